mod parser;
pub mod scraper;

pub use scraper::WebScraper;

pub(crate) const BASE_URL: &str = "https://www.desiringgod.org";
pub(crate) const LISTING_PATH: &str = "/ask-pastor-john";
