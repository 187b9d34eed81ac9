use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;

use super::parser::parse_episode_list;
use crate::error::ScraperError;
use crate::types::Source;
use crate::utils::ScrapeReport;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_ATTEMPTS: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(2);
const PAGE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct WebScraper {
    client: Client,
    base_url: String,
}

impl WebScraper {
    pub fn new() -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(format!(
                "{}/{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            client,
            base_url: super::BASE_URL.to_string(),
        })
    }

    /// Walks the paginated listing in page-number order and collects every
    /// episode in encounter order. Stops on an empty page, when the site no
    /// longer advertises further pages, or at the `max_pages` cap.
    pub fn fetch_episodes(&self, max_pages: Option<u32>) -> Result<ScrapeReport, ScraperError> {
        let mut report = ScrapeReport::new(Source::AskPastorJohn);
        let mut page = 1u32;

        loop {
            let url = self.page_url(page);
            log::info!("Fetching episode list page {}: {}", page, url);

            let html = self.get_html(&url)?;
            let parsed = parse_episode_list(&html, &url)?;
            report.pages_fetched += 1;
            report.skipped_entries += parsed.skipped;

            if parsed.episodes.is_empty() {
                log::info!("No episodes on page {}, stopping", page);
                break;
            }

            report.episodes.extend(parsed.episodes);
            log::info!("Collected {} episodes so far", report.episodes.len());

            if !parsed.has_more {
                log::info!("No further pages advertised, stopping");
                break;
            }
            if max_pages.is_some_and(|max| page >= max) {
                log::info!("Reached page cap ({}), stopping", page);
                break;
            }

            thread::sleep(PAGE_DELAY);
            page += 1;
        }

        Ok(report)
    }

    fn page_url(&self, page: u32) -> String {
        if page == 1 {
            format!("{}{}", self.base_url, super::LISTING_PATH)
        } else {
            format!(
                "{}{}/recent.html?page={}",
                self.base_url,
                super::LISTING_PATH,
                page
            )
        }
    }

    fn get_html(&self, url: &str) -> Result<String, ScraperError> {
        let mut attempt = 1;
        loop {
            match self.try_get(url) {
                Ok(html) => return Ok(html),
                Err(e) if attempt < MAX_ATTEMPTS && is_transient(&e) => {
                    log::warn!("Attempt {}/{} for {} failed: {}", attempt, MAX_ATTEMPTS, url, e);
                    thread::sleep(RETRY_DELAY);
                    attempt += 1;
                }
                Err(e) => {
                    log::error!("HTTP error for {}: {}", url, e);
                    return Err(e.into());
                }
            }
        }
    }

    fn try_get(&self, url: &str) -> Result<String, reqwest::Error> {
        self.client.get(url).send()?.error_for_status()?.text()
    }
}

fn is_transient(error: &reqwest::Error) -> bool {
    error.is_timeout()
        || error.is_connect()
        || error.status().is_some_and(|s| s.is_server_error())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_url_pattern() {
        let scraper = WebScraper::new().expect("Failed to create scraper");

        assert_eq!(
            scraper.page_url(1),
            "https://www.desiringgod.org/ask-pastor-john"
        );
        assert_eq!(
            scraper.page_url(2),
            "https://www.desiringgod.org/ask-pastor-john/recent.html?page=2"
        );
        assert_eq!(
            scraper.page_url(215),
            "https://www.desiringgod.org/ask-pastor-john/recent.html?page=215"
        );
    }
}
