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

    /// Follows the listing's next-page links from the front page, collecting
    /// episodes in encounter order. Stops when a page is empty, the next
    /// link disappears, or the `max_pages` cap is reached.
    pub fn fetch_episodes(&self, max_pages: Option<u32>) -> Result<ScrapeReport, ScraperError> {
        let mut report = ScrapeReport::new(Source::TherapyTheology);
        let mut next_url = Some(self.base_url.clone());
        let mut page = 1u32;

        while let Some(url) = next_url.take() {
            log::info!("Fetching episode list page {}: {}", page, url);

            let html = self.get_html(&url)?;
            let parsed = parse_episode_list(&html, &url)?;
            report.pages_fetched += 1;
            report.skipped_entries += parsed.skipped;

            if parsed.episodes.is_empty() {
                log::info!("No episodes on page {}, stopping", page);
                break;
            }

            for mut episode in parsed.episodes {
                // The platform numbers few episodes in their titles; the
                // rest get their 1-based encounter position.
                if episode.episode_number.is_empty() {
                    episode.episode_number = (report.episodes.len() + 1).to_string();
                }
                report.episodes.push(episode);
            }
            log::info!("Collected {} episodes so far", report.episodes.len());

            if max_pages.is_some_and(|max| page >= max) {
                log::info!("Reached page cap ({}), stopping", page);
                break;
            }

            match parsed.next_page {
                Some(next) => {
                    thread::sleep(PAGE_DELAY);
                    next_url = Some(next);
                    page += 1;
                }
                None => log::info!("No next-page link, stopping"),
            }
        }

        Ok(report)
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
