use std::fmt::Display;

use crate::types::{Episode, Source};

/// Outcome of one source's scrape run. Skipped entries are counted so the
/// run summary can report them; nothing is dropped silently.
#[derive(Debug)]
pub struct ScrapeReport {
    pub source: Source,
    pub episodes: Vec<Episode>,
    pub pages_fetched: usize,
    pub skipped_entries: usize,
}

impl ScrapeReport {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            episodes: Vec::new(),
            pages_fetched: 0,
            skipped_entries: 0,
        }
    }
}

impl Display for ScrapeReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}:", self.source)?;
        writeln!(f, "  Pages fetched:   {}", self.pages_fetched)?;
        writeln!(f, "  Episodes:        {}", self.episodes.len())?;
        writeln!(f, "  Skipped entries: {}", self.skipped_entries)
    }
}

/// Episode links must be absolute in the output. Hrefs that are neither
/// absolute nor site-rooted cannot be resolved and the entry is skipped.
pub(crate) fn absolutize_url(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.starts_with("http://") || href.starts_with("https://") {
        Some(href.to_string())
    } else if href.starts_with('/') {
        Some(format!("{}{}", base.trim_end_matches('/'), href))
    } else {
        None
    }
}
