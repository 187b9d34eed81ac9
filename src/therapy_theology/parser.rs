use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::ParseError;
use crate::types::Episode;
use crate::utils::absolutize_url;

// Titles on the platform carry the number when there is one, e.g.
// "Ep. 42: Boundaries That Hold" or "Episode 7 | ...".
static RE_TITLE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^ep(?:isode)?\.?\s*(\d+)").expect("invalid regex: title number")
});

pub(crate) struct ParsedPage {
    pub episodes: Vec<Episode>,
    pub skipped: usize,
    pub next_page: Option<String>,
}

fn elem_text(element: ElementRef) -> String {
    element.text().collect::<String>()
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn parse_episode_list(html: &str, page_url: &str) -> Result<ParsedPage, ParseError> {
    let document = Html::parse_document(html);
    let list_sel = Selector::parse("ul.episode-list").unwrap();
    let item_sel = Selector::parse("li.episode-item").unwrap();
    let next_sel = Selector::parse("div.pagination a.next").unwrap();

    let Some(list) = document.select(&list_sel).next() else {
        return Err(ParseError::StructureMismatch(format!(
            "no ul.episode-list container on {}",
            page_url
        )));
    };

    let mut episodes = Vec::new();
    let mut skipped = 0;

    for item in list.select(&item_sel) {
        match parse_item(item) {
            Ok(episode) => episodes.push(episode),
            Err(e) => {
                log::warn!("Skipping malformed episode entry on {}: {}", page_url, e);
                skipped += 1;
            }
        }
    }

    let next_page = document
        .select(&next_sel)
        .next()
        .and_then(|e| e.value().attr("href"))
        .and_then(|href| absolutize_url(super::BASE_URL, href));

    Ok(ParsedPage {
        episodes,
        skipped,
        next_page,
    })
}

fn parse_item(item: ElementRef) -> Result<Episode, ParseError> {
    let title_sel = Selector::parse("h3.episode-title a").unwrap();
    let date_sel = Selector::parse("span.episode-date").unwrap();
    let excerpt_sel = Selector::parse("p.episode-excerpt").unwrap();

    let title_elem = item
        .select(&title_sel)
        .next()
        .ok_or_else(|| ParseError::MissingField("title link".to_string()))?;

    let title = normalize_whitespace(&elem_text(title_elem));
    if title.is_empty() {
        return Err(ParseError::MissingField("title text".to_string()));
    }

    let href = title_elem
        .value()
        .attr("href")
        .ok_or_else(|| ParseError::MissingField("href attribute".to_string()))?;
    let url = absolutize_url(super::BASE_URL, href)
        .ok_or_else(|| ParseError::MissingField(format!("absolute URL for href '{}'", href)))?;

    // Empty means the scraper assigns the running ordinal instead.
    let episode_number = RE_TITLE_NUMBER
        .captures(&title)
        .map(|caps| caps[1].to_string())
        .unwrap_or_default();

    let date = item
        .select(&date_sel)
        .next()
        .map(|e| normalize_whitespace(&elem_text(e)))
        .unwrap_or_default();

    let description = item
        .select(&excerpt_sel)
        .next()
        .map(|e| normalize_whitespace(&elem_text(e)))
        .unwrap_or_default();

    Ok(Episode {
        episode_number,
        title,
        url,
        date,
        // The platform exposes no topic taxonomy; the column stays in the
        // schema with an empty value.
        topic: String::new(),
        description,
    })
}
