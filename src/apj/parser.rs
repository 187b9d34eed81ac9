use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::ParseError;
use crate::types::Episode;
use crate::utils::absolutize_url;

static RE_EPISODE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)").expect("invalid regex: episode number"));

pub(crate) struct ParsedPage {
    pub episodes: Vec<Episode>,
    pub skipped: usize,
    pub has_more: bool,
}

fn elem_text(element: ElementRef) -> String {
    element.text().collect::<String>()
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn parse_episode_list(html: &str, page_url: &str) -> Result<ParsedPage, ParseError> {
    let document = Html::parse_document(html);
    let list_sel = Selector::parse("div.resource-list").unwrap();
    let tile_sel = Selector::parse("div.tile").unwrap();
    let load_more_sel = Selector::parse("a.load-more").unwrap();

    let Some(list) = document.select(&list_sel).next() else {
        return Err(ParseError::StructureMismatch(format!(
            "no div.resource-list container on {}",
            page_url
        )));
    };

    let mut episodes = Vec::new();
    let mut skipped = 0;

    for tile in list.select(&tile_sel) {
        match parse_tile(tile) {
            Ok(episode) => episodes.push(episode),
            Err(e) => {
                log::warn!("Skipping malformed episode tile on {}: {}", page_url, e);
                skipped += 1;
            }
        }
    }

    let has_more = document.select(&load_more_sel).next().is_some();

    Ok(ParsedPage {
        episodes,
        skipped,
        has_more,
    })
}

fn parse_tile(tile: ElementRef) -> Result<Episode, ParseError> {
    let title_sel = Selector::parse("h2.tile-title a").unwrap();
    let number_sel = Selector::parse("span.number").unwrap();
    let time_sel = Selector::parse("time.time").unwrap();
    let topic_sel = Selector::parse(r#"a[data-grouping-type="Topic"]"#).unwrap();
    let description_sel = Selector::parse("div.tile-description").unwrap();

    let title_elem = tile
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

    let episode_number = tile
        .select(&number_sel)
        .next()
        .map(elem_text)
        .and_then(|text| {
            RE_EPISODE_NUMBER
                .captures(&text)
                .map(|caps| caps[1].to_string())
        })
        .unwrap_or_default();

    // The datetime attribute is the stable form; the element text is a
    // display variant that changes with the site's locale settings.
    let date = tile
        .select(&time_sel)
        .next()
        .map(|e| match e.value().attr("datetime") {
            Some(datetime) => datetime.to_string(),
            None => normalize_whitespace(&elem_text(e)),
        })
        .unwrap_or_default();

    let topic = tile
        .select(&topic_sel)
        .next()
        .map(|e| normalize_whitespace(&elem_text(e)))
        .unwrap_or_default();

    let description = tile
        .select(&description_sel)
        .next()
        .map(|e| normalize_whitespace(&elem_text(e)))
        .unwrap_or_default();

    Ok(Episode {
        episode_number,
        title,
        url,
        date,
        topic,
        description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_parse_listing_from_fixture() {
        let html =
            fs::read_to_string("fixtures/apj_listing.html").expect("Failed to read fixture");

        let page = parse_episode_list(&html, "https://www.desiringgod.org/ask-pastor-john")
            .expect("Failed to parse episode list");

        assert_eq!(page.episodes.len(), 2);
        assert_eq!(page.skipped, 1, "tile without a title link should be skipped");
        assert!(page.has_more, "fixture advertises a load-more link");

        let first = &page.episodes[0];
        assert_eq!(first.episode_number, "1742");
        assert_eq!(first.title, "Does God Delight in Me?");
        assert_eq!(
            first.url,
            "https://www.desiringgod.org/interviews/does-god-delight-in-me"
        );
        assert_eq!(first.date, "2022-01-31");
        assert_eq!(first.topic, "Assurance of Salvation");
        assert_eq!(
            first.description,
            "Pastor John answers a listener question about assurance."
        );

        assert_eq!(page.episodes[1].title, "Faith, Hope, and Love");
    }

    #[test]
    fn test_parse_single_tile() {
        let html = r#"
            <div class="resource-list">
              <div class="tile">
                <span class="number">Episode 1500</span>
                <h2 class="tile-title"><a href="/interviews/some-episode">Some  Episode</a></h2>
                <time class="time" datetime="2020-06-15">Jun 15, 2020</time>
                <a data-grouping-type="Topic" href="/topics/prayer">Prayer</a>
                <div class="tile-description">On prayer.</div>
              </div>
            </div>
        "#;

        let page = parse_episode_list(html, "test://apj").expect("Failed to parse");

        assert_eq!(page.episodes.len(), 1);
        assert_eq!(page.skipped, 0);
        assert!(!page.has_more);

        let episode = &page.episodes[0];
        assert_eq!(episode.episode_number, "1500");
        assert_eq!(episode.title, "Some Episode");
        assert_eq!(
            episode.url,
            "https://www.desiringgod.org/interviews/some-episode"
        );
        assert_eq!(episode.date, "2020-06-15");
        assert_eq!(episode.topic, "Prayer");
        assert_eq!(episode.description, "On prayer.");
    }

    #[test]
    fn test_tile_without_optional_fields_still_parses() {
        let html = r#"
            <div class="resource-list">
              <div class="tile">
                <h2 class="tile-title"><a href="https://www.desiringgod.org/interviews/bare">Bare Episode</a></h2>
              </div>
            </div>
        "#;

        let page = parse_episode_list(html, "test://apj").expect("Failed to parse");

        assert_eq!(page.episodes.len(), 1);
        let episode = &page.episodes[0];
        assert_eq!(episode.episode_number, "");
        assert_eq!(episode.date, "");
        assert_eq!(episode.topic, "");
        assert_eq!(episode.description, "");
    }

    #[test]
    fn test_tile_missing_title_is_skipped() {
        let html = r#"
            <div class="resource-list">
              <div class="tile">
                <span class="number">Episode 9</span>
                <time class="time" datetime="2020-01-01">Jan 1, 2020</time>
              </div>
              <div class="tile">
                <h2 class="tile-title"><a href="/interviews/kept">Kept</a></h2>
              </div>
            </div>
        "#;

        let page = parse_episode_list(html, "test://apj").expect("Failed to parse");

        assert_eq!(page.episodes.len(), 1);
        assert_eq!(page.skipped, 1);
        assert_eq!(page.episodes[0].title, "Kept");
    }

    #[test]
    fn test_tile_with_unresolvable_href_is_skipped() {
        let html = r#"
            <div class="resource-list">
              <div class="tile">
                <h2 class="tile-title"><a href="interviews/relative">Relative Link</a></h2>
              </div>
            </div>
        "#;

        let page = parse_episode_list(html, "test://apj").expect("Failed to parse");

        assert!(page.episodes.is_empty());
        assert_eq!(page.skipped, 1);
    }

    #[test]
    fn test_missing_container_is_structure_mismatch() {
        let html = "<html><body><p>Maintenance page</p></body></html>";

        let result = parse_episode_list(html, "test://apj");

        assert!(matches!(result, Err(ParseError::StructureMismatch(_))));
    }

    #[test]
    fn test_empty_container_yields_no_episodes() {
        let html = r#"<div class="resource-list"></div>"#;

        let page = parse_episode_list(html, "test://apj").expect("Failed to parse");

        assert!(page.episodes.is_empty());
        assert_eq!(page.skipped, 0);
        assert!(!page.has_more);
    }

    #[test]
    fn test_time_without_datetime_falls_back_to_text() {
        let html = r#"
            <div class="resource-list">
              <div class="tile">
                <h2 class="tile-title"><a href="/interviews/fallback">Fallback</a></h2>
                <time class="time">Jan 31, 2022</time>
              </div>
            </div>
        "#;

        let page = parse_episode_list(html, "test://apj").expect("Failed to parse");

        assert_eq!(page.episodes[0].date, "Jan 31, 2022");
    }
}
