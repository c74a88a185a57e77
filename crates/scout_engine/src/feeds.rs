//! AI news sources: candidate feed URLs, keyword filters and manual fallbacks.
use std::collections::BTreeMap;

use engine_logging::{engine_info, engine_warn};
use futures_util::future::join_all;
use regex::Regex;

use crate::digest::{FeedEntry, SourceFailure, SourceResult};
use crate::fetch::Fetcher;

#[derive(Debug, Clone)]
pub struct FeedSource {
    pub name: String,
    /// Feed URLs tried in order.
    pub candidates: Vec<String>,
    /// Keeps entries whose link or title matches.
    pub keyword_filter: Option<Regex>,
    /// Page to check by hand when no candidate yields entries.
    pub fallback_page: Option<String>,
}

impl FeedSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            candidates: vec![url.into()],
            keyword_filter: None,
            fallback_page: None,
        }
    }

    /// Candidate feed paths under `origin`, e.g. `/feed`, `/rss.xml`.
    pub fn probing(name: impl Into<String>, origin: &str, paths: &[&str]) -> Self {
        Self {
            name: name.into(),
            candidates: paths.iter().map(|path| format!("{origin}{path}")).collect(),
            keyword_filter: None,
            fallback_page: None,
        }
    }

    pub fn filtered_by(mut self, filter: Regex) -> Self {
        self.keyword_filter = Some(filter);
        self
    }

    pub fn with_fallback_page(mut self, url: impl Into<String>) -> Self {
        self.fallback_page = Some(url.into());
        self
    }

    fn keeps(&self, entry: &FeedEntry) -> bool {
        self.keyword_filter
            .as_ref()
            .is_none_or(|filter| filter.is_match(&format!("{} {}", entry.link, entry.title)))
    }

    fn manual_check_entry(&self, page: &str) -> FeedEntry {
        FeedEntry {
            title: format!("{} updates", self.name),
            link: page.to_string(),
            published: None,
            summary: format!("No feed found. Check manually: {page}"),
        }
    }
}

pub fn default_sources() -> Vec<FeedSource> {
    let mut sources = vec![
        FeedSource::new("OpenAI", "https://openai.com/blog/rss.xml"),
        FeedSource::new("Google Cloud", "https://cloudblog.withgoogle.com/rss/"),
        FeedSource::probing(
            "xAI",
            "https://x.ai",
            &["/feed", "/rss", "/feed.xml", "/rss.xml", "/blog/feed"],
        )
        .with_fallback_page("https://x.ai/blog"),
        FeedSource::probing(
            "Manus",
            "https://manus.im",
            &["/feed", "/rss", "/updates/feed", "/feed.xml"],
        )
        .with_fallback_page("https://manus.im/updates"),
    ];
    if let Ok(gemini) = Regex::new(r"(?i)gemini|google ai|duet|bard|ai (studio|api)") {
        sources.push(FeedSource::new("Gemini", "https://cloudblog.withgoogle.com/rss/").filtered_by(gemini));
    }
    sources
}

/// Parses RSS, Atom or JSON Feed bytes.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<FeedEntry>, String> {
    let feed = feed_rs::parser::parse(bytes).map_err(|err| err.to_string())?;
    Ok(feed
        .entries
        .into_iter()
        .map(|entry| FeedEntry {
            title: entry
                .title
                .map(|t| t.content)
                .unwrap_or_default(),
            link: entry
                .links
                .first()
                .map(|link| link.href.clone())
                .unwrap_or_default(),
            published: entry.published.or(entry.updated),
            summary: entry
                .summary
                .map(|s| s.content)
                .or_else(|| entry.content.and_then(|c| c.body))
                .unwrap_or_default(),
        })
        .collect())
}

/// Tries each candidate until one yields entries.
pub async fn fetch_source(fetcher: &dyn Fetcher, source: &FeedSource) -> SourceResult {
    let mut last_failure = None;
    let mut empty_feed = None;
    for url in &source.candidates {
        let parsed = fetcher
            .fetch(url)
            .await
            .map_err(|err| err.to_string())
            .and_then(|output| parse_feed(&output.bytes));
        match parsed {
            Ok(entries) if !entries.is_empty() => {
                let kept: Vec<FeedEntry> = entries.into_iter().filter(|e| source.keeps(e)).collect();
                engine_info!("{}: {} entries from {url}", source.name, kept.len());
                return Ok(kept);
            }
            Ok(_) => empty_feed = Some(Vec::new()),
            Err(message) => {
                engine_warn!("{}: {url}: {message}", source.name);
                last_failure = Some(SourceFailure {
                    url: url.clone(),
                    message,
                });
            }
        }
    }
    if let Some(page) = &source.fallback_page {
        return Ok(vec![source.manual_check_entry(page)]);
    }
    if let Some(empty) = empty_feed {
        return Ok(empty);
    }
    Err(last_failure.unwrap_or_else(|| SourceFailure {
        url: String::new(),
        message: "no feed URL configured".to_string(),
    }))
}

/// Fetches every source concurrently. One source failing never affects another.
pub async fn fetch_all(fetcher: &dyn Fetcher, sources: &[FeedSource]) -> BTreeMap<String, SourceResult> {
    let results = join_all(sources.iter().map(|source| fetch_source(fetcher, source))).await;
    sources
        .iter()
        .map(|source| source.name.clone())
        .zip(results)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_filter_checks_link_and_title() {
        let source = FeedSource::new("Gemini", "https://example.com/rss")
            .filtered_by(Regex::new("(?i)gemini").unwrap());
        let entry = |title: &str, link: &str| FeedEntry {
            title: title.into(),
            link: link.into(),
            published: None,
            summary: String::new(),
        };
        assert!(source.keeps(&entry("Gemini 3 launch", "https://example.com/a")));
        assert!(source.keeps(&entry("Launch", "https://example.com/products/gemini/")));
        assert!(!source.keeps(&entry("Storage news", "https://example.com/b")));
    }

    #[test]
    fn rss_entries_are_parsed() {
        let rss = br#"<?xml version="1.0"?><rss version="2.0"><channel><title>t</title>
            <item><title>Hello</title><link>https://example.com/hello</link>
            <pubDate>Tue, 13 Oct 2026 10:00:00 GMT</pubDate><description>&lt;p&gt;Hi&lt;/p&gt;</description></item>
            </channel></rss>"#;
        let entries = parse_feed(rss).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Hello");
        assert_eq!(entries[0].link, "https://example.com/hello");
        assert!(entries[0].published.is_some());
        assert!(entries[0].summary.contains("Hi"));
    }
}
