use scout_core::{Cascade, ExtractionResult};

use super::first_text;
use crate::page::DomSnapshot;

const TOP_CARD_TITLES: &[&str] = &[
    "h1.org-top-card-summary__title",
    "h1[data-anonymize=\"company-name\"]",
    "h1.text-heading-xlarge",
];

const TITLE_SUFFIXES: &[&str] = &[" | LinkedIn", " - LinkedIn"];

pub fn company_name_cascade() -> Cascade<DomSnapshot, String> {
    Cascade::new("company name", |name: &String| !name.trim().is_empty())
        .strategy("top card title", |snap: &DomSnapshot| first_text(snap, TOP_CARD_TITLES))
        .strategy("og:title", |snap: &DomSnapshot| {
            Ok(snap.meta_content("og:title").map(|t| strip_site_suffix(&t)))
        })
        .strategy("document title", |snap: &DomSnapshot| {
            Ok(snap.title().map(|t| strip_site_suffix(&t)))
        })
}

pub fn extract_company_name(url: &str, html: &str) -> ExtractionResult<String> {
    let snapshot = DomSnapshot::parse(url, html);
    company_name_cascade().extract(&snapshot)
}

fn strip_site_suffix(title: &str) -> String {
    let mut title = title.trim();
    for suffix in TITLE_SUFFIXES {
        if let Some(stripped) = title.strip_suffix(suffix) {
            title = stripped.trim_end();
        }
    }
    // Company pages are titled "Acme: Overview | LinkedIn".
    title = title.strip_suffix(": Overview").unwrap_or(title);
    title.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_suffix_is_removed() {
        assert_eq!(strip_site_suffix("Acme: Overview | LinkedIn"), "Acme");
        assert_eq!(strip_site_suffix("Acme Games"), "Acme Games");
    }
}
