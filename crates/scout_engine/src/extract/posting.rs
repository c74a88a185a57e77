use scout_core::{Cascade, StrategyError};
use serde::Serialize;
use serde_json::Value;

use super::first_text;
use crate::page::{element_text, DomSnapshot};
use crate::text::plain_text;

const MIN_DESCRIPTION_CHARS: usize = 100;

const DESCRIPTION_CONTAINERS: &[&str] = &[
    "div[class*=\"jobs-description-content__text\"]",
    "div[class*=\"jobs-box__html-content\"]",
    "div[class*=\"description__text\"]",
    "section[class*=\"jobs-description\"] div[class*=\"text\"]",
    "[data-test-id=\"job-poster-description\"]",
    "div.jobs-description__content",
    "section[class*=\"description\"]",
];
const MAIN_CONTENT: &[&str] = &["main", "[class*=\"scaffold-layout__main\"]"];
const TITLES: &[&str] = &[
    "h1[class*=\"jobs-unified-top-card__job-title\"]",
    "h1[class*=\"job-title\"]",
    "h2[class*=\"job-title\"]",
    "h1.top-card-layout__title",
];
const COMPANIES: &[&str] = &[
    "a[class*=\"jobs-unified-top-card__company-name\"]",
    "a[class*=\"job-details-jobs-unified-top-card__company-name\"]",
    "[data-test-id=\"job-poster-name\"]",
    "span[class*=\"jobs-unified-top-card__company-name\"]",
    "a.topcard__org-name-link",
];
const LOCATIONS: &[&str] = &[
    "span[class*=\"jobs-unified-top-card__bullet\"]",
    "span[class*=\"jobs-unified-top-card__primary-description\"]",
    "[data-test-id=\"job-poster-location\"]",
    "span.topcard__flavor--bullet",
];

/// Details of one job posting page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobPosting {
    pub url: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
}

/// `None` when no description could be found.
pub fn extract_job_posting(url: &str, html: &str) -> Option<JobPosting> {
    let snapshot = DomSnapshot::parse(url, html);
    let description = description_cascade().extract(&snapshot).into_option()?;
    let field = |selectors: &'static [&'static str], ld_key: &'static str| {
        text_cascade(selectors, ld_key)
            .extract(&snapshot)
            .into_option()
            .unwrap_or_default()
    };
    Some(JobPosting {
        url: url.to_string(),
        title: field(TITLES, "title"),
        company: field(COMPANIES, "hiringOrganization"),
        location: field(LOCATIONS, "jobLocation"),
        description,
    })
}

fn description_cascade() -> Cascade<DomSnapshot, String> {
    Cascade::new("job description", |text: &String| {
        text.trim().chars().count() > MIN_DESCRIPTION_CHARS
    })
    .strategy("description container", |snap: &DomSnapshot| {
        long_text(snap, DESCRIPTION_CONTAINERS)
    })
    .strategy("json-ld", |snap: &DomSnapshot| {
        Ok(json_ld_posting(snap)?
            .as_ref()
            .and_then(|posting| posting.get("description"))
            .and_then(Value::as_str)
            .map(plain_text))
    })
    .strategy("main content", |snap: &DomSnapshot| long_text(snap, MAIN_CONTENT))
}

fn text_cascade(selectors: &'static [&'static str], ld_key: &'static str) -> Cascade<DomSnapshot, String> {
    Cascade::new("job field", |text: &String| !text.trim().is_empty())
        .strategy("top card", move |snap: &DomSnapshot| first_text(snap, selectors))
        .strategy("json-ld", move |snap: &DomSnapshot| {
            Ok(json_ld_posting(snap)?
                .as_ref()
                .and_then(|posting| posting.get(ld_key))
                .and_then(ld_text))
        })
}

/// First matching container whose text is long enough to be a description.
fn long_text(snap: &DomSnapshot, selectors: &[&str]) -> Result<Option<String>, StrategyError> {
    for css in selectors {
        for element in snap.select(css)? {
            let text = element_text(element);
            if text.chars().count() > MIN_DESCRIPTION_CHARS {
                return Ok(Some(text));
            }
        }
    }
    Ok(None)
}

/// The `JobPosting` object from the page's JSON-LD blocks, top level or in `@graph`.
fn json_ld_posting(snap: &DomSnapshot) -> Result<Option<Value>, StrategyError> {
    for script in snap.select("script[type=\"application/ld+json\"]")? {
        let raw: String = script.text().collect();
        let Ok(value) = serde_json::from_str::<Value>(&raw) else {
            continue;
        };
        if let Some(posting) = find_posting(value) {
            return Ok(Some(posting));
        }
    }
    Ok(None)
}

fn find_posting(value: Value) -> Option<Value> {
    match value {
        Value::Array(items) => items.into_iter().find_map(find_posting),
        Value::Object(mut map) => {
            let is_posting = map
                .get("@type")
                .and_then(Value::as_str)
                .is_some_and(|t| t.eq_ignore_ascii_case("JobPosting"));
            if is_posting {
                return Some(Value::Object(map));
            }
            map.remove("@graph").and_then(find_posting)
        }
        _ => None,
    }
}

/// Strings as-is; organizations and places by their name or locality.
fn ld_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(plain_text(s)),
        Value::Array(items) => items.iter().find_map(ld_text),
        Value::Object(map) => ["name", "addressLocality"]
            .iter()
            .find_map(|key| map.get(*key).and_then(ld_text))
            .or_else(|| map.get("address").and_then(ld_text)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_ld_posting_fills_missing_fields() {
        let long = "Build worlds. ".repeat(20);
        let html = format!(
            r#"<html><head><script type="application/ld+json">
            {{"@context":"https://schema.org","@graph":[{{"@type":"JobPosting",
              "title":"Level Designer","description":"<p>{long}</p>",
              "hiringOrganization":{{"@type":"Organization","name":"Acme Games"}},
              "jobLocation":{{"@type":"Place","address":{{"addressLocality":"Lisbon"}}}}}}]}}
            </script></head><body><main>short</main></body></html>"#
        );
        let posting = extract_job_posting("https://www.linkedin.com/jobs/view/1/", &html).unwrap();
        assert_eq!(posting.title, "Level Designer");
        assert_eq!(posting.company, "Acme Games");
        assert_eq!(posting.location, "Lisbon");
        assert!(posting.description.starts_with("Build worlds. Build worlds."));
    }

    #[test]
    fn page_without_description_yields_none() {
        let html = "<html><body><h1 class=\"job-title\">Artist</h1></body></html>";
        assert_eq!(extract_job_posting("https://www.linkedin.com/jobs/view/2/", html), None);
    }
}
