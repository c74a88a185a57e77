use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

use super::{normalize_text, Locator, TextMatch};
use crate::PageError;

/// Tags whose text never counts as visible page text.
const INVISIBLE_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Parsed copy of a page at one point in time.
///
/// Every extraction strategy runs against a snapshot, so strategies behave the
/// same whether the source came from a live browser or from a saved file.
pub struct DomSnapshot {
    url: String,
    html: String,
    document: Html,
}

impl DomSnapshot {
    pub fn parse(url: impl Into<String>, html: impl Into<String>) -> Self {
        let html = html.into();
        let document = Html::parse_document(&html);
        Self {
            url: url.into(),
            html,
            document,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn select(&self, css: &str) -> Result<Vec<ElementRef<'_>>, PageError> {
        let selector = parse_selector(css)?;
        Ok(self.document.select(&selector).collect())
    }

    /// Elements matched by `locator`, in document order.
    pub fn find(&self, locator: &Locator) -> Result<Vec<ElementRef<'_>>, PageError> {
        match locator {
            Locator::Css(css) => self.select(css),
            Locator::CssText { css, text } => Ok(self
                .select(css)?
                .into_iter()
                .filter(|el| text.matches(&element_text(*el)))
                .collect()),
            Locator::Text(text) => {
                let mut found = Vec::new();
                collect_by_own_text(self.document.root_element(), text, &mut found);
                Ok(found)
            }
        }
    }

    pub fn count(&self, locator: &Locator) -> Result<usize, PageError> {
        Ok(self.find(locator)?.len())
    }

    pub fn first_text(&self, locator: &Locator) -> Result<Option<String>, PageError> {
        Ok(self.find(locator)?.into_iter().next().map(element_text))
    }

    /// `content` of `<meta property=..>` or `<meta name=..>`.
    pub fn meta_content(&self, key: &str) -> Option<String> {
        let css = format!("meta[property=\"{key}\"], meta[name=\"{key}\"]");
        self.select(&css)
            .ok()?
            .into_iter()
            .filter_map(|el| el.value().attr("content"))
            .map(normalize_text)
            .find(|content| !content.is_empty())
    }

    pub fn title(&self) -> Option<String> {
        self.select("title")
            .ok()?
            .into_iter()
            .map(|el| normalize_text(&el.text().collect::<String>()))
            .find(|title| !title.is_empty())
    }
}

pub(crate) fn parse_selector(css: &str) -> Result<Selector, PageError> {
    Selector::parse(css).map_err(|err| PageError::InvalidSelector {
        selector: css.to_string(),
        message: err.to_string(),
    })
}

/// Matches of `css` below `element`.
pub(crate) fn select_within<'a>(
    element: ElementRef<'a>,
    css: &str,
) -> Result<Vec<ElementRef<'a>>, PageError> {
    let selector = parse_selector(css)?;
    Ok(element.select(&selector).collect())
}

/// Visible text of an element and its descendants, whitespace-normalized.
pub fn element_text(element: ElementRef<'_>) -> String {
    let mut parts = Vec::new();
    push_visible_text(element, &mut parts);
    normalize_text(&parts.join(" "))
}

/// Text of the element's direct text children only.
pub fn own_text(element: ElementRef<'_>) -> String {
    let parts: Vec<&str> = element
        .children()
        .filter_map(|child| child.value().as_text().map(|text| &**text))
        .collect();
    normalize_text(&parts.join(" "))
}

fn push_visible_text<'a>(element: ElementRef<'a>, parts: &mut Vec<&'a str>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => parts.push(text),
            Node::Element(el) if INVISIBLE_TAGS.contains(&el.name()) => {}
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    push_visible_text(child_el, parts);
                }
            }
            _ => {}
        }
    }
}

fn collect_by_own_text<'a>(element: ElementRef<'a>, text: &TextMatch, found: &mut Vec<ElementRef<'a>>) {
    if INVISIBLE_TAGS.contains(&element.value().name()) {
        return;
    }
    let own = own_text(element);
    if !own.is_empty() && text.matches(&own) {
        found.push(element);
    }
    for child in element.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            collect_by_own_text(child_el, text, found);
        }
    }
}
