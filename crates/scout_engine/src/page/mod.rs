//! Browser page abstraction.
//!
//! Automation code talks to a [`Page`]: navigate, count and read elements,
//! click, and move cookies in and out. Extraction never queries the live page
//! element by element; it reads a [`DomSnapshot`] parsed from the page source.
mod snapshot;
mod static_page;
mod webdriver;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use engine_logging::engine_debug;

use crate::{Cookie, PageError};

pub use snapshot::{element_text, own_text, DomSnapshot};
pub(crate) use snapshot::select_within;
pub use static_page::StaticPage;
pub use webdriver::{WebDriverPage, WebDriverSettings};

/// Case-insensitive, whitespace-normalized text comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextMatch {
    Contains(String),
    Exact(String),
}

impl TextMatch {
    pub fn needle(&self) -> &str {
        match self {
            TextMatch::Contains(s) | TextMatch::Exact(s) => s,
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        let haystack = normalize_text(text).to_lowercase();
        let needle = normalize_text(self.needle()).to_lowercase();
        match self {
            TextMatch::Contains(_) => haystack.contains(&needle),
            TextMatch::Exact(_) => haystack == needle,
        }
    }
}

/// Collapses every run of whitespace to one space and trims the ends.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// How to find elements on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// Plain CSS selector.
    Css(String),
    /// Elements matching `css` whose full text matches `text`.
    CssText { css: String, text: TextMatch },
    /// Any element whose own text matches.
    Text(TextMatch),
}

impl Locator {
    pub fn css(css: impl Into<String>) -> Self {
        Locator::Css(css.into())
    }

    pub fn css_containing(css: impl Into<String>, text: impl Into<String>) -> Self {
        Locator::CssText {
            css: css.into(),
            text: TextMatch::Contains(text.into()),
        }
    }

    pub fn css_exact(css: impl Into<String>, text: impl Into<String>) -> Self {
        Locator::CssText {
            css: css.into(),
            text: TextMatch::Exact(text.into()),
        }
    }

    pub fn text_containing(text: impl Into<String>) -> Self {
        Locator::Text(TextMatch::Contains(text.into()))
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(css) => write!(f, "{css}"),
            Locator::CssText {
                css,
                text: TextMatch::Contains(t),
            } => write!(f, "{css}:has-text({t:?})"),
            Locator::CssText {
                css,
                text: TextMatch::Exact(t),
            } => write!(f, "{css}:text-is({t:?})"),
            Locator::Text(TextMatch::Contains(t)) => write!(f, "text={t}"),
            Locator::Text(TextMatch::Exact(t)) => write!(f, "text={t:?}"),
        }
    }
}

/// A single browser tab. Implementations use interior mutability so one page
/// can be shared by reference across the steps of a batch.
#[async_trait]
pub trait Page: Send + Sync {
    async fn goto(&self, url: &str) -> Result<(), PageError>;
    async fn current_url(&self) -> Result<String, PageError>;
    async fn count(&self, locator: &Locator) -> Result<usize, PageError>;
    /// Text of the first matching element.
    async fn inner_text(&self, locator: &Locator) -> Result<Option<String>, PageError>;
    /// Clicks the first matching element; [`PageError::NoMatch`] when none.
    async fn click(&self, locator: &Locator) -> Result<(), PageError>;
    /// Full page source.
    async fn content(&self) -> Result<String, PageError>;
    async fn cookies(&self) -> Result<Vec<Cookie>, PageError>;
    async fn add_cookies(&self, cookies: &[Cookie]) -> Result<(), PageError>;
    async fn close(&self) -> Result<(), PageError>;
}

/// Navigates and waits `settle` for dynamic content to render.
pub async fn open(page: &dyn Page, url: &str, settle: Duration) -> Result<(), PageError> {
    engine_debug!("navigating to {url}");
    page.goto(url).await?;
    if !settle.is_zero() {
        tokio::time::sleep(settle).await;
    }
    Ok(())
}

/// Current URL and source of the page, ready to be parsed into a [`DomSnapshot`].
///
/// The parsed document is not `Send`, so callers keep only these strings
/// across `.await` points and parse inside synchronous code.
pub async fn capture(page: &dyn Page) -> Result<(String, String), PageError> {
    let url = page.current_url().await?;
    let html = page.content().await?;
    Ok((url, html))
}
