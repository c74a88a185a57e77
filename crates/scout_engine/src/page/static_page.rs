use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{DomSnapshot, Locator, Page};
use crate::{Cookie, PageError};

const BLANK: &str = "<html><head></head><body></body></html>";

/// In-memory page over fixed HTML documents.
///
/// Navigation switches between registered documents; unknown URLs load an
/// empty body. Clicks are recorded rather than executed. Used for offline
/// extraction from saved pages and as the browser double in tests.
#[derive(Debug)]
pub struct StaticPage {
    state: Mutex<StaticState>,
}

#[derive(Debug, Default)]
struct StaticState {
    url: String,
    html: String,
    documents: HashMap<String, String>,
    cookies: Vec<Cookie>,
    clicks: Vec<(String, Locator)>,
    visits: Vec<String>,
    closed: bool,
}

impl StaticPage {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(StaticState {
                url: url.into(),
                html: html.into(),
                ..StaticState::default()
            }),
        }
    }

    pub fn blank() -> Self {
        Self::new("about:blank", BLANK)
    }

    /// Registers the document served when navigating to `url`.
    pub fn with_document(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.state().documents.insert(url.into(), html.into());
        self
    }

    /// Clicks so far, as `(url at click time, locator)`.
    pub fn clicks(&self) -> Vec<(String, Locator)> {
        self.state().clicks.clone()
    }

    pub fn visits(&self) -> Vec<String> {
        self.state().visits.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.state().closed
    }

    fn state(&self) -> MutexGuard<'_, StaticState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn open_state(&self) -> Result<MutexGuard<'_, StaticState>, PageError> {
        let state = self.state();
        if state.closed {
            return Err(PageError::Closed);
        }
        Ok(state)
    }

    fn snapshot(&self) -> Result<DomSnapshot, PageError> {
        let state = self.open_state()?;
        Ok(DomSnapshot::parse(state.url.clone(), state.html.clone()))
    }
}

#[async_trait]
impl Page for StaticPage {
    async fn goto(&self, url: &str) -> Result<(), PageError> {
        let mut state = self.open_state()?;
        let html = state
            .documents
            .get(url)
            .cloned()
            .unwrap_or_else(|| BLANK.to_string());
        state.url = url.to_string();
        state.html = html;
        state.visits.push(url.to_string());
        Ok(())
    }

    async fn current_url(&self) -> Result<String, PageError> {
        Ok(self.open_state()?.url.clone())
    }

    async fn count(&self, locator: &Locator) -> Result<usize, PageError> {
        self.snapshot()?.count(locator)
    }

    async fn inner_text(&self, locator: &Locator) -> Result<Option<String>, PageError> {
        self.snapshot()?.first_text(locator)
    }

    async fn click(&self, locator: &Locator) -> Result<(), PageError> {
        if self.snapshot()?.count(locator)? == 0 {
            return Err(PageError::NoMatch(locator.to_string()));
        }
        let mut state = self.open_state()?;
        let url = state.url.clone();
        state.clicks.push((url, locator.clone()));
        Ok(())
    }

    async fn content(&self) -> Result<String, PageError> {
        Ok(self.open_state()?.html.clone())
    }

    async fn cookies(&self) -> Result<Vec<Cookie>, PageError> {
        Ok(self.open_state()?.cookies.clone())
    }

    async fn add_cookies(&self, cookies: &[Cookie]) -> Result<(), PageError> {
        let mut state = self.open_state()?;
        for cookie in cookies {
            state.cookies.retain(|c| c.name != cookie.name || c.domain != cookie.domain);
            state.cookies.push(cookie.clone());
        }
        Ok(())
    }

    async fn close(&self) -> Result<(), PageError> {
        self.state().closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn navigation_serves_registered_documents() {
        let page = StaticPage::blank()
            .with_document("https://a.example/", "<html><body><h1>A</h1></body></html>");
        page.goto("https://a.example/").await.unwrap();
        assert_eq!(page.inner_text(&Locator::css("h1")).await.unwrap().as_deref(), Some("A"));

        page.goto("https://unknown.example/").await.unwrap();
        assert_eq!(page.count(&Locator::css("h1")).await.unwrap(), 0);
        assert_eq!(page.visits().len(), 2);
    }

    #[tokio::test]
    async fn click_requires_a_match_and_is_recorded() {
        let page = StaticPage::new("https://a.example/", "<button>Follow</button>");
        let missing = Locator::css_exact("button", "Unfollow");
        assert_eq!(
            page.click(&missing).await,
            Err(PageError::NoMatch(missing.to_string()))
        );
        page.click(&Locator::css_exact("button", "Follow")).await.unwrap();
        assert_eq!(page.clicks().len(), 1);
    }

    #[tokio::test]
    async fn closed_page_rejects_calls() {
        let page = StaticPage::blank();
        page.close().await.unwrap();
        assert_eq!(page.content().await, Err(PageError::Closed));
        assert!(page.is_closed());
    }
}
