use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use scout_core::urls::is_member_area;
use scout_core::{LoginPoll, LoginState};
use tokio::time::Instant;

use crate::page::{Locator, Page};

/// Page signals that tell a signed-in member from an anonymous visitor.
#[derive(Debug, Clone)]
pub struct LoginSignals {
    /// Checked first; any match means not authenticated.
    pub sign_in_prompt: Locator,
    /// Navigation elements only shown to members.
    pub member_markers: Vec<Locator>,
    pub is_member_url: fn(&str) -> bool,
}

impl Default for LoginSignals {
    fn default() -> Self {
        Self {
            sign_in_prompt: Locator::text_containing("Sign in"),
            member_markers: vec![
                Locator::css("[data-control-name=\"nav.settings\"]"),
                Locator::css("[aria-label=\"Me\"]"),
            ],
            is_member_url: is_member_area,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginGate {
    signals: LoginSignals,
}

impl LoginGate {
    pub fn new(signals: LoginSignals) -> Self {
        Self { signals }
    }

    /// Evaluates the signals against the live page. Query errors count as
    /// "not authenticated".
    pub async fn is_authenticated(&self, page: &dyn Page) -> bool {
        match page.count(&self.signals.sign_in_prompt).await {
            Ok(0) => {}
            Ok(_) => return false,
            Err(err) => {
                engine_debug!("login check failed: {err}");
                return false;
            }
        }
        for marker in &self.signals.member_markers {
            if matches!(page.count(marker).await, Ok(n) if n > 0) {
                return true;
            }
        }
        match page.current_url().await {
            Ok(url) => (self.signals.is_member_url)(&url),
            Err(err) => {
                engine_debug!("login check failed: {err}");
                false
            }
        }
    }

    /// Polls until the page is authenticated or `max_wait` has elapsed.
    pub async fn await_login(&self, page: &dyn Page, poll_interval: Duration, max_wait: Duration) -> bool {
        let started = Instant::now();
        let mut poll = LoginPoll::new(poll_interval, max_wait);
        engine_info!("waiting up to {}s for login", max_wait.as_secs());
        loop {
            let authenticated = self.is_authenticated(page).await;
            match poll.observe(authenticated, started.elapsed()) {
                LoginState::Authenticated => {
                    engine_info!("login detected after {}s", started.elapsed().as_secs());
                    return true;
                }
                LoginState::TimedOut => {
                    engine_warn!("login not detected within {}s", max_wait.as_secs());
                    return false;
                }
                LoginState::Waiting => {}
            }
            if let Some(delay) = poll.next_delay(started.elapsed()) {
                tokio::time::sleep(delay).await;
            }
        }
    }
}
