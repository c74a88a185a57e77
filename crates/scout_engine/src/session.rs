//! Persisted browser identity and the scope that restores and saves it.
use std::fs;
use std::path::{Path, PathBuf};

use engine_logging::{engine_debug, engine_info, engine_warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::page::Page;
use crate::persist::{write_json_file, PersistError};
use crate::{Cookie, PageError};

/// On-disk session: the cookies captured from an authenticated browser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub cookies: Vec<Cookie>,
}

impl Session {
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("could not read browser cookies: {0}")]
    Capture(#[from] PageError),
    #[error("could not write session file: {0}")]
    Persist(#[from] PersistError),
}

/// Location of the session file. Absence of a usable file means the user
/// has to log in interactively.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing, unreadable and corrupt files all load as `None`.
    pub fn load(&self) -> Option<Session> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) => {
                engine_debug!("no session at {}: {err}", self.path.display());
                return None;
            }
        };
        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => Some(session),
            Err(err) => {
                engine_warn!(
                    "ignoring unreadable session file {}: {err}",
                    self.path.display()
                );
                None
            }
        }
    }

    pub fn requires_login(&self) -> bool {
        self.load().is_none_or(|session| session.is_empty())
    }

    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        write_json_file(&self.path, session)?;
        engine_debug!(
            "saved {} cookies to {}",
            session.cookies.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Reads the page's cookies and saves them. Returns the cookie count.
    pub async fn capture(&self, page: &dyn Page) -> Result<usize, SessionError> {
        let cookies = page.cookies().await?;
        let count = cookies.len();
        self.save(&Session { cookies })?;
        Ok(count)
    }
}

/// A browser page bound to a session store.
///
/// Opening restores the stored cookies; [`BrowserSession::release`] saves the
/// current cookies and closes the browser. Every exit path of an operation
/// should end in `release`, including failures.
pub struct BrowserSession {
    page: Box<dyn Page>,
    store: SessionStore,
    released: bool,
}

impl BrowserSession {
    /// Wraps `page`, restoring cookies from `store`. Cookie domains must match
    /// the current page, so the browser first visits `cookie_origin`.
    pub async fn open(page: Box<dyn Page>, store: SessionStore, cookie_origin: &str) -> Self {
        if let Some(session) = store.load().filter(|s| !s.is_empty()) {
            let restored = async {
                page.goto(cookie_origin).await?;
                page.add_cookies(&session.cookies).await
            }
            .await;
            match restored {
                Ok(()) => engine_info!("restored {} cookies", session.cookies.len()),
                Err(err) => engine_warn!("could not restore session cookies: {err}"),
            }
        }
        Self {
            page,
            store,
            released: false,
        }
    }

    pub fn page(&self) -> &dyn Page {
        self.page.as_ref()
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Saves the current cookies. Failures are logged and reported as `false`.
    pub async fn persist(&self) -> bool {
        match self.store.capture(self.page()).await {
            Ok(count) => {
                engine_debug!("persisted session ({count} cookies)");
                true
            }
            Err(err) => {
                engine_warn!("failed to persist session: {err}");
                false
            }
        }
    }

    /// Saves the session, then closes the browser.
    pub async fn release(mut self) {
        self.persist().await;
        if let Err(err) = self.page.close().await {
            engine_warn!("failed to close browser: {err}");
        }
        self.released = true;
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if !self.released {
            engine_warn!("browser session dropped without release; latest cookies were not saved");
        }
    }
}
