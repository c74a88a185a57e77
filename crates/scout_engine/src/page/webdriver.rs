use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use engine_logging::{engine_debug, engine_info, engine_warn};
use reqwest::Method;
use serde_json::{json, Value};

use super::{Locator, Page, TextMatch};
use crate::{Cookie, PageError};

/// W3C key under which element references are returned.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

#[derive(Debug, Clone)]
pub struct WebDriverSettings {
    /// Base URL of a running WebDriver server, e.g. `http://localhost:9515`.
    pub endpoint: String,
    pub headless: bool,
    pub request_timeout: Duration,
    pub window_size: (u32, u32),
    pub user_agent: Option<String>,
}

impl Default for WebDriverSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9515".to_string(),
            headless: false,
            request_timeout: Duration::from_secs(60),
            window_size: (1920, 1080),
            user_agent: None,
        }
    }
}

impl WebDriverSettings {
    fn capabilities(&self) -> Value {
        let (width, height) = self.window_size;
        let mut args = vec![
            format!("--window-size={width},{height}"),
            "--disable-blink-features=AutomationControlled".to_string(),
        ];
        if self.headless {
            args.push("--headless=new".to_string());
        }
        if let Some(agent) = &self.user_agent {
            args.push(format!("--user-agent={agent}"));
        }
        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": args }
                }
            }
        })
    }
}

/// A browser tab driven over the W3C WebDriver protocol.
#[derive(Debug)]
pub struct WebDriverPage {
    client: reqwest::Client,
    session_url: String,
    closed: AtomicBool,
}

impl WebDriverPage {
    /// Starts a new browser session on the WebDriver server.
    pub async fn connect(settings: &WebDriverSettings) -> Result<Self, PageError> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| PageError::Transport(err.to_string()))?;
        let endpoint = settings.endpoint.trim_end_matches('/');
        let value = send(
            &client,
            Method::POST,
            &format!("{endpoint}/session"),
            Some(settings.capabilities()),
        )
        .await?;
        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| PageError::UnexpectedResponse(format!("no sessionId in {value}")))?;
        engine_info!("started browser session {session_id} (headless: {})", settings.headless);
        Ok(Self {
            client,
            session_url: format!("{endpoint}/session/{session_id}"),
            closed: AtomicBool::new(false),
        })
    }

    async fn command(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, PageError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(PageError::Closed);
        }
        send(&self.client, method, &format!("{}{path}", self.session_url), body).await
    }

    async fn find_elements(&self, using: &str, value: &str) -> Result<Vec<String>, PageError> {
        let found = self
            .command(
                Method::POST,
                "/elements",
                Some(json!({ "using": using, "value": value })),
            )
            .await?;
        let elements = found
            .as_array()
            .ok_or_else(|| PageError::UnexpectedResponse(format!("elements: {found}")))?;
        Ok(elements
            .iter()
            .filter_map(|el| el.get(ELEMENT_KEY).and_then(Value::as_str))
            .map(str::to_string)
            .collect())
    }

    async fn element_text(&self, element: &str) -> Result<String, PageError> {
        let text = self
            .command(Method::GET, &format!("/element/{element}/text"), None)
            .await?;
        Ok(text.as_str().unwrap_or_default().to_string())
    }

    /// Element references matched by `locator`, in document order.
    async fn locate(&self, locator: &Locator) -> Result<Vec<String>, PageError> {
        match locator {
            Locator::Css(css) => self.find_elements("css selector", css).await,
            Locator::CssText { css, text } => {
                let mut matched = Vec::new();
                for element in self.find_elements("css selector", css).await? {
                    if text.matches(&self.element_text(&element).await?) {
                        matched.push(element);
                    }
                }
                Ok(matched)
            }
            Locator::Text(text) => self.find_elements("xpath", &text_xpath(text)).await,
        }
    }
}

#[async_trait]
impl Page for WebDriverPage {
    async fn goto(&self, url: &str) -> Result<(), PageError> {
        self.command(Method::POST, "/url", Some(json!({ "url": url })))
            .await
            .map(|_| ())
    }

    async fn current_url(&self) -> Result<String, PageError> {
        let value = self.command(Method::GET, "/url", None).await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| PageError::UnexpectedResponse(format!("url: {value}")))
    }

    async fn count(&self, locator: &Locator) -> Result<usize, PageError> {
        Ok(self.locate(locator).await?.len())
    }

    async fn inner_text(&self, locator: &Locator) -> Result<Option<String>, PageError> {
        match self.locate(locator).await?.first() {
            Some(element) => Ok(Some(self.element_text(element).await?)),
            None => Ok(None),
        }
    }

    async fn click(&self, locator: &Locator) -> Result<(), PageError> {
        let elements = self.locate(locator).await?;
        let element = elements
            .first()
            .ok_or_else(|| PageError::NoMatch(locator.to_string()))?;
        engine_debug!("clicking {locator}");
        self.command(
            Method::POST,
            &format!("/element/{element}/click"),
            Some(json!({})),
        )
        .await
        .map(|_| ())
    }

    async fn content(&self) -> Result<String, PageError> {
        let value = self.command(Method::GET, "/source", None).await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| PageError::UnexpectedResponse("page source is not a string".into()))
    }

    async fn cookies(&self) -> Result<Vec<Cookie>, PageError> {
        let value = self.command(Method::GET, "/cookie", None).await?;
        serde_json::from_value(value).map_err(|err| PageError::UnexpectedResponse(err.to_string()))
    }

    /// Cookies the browser refuses (for instance a domain mismatch) are
    /// skipped with a warning; transport failures abort.
    async fn add_cookies(&self, cookies: &[Cookie]) -> Result<(), PageError> {
        for cookie in cookies {
            match self
                .command(Method::POST, "/cookie", Some(json!({ "cookie": cookie })))
                .await
            {
                Ok(_) => {}
                Err(PageError::Protocol { error, message }) => {
                    engine_warn!("browser rejected cookie {}: {error}: {message}", cookie.name);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    async fn close(&self) -> Result<(), PageError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        send(&self.client, Method::DELETE, &self.session_url, None)
            .await
            .map(|_| ())
    }
}

async fn send(
    client: &reqwest::Client,
    method: Method,
    url: &str,
    body: Option<Value>,
) -> Result<Value, PageError> {
    let mut request = client.request(method, url);
    if let Some(body) = body {
        request = request.json(&body);
    }
    let response = request
        .send()
        .await
        .map_err(|err| PageError::Transport(err.to_string()))?;
    let status = response.status();
    let mut payload: Value = response
        .json()
        .await
        .map_err(|err| PageError::UnexpectedResponse(err.to_string()))?;
    let value = payload.get_mut("value").map(Value::take).unwrap_or(Value::Null);
    if !status.is_success() {
        let field = |name: &str| {
            value
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        return Err(PageError::Protocol {
            error: field("error"),
            message: field("message"),
        });
    }
    Ok(value)
}

/// XPath selecting elements whose own text matches, case-insensitively.
fn text_xpath(text: &TextMatch) -> String {
    const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";
    let needle = xpath_literal(&text.needle().to_lowercase());
    let lowered = format!("translate(normalize-space(.), '{UPPER}', '{LOWER}')");
    match text {
        TextMatch::Contains(_) => format!("//body//*[text()[contains({lowered}, {needle})]]"),
        TextMatch::Exact(_) => format!("//body//*[text()[{lowered} = {needle}]]"),
    }
}

fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    if !value.contains('"') {
        return format!("\"{value}\"");
    }
    let parts: Vec<String> = value.split('\'').map(|part| format!("'{part}'")).collect();
    format!("concat({})", parts.join(", \"'\", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xpath_literal_handles_quotes() {
        assert_eq!(xpath_literal("sign in"), "'sign in'");
        assert_eq!(xpath_literal("it's"), "\"it's\"");
        assert_eq!(xpath_literal("a'b\"c"), "concat('a', \"'\", 'b\"c')");
    }

    #[test]
    fn text_xpath_lowercases_both_sides() {
        let xpath = text_xpath(&TextMatch::Contains("Sign in".into()));
        assert!(xpath.contains("contains(translate(normalize-space(.)"));
        assert!(xpath.ends_with("'sign in')]]"));
    }

    #[test]
    fn headless_flag_reaches_chrome_args() {
        let settings = WebDriverSettings {
            headless: true,
            ..WebDriverSettings::default()
        };
        let caps = settings.capabilities();
        let args = caps["capabilities"]["alwaysMatch"]["goog:chromeOptions"]["args"]
            .as_array()
            .unwrap();
        assert!(args.iter().any(|a| a == "--headless=new"));
    }
}
