//! Browser automation seam
//!
//! [`BrowserDriver`] opens a page; [`FormPage`] is the handful of form
//! operations auto-apply needs. [`ChromiumDriver`] implements both over the
//! Chrome DevTools Protocol.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::element::Element;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use reqwest::Url;
use tempfile::TempDir;
use tokio::task::JoinHandle;

use crate::error::{ApplyError, Result};

/// How to find an element on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator {
    /// CSS selector
    Css(&'static str),

    /// Element of `tag` whose visible text contains `text` (case-insensitive)
    Text { tag: &'static str, text: &'static str },
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::Css(css) => write!(f, "{}", css),
            Locator::Text { tag, text } => write!(f, "{}:has-text(\"{}\")", tag, text),
        }
    }
}

/// An open page with form controls
#[async_trait]
pub trait FormPage: Send {
    /// Number of elements matching `locator`
    async fn count(&mut self, locator: &Locator) -> Result<usize>;

    /// Type `value` into the first element matching `locator`
    async fn fill(&mut self, locator: &Locator, value: &str) -> Result<()>;

    /// Attach `path` to the first file input matching `locator`
    async fn set_input_file(&mut self, locator: &Locator, path: &Path) -> Result<()>;

    /// Click the first element matching `locator`
    async fn click(&mut self, locator: &Locator) -> Result<()>;

    /// Tear down the page and its browser
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Empties the element's value and tells listening frameworks about it
const CLEAR_VALUE_JS: &str = "function() { this.value = ''; this.dispatchEvent(new Event('input', { bubbles: true })); }";

/// Launches browser sessions
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Start a fresh session and navigate to `url`
    async fn open(&self, url: &Url) -> Result<Box<dyn FormPage>>;
}

/// Headless Chromium over CDP
#[derive(Debug, Clone)]
pub struct ChromiumDriver {
    executable: Option<PathBuf>,
    headless: bool,
}

impl ChromiumDriver {
    /// Create a driver; `executable` overrides browser auto-detection
    pub fn new(executable: Option<PathBuf>, headless: bool) -> Self {
        Self { executable, headless }
    }

    async fn launch(&self, profile: &Path) -> Result<(Browser, JoinHandle<()>)> {
        let mut builder = BrowserConfig::builder().user_data_dir(profile);
        if let Some(path) = &self.executable {
            builder = builder.chrome_executable(path);
        }
        if !self.headless {
            builder = builder.with_head();
        }
        let config = builder
            .build()
            .map_err(|message| ApplyError::Browser { message })?;

        let (browser, mut handler) = Browser::launch(config).await.map_err(|e| ApplyError::Browser {
            message: e.to_string(),
        })?;

        // The handler must be polled for any CDP command to complete
        let events = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok((browser, events))
    }
}

#[async_trait]
impl BrowserDriver for ChromiumDriver {
    async fn open(&self, url: &Url) -> Result<Box<dyn FormPage>> {
        let profile = session_profile()?;
        let (mut browser, events) = self.launch(profile.path()).await?;

        let navigation = async {
            let page = browser.new_page(url.as_str()).await?;
            page.wait_for_navigation().await?;
            Ok::<_, chromiumoxide::error::CdpError>(page)
        }
        .await;

        match navigation {
            Ok(page) => {
                tracing::debug!(url = %url, "Page loaded");
                Ok(Box::new(ChromiumPage {
                    browser,
                    page,
                    events,
                    _profile: profile,
                }))
            }
            Err(e) => {
                let _ = browser.close().await;
                events.abort();
                Err(ApplyError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                }
                .into())
            }
        }
    }
}

/// A fresh Chromium profile directory, removed on drop
///
/// Concurrent sessions must not share a profile: Chrome's singleton lock
/// would hand the second launch over to the first browser.
fn session_profile() -> Result<TempDir> {
    let dir = tempfile::Builder::new()
        .prefix("job-finder-chrome-")
        .tempdir()
        .map_err(|e| ApplyError::Browser {
            message: format!("could not create browser profile: {}", e),
        })?;
    Ok(dir)
}

struct ChromiumPage {
    browser: Browser,
    page: Page,
    events: JoinHandle<()>,
    _profile: TempDir,
}

impl ChromiumPage {
    async fn find(&self, locator: &Locator) -> std::result::Result<Vec<Element>, chromiumoxide::error::CdpError> {
        match locator {
            Locator::Css(css) => self.page.find_elements(*css).await,
            Locator::Text { tag, text } => {
                let needle = text.to_lowercase();
                let mut matches = Vec::new();
                for element in self.page.find_elements(*tag).await? {
                    let inner = element.inner_text().await?.unwrap_or_default();
                    if inner.to_lowercase().contains(&needle) {
                        matches.push(element);
                    }
                }
                Ok(matches)
            }
        }
    }

    async fn first(&self, locator: &Locator) -> std::result::Result<Option<Element>, chromiumoxide::error::CdpError> {
        Ok(self.find(locator).await?.into_iter().next())
    }
}

#[async_trait]
impl FormPage for ChromiumPage {
    async fn count(&mut self, locator: &Locator) -> Result<usize> {
        // Query failures (e.g. a selector the page's DOM rejects) count as no match
        Ok(self.find(locator).await.map(|found| found.len()).unwrap_or(0))
    }

    async fn fill(&mut self, locator: &Locator, value: &str) -> Result<()> {
        let input_error = |message: String| ApplyError::FieldInput {
            field: locator.to_string(),
            message,
        };

        let element = self
            .first(locator)
            .await
            .map_err(|e| input_error(e.to_string()))?
            .ok_or_else(|| input_error("element disappeared".to_string()))?;

        element
            .call_js_fn(CLEAR_VALUE_JS, false)
            .await
            .map_err(|e| input_error(e.to_string()))?;
        element
            .click()
            .await
            .map_err(|e| input_error(e.to_string()))?
            .type_str(value)
            .await
            .map_err(|e| input_error(e.to_string()))?;
        Ok(())
    }

    async fn set_input_file(&mut self, locator: &Locator, path: &Path) -> Result<()> {
        let input_error = |message: String| ApplyError::FieldInput {
            field: locator.to_string(),
            message,
        };

        let element = self
            .first(locator)
            .await
            .map_err(|e| input_error(e.to_string()))?
            .ok_or_else(|| input_error("element disappeared".to_string()))?;

        let params = SetFileInputFilesParams::builder()
            .file(path.display().to_string())
            .backend_node_id(element.backend_node_id)
            .build()
            .map_err(input_error)?;

        self.page
            .execute(params)
            .await
            .map_err(|e| input_error(e.to_string()))?;
        Ok(())
    }

    async fn click(&mut self, locator: &Locator) -> Result<()> {
        let element = self
            .first(locator)
            .await
            .map_err(|e| ApplyError::Submission { message: e.to_string() })?
            .ok_or_else(|| ApplyError::Submission {
                message: format!("{} disappeared", locator),
            })?;

        element
            .click()
            .await
            .map_err(|e| ApplyError::Submission { message: e.to_string() })?;
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let ChromiumPage {
            mut browser,
            page: _,
            events,
            _profile: profile,
        } = *self;

        let closed = browser.close().await;
        events.abort();
        // Profile outlives the browser that used it
        drop(profile);

        closed.map(|_| ()).map_err(|e| {
            ApplyError::Browser {
                message: e.to_string(),
            }
            .into()
        })
    }
}
