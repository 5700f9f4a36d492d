use async_trait::async_trait;
use chromiumoxide::error::CdpError;
use chromiumoxide::{Browser, BrowserConfig, Element, Page};
use futures::StreamExt;
use serde_json::Value;
use tokio::task::JoinHandle;

use super::Driver;
use crate::error::DriverError;
use crate::Config;

/// A Chrome instance driven over the DevTools protocol, with a single page
/// that the whole walk happens in.
///
/// Call [`ChromeSession::close`] when done. A session dropped without being
/// closed stops its event loop, and `chromiumoxide` kills the browser process.
pub struct ChromeSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    closed: bool,
}

impl ChromeSession {
    pub async fn launch(config: &Config) -> Result<Self, DriverError> {
        let (mut browser, mut handler) = Browser::launch(browser_config(config)?)
            .await
            .map_err(browser_error)?;

        // The connection only makes progress while the handler is polled.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    log::debug!("Browser event error: {}", e);
                }
            }
        });

        match browser.new_page("about:blank").await {
            Ok(page) => {
                log::info!("Browser started");
                Ok(Self {
                    browser,
                    page,
                    handler,
                    closed: false,
                })
            }
            Err(e) => {
                if let Err(close_err) = browser.close().await {
                    log::warn!("Failed to close browser: {}", close_err);
                }
                handler.abort();
                Err(browser_error(e))
            }
        }
    }

    /// Closes the browser. The session is unusable afterwards.
    pub async fn close(mut self) -> Result<(), DriverError> {
        self.closed = true;
        let result = self.browser.close().await.map(|_| ()).map_err(browser_error);
        if let Err(e) = self.browser.wait().await {
            log::warn!("Failed to wait for browser exit: {}", e);
        }
        self.handler.abort();
        log::info!("Browser closed");
        result
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        if !self.closed {
            log::warn!("Browser session dropped without being closed");
            self.handler.abort();
        }
    }
}

fn browser_config(config: &Config) -> Result<BrowserConfig, DriverError> {
    let mut builder = BrowserConfig::builder()
        .request_timeout(config.command_timeout)
        .args(config.browser_args.iter().cloned());
    if !config.headless {
        builder = builder.with_head();
    }
    if let Some(path) = &config.chrome_executable {
        builder = builder.chrome_executable(path);
    }
    builder.build().map_err(DriverError::Launch)
}

fn browser_error(e: CdpError) -> DriverError {
    DriverError::Browser(e.to_string())
}

fn first_or_not_found(mut found: Vec<Element>, selector: &str) -> Result<Element, DriverError> {
    if found.is_empty() {
        return Err(DriverError::NotFound {
            locator: selector.to_owned(),
        });
    }
    Ok(found.swap_remove(0))
}

/// `undefined` results carry no value; they read as JSON `null`.
fn script_value(value: Option<&Value>) -> Value {
    value.cloned().unwrap_or(Value::Null)
}

#[async_trait]
impl Driver for ChromeSession {
    type Element = Element;

    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        log::debug!("goto {}", url);
        self.page.goto(url).await.map_err(browser_error)?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        let url = self.page.url().await.map_err(browser_error)?;
        Ok(url.unwrap_or_else(|| "about:blank".to_owned()))
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Element>, DriverError> {
        self.page.find_elements(selector).await.map_err(browser_error)
    }

    // Lookups go through querySelectorAll: an empty match is a clean
    // "not found", while querySelector would surface as a protocol error.
    async fn find(&self, selector: &str) -> Result<Element, DriverError> {
        first_or_not_found(self.find_all(selector).await?, selector)
    }

    async fn find_in(&self, parent: &Element, selector: &str) -> Result<Element, DriverError> {
        let found = parent.find_elements(selector).await.map_err(browser_error)?;
        first_or_not_found(found, selector)
    }

    async fn execute_script(&self, script: &str) -> Result<Value, DriverError> {
        log::debug!("evaluate {}", script);
        let result = self.page.evaluate(script).await.map_err(browser_error)?;
        Ok(script_value(result.value()))
    }

    async fn hover(&self, element: &Element) -> Result<(), DriverError> {
        element.hover().await.map_err(browser_error)?;
        Ok(())
    }

    async fn text(&self, element: &Element) -> Result<String, DriverError> {
        let text = element.inner_text().await.map_err(browser_error)?;
        Ok(text.unwrap_or_default().trim().to_owned())
    }

    async fn attribute(&self, element: &Element, name: &str) -> Result<Option<String>, DriverError> {
        element.attribute(name).await.map_err(browser_error)
    }

    async fn click(&self, element: &Element) -> Result<(), DriverError> {
        element.click().await.map_err(browser_error)?;
        Ok(())
    }
}
