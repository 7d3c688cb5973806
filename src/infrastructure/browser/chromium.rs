use super::driver::{BrowserDriver, DynBrowserDriver, Selector, SessionFactory};
use crate::domain::error::{BookingError, Result};
use crate::domain::scope::Scope;
use crate::infrastructure::config::BrowserConfig as BrowserSettings;
use anyhow::anyhow;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Interval between element lookups while waiting.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

const IS_VISIBLE_FN: &str = "function() { \
    const rect = this.getBoundingClientRect(); \
    const style = window.getComputedStyle(this); \
    return rect.width > 0 && rect.height > 0 \
        && style.visibility !== 'hidden' && style.display !== 'none'; \
}";

const CLEAR_FN: &str = "function() { \
    this.value = ''; \
    this.dispatchEvent(new Event('input', { bubbles: true })); \
}";

/// Shared Chromium process with a persistent profile directory.
/// Each booking gets its own tab through [`SessionFactory::open_session`].
pub struct ChromiumBrowser {
    browser: RwLock<Option<Browser>>,
    handler_handle: RwLock<Option<tokio::task::JoinHandle<()>>>,
    user_data_dir: PathBuf,
}

impl ChromiumBrowser {
    pub async fn launch(settings: &BrowserSettings) -> anyhow::Result<Self> {
        let user_data_dir = settings.effective_user_data_dir();
        std::fs::create_dir_all(&user_data_dir)
            .map_err(|e| anyhow!("Failed to create user data dir: {}", e))?;

        clean_stale_lockfiles(&user_data_dir);

        tracing::info!(
            "Starting browser with profile {:?} (headless={})",
            user_data_dir,
            settings.headless
        );

        let mut builder = BrowserConfig::builder()
            .user_data_dir(&user_data_dir)
            .arg("--disable-infobars")
            .arg("--mute-audio");
        if !settings.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &settings.executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder
            .build()
            .map_err(|e| anyhow!("Failed to build browser config: {}", e))?;

        let (browser, mut handler) = Browser::launch(config).await?;

        let handler_handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("Browser handler event error: {}", e);
                }
            }
        });

        tracing::info!("Browser started");

        Ok(Self {
            browser: RwLock::new(Some(browser)),
            handler_handle: RwLock::new(Some(handler_handle)),
            user_data_dir,
        })
    }

    pub async fn shutdown(&self) {
        if let Some(mut browser) = self.browser.write().await.take() {
            if let Err(e) = browser.close().await {
                tracing::warn!("Failed to close browser: {}", e);
            }
        }
        if let Some(handle) = self.handler_handle.write().await.take() {
            handle.abort();
        }
        tracing::info!("Browser stopped (profile preserved at {:?})", self.user_data_dir);
    }
}

/// Chrome leaves "SingletonLock" and friends behind after a crash, which blocks
/// reuse of the profile directory.
fn clean_stale_lockfiles(user_data_dir: &std::path::Path) {
    for name in ["SingletonLock", "SingletonSocket", "SingletonCookie"] {
        let lockfile = user_data_dir.join(name);
        if lockfile.exists() {
            if let Err(e) = std::fs::remove_file(&lockfile) {
                tracing::warn!("Failed to remove stale lockfile {:?}: {}", lockfile, e);
            } else {
                tracing::debug!("Removed stale lockfile: {:?}", lockfile);
            }
        }
    }
}

#[async_trait]
impl SessionFactory for ChromiumBrowser {
    async fn open_session(&self) -> Result<DynBrowserDriver> {
        let guard = self.browser.read().await;
        let browser = guard
            .as_ref()
            .ok_or_else(|| BookingError::Browser("Browser not started".into()))?;
        let page = browser.new_page("about:blank").await?;
        tracing::debug!("Opened browser session");
        Ok(Arc::new(ChromiumSession { page }))
    }
}

/// One browser tab driven through the DevTools protocol.
pub struct ChromiumSession {
    page: Page,
}

impl ChromiumSession {
    async fn find(&self, selector: &Selector) -> Result<Element> {
        let element = match selector {
            Selector::Css(query) => self.page.find_element(query.as_str()).await?,
            Selector::XPath(query) => self.page.find_xpath(query.as_str()).await?,
        };
        Ok(element)
    }

    async fn is_visible(element: &Element) -> bool {
        match element.call_js_fn(IS_VISIBLE_FN, false).await {
            Ok(ret) => ret
                .result
                .value
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Poll until the element exists (and optionally is visible), bounded by `scope`.
    async fn wait_for(&self, scope: &Scope, selector: &Selector, visible: bool) -> Result<Element> {
        scope
            .run(async {
                loop {
                    if let Ok(element) = self.find(selector).await {
                        if !visible || Self::is_visible(&element).await {
                            tracing::trace!(%selector, visible, "Element ready");
                            return Ok(element);
                        }
                    }
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
            })
            .await
    }
}

#[async_trait]
impl BrowserDriver for ChromiumSession {
    async fn navigate(&self, scope: &Scope, url: &str) -> Result<()> {
        scope
            .run(async {
                self.page.goto(url).await?;
                Ok(())
            })
            .await?;
        tracing::debug!("Navigated to {}", url);
        Ok(())
    }

    async fn wait_visible(&self, scope: &Scope, selector: &Selector) -> Result<()> {
        self.wait_for(scope, selector, true).await.map(|_| ())
    }

    async fn wait_ready(&self, scope: &Scope, selector: &Selector) -> Result<()> {
        self.wait_for(scope, selector, false).await.map(|_| ())
    }

    async fn click(&self, scope: &Scope, selector: &Selector) -> Result<()> {
        let element = self.wait_for(scope, selector, true).await?;
        scope
            .run(async {
                element.click().await?;
                Ok(())
            })
            .await?;
        tracing::debug!(%selector, "Clicked element");
        Ok(())
    }

    async fn set_value(&self, scope: &Scope, selector: &Selector, value: &str) -> Result<()> {
        let element = self.wait_for(scope, selector, false).await?;
        let literal =
            serde_json::to_string(value).map_err(|e| BookingError::Browser(e.to_string()))?;
        let function = format!(
            "function() {{ \
                this.value = {literal}; \
                this.dispatchEvent(new Event('input', {{ bubbles: true }})); \
                this.dispatchEvent(new Event('change', {{ bubbles: true }})); \
            }}"
        );
        scope
            .run(async {
                element.call_js_fn(function, false).await?;
                Ok(())
            })
            .await?;
        tracing::debug!(%selector, "Set value");
        Ok(())
    }

    async fn send_keys(&self, scope: &Scope, selector: &Selector, text: &str) -> Result<()> {
        let element = self.wait_for(scope, selector, true).await?;
        scope
            .run(async {
                element.focus().await?;
                element.type_str(text).await?;
                Ok(())
            })
            .await?;
        tracing::debug!(%selector, "Typed text");
        Ok(())
    }

    async fn clear(&self, scope: &Scope, selector: &Selector) -> Result<()> {
        let element = self.wait_for(scope, selector, false).await?;
        scope
            .run(async {
                element.call_js_fn(CLEAR_FN, false).await?;
                Ok(())
            })
            .await
    }

    async fn attribute_value(
        &self,
        scope: &Scope,
        selector: &Selector,
        name: &str,
    ) -> Result<Option<String>> {
        let element = self.wait_for(scope, selector, false).await?;
        scope
            .run(async { Ok(element.attribute(name).await?) })
            .await
    }

    async fn evaluate(&self, scope: &Scope, script: &str) -> Result<serde_json::Value> {
        scope
            .run(async {
                let result = self.page.evaluate(script).await?;
                Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
            })
            .await
    }

    async fn close(&self) -> Result<()> {
        self.page.clone().close().await?;
        tracing::debug!("Closed browser session");
        Ok(())
    }
}
