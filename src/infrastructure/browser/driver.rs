use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::domain::error::Result;
use crate::domain::scope::Scope;

/// Element query understood by the browser driver.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    Css(String),
    XPath(String),
}

impl Selector {
    pub fn css(query: impl Into<String>) -> Self {
        Self::Css(query.into())
    }

    pub fn xpath(query: impl Into<String>) -> Self {
        Self::XPath(query.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Css(query) | Self::XPath(query) => query,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(query) => write!(f, "css:{}", query),
            Self::XPath(query) => write!(f, "xpath:{}", query),
        }
    }
}

/// Quote arbitrary text as an XPath string literal.
///
/// XPath 1.0 has no escape sequences, so text containing both quote kinds is
/// assembled with `concat()`.
pub fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        return format!("'{}'", text);
    }
    if !text.contains('"') {
        return format!("\"{}\"", text);
    }
    let parts: Vec<String> = text
        .split('\'')
        .map(|part| format!("'{}'", part))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}

/// Browser session primitives. Every call is bound to a [`Scope`] and fails with the
/// scope's error once it is cancelled or past its deadline.
///
/// Implementations must tolerate concurrent calls from several tasks, each targeting
/// a different element.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Navigate to a URL and wait for the load event
    async fn navigate(&self, scope: &Scope, url: &str) -> Result<()>;

    /// Wait until the element exists and is rendered with a non-empty box
    async fn wait_visible(&self, scope: &Scope, selector: &Selector) -> Result<()>;

    /// Wait until the element exists in the DOM
    async fn wait_ready(&self, scope: &Scope, selector: &Selector) -> Result<()>;

    /// Wait for the element to be visible, then click it
    async fn click(&self, scope: &Scope, selector: &Selector) -> Result<()>;

    /// Set the `value` property of a form field and fire input/change events
    async fn set_value(&self, scope: &Scope, selector: &Selector, value: &str) -> Result<()>;

    /// Focus the element and type text key by key
    async fn send_keys(&self, scope: &Scope, selector: &Selector, text: &str) -> Result<()>;

    /// Empty a form field
    async fn clear(&self, scope: &Scope, selector: &Selector) -> Result<()>;

    /// Read an attribute of the first matching element
    async fn attribute_value(
        &self,
        scope: &Scope,
        selector: &Selector,
        name: &str,
    ) -> Result<Option<String>>;

    /// Evaluate a JavaScript expression and return its JSON value
    async fn evaluate(&self, scope: &Scope, script: &str) -> Result<serde_json::Value>;

    /// Close the session, keeping the persisted profile
    async fn close(&self) -> Result<()>;
}

pub type DynBrowserDriver = Arc<dyn BrowserDriver>;

/// Opens one fresh browser session per booking.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn open_session(&self) -> Result<DynBrowserDriver>;
}
