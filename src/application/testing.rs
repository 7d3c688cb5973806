//! Scripted in-memory browser for flow tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep_until, Instant};

use crate::domain::error::{BookingError, Result};
use crate::domain::scope::Scope;
use crate::infrastructure::browser::{BrowserDriver, Selector};

/// A primitive call that completed against the fake page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Navigate(String),
    WaitVisible(String),
    WaitReady(String),
    Click(String),
    SetValue(String, String),
    SendKeys(String, String),
    Clear(String),
    Attribute(String, String),
    Evaluate(String),
    Close,
}

#[derive(Debug, Clone)]
enum Element {
    /// Rendered from this instant on
    From(Instant),
    /// Any interaction fails immediately
    Broken(String),
}

#[derive(Default)]
struct State {
    elements: HashMap<Selector, Element>,
    attributes: HashMap<(Selector, String), String>,
    scripts: HashMap<String, std::result::Result<serde_json::Value, String>>,
    calls: Vec<Call>,
}

/// Page whose elements are declared up front. Unknown elements never render, so waits
/// on them block until their scope ends, as against a real page.
#[derive(Default)]
pub struct ScriptedBrowser {
    state: Mutex<State>,
}

impl ScriptedBrowser {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn present(&self, selector: Selector) -> &Self {
        self.appears_after(selector, Duration::ZERO)
    }

    /// The element renders `delay` after this call.
    pub fn appears_after(&self, selector: Selector, delay: Duration) -> &Self {
        self.state
            .lock()
            .unwrap()
            .elements
            .insert(selector, Element::From(Instant::now() + delay));
        self
    }

    pub fn broken(&self, selector: Selector, message: &str) -> &Self {
        self.state
            .lock()
            .unwrap()
            .elements
            .insert(selector, Element::Broken(message.to_string()));
        self
    }

    pub fn attribute(&self, selector: Selector, name: &str, value: &str) -> &Self {
        self.state
            .lock()
            .unwrap()
            .attributes
            .insert((selector, name.to_string()), value.to_string());
        self
    }

    pub fn script(&self, script: &str, value: serde_json::Value) -> &Self {
        self.state
            .lock()
            .unwrap()
            .scripts
            .insert(script.to_string(), Ok(value));
        self
    }

    pub fn script_error(&self, script: &str, message: &str) -> &Self {
        self.state
            .lock()
            .unwrap()
            .scripts
            .insert(script.to_string(), Err(message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Selectors clicked so far, in order.
    pub fn clicks(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Click(selector) => Some(selector),
                _ => None,
            })
            .collect()
    }

    pub fn has_clicked(&self, selector: &Selector) -> bool {
        self.clicks().contains(&selector.to_string())
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }

    async fn wait_for(&self, scope: &Scope, selector: &Selector) -> Result<()> {
        let element = self.state.lock().unwrap().elements.get(selector).cloned();
        match element {
            Some(Element::From(at)) => {
                scope
                    .run(async {
                        sleep_until(at).await;
                        Ok(())
                    })
                    .await
            }
            Some(Element::Broken(message)) => Err(BookingError::Browser(message)),
            None => Err(scope.done().await),
        }
    }
}

#[async_trait]
impl BrowserDriver for ScriptedBrowser {
    async fn navigate(&self, scope: &Scope, url: &str) -> Result<()> {
        if let Some(err) = scope.err() {
            return Err(err);
        }
        self.record(Call::Navigate(url.to_string()));
        Ok(())
    }

    async fn wait_visible(&self, scope: &Scope, selector: &Selector) -> Result<()> {
        self.wait_for(scope, selector).await?;
        self.record(Call::WaitVisible(selector.to_string()));
        Ok(())
    }

    async fn wait_ready(&self, scope: &Scope, selector: &Selector) -> Result<()> {
        self.wait_for(scope, selector).await?;
        self.record(Call::WaitReady(selector.to_string()));
        Ok(())
    }

    async fn click(&self, scope: &Scope, selector: &Selector) -> Result<()> {
        self.wait_for(scope, selector).await?;
        self.record(Call::Click(selector.to_string()));
        Ok(())
    }

    async fn set_value(&self, scope: &Scope, selector: &Selector, value: &str) -> Result<()> {
        self.wait_for(scope, selector).await?;
        self.record(Call::SetValue(selector.to_string(), value.to_string()));
        Ok(())
    }

    async fn send_keys(&self, scope: &Scope, selector: &Selector, text: &str) -> Result<()> {
        self.wait_for(scope, selector).await?;
        self.record(Call::SendKeys(selector.to_string(), text.to_string()));
        Ok(())
    }

    async fn clear(&self, scope: &Scope, selector: &Selector) -> Result<()> {
        self.wait_for(scope, selector).await?;
        self.record(Call::Clear(selector.to_string()));
        Ok(())
    }

    async fn attribute_value(
        &self,
        scope: &Scope,
        selector: &Selector,
        name: &str,
    ) -> Result<Option<String>> {
        self.wait_for(scope, selector).await?;
        self.record(Call::Attribute(selector.to_string(), name.to_string()));
        let value = self
            .state
            .lock()
            .unwrap()
            .attributes
            .get(&(selector.clone(), name.to_string()))
            .cloned();
        Ok(value)
    }

    async fn evaluate(&self, scope: &Scope, script: &str) -> Result<serde_json::Value> {
        if let Some(err) = scope.err() {
            return Err(err);
        }
        self.record(Call::Evaluate(script.to_string()));
        let scripted = self.state.lock().unwrap().scripts.get(script).cloned();
        match scripted {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(BookingError::Browser(message)),
            None => Ok(serde_json::Value::Null),
        }
    }

    async fn close(&self) -> Result<()> {
        self.record(Call::Close);
        Ok(())
    }
}
