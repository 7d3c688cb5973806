mod chromium;
mod driver;

pub use chromium::{ChromiumBrowser, ChromiumSession};
pub use driver::{xpath_literal, BrowserDriver, DynBrowserDriver, Selector, SessionFactory};
