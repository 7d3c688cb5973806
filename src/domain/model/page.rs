use serde::{Deserialize, Serialize};

/// Which view the bookings landing page resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageState {
    /// The member login entry control is showing.
    NeedsLogin,
    /// The reservation view rendered, so the session cookies are still valid.
    ReadyToBook,
}

impl PageState {
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::NeedsLogin)
    }
}
