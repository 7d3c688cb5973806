//! Detects which page the booking session landed on.

use std::time::Duration;

use super::race::{Probe, RaceDetector};
use super::site;
use crate::domain::error::{BookingError, Result};
use crate::domain::model::PageState;
use crate::domain::scope::Scope;
use crate::infrastructure::browser::DynBrowserDriver;

/// Navigate-and-race rounds before giving up on an unrecognised page.
const CLASSIFY_ROUNDS: u32 = 2;

pub struct PageStateClassifier {
    driver: DynBrowserDriver,
    bookings_url: String,
    race: RaceDetector,
}

impl PageStateClassifier {
    pub fn new(driver: DynBrowserDriver, bookings_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            driver,
            bookings_url: bookings_url.into(),
            race: RaceDetector::new(timeout),
        }
    }

    /// Load the bookings view and report whether it asks for a login or shows the
    /// reservation page. An unrecognised page is reloaded once before failing with
    /// `ClassificationTimeout`.
    pub async fn classify(&self, scope: &Scope) -> Result<PageState> {
        let mut round = 1;
        loop {
            match self.load_and_race(scope).await {
                Ok(state) => {
                    tracing::info!(state = ?state, round, "Classified bookings page");
                    return Ok(state);
                }
                Err(BookingError::RaceTimeout(timeout)) if round < CLASSIFY_ROUNDS => {
                    tracing::warn!(round, ?timeout, "Bookings page not recognised, reloading");
                    round += 1;
                }
                Err(BookingError::RaceTimeout(_)) => return Err(BookingError::ClassificationTimeout),
                Err(err) => return Err(err),
            }
        }
    }

    async fn load_and_race(&self, scope: &Scope) -> Result<PageState> {
        self.driver.navigate(scope, &self.bookings_url).await?;
        self.race.race(scope, self.probes()).await
    }

    fn probes(&self) -> Vec<Probe<PageState>> {
        let login = self.driver.clone();
        let reserve = self.driver.clone();
        vec![
            Probe::new("login button", PageState::NeedsLogin, move |scope| async move {
                login.wait_visible(&scope, &site::login_entry()).await
            }),
            Probe::new("reserve page", PageState::ReadyToBook, move |scope| async move {
                reserve.wait_ready(&scope, &site::reserve_marker()).await
            }),
        ]
    }
}
