//! Top-level booking orchestration for one browser session.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::Instrument;
use ulid::Ulid;

use super::calendar::CalendarNavigator;
use super::classifier::PageStateClassifier;
use super::location::{ApiLocationResolver, DomLocationResolver};
use super::login::LoginFlow;
use super::retry::RetryPolicy;
use super::site;
use crate::domain::error::{BookingError, Result};
use crate::domain::model::{Credentials, LocationId, TargetDate};
use crate::domain::scope::Scope;
use crate::infrastructure::api::{BookingRequest, WorkplaceClient};
use crate::infrastructure::browser::DynBrowserDriver;
use crate::infrastructure::config::{BookingConfig, DateEntryMode};

/// Source of "today" for the booking window and the date-picker anchor.
pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(|| chrono::Local::now().date_naive())
}

/// What to book and as whom.
#[derive(Debug, Clone)]
pub struct BookingOrder {
    pub credentials: Credentials,
    pub location_name: String,
    pub date: TargetDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStage {
    Start,
    Classified,
    LoggedIn,
    DateSelected,
    LocationResolved,
    Submitted,
    ConfirmedOrDeclined,
    Done,
}

/// Drives one booking through a dedicated browser session and closes the session when
/// done. Steps run strictly in order and the first error ends the run.
pub struct BookingFlow {
    driver: DynBrowserDriver,
    config: BookingConfig,
    api: Option<WorkplaceClient>,
    today: Clock,
    stage: BookingStage,
}

impl BookingFlow {
    pub fn new(driver: DynBrowserDriver, config: BookingConfig, today: Clock) -> Self {
        Self {
            driver,
            config,
            api: None,
            today,
            stage: BookingStage::Start,
        }
    }

    /// Client used by the api date entry mode.
    pub fn with_api(mut self, client: WorkplaceClient) -> Self {
        self.api = Some(client);
        self
    }

    pub fn stage(&self) -> BookingStage {
        self.stage
    }

    fn transition_to(&mut self, next: BookingStage) {
        tracing::debug!(from = ?self.stage, to = ?next, "Booking stage transition");
        self.stage = next;
    }

    /// Bounded scope for one sequential step after classification.
    fn step(&self, scope: &Scope) -> Scope {
        scope.with_timeout(self.config.step_timeout)
    }

    /// Run the booking. The session is closed on every exit, including when this future
    /// is dropped before it completes.
    pub async fn run(&mut self, scope: &Scope, order: &BookingOrder) -> Result<()> {
        let span = tracing::info_span!("booking", id = %Ulid::new(), date = %order.date);

        async {
            let release = SessionRelease::new(self.driver.clone());
            let result = self.drive(scope, order).await;
            release.close().await;

            match &result {
                Ok(()) => tracing::info!("Booking successful"),
                Err(e) => tracing::error!(stage = ?self.stage, kind = e.kind(), "Booking failed: {}", e),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn drive(&mut self, scope: &Scope, order: &BookingOrder) -> Result<()> {
        let today = (self.today)();
        order.date.ensure_within_window(today)?;

        let classifier = PageStateClassifier::new(
            self.driver.clone(),
            self.config.bookings_url.clone(),
            self.config.classify_timeout,
        );
        let state = classifier.classify(scope).await?;
        self.transition_to(BookingStage::Classified);

        if state.requires_login() {
            LoginFlow::new(
                self.driver.clone(),
                self.config.login_branch_timeout,
                self.config.login_form_settle,
                self.config.step_timeout,
            )
            .login(scope, &order.credentials)
            .await?;
            self.transition_to(BookingStage::LoggedIn);

            self.driver
                .navigate(&self.step(scope), &self.config.bookings_url)
                .await?;
        }

        match self.config.date_entry {
            DateEntryMode::Input => {
                self.fill_date(scope, &order.date).await?;
                self.book_in_listing(scope, order).await
            }
            DateEntryMode::Calendar => {
                self.pick_date(scope, today, &order.date).await?;
                self.book_in_listing(scope, order).await
            }
            DateEntryMode::Api => self.book_via_api(scope, order).await,
        }
    }

    async fn fill_date(&mut self, scope: &Scope, date: &TargetDate) -> Result<()> {
        let step = self.step(scope);
        self.driver
            .set_value(&step, &site::date_input(), &date.label())
            .await?;
        self.driver.wait_visible(&step, &site::listing_loading()).await?;
        self.transition_to(BookingStage::DateSelected);
        Ok(())
    }

    async fn pick_date(&mut self, scope: &Scope, today: NaiveDate, date: &TargetDate) -> Result<()> {
        let step = self.step(scope);
        self.driver.click(&step, &site::date_input()).await?;
        CalendarNavigator::new(self.driver.clone())
            .navigate_and_select(&step, today, date)
            .await?;
        self.driver.wait_visible(&step, &site::listing_loading()).await?;
        self.transition_to(BookingStage::DateSelected);
        Ok(())
    }

    async fn book_in_listing(&mut self, scope: &Scope, order: &BookingOrder) -> Result<()> {
        let resolver = DomLocationResolver::new(
            self.driver.clone(),
            RetryPolicy::new(self.config.location_attempts, self.config.location_backoff),
            self.config.location_attempt_timeout,
        );
        let id = resolver.resolve(scope, &order.location_name).await?;
        self.transition_to(BookingStage::LocationResolved);

        self.submit(scope, &id).await?;
        self.transition_to(BookingStage::Submitted);

        self.confirm_low_credits(scope).await?;
        self.transition_to(BookingStage::ConfirmedOrDeclined);

        self.driver
            .click(&self.step(scope), &site::done_button())
            .await
            .map_err(|e| e.at_submission_step("dismiss confirmation"))?;
        self.transition_to(BookingStage::Done);
        Ok(())
    }

    async fn submit(&self, scope: &Scope, id: &LocationId) -> Result<()> {
        self.driver
            .wait_visible(&self.step(scope), &site::location_item(id))
            .await
            .map_err(|e| e.at_submission_step("location entry"))?;
        self.driver
            .evaluate(&self.step(scope), &site::location_book_script(id))
            .await
            .map_err(|e| e.at_submission_step("open booking"))?;
        self.driver
            .wait_visible(&self.step(scope), &site::booking_cost())
            .await
            .map_err(|e| e.at_submission_step("booking review"))?;
        self.driver
            .click(&self.step(scope), &site::booking_confirm())
            .await
            .map_err(|e| e.at_submission_step("confirm booking"))
    }

    /// Accept the low-credit warning when the site shows one. Its absence is expected.
    async fn confirm_low_credits(&self, scope: &Scope) -> Result<()> {
        let probe = scope.with_timeout(self.config.credits_modal_timeout);

        match self
            .driver
            .click(&probe, &site::insufficient_credits_confirm())
            .await
        {
            Ok(()) => {
                tracing::info!("Accepted insufficient credits warning");
                Ok(())
            }
            Err(e) if e.is_scope_error() => match scope.err() {
                Some(parent) => Err(parent),
                None => {
                    tracing::debug!("No insufficient credits warning");
                    Ok(())
                }
            },
            Err(e) => Err(e.at_submission_step("insufficient credits")),
        }
    }

    async fn book_via_api(&mut self, scope: &Scope, order: &BookingOrder) -> Result<()> {
        let client = self.api.clone().ok_or_else(|| {
            BookingError::Config("api date entry mode needs an API client".to_string())
        })?;
        let resolver = ApiLocationResolver::new(
            self.driver.clone(),
            client.clone(),
            self.config.location_uuid.clone(),
        );

        let token = resolver.bearer_token(&self.step(scope)).await?;
        let space = resolver.resolve(scope, &token, &order.location_name).await?;
        self.transition_to(BookingStage::LocationResolved);

        let request = BookingRequest::day_pass(&space, &order.date);
        self.transition_to(BookingStage::DateSelected);
        client.create_booking(scope, &token, &request).await?;
        self.transition_to(BookingStage::Submitted);
        self.transition_to(BookingStage::Done);
        Ok(())
    }
}

/// Closes the session from a background task if the owning run is dropped first.
struct SessionRelease {
    driver: Option<DynBrowserDriver>,
}

impl SessionRelease {
    fn new(driver: DynBrowserDriver) -> Self {
        Self {
            driver: Some(driver),
        }
    }

    async fn close(mut self) {
        if let Some(driver) = &self.driver {
            if let Err(e) = driver.close().await {
                tracing::warn!("Failed to close browser session: {}", e);
            }
        }
        self.driver = None;
    }
}

impl Drop for SessionRelease {
    fn drop(&mut self) {
        let Some(driver) = self.driver.take() else {
            return;
        };
        tracing::warn!("Booking abandoned, closing browser session");
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = driver.close().await {
                        tracing::warn!("Failed to close browser session: {}", e);
                    }
                });
            }
            Err(_) => tracing::error!("No runtime left to close the browser session"),
        }
    }
}
