pub mod adapter;
pub mod application;
pub mod domain;
pub mod infrastructure;

use std::sync::Arc;

use adapter::http::{self, AppState};
use application::{system_clock, BrowserBookingService};
use infrastructure::api::WorkplaceClient;
use infrastructure::browser::ChromiumBrowser;
use infrastructure::config::{self, DateEntryMode};
use infrastructure::logging;

pub async fn run() -> anyhow::Result<()> {
    let _log_flush = logging::setup(!cfg!(debug_assertions));

    // Initialize configuration
    let app_config = config::init()?;
    config::validate(app_config)?;
    let credentials = config::credentials_from_env(|key| std::env::var(key).ok())?;

    let browser = Arc::new(ChromiumBrowser::launch(&app_config.browser).await?);

    let mut service = BrowserBookingService::new(
        browser.clone(),
        app_config.booking.clone(),
        credentials,
        system_clock(),
    );
    if app_config.booking.date_entry == DateEntryMode::Api {
        service = service.with_api(WorkplaceClient::new(&app_config.api)?);
    }
    tracing::info!(
        location = %app_config.booking.location_name,
        date_entry = ?app_config.booking.date_entry,
        "Booking service ready"
    );

    let state = Arc::new(AppState::new(Arc::new(service)));
    let served = http::serve(app_config.server.bind, state).await;

    browser.shutdown().await;
    served
}
