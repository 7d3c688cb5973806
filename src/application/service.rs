use std::sync::Arc;

use async_trait::async_trait;

use super::booking::{BookingFlow, BookingOrder, Clock};
use crate::domain::error::Result;
use crate::domain::model::{Credentials, TargetDate};
use crate::domain::scope::Scope;
use crate::infrastructure::api::WorkplaceClient;
use crate::infrastructure::browser::SessionFactory;
use crate::infrastructure::config::BookingConfig;

/// Entry point used by the HTTP front door.
#[async_trait]
pub trait BookingService: Send + Sync {
    async fn book(&self, scope: &Scope, date: TargetDate) -> Result<()>;
}

/// Books for the configured member, opening a fresh browser tab per booking.
pub struct BrowserBookingService {
    sessions: Arc<dyn SessionFactory>,
    config: BookingConfig,
    credentials: Credentials,
    api: Option<WorkplaceClient>,
    clock: Clock,
}

impl BrowserBookingService {
    pub fn new(
        sessions: Arc<dyn SessionFactory>,
        config: BookingConfig,
        credentials: Credentials,
        clock: Clock,
    ) -> Self {
        Self {
            sessions,
            config,
            credentials,
            api: None,
            clock,
        }
    }

    pub fn with_api(mut self, client: WorkplaceClient) -> Self {
        self.api = Some(client);
        self
    }
}

#[async_trait]
impl BookingService for BrowserBookingService {
    async fn book(&self, scope: &Scope, date: TargetDate) -> Result<()> {
        // Requests abandoned while queued never open a tab.
        if let Some(err) = scope.err() {
            return Err(err);
        }
        let session = self.sessions.open_session().await?;

        let mut flow = BookingFlow::new(session, self.config.clone(), self.clock.clone());
        if let Some(client) = &self.api {
            flow = flow.with_api(client.clone());
        }

        let order = BookingOrder {
            credentials: self.credentials.clone(),
            location_name: self.config.location_name.clone(),
            date,
        };
        flow.run(scope, &order).await
    }
}
