//! Maps a coworking space to the identifier the booking site books against.

use std::time::Duration;

use super::retry::{self, RetryPolicy};
use super::site;
use crate::domain::error::{BookingError, Result};
use crate::domain::model::LocationId;
use crate::domain::scope::Scope;
use crate::infrastructure::api::{WorkplaceClient, Workspace};
use crate::infrastructure::browser::{DynBrowserDriver, Selector};

/// Finds a location in the rendered listing by its display name.
pub struct DomLocationResolver {
    driver: DynBrowserDriver,
    policy: RetryPolicy,
    attempt_timeout: Duration,
}

impl DomLocationResolver {
    pub fn new(driver: DynBrowserDriver, policy: RetryPolicy, attempt_timeout: Duration) -> Self {
        Self {
            driver,
            policy,
            attempt_timeout,
        }
    }

    /// Read the `id` of the listing entry titled `name`. The listing renders lazily, so
    /// each lookup is bounded and retried.
    pub async fn resolve(&self, scope: &Scope, name: &str) -> Result<LocationId> {
        let entry = site::location_item_by_name(name);

        let id = retry::execute(scope, self.policy, "resolve location", |attempt| {
            self.lookup(attempt, name, &entry)
        })
        .await?;

        tracing::info!(location = name, id = %id, "Resolved location");
        Ok(id)
    }

    async fn lookup(&self, scope: Scope, name: &str, entry: &Selector) -> Result<LocationId> {
        let bounded = scope.with_timeout(self.attempt_timeout);

        match self.driver.attribute_value(&bounded, entry, "id").await {
            Ok(Some(id)) if !id.trim().is_empty() => Ok(LocationId::new(id)),
            Ok(_) => Err(BookingError::LocationNotFound(name.to_string())),
            // Only the attempt's own deadline means "not rendered"; the caller's scope wins.
            Err(err) if err.is_scope_error() => {
                Err(scope.err().unwrap_or_else(|| BookingError::LocationNotFound(name.to_string())))
            }
            Err(err) => Err(err),
        }
    }
}

/// Looks a location up in the workplace catalog with the session's API token.
pub struct ApiLocationResolver {
    driver: DynBrowserDriver,
    client: WorkplaceClient,
    location_uuid: String,
}

impl ApiLocationResolver {
    pub fn new(driver: DynBrowserDriver, client: WorkplaceClient, location_uuid: String) -> Self {
        Self {
            driver,
            client,
            location_uuid,
        }
    }

    /// Access token cached by the signed-in page.
    pub async fn bearer_token(&self, scope: &Scope) -> Result<String> {
        let value = self
            .driver
            .evaluate(scope, site::BEARER_TOKEN_SCRIPT)
            .await?;

        match value.as_str() {
            Some(token) if !token.is_empty() => Ok(token.to_string()),
            _ => Err(BookingError::Api(
                "no access token in session storage".to_string(),
            )),
        }
    }

    /// Catalog entry of the configured location.
    pub async fn resolve(&self, scope: &Scope, token: &str, name: &str) -> Result<Workspace> {
        let space = self
            .client
            .fetch_space(scope, token, &self.location_uuid)
            .await?;

        tracing::info!(
            location = name,
            uuid = %self.location_uuid,
            space = %space.uuid,
            "Resolved location from catalog"
        );
        Ok(space)
    }
}
