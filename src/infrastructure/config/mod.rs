mod app_config;
pub mod loader;
pub mod paths;

pub use app_config::*;

use std::sync::OnceLock;

use crate::domain::model::Credentials;

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

pub const EMAIL_ENV: &str = "WEWORK_EMAIL";
pub const PASSWORD_ENV: &str = "WEWORK_PASSWORD";
pub const COWORKING_NAME_ENV: &str = "WEWORK_COWORKING_NAME";
pub const LOCATION_UUID_ENV: &str = "WEWORK_LOCATION_UUID";

/// Initialize configuration system (called at startup)
pub fn init() -> anyhow::Result<&'static AppConfig> {
    if let Some(config) = APP_CONFIG.get() {
        return Ok(config);
    }
    let mut config = loader::load_app_config()?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    let config = APP_CONFIG.get_or_init(|| config);
    tracing::info!("Configuration initialized");
    Ok(config)
}

/// Environment variables win over both config files.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(name) = lookup(COWORKING_NAME_ENV).filter(|v| !v.is_empty()) {
        config.booking.location_name = name;
    }
    if let Some(uuid) = lookup(LOCATION_UUID_ENV).filter(|v| !v.is_empty()) {
        config.booking.location_uuid = uuid;
    }
}

/// Read member credentials from the environment.
pub fn credentials_from_env<F>(lookup: F) -> anyhow::Result<Credentials>
where
    F: Fn(&str) -> Option<String>,
{
    let email = lookup(EMAIL_ENV).unwrap_or_default();
    let password = lookup(PASSWORD_ENV).unwrap_or_default();

    if email.is_empty() || password.is_empty() {
        anyhow::bail!("{} and {} must be set", EMAIL_ENV, PASSWORD_ENV);
    }

    Ok(Credentials::new(email, password))
}

/// Check the settings the selected date entry mode depends on.
pub fn validate(config: &AppConfig) -> anyhow::Result<()> {
    if config.booking.location_name.is_empty() {
        anyhow::bail!(
            "booking.location_name is empty; set it in the config file or via {}",
            COWORKING_NAME_ENV
        );
    }
    if config.booking.date_entry == DateEntryMode::Api && config.booking.location_uuid.is_empty() {
        anyhow::bail!(
            "booking.location_uuid is required for the api date entry mode ({})",
            LOCATION_UUID_ENV
        );
    }
    Ok(())
}
