use super::paths;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub browser: BrowserConfig,
    pub booking: BookingConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8081)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BrowserConfig {
    /// Leave empty to use ./chrome-data
    pub user_data_dir: String,
    pub headless: bool,
    /// Explicit Chrome binary; autodetected when unset
    pub executable: Option<PathBuf>,
}

impl BrowserConfig {
    pub fn effective_user_data_dir(&self) -> PathBuf {
        if self.user_data_dir.is_empty() {
            paths::default_profile_dir()
        } else {
            PathBuf::from(&self.user_data_dir)
        }
    }
}

/// How the reservation date reaches the booking site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DateEntryMode {
    /// Write the date straight into the date input
    #[default]
    Input,
    /// Step the date-picker widget from today to the target date
    Calendar,
    /// Skip the UI and post the booking with the session's bearer token
    Api,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingConfig {
    pub bookings_url: String,
    pub date_entry: DateEntryMode,
    /// Display name of the coworking space, as rendered in the listing
    pub location_name: String,
    /// Catalog UUID of the location, required for the api date entry mode
    pub location_uuid: String,
    #[serde(with = "humantime_serde")]
    pub classify_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub login_branch_timeout: Duration,
    /// Pause after the credential form appears, before typing
    #[serde(with = "humantime_serde")]
    pub login_form_settle: Duration,
    pub location_attempts: u32,
    #[serde(with = "humantime_serde")]
    pub location_backoff: Duration,
    #[serde(with = "humantime_serde")]
    pub location_attempt_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub credits_modal_timeout: Duration,
    /// Upper bound for each wait or click after the page is classified
    #[serde(with = "humantime_serde")]
    pub step_timeout: Duration,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            bookings_url: "https://members.wework.com/workplaceone/content2/bookings/desks"
                .to_string(),
            date_entry: DateEntryMode::Input,
            location_name: String::new(),
            location_uuid: String::new(),
            classify_timeout: Duration::from_secs(10),
            login_branch_timeout: Duration::from_secs(5),
            login_form_settle: Duration::from_secs(2),
            location_attempts: 3,
            location_backoff: Duration::from_secs(2),
            location_attempt_timeout: Duration::from_secs(10),
            credits_modal_timeout: Duration::from_secs(2),
            step_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://members.wework.com/workplaceone/api".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Durations written as humantime strings ("10s", "1m 30s")
mod humantime_serde {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(de::Error::custom)
    }
}
