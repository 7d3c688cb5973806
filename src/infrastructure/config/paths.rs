use std::path::PathBuf;

/// Get platform-specific configuration directory
pub fn config_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Library/Application Support/webook")
    }

    #[cfg(not(target_os = "macos"))]
    {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("webook")
    }
}

pub fn user_config_path() -> PathBuf {
    config_dir().join("app.yaml")
}

pub fn log_dir() -> PathBuf {
    config_dir().join("logs")
}

/// Chrome profile kept next to the working directory so cookies survive restarts.
pub fn default_profile_dir() -> PathBuf {
    PathBuf::from("./chrome-data")
}
