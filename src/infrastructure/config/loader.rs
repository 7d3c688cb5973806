use include_dir::{include_dir, Dir};
use serde::de::DeserializeOwned;
use serde_yaml::Value;
use std::path::{Path, PathBuf};

use super::paths;
use super::AppConfig;

// Embed the entire configs directory at compile time
static CONFIGS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/resources/configs");

/// Environment variable pointing at an alternative user config file
pub const CONFIG_PATH_ENV: &str = "WEBOOK_CONFIG";

/// Parse YAML from string
pub fn parse_yaml<T: DeserializeOwned>(content: &str) -> anyhow::Result<T> {
    let config: T = serde_yaml::from_str(content)?;
    Ok(config)
}

/// Load an embedded configuration document by name from the configs directory
fn embedded_document(name: &str) -> anyhow::Result<Value> {
    let file_name = format!("{}.yaml", name);
    let file = CONFIGS_DIR
        .get_file(&file_name)
        .ok_or_else(|| anyhow::anyhow!("Embedded config {} not found", name))?;
    let content = file
        .contents_utf8()
        .ok_or_else(|| anyhow::anyhow!("Embedded config {} is not valid UTF-8", name))?;
    parse_yaml(content)
}

/// Recursively overlay `overlay` onto `base`. Mappings merge key by key; any other
/// value in the overlay replaces the base value.
pub fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

fn user_config_path() -> PathBuf {
    std::env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(paths::user_config_path)
}

/// Build the application config: embedded defaults, then the user file if present.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let mut document = embedded_document("app")?;
    tracing::debug!("Loaded embedded config: app");

    let path = user_config_path();
    if let Some(overlay) = read_user_document(&path)? {
        tracing::info!("Loaded user config from {:?}", path);
        merge(&mut document, overlay);
    } else {
        tracing::debug!("No user config at {:?}, using defaults", path);
    }

    let config: AppConfig = serde_yaml::from_value(document)?;
    Ok(config)
}

fn read_user_document(path: &Path) -> anyhow::Result<Option<Value>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    let value: Value = parse_yaml(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse {:?}: {}", path, e))?;
    Ok(Some(value))
}
