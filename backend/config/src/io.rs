//! Settings file read/write with atomic replacement.

use crate::schema::SkycastConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Settings file name within the config directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Resolve the Skycast config directory.
/// Priority: `SKYCAST_CONFIG_DIR` env > `~/.skycast/`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SKYCAST_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".skycast");
    }
    PathBuf::from(".skycast")
}

/// Resolve the full path to the settings file.
pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Load and parse settings from disk.
///
/// Returns `Ok(Default::default())` if the file doesn't exist (first run).
pub async fn load_config(path: &Path) -> Result<SkycastConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "Settings file does not exist; using defaults");
        return Ok(SkycastConfig::default());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

    let config: SkycastConfig = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse settings YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded settings");
    Ok(config)
}

/// Write settings to disk atomically (write to temp file, rename).
pub async fn save_config(config: &SkycastConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
    }

    let yaml =
        serde_yaml::to_string(config).with_context(|| "Failed to serialize settings to YAML")?;

    let tmp_path = path.with_extension("yaml.tmp");
    fs::write(&tmp_path, yaml.as_bytes())
        .await
        .with_context(|| format!("Failed to write temp settings: {}", tmp_path.display()))?;

    fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("Failed to rename temp settings to: {}", path.display()))?;

    debug!(path = %path.display(), "Wrote settings");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TemperatureUnit;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("skycast-config-test-{}-{}", std::process::id(), name))
            .join(CONFIG_FILE_NAME)
    }

    #[tokio::test]
    async fn test_missing_file_yields_defaults() {
        let path = scratch_path("missing");
        let config = load_config(&path).await.unwrap();
        assert_eq!(config, SkycastConfig::default());
    }

    #[tokio::test]
    async fn test_save_then_load_roundtrip() {
        let path = scratch_path("roundtrip");
        let config = SkycastConfig {
            api_key: "abc123".to_string(),
            city: "Reykjavik".to_string(),
            temperature_unit: TemperatureUnit::Celsius,
            ..Default::default()
        };
        save_config(&config, &path).await.unwrap();
        let loaded = load_config(&path).await.unwrap();
        assert_eq!(loaded, config);
        let _ = fs::remove_dir_all(path.parent().unwrap()).await;
    }

    #[tokio::test]
    async fn test_legacy_kelvin_on_disk_becomes_default() {
        let path = scratch_path("kelvin");
        fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        fs::write(&path, "temperatureUnit: Kelvin\ncity: Barrow\n")
            .await
            .unwrap();
        let loaded = load_config(&path).await.unwrap();
        assert_eq!(loaded.temperature_unit, TemperatureUnit::Fahrenheit);
        assert_eq!(loaded.city, "Barrow");
        let _ = fs::remove_dir_all(path.parent().unwrap()).await;
    }
}
