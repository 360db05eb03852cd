//! Skycast settings schema, typed for serde YAML deserialization.

use serde::{Deserialize, Deserializer, Serialize};

/// Display unit for temperatures. Canonical storage is always Kelvin;
/// this only affects getters and the snapshot handed to the UI host.
///
/// Kelvin is deliberately not a variant: a legacy persisted "Kelvin"
/// value falls back to the default on load and cannot be written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemperatureUnit {
    Celsius,
    #[default]
    Fahrenheit,
}

impl TemperatureUnit {
    /// Convert a canonical Kelvin value into this display unit.
    pub fn from_kelvin(self, kelvin: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => kelvin - 273.15,
            TemperatureUnit::Fahrenheit => (kelvin - 273.15) * 9.0 / 5.0 + 32.0,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }
}

/// Tolerant unit parser for values persisted by older builds, which
/// could write "Kelvin". Anything unrecognized maps to the default.
fn unit_or_default<'de, D>(deserializer: D) -> Result<TemperatureUnit, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(match raw.as_str() {
        "Celsius" => TemperatureUnit::Celsius,
        "Fahrenheit" => TemperatureUnit::Fahrenheit,
        _ => TemperatureUnit::default(),
    })
}

/// Root persisted settings for Skycast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkycastConfig {
    /// Weather API credential.
    pub api_key: String,

    /// Image-search API credential for city backgrounds.
    pub image_api_key: String,

    /// Last selected city.
    pub city: String,

    #[serde(deserialize_with = "unit_or_default")]
    pub temperature_unit: TemperatureUnit,

    /// Clock format: "12" or "24".
    pub time_format: String,

    /// Language code for localized weather descriptions.
    pub language: String,
}

impl Default for SkycastConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            image_api_key: String::new(),
            city: "San Francisco".to_string(),
            temperature_unit: TemperatureUnit::default(),
            time_format: "12".to_string(),
            language: "en".to_string(),
        }
    }
}

impl SkycastConfig {
    pub fn api_key_set(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kelvin_conversion() {
        let k = 293.15;
        assert!((TemperatureUnit::Celsius.from_kelvin(k) - 20.0).abs() < 1e-9);
        assert!((TemperatureUnit::Fahrenheit.from_kelvin(k) - 68.0).abs() < 1e-9);
    }

    #[test]
    fn test_symbols() {
        assert_eq!(TemperatureUnit::Celsius.symbol(), "°C");
        assert_eq!(TemperatureUnit::Fahrenheit.symbol(), "°F");
    }

    #[test]
    fn test_legacy_kelvin_rejected_on_load() {
        let yaml = "temperatureUnit: Kelvin\n";
        let config: SkycastConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.temperature_unit, TemperatureUnit::Fahrenheit);
    }

    #[test]
    fn test_celsius_accepted_on_load() {
        let yaml = "temperatureUnit: Celsius\ncity: Oslo\n";
        let config: SkycastConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.temperature_unit, TemperatureUnit::Celsius);
        assert_eq!(config.city, "Oslo");
    }

    #[test]
    fn test_defaults() {
        let config = SkycastConfig::default();
        assert_eq!(config.city, "San Francisco");
        assert_eq!(config.time_format, "12");
        assert_eq!(config.language, "en");
        assert!(!config.api_key_set());
    }
}
