use serde::{Deserialize, Serialize};

/// Display-ready weather values the host packages into a
/// `set_weather` command for the agent helper.
///
/// Temperatures are already converted to the configured display unit;
/// `unit` carries the symbol so the helper can echo it back in prose.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature: f64,
    pub feels_like: f64,
    pub high: f64,
    pub low: f64,
    pub humidity: i64,
    pub wind_speed: f64,
    pub uv_index: i64,
    pub description: String,
    pub unit: String,
}
