//! Field extraction from the upstream REST payloads.
//!
//! Pure functions over parsed JSON; the gateway applies the extracts to
//! its state. Missing numeric fields default to zero, matching what the
//! APIs actually omit for partial records.

use serde_json::Value;

use crate::icons::condition_icon;

/// Extract from the current-weather-by-city payload. Kelvin throughout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurrentWeather {
    pub temperature_k: f64,
    pub high_k: f64,
    pub low_k: f64,
    pub feels_like_k: f64,
    pub humidity: i64,
    pub wind_speed: f64,
    pub description: String,
    pub icon: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone_offset_secs: i64,
}

fn num(value: &Value, path: &[&str]) -> f64 {
    let mut cursor = value;
    for key in path {
        match cursor.get(key) {
            Some(next) => cursor = next,
            None => return 0.0,
        }
    }
    cursor.as_f64().unwrap_or(0.0)
}

fn text(value: &Value, path: &[&str]) -> String {
    let mut cursor = value;
    for key in path {
        match cursor.get(key) {
            Some(next) => cursor = next,
            None => return String::new(),
        }
    }
    cursor.as_str().unwrap_or_default().to_string()
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Parse the current-weather payload. `None` when the document is not a
/// JSON object (invalid content).
pub fn current_weather(value: &Value) -> Option<CurrentWeather> {
    if !value.is_object() {
        return None;
    }

    let mut extract = CurrentWeather {
        temperature_k: num(value, &["main", "temp"]),
        high_k: num(value, &["main", "temp_max"]),
        low_k: num(value, &["main", "temp_min"]),
        feels_like_k: num(value, &["main", "feels_like"]),
        humidity: num(value, &["main", "humidity"]) as i64,
        wind_speed: num(value, &["wind", "speed"]),
        latitude: num(value, &["coord", "lat"]),
        longitude: num(value, &["coord", "lon"]),
        timezone_offset_secs: value.get("timezone").and_then(Value::as_i64).unwrap_or(0),
        ..Default::default()
    };

    if let Some(weather) = value.get("weather").and_then(Value::as_array) {
        if let Some(first) = weather.first() {
            extract.description = capitalize_first(&text(first, &["description"]));
            extract.icon = condition_icon(&text(first, &["main"])).to_string();
        }
    }

    Some(extract)
}

/// Parse the UV-index payload; the displayed index is rounded.
pub fn uv_index(value: &Value) -> Option<i64> {
    if !value.is_object() {
        return None;
    }
    Some(num(value, &["value"]).round() as i64)
}

/// Format geocoding results as "City, State, Country" suggestions,
/// omitting the state when the API returned none.
pub fn city_suggestions(value: &Value) -> Vec<String> {
    let Some(results) = value.as_array() else {
        return Vec::new();
    };
    results
        .iter()
        .map(|entry| {
            let name = text(entry, &["name"]);
            let state = text(entry, &["state"]);
            let country = text(entry, &["country"]);
            if state.is_empty() {
                format!("{}, {}", name, country)
            } else {
                format!("{}, {}, {}", name, state, country)
            }
        })
        .collect()
}

/// Pull the "regular"-size URL out of the first image-search result.
pub fn background_image_url(value: &Value) -> Option<String> {
    let url = value
        .get("results")?
        .as_array()?
        .first()?
        .get("urls")?
        .get("regular")?
        .as_str()?;
    if url.is_empty() {
        None
    } else {
        Some(url.to_string())
    }
}

/// Extract from the planetary-weather feed's latest sol.
///
/// Each sensor block is optional in the feed; absent blocks leave the
/// corresponding fields untouched on apply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarsWeather {
    pub sol: String,
    pub temperature_k: Option<f64>,
    pub high_k: Option<f64>,
    pub low_k: Option<f64>,
    /// Already converted from m/s to mph.
    pub wind_speed: Option<f64>,
    /// Atmospheric pressure, rounded; displayed in the humidity slot.
    pub pressure: Option<i64>,
}

const CELSIUS_TO_KELVIN: f64 = 273.15;
const MS_TO_MPH: f64 = 2.237;

/// Parse the Mars feed. `None` when the document is not an object or
/// lists no sols.
pub fn mars_weather(value: &Value) -> Option<MarsWeather> {
    let sol = value
        .get("sol_keys")?
        .as_array()?
        .last()?
        .as_str()?
        .to_string();
    let sol_data = value.get(&sol)?;

    let mut extract = MarsWeather {
        sol,
        ..Default::default()
    };

    // Atmospheric temperature arrives in Celsius; storage is Kelvin.
    if let Some(at) = sol_data.get("AT").filter(|v| v.is_object()) {
        extract.temperature_k = Some(num(at, &["av"]) + CELSIUS_TO_KELVIN);
        extract.high_k = Some(num(at, &["mx"]) + CELSIUS_TO_KELVIN);
        extract.low_k = Some(num(at, &["mn"]) + CELSIUS_TO_KELVIN);
    }
    if let Some(hws) = sol_data.get("HWS").filter(|v| v.is_object()) {
        extract.wind_speed = Some(num(hws, &["av"]) * MS_TO_MPH);
    }
    if let Some(pre) = sol_data.get("PRE").filter(|v| v.is_object()) {
        extract.pressure = Some(num(pre, &["av"]).round() as i64);
    }

    Some(extract)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_current_weather_extraction() {
        let payload = json!({
            "main": {"temp": 293.15, "temp_max": 295.0, "temp_min": 290.0,
                     "humidity": 60, "feels_like": 292.0},
            "weather": [{"main": "Clear", "description": "clear sky"}],
            "wind": {"speed": 3.4},
            "coord": {"lat": 37.77, "lon": -122.42},
            "timezone": -28800
        });
        let extract = current_weather(&payload).unwrap();
        assert_eq!(extract.temperature_k, 293.15);
        assert_eq!(extract.humidity, 60);
        assert_eq!(extract.description, "Clear sky");
        assert_eq!(extract.icon, "☀️");
        assert_eq!(extract.timezone_offset_secs, -28800);
    }

    #[test]
    fn test_current_weather_rejects_non_object() {
        assert!(current_weather(&json!([1, 2, 3])).is_none());
        assert!(current_weather(&json!("oops")).is_none());
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let extract = current_weather(&json!({})).unwrap();
        assert_eq!(extract.temperature_k, 0.0);
        assert_eq!(extract.humidity, 0);
        assert_eq!(extract.description, "");
    }

    #[test]
    fn test_uv_index_rounds() {
        assert_eq!(uv_index(&json!({"value": 6.7})), Some(7));
        assert_eq!(uv_index(&json!({"value": 6.2})), Some(6));
        assert_eq!(uv_index(&json!([])), None);
    }

    #[test]
    fn test_city_suggestions_formatting() {
        let payload = json!([
            {"name": "Portland", "state": "Oregon", "country": "US"},
            {"name": "Paris", "state": "", "country": "FR"},
            {"name": "Lima", "country": "PE"}
        ]);
        assert_eq!(
            city_suggestions(&payload),
            vec!["Portland, Oregon, US", "Paris, FR", "Lima, PE"]
        );
    }

    #[test]
    fn test_background_image_url() {
        let payload = json!({
            "results": [{"urls": {"regular": "https://img.example/x.jpg"}}]
        });
        assert_eq!(
            background_image_url(&payload).as_deref(),
            Some("https://img.example/x.jpg")
        );
        assert_eq!(background_image_url(&json!({"results": []})), None);
    }

    #[test]
    fn test_mars_weather_extraction() {
        let payload = json!({
            "sol_keys": ["675", "676"],
            "676": {
                "AT": {"av": -62.3, "mx": -21.0, "mn": -96.9},
                "HWS": {"av": 7.2},
                "PRE": {"av": 750.6}
            }
        });
        let extract = mars_weather(&payload).unwrap();
        assert_eq!(extract.sol, "676");
        assert!((extract.temperature_k.unwrap() - (273.15 - 62.3)).abs() < 1e-9);
        assert!((extract.wind_speed.unwrap() - 7.2 * 2.237).abs() < 1e-9);
        assert_eq!(extract.pressure, Some(751));
    }

    #[test]
    fn test_mars_weather_without_sols_is_none() {
        assert!(mars_weather(&json!({"sol_keys": []})).is_none());
        assert!(mars_weather(&json!({})).is_none());
    }

    #[test]
    fn test_mars_weather_partial_sensor_blocks() {
        let payload = json!({
            "sol_keys": ["700"],
            "700": {"PRE": {"av": 730.2}}
        });
        let extract = mars_weather(&payload).unwrap();
        assert_eq!(extract.temperature_k, None);
        assert_eq!(extract.wind_speed, None);
        assert_eq!(extract.pressure, Some(730));
    }
}
