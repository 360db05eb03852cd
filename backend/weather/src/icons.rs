//! Condition-to-icon mapping and time-of-day keywords for background
//! image searches.

use chrono::{Duration, Timelike, Utc};

/// Map a weather condition group to its display icon.
pub fn condition_icon(condition: &str) -> &'static str {
    match condition {
        "Clear" => "☀️",
        "Clouds" => "☁️",
        "Rain" => "🌧️",
        "Drizzle" => "🌦️",
        "Thunderstorm" => "⛈️",
        "Snow" => "❄️",
        "Mist" | "Fog" | "Haze" => "🌫️",
        "Smoke" => "💨",
        _ => "🌤️",
    }
}

/// Search keywords for the city's current time of day.
pub fn time_of_day_keywords(hour: u32) -> &'static str {
    match hour {
        5..=7 => "sunrise dawn morning",
        8..=11 => "morning",
        12..=16 => "afternoon",
        17..=18 => "sunset golden hour",
        19..=21 => "evening dusk",
        _ => "night",
    }
}

/// The city's local hour, derived from its UTC offset in seconds.
pub fn local_hour(timezone_offset_secs: i64) -> u32 {
    (Utc::now() + Duration::seconds(timezone_offset_secs)).hour()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_icons() {
        assert_eq!(condition_icon("Clear"), "☀️");
        assert_eq!(condition_icon("Snow"), "❄️");
        assert_eq!(condition_icon("Fog"), "🌫️");
        assert_eq!(condition_icon("Tornado"), "🌤️");
    }

    #[test]
    fn test_time_of_day_buckets() {
        assert_eq!(time_of_day_keywords(6), "sunrise dawn morning");
        assert_eq!(time_of_day_keywords(10), "morning");
        assert_eq!(time_of_day_keywords(14), "afternoon");
        assert_eq!(time_of_day_keywords(17), "sunset golden hour");
        assert_eq!(time_of_day_keywords(20), "evening dusk");
        assert_eq!(time_of_day_keywords(23), "night");
        assert_eq!(time_of_day_keywords(3), "night");
    }
}
