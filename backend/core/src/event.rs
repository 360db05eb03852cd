use serde::{Deserialize, Serialize};

/// Notifications published by the conversational-agent gateway.
///
/// One variant per observable topic. The UI host subscribes through a
/// broadcast channel rather than wiring per-property callbacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "topic", rename_all = "snake_case")]
pub enum AgentEvent {
    /// Helper process signalled it accepts commands (or lost that state).
    ReadyChanged { ready: bool },
    /// A command went out / its response arrived.
    ProcessingChanged { processing: bool },
    /// Latest observable error text ("" when cleared).
    ErrorChanged { error: String },
    /// The helper confirmed a new weather location.
    LocationChanged { location: String },
    /// Chat transcript was appended to or cleared.
    HistoryChanged,
    /// Human-readable response text: either a weather-set confirmation
    /// or the helper's reply to a query.
    ResponseReceived { text: String },
}

/// Notifications published by the weather-data gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "topic", rename_all = "snake_case")]
pub enum WeatherEvent {
    /// One consolidated notification per logical fetch.
    DataChanged,
    LoadingChanged { loading: bool },
    ErrorChanged { error: String },
    CityChanged { city: String },
    SuggestionsChanged { suggestions: Vec<String> },
    BackgroundChanged { url: String },
    PlanetChanged { planet: String },
    UnitChanged,
    TimeFormatChanged { format: String },
    LanguageChanged { language: String },
    ApiKeyChanged { set: bool },
}

impl std::fmt::Display for AgentEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = serde_json::to_value(self)
            .ok()
            .and_then(|v| v.get("topic").and_then(|t| t.as_str()).map(String::from))
            .unwrap_or_else(|| format!("{:?}", self));
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_event_topic_names() {
        let v = serde_json::to_value(AgentEvent::ReadyChanged { ready: true }).unwrap();
        assert_eq!(v["topic"], "ready_changed");
        assert_eq!(AgentEvent::HistoryChanged.to_string(), "history_changed");
    }

    #[test]
    fn test_weather_event_roundtrip() {
        let e = WeatherEvent::SuggestionsChanged {
            suggestions: vec!["Paris, FR".to_string()],
        };
        let json = serde_json::to_string(&e).unwrap();
        let back: WeatherEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }
}
