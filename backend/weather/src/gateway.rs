//! Weather-data gateway.
//!
//! Issues the upstream REST calls, stores temperatures canonically in
//! Kelvin, converts to the configured display unit in getters, and
//! publishes change notifications per logical fetch.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use skycast_config::{save_config, SkycastConfig, TemperatureUnit};
use skycast_core::{SkycastError, WeatherEvent, WeatherSnapshot};

use crate::alias;
use crate::icons::{local_hour, time_of_day_keywords};
use crate::parse::{self, CurrentWeather};

const WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
const UV_URL: &str = "https://api.openweathermap.org/data/2.5/uvi";
const GEOCODING_URL: &str = "http://api.openweathermap.org/geo/1.0/direct";
const IMAGE_SEARCH_URL: &str = "https://api.unsplash.com/search/photos";
const MARS_WEATHER_URL: &str = "https://api.nasa.gov/insight_weather/";

/// Autocomplete queries are quantized to this delay before a geocoding
/// lookup goes out.
const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);
const MIN_SEARCH_LEN: usize = 2;
const SUGGESTION_LIMIT: &str = "5";
const EVENT_CAPACITY: usize = 64;

const DEFAULT_CITY: &str = "San Francisco";
/// 20 °C, shown before the first fetch lands.
const DEFAULT_KELVIN: f64 = 293.15;
const CELSIUS_TO_KELVIN: f64 = 273.15;

#[derive(Debug)]
struct WeatherState {
    city: String,
    current_planet: String,
    temperature_k: f64,
    high_k: f64,
    low_k: f64,
    feels_like_k: f64,
    humidity: i64,
    wind_speed: f64,
    uv_index: i64,
    description: String,
    icon: String,
    latitude: f64,
    longitude: f64,
    timezone_offset_secs: i64,
    loading: bool,
    error: String,
    suggestions: Vec<String>,
    background_image_url: String,
}

impl WeatherState {
    fn new(city: String) -> Self {
        Self {
            city,
            current_planet: "Earth".to_string(),
            temperature_k: DEFAULT_KELVIN,
            high_k: DEFAULT_KELVIN,
            low_k: DEFAULT_KELVIN,
            feels_like_k: DEFAULT_KELVIN,
            humidity: 0,
            wind_speed: 0.0,
            uv_index: 0,
            description: String::new(),
            icon: String::new(),
            latitude: 0.0,
            longitude: 0.0,
            timezone_offset_secs: 0,
            loading: false,
            error: String::new(),
            suggestions: Vec::new(),
            background_image_url: String::new(),
        }
    }

    fn apply_current(&mut self, extract: CurrentWeather) {
        self.temperature_k = extract.temperature_k;
        self.high_k = extract.high_k;
        self.low_k = extract.low_k;
        self.feels_like_k = extract.feels_like_k;
        self.humidity = extract.humidity;
        self.wind_speed = extract.wind_speed;
        self.description = extract.description;
        self.icon = extract.icon;
        self.latitude = extract.latitude;
        self.longitude = extract.longitude;
        self.timezone_offset_secs = extract.timezone_offset_secs;
    }

    /// Wipe displayed data when switching planets.
    fn clear_readings(&mut self) {
        self.temperature_k = 0.0;
        self.high_k = 0.0;
        self.low_k = 0.0;
        self.feels_like_k = 0.0;
        self.humidity = 0;
        self.wind_speed = 0.0;
        self.uv_index = 0;
        self.description = String::new();
        self.icon = String::new();
    }
}

struct Inner {
    http: reqwest::Client,
    state: RwLock<WeatherState>,
    settings: RwLock<SkycastConfig>,
    config_path: PathBuf,
    events: broadcast::Sender<WeatherEvent>,
    search_generation: AtomicU64,
    pending_search: std::sync::Mutex<String>,
}

impl Inner {
    fn emit(&self, event: WeatherEvent) {
        let _ = self.events.send(event);
    }

    async fn set_loading(&self, loading: bool) {
        let mut state = self.state.write().await;
        if state.loading != loading {
            state.loading = loading;
            drop(state);
            self.emit(WeatherEvent::LoadingChanged { loading });
        }
    }

    async fn set_error(&self, error: impl Into<String>) {
        let error = error.into();
        let mut state = self.state.write().await;
        if state.error != error {
            state.error = error.clone();
            drop(state);
            self.emit(WeatherEvent::ErrorChanged { error });
        }
    }

    async fn persist(&self) {
        let settings = self.settings.read().await.clone();
        if let Err(e) = save_config(&settings, &self.config_path).await {
            warn!(error = %e, "Failed to persist settings");
        }
    }

    /// Chained after a weather fetch; failures are non-fatal and the
    /// loading flag is always released here.
    async fn fetch_uv(&self) {
        let (api_key, lat, lon) = {
            let settings = self.settings.read().await;
            let state = self.state.read().await;
            (settings.api_key.clone(), state.latitude, state.longitude)
        };

        let result = async {
            self.http
                .get(UV_URL)
                .query(&[
                    ("lat", lat.to_string()),
                    ("lon", lon.to_string()),
                    ("appid", api_key),
                ])
                .send()
                .await?
                .error_for_status()?
                .json::<Value>()
                .await
        }
        .await;

        match result {
            Ok(payload) => {
                if let Some(uv) = parse::uv_index(&payload) {
                    self.state.write().await.uv_index = uv;
                    self.emit(WeatherEvent::DataChanged);
                }
            }
            Err(e) => debug!(error = %e, "UV lookup failed"),
        }

        self.set_loading(false).await;
    }

    /// Geocoding lookup after the debounce delay fires.
    async fn perform_city_search(&self) {
        let api_key = {
            let settings = self.settings.read().await;
            if !settings.api_key_set() {
                return;
            }
            settings.api_key.clone()
        };
        let query = self
            .pending_search
            .lock()
            .map(|q| q.clone())
            .unwrap_or_default();
        if query.chars().count() < MIN_SEARCH_LEN {
            return;
        }

        let result = async {
            self.http
                .get(GEOCODING_URL)
                .query(&[
                    ("q", query.as_str()),
                    ("limit", SUGGESTION_LIMIT),
                    ("appid", api_key.as_str()),
                ])
                .send()
                .await?
                .error_for_status()?
                .json::<Value>()
                .await
        }
        .await;

        let suggestions = match result {
            Ok(payload) => parse::city_suggestions(&payload),
            Err(e) => {
                debug!(error = %e, "Geocoding lookup failed");
                Vec::new()
            }
        };

        self.state.write().await.suggestions = suggestions.clone();
        self.emit(WeatherEvent::SuggestionsChanged { suggestions });
    }

    /// Background image lookup keyed on the city and its time of day.
    async fn fetch_city_background(&self, city: &str) {
        let image_key = self.settings.read().await.image_api_key.clone();
        if image_key.is_empty() {
            return;
        }

        let offset = self.state.read().await.timezone_offset_secs;
        let base = city.split(',').next().unwrap_or(city).trim();
        let query = format!(
            "{} cityscape skyline {}",
            base,
            time_of_day_keywords(local_hour(offset))
        );

        let result = async {
            self.http
                .get(IMAGE_SEARCH_URL)
                .header("Authorization", format!("Client-ID {}", image_key))
                .query(&[
                    ("query", query.as_str()),
                    ("per_page", "1"),
                    ("orientation", "portrait"),
                ])
                .send()
                .await?
                .error_for_status()?
                .json::<Value>()
                .await
        }
        .await;

        match result {
            Ok(payload) => {
                if let Some(url) = parse::background_image_url(&payload) {
                    self.state.write().await.background_image_url = url.clone();
                    self.emit(WeatherEvent::BackgroundChanged { url });
                }
            }
            Err(e) => debug!(error = %e, "Image search lookup failed"),
        }
    }

    async fn fetch_mars_weather(&self) {
        self.set_loading(true).await;
        self.set_error("").await;

        let outcome = async {
            self.http
                .get(MARS_WEATHER_URL)
                .query(&[("api_key", "DEMO_KEY"), ("feedtype", "json"), ("ver", "1.0")])
                .send()
                .await?
                .error_for_status()?
                .json::<Value>()
                .await
        }
        .await
        .map_err(|e| e.to_string());

        self.apply_mars_outcome(outcome).await;
        self.set_loading(false).await;
    }

    /// Apply the feed's latest sol, or the hardcoded fallback dataset on
    /// any HTTP, transport, or decode failure.
    async fn apply_mars_outcome(&self, outcome: Result<Value, String>) {
        match outcome {
            Ok(payload) => {
                // An empty feed (no sols) changes nothing, per the upstream
                // contract: stale-but-real data beats a simulated reading.
                if let Some(extract) = parse::mars_weather(&payload) {
                    let mut state = self.state.write().await;
                    if let Some(k) = extract.temperature_k {
                        state.temperature_k = k;
                    }
                    if let Some(k) = extract.high_k {
                        state.high_k = k;
                    }
                    if let Some(k) = extract.low_k {
                        state.low_k = k;
                    }
                    if let Some(mph) = extract.wind_speed {
                        state.wind_speed = mph;
                    }
                    if let Some(pressure) = extract.pressure {
                        // Mars has no humidity; the pressure reading rides
                        // in that slot for display.
                        state.humidity = pressure;
                    }
                    state.description = "Martian atmospheric conditions".to_string();
                    state.icon = "🔴".to_string();
                    state.city = format!("Mars (Sol {})", extract.sol);
                    drop(state);
                    self.emit(WeatherEvent::DataChanged);
                }
            }
            Err(e) => {
                warn!(error = %e, "Mars feed unavailable; using fallback dataset");
                let mut state = self.state.write().await;
                state.temperature_k = -63.0 + CELSIUS_TO_KELVIN;
                state.high_k = -21.0 + CELSIUS_TO_KELVIN;
                state.low_k = -87.0 + CELSIUS_TO_KELVIN;
                state.wind_speed = 20.0;
                state.humidity = 0;
                state.description = "Typical Martian conditions (simulated)".to_string();
                state.icon = "🔴".to_string();
                state.city = "Mars".to_string();
                drop(state);
                self.emit(WeatherEvent::DataChanged);
            }
        }
    }

    /// Apply a fetched current-weather payload, or record the failure.
    /// Returns whether coordinates are known, for the UV chain.
    async fn apply_weather_outcome(
        &self,
        outcome: Result<Value, String>,
    ) -> Result<bool, SkycastError> {
        let payload = match outcome {
            Ok(payload) => payload,
            Err(e) => {
                self.set_error(format!("Failed to fetch weather data: {}", e))
                    .await;
                self.set_loading(false).await;
                return Err(SkycastError::Upstream(e));
            }
        };

        let Some(extract) = parse::current_weather(&payload) else {
            self.set_error("Invalid weather data received").await;
            self.set_loading(false).await;
            return Err(SkycastError::Upstream(
                "invalid weather payload".to_string(),
            ));
        };

        let has_coords = extract.latitude != 0.0 || extract.longitude != 0.0;
        self.state.write().await.apply_current(extract);
        self.emit(WeatherEvent::DataChanged);
        Ok(has_coords)
    }
}

/// Gateway over the weather REST APIs. Composed with the agent gateway
/// only by the host; the two never call each other.
pub struct WeatherGateway {
    inner: Arc<Inner>,
}

impl WeatherGateway {
    pub fn new(config: SkycastConfig, config_path: PathBuf) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let city = config.city.clone();
        Self {
            inner: Arc::new(Inner {
                http: reqwest::Client::new(),
                state: RwLock::new(WeatherState::new(city)),
                settings: RwLock::new(config),
                config_path,
                events,
                search_generation: AtomicU64::new(0),
                pending_search: std::sync::Mutex::new(String::new()),
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WeatherEvent> {
        self.inner.events.subscribe()
    }

    /// Fetch current weather for the selected city, then chain the UV
    /// and background-image lookups.
    pub async fn fetch_weather(&self) -> Result<(), SkycastError> {
        let (api_key, language) = {
            let settings = self.inner.settings.read().await;
            if !settings.api_key_set() {
                drop(settings);
                let message = "API key not set. Please set your weather API key.";
                self.inner.set_error(message).await;
                return Err(SkycastError::Config(message.to_string()));
            }
            (settings.api_key.clone(), settings.language.clone())
        };

        self.inner.set_loading(true).await;
        self.inner.set_error("").await;

        let city = self.inner.state.read().await.city.clone();
        let api_city = alias::api_city_name(&city).to_string();
        info!(city = %city, api_city = %api_city, "Fetching weather");

        let outcome = async {
            self.inner
                .http
                .get(WEATHER_URL)
                .query(&[
                    ("q", api_city.as_str()),
                    ("appid", api_key.as_str()),
                    // Kelvin from the API; conversion happens in getters.
                    ("units", "standard"),
                    ("lang", language.as_str()),
                ])
                .send()
                .await?
                .error_for_status()?
                .json::<Value>()
                .await
        }
        .await
        .map_err(|e| e.to_string());

        let has_coords = self.inner.apply_weather_outcome(outcome).await?;

        self.inner.fetch_city_background(&city).await;
        if has_coords {
            self.inner.fetch_uv().await;
        } else {
            self.inner.set_loading(false).await;
        }
        Ok(())
    }

    /// Debounced city-name autocomplete. Queries shorter than two
    /// characters clear the suggestion list and never hit the network.
    pub async fn search_cities(&self, query: &str) {
        if query.chars().count() < MIN_SEARCH_LEN {
            self.inner.state.write().await.suggestions.clear();
            self.inner.emit(WeatherEvent::SuggestionsChanged {
                suggestions: Vec::new(),
            });
            return;
        }

        if let Ok(mut pending) = self.inner.pending_search.lock() {
            *pending = query.to_string();
        }
        let generation = self.inner.search_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(SEARCH_DEBOUNCE).await;
            // A newer keystroke superseded this one.
            if inner.search_generation.load(Ordering::SeqCst) != generation {
                return;
            }
            inner.perform_city_search().await;
        });
    }

    /// Switch between Earth and the simulated Mars mode.
    pub async fn set_current_planet(&self, planet: &str) {
        {
            let state = self.inner.state.read().await;
            if state.current_planet == planet {
                return;
            }
        }

        // Loading hides the stale readings immediately.
        self.inner.set_loading(true).await;
        {
            let mut state = self.inner.state.write().await;
            state.current_planet = planet.to_string();
            state.clear_readings();
        }
        self.inner.emit(WeatherEvent::PlanetChanged {
            planet: planet.to_string(),
        });

        if planet == "Mars" {
            self.inner.state.write().await.city = "Mars".to_string();
            self.inner.emit(WeatherEvent::CityChanged {
                city: "Mars".to_string(),
            });
            self.inner.emit(WeatherEvent::DataChanged);
            self.inner.fetch_mars_weather().await;
        } else {
            self.inner.state.write().await.city = DEFAULT_CITY.to_string();
            self.inner.emit(WeatherEvent::CityChanged {
                city: DEFAULT_CITY.to_string(),
            });
            self.inner.emit(WeatherEvent::DataChanged);
            self.inner.set_loading(false).await;
        }
    }

    pub async fn set_city(&self, city: &str) {
        let changed = {
            let mut state = self.inner.state.write().await;
            if state.city != city {
                state.city = city.to_string();
                true
            } else {
                false
            }
        };
        if changed {
            self.inner.settings.write().await.city = city.to_string();
            self.inner.persist().await;
            self.inner.emit(WeatherEvent::CityChanged {
                city: city.to_string(),
            });
        }
    }

    pub async fn set_api_key(&self, api_key: &str) {
        self.inner.settings.write().await.api_key = api_key.to_string();
        self.inner.persist().await;
        self.inner.emit(WeatherEvent::ApiKeyChanged {
            set: !api_key.is_empty(),
        });
    }

    pub async fn set_image_api_key(&self, api_key: &str) {
        self.inner.settings.write().await.image_api_key = api_key.to_string();
        self.inner.persist().await;
    }

    /// The enum carries only Celsius and Fahrenheit; a legacy Kelvin
    /// setting cannot be expressed, let alone written back.
    pub async fn set_temperature_unit(&self, unit: TemperatureUnit) {
        let changed = {
            let mut settings = self.inner.settings.write().await;
            if settings.temperature_unit != unit {
                settings.temperature_unit = unit;
                true
            } else {
                false
            }
        };
        if changed {
            self.inner.persist().await;
            self.inner.emit(WeatherEvent::UnitChanged);
            self.inner.emit(WeatherEvent::DataChanged);
        }
    }

    pub async fn set_time_format(&self, format: &str) {
        let changed = {
            let mut settings = self.inner.settings.write().await;
            if settings.time_format != format {
                settings.time_format = format.to_string();
                true
            } else {
                false
            }
        };
        if changed {
            self.inner.persist().await;
            self.inner.emit(WeatherEvent::TimeFormatChanged {
                format: format.to_string(),
            });
        }
    }

    /// Changing language re-fetches for localized descriptions, Earth only.
    pub async fn set_language(&self, language: &str) {
        let changed = {
            let mut settings = self.inner.settings.write().await;
            if settings.language != language {
                settings.language = language.to_string();
                true
            } else {
                false
            }
        };
        if !changed {
            return;
        }
        self.inner.persist().await;
        self.inner.emit(WeatherEvent::LanguageChanged {
            language: language.to_string(),
        });

        let (planet, city) = {
            let state = self.inner.state.read().await;
            (state.current_planet.clone(), state.city.clone())
        };
        if planet == "Earth" && !city.is_empty() {
            let _ = self.fetch_weather().await;
        }
    }

    /// Display-unit values for the host to package into a
    /// `set_weather` command.
    pub async fn snapshot(&self) -> WeatherSnapshot {
        let unit = self.inner.settings.read().await.temperature_unit;
        let state = self.inner.state.read().await;
        WeatherSnapshot {
            temperature: unit.from_kelvin(state.temperature_k),
            feels_like: unit.from_kelvin(state.feels_like_k),
            high: unit.from_kelvin(state.high_k),
            low: unit.from_kelvin(state.low_k),
            humidity: state.humidity,
            wind_speed: state.wind_speed,
            uv_index: state.uv_index,
            description: state.description.clone(),
            unit: unit.symbol().to_string(),
        }
    }

    pub async fn city(&self) -> String {
        self.inner.state.read().await.city.clone()
    }

    pub async fn current_planet(&self) -> String {
        self.inner.state.read().await.current_planet.clone()
    }

    pub async fn loading(&self) -> bool {
        self.inner.state.read().await.loading
    }

    pub async fn error(&self) -> String {
        self.inner.state.read().await.error.clone()
    }

    pub async fn city_suggestions(&self) -> Vec<String> {
        self.inner.state.read().await.suggestions.clone()
    }

    pub async fn background_image_url(&self) -> String {
        self.inner.state.read().await.background_image_url.clone()
    }

    pub async fn temperature_unit(&self) -> TemperatureUnit {
        self.inner.settings.read().await.temperature_unit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skycast_core::WeatherEvent;

    fn scratch_gateway(name: &str, config: SkycastConfig) -> WeatherGateway {
        let path = std::env::temp_dir()
            .join(format!("skycast-weather-test-{}-{}", std::process::id(), name))
            .join("config.yaml");
        WeatherGateway::new(config, path)
    }

    #[tokio::test]
    async fn test_default_snapshot_uses_display_unit() {
        let gateway = scratch_gateway("snapshot", SkycastConfig::default());
        let snap = gateway.snapshot().await;
        // 293.15 K default, Fahrenheit display.
        assert!((snap.temperature - 68.0).abs() < 1e-9);
        assert_eq!(snap.unit, "°F");

        gateway
            .set_temperature_unit(TemperatureUnit::Celsius)
            .await;
        let snap = gateway.snapshot().await;
        assert!((snap.temperature - 20.0).abs() < 1e-9);
        assert_eq!(snap.unit, "°C");
    }

    #[tokio::test]
    async fn test_unit_change_notifies_once() {
        let gateway = scratch_gateway("unit", SkycastConfig::default());
        let mut events = gateway.subscribe();
        gateway
            .set_temperature_unit(TemperatureUnit::Celsius)
            .await;
        assert_eq!(events.recv().await.unwrap(), WeatherEvent::UnitChanged);
        assert_eq!(events.recv().await.unwrap(), WeatherEvent::DataChanged);

        // Setting the same unit again is silent.
        gateway
            .set_temperature_unit(TemperatureUnit::Celsius)
            .await;
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_http_error_response_is_reported_not_applied() {
        let gateway = scratch_gateway("httperr", SkycastConfig::default());
        let mut events = gateway.subscribe();
        gateway.inner.set_loading(true).await;

        // A 404 "city not found" reply surfaces through the status check.
        let outcome = Err("HTTP status client error (404 Not Found) for url \
             (https://api.openweathermap.org/data/2.5/weather)"
            .to_string());
        let result = gateway.inner.apply_weather_outcome(outcome).await;
        assert!(matches!(result, Err(SkycastError::Upstream(_))));

        assert!(gateway
            .error()
            .await
            .starts_with("Failed to fetch weather data"));
        assert!(!gateway.loading().await);
        // Readings keep their defaults instead of going to zero.
        let snap = gateway.snapshot().await;
        assert!((snap.temperature - 68.0).abs() < 1e-9);
        // No DataChanged was announced for the failed fetch.
        assert_eq!(
            events.recv().await.unwrap(),
            WeatherEvent::LoadingChanged { loading: true }
        );
        assert!(matches!(
            events.recv().await.unwrap(),
            WeatherEvent::ErrorChanged { .. }
        ));
        assert_eq!(
            events.recv().await.unwrap(),
            WeatherEvent::LoadingChanged { loading: false }
        );
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_weather_payload_applies_and_reports_coords() {
        let gateway = scratch_gateway("payload", SkycastConfig::default());
        let payload = serde_json::json!({
            "main": {"temp": 280.15, "temp_max": 282.0, "temp_min": 278.0,
                     "humidity": 80, "feels_like": 279.0},
            "weather": [{"main": "Rain", "description": "light rain"}],
            "wind": {"speed": 5.0},
            "coord": {"lat": 59.91, "lon": 10.75},
            "timezone": 3600
        });
        let has_coords = gateway
            .inner
            .apply_weather_outcome(Ok(payload))
            .await
            .unwrap();
        assert!(has_coords);

        gateway
            .set_temperature_unit(TemperatureUnit::Celsius)
            .await;
        let snap = gateway.snapshot().await;
        assert!((snap.temperature - 7.0).abs() < 1e-9);
        assert_eq!(snap.description, "Light rain");
        assert_eq!(snap.humidity, 80);
        assert!(gateway.error().await.is_empty());
    }

    #[tokio::test]
    async fn test_mars_feed_failure_uses_fallback_dataset() {
        let gateway = scratch_gateway("marsfail", SkycastConfig::default());
        let mut events = gateway.subscribe();
        gateway
            .inner
            .apply_mars_outcome(Err(
                "HTTP status server error (503 Service Unavailable)".to_string()
            ))
            .await;

        assert_eq!(events.recv().await.unwrap(), WeatherEvent::DataChanged);
        gateway
            .set_temperature_unit(TemperatureUnit::Celsius)
            .await;
        let snap = gateway.snapshot().await;
        assert!((snap.temperature - (-63.0)).abs() < 1e-9);
        assert!((snap.high - (-21.0)).abs() < 1e-9);
        assert!((snap.low - (-87.0)).abs() < 1e-9);
        assert_eq!(snap.wind_speed, 20.0);
        assert_eq!(snap.humidity, 0);
        assert_eq!(snap.description, "Typical Martian conditions (simulated)");
        assert_eq!(gateway.city().await, "Mars");
    }

    #[tokio::test]
    async fn test_fetch_without_api_key_is_config_error() {
        let gateway = scratch_gateway("nokey", SkycastConfig::default());
        let result = gateway.fetch_weather().await;
        assert!(matches!(result, Err(SkycastError::Config(_))));
        assert!(gateway.error().await.contains("API key not set"));
        assert!(!gateway.loading().await);
    }

    #[tokio::test]
    async fn test_short_search_clears_suggestions_without_network() {
        let gateway = scratch_gateway("search", SkycastConfig::default());
        let mut events = gateway.subscribe();
        gateway.search_cities("a").await;
        assert_eq!(
            events.recv().await.unwrap(),
            WeatherEvent::SuggestionsChanged {
                suggestions: Vec::new()
            }
        );
        assert!(gateway.city_suggestions().await.is_empty());
    }

    #[tokio::test]
    async fn test_set_city_notifies_on_change_only() {
        let gateway = scratch_gateway("city", SkycastConfig::default());
        let mut events = gateway.subscribe();
        gateway.set_city("Oslo").await;
        assert_eq!(
            events.recv().await.unwrap(),
            WeatherEvent::CityChanged {
                city: "Oslo".to_string()
            }
        );
        gateway.set_city("Oslo").await;
        assert!(events.try_recv().is_err());
        assert_eq!(gateway.city().await, "Oslo");
    }
}
