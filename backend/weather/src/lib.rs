//! Weather-data gateway for Skycast: REST fetching and normalization,
//! Kelvin-canonical storage with display-unit conversion, debounced city
//! autocomplete, city background images, and the simulated Mars mode.

pub mod alias;
pub mod gateway;
pub mod icons;
pub mod parse;

pub use gateway::WeatherGateway;
