//! Persisted settings for Skycast: API credentials, last city,
//! temperature unit, clock format, and language code.

pub mod io;
pub mod schema;
pub mod validation;

pub use io::{config_dir, config_file_path, load_config, save_config};
pub use schema::{SkycastConfig, TemperatureUnit};
pub use validation::{validate, ValidationReport};
