//! Settings validation with user-friendly error messages.

use crate::schema::SkycastConfig;
use thiserror::Error;

/// A settings validation finding with field path and message.
#[derive(Debug, Error)]
#[error("Settings validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation findings from one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate settings and return a report of all errors and warnings.
pub fn validate(config: &SkycastConfig) -> ValidationReport {
    let mut report = ValidationReport::default();

    if !config.api_key_set() {
        report.warn("apiKey", "No weather API key configured; fetches will fail");
    }
    if config.time_format != "12" && config.time_format != "24" {
        report.error(
            "timeFormat",
            format!("Must be \"12\" or \"24\", got \"{}\"", config.time_format),
        );
    }
    if config.language.trim().is_empty() {
        report.warn("language", "Empty language code; API default will be used");
    }
    if config.city.trim().is_empty() {
        report.warn("city", "No city configured");
    }

    report
}
