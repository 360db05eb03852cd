//! Wire protocol spoken with the helper process.
//!
//! Outbound commands are compact single-line JSON objects tagged by a
//! `command` field; inbound responses are classified by an ordered
//! decision table: status "ready", status "error", then the command echo.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One-shot outbound message to the helper.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    SetWeather {
        location: String,
        weather_data: Value,
    },
    Query {
        prompt: String,
    },
}

impl Command {
    /// Serialize as one compact JSON line, newline-terminated.
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

/// Inbound message fields; all optional because the helper mixes
/// status-only and command-echo shapes on the same stream.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
}

/// The classified meaning of one inbound response.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Helper finished initializing and accepts commands.
    Ready,
    /// Helper-side failure for the outstanding command.
    Error { message: String },
    /// `set_weather` confirmation carrying the accepted location.
    WeatherSet { location: String },
    /// `query` answer text.
    Answer { text: String },
    /// Anything that matches no table row.
    Ignored,
}

impl Response {
    /// Decode from an already-parsed JSON object.
    pub fn from_object(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    /// Evaluate the dispatch table in order.
    pub fn classify(self) -> Reply {
        if self.status.as_deref() == Some("ready") {
            return Reply::Ready;
        }
        if self.status.as_deref() == Some("error") {
            return Reply::Error {
                message: self.message.unwrap_or_default(),
            };
        }
        match self.command.as_deref() {
            Some("set_weather") => Reply::WeatherSet {
                location: self.location.unwrap_or_default(),
            },
            Some("query") => Reply::Answer {
                text: self.response.unwrap_or_default(),
            },
            _ => Reply::Ignored,
        }
    }
}
