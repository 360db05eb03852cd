//! Core types shared by the Skycast gateways: the error taxonomy, the
//! notification event enums, chat transcript types, and the weather
//! snapshot passed from the weather gateway's host into the agent gateway.

pub mod chat;
pub mod error;
pub mod event;
pub mod snapshot;

pub use chat::{ChatEntry, ChatRole};
pub use error::SkycastError;
pub use event::{AgentEvent, WeatherEvent};
pub use snapshot::WeatherSnapshot;
