//! Conversational-agent gateway for Skycast.
//!
//! Spawns the external AI helper as a subprocess and speaks a
//! line-oriented JSON protocol with it: commands out on stdin, one JSON
//! object per newline-terminated line back on stdout. Exposes the
//! readiness/processing state machine and the chat transcript to the
//! UI host through broadcast notifications.

pub mod framing;
pub mod gateway;
pub mod protocol;

pub use framing::LineFramer;
pub use gateway::{AgentGateway, GatewayState, ServiceSpec, START_WAIT};
pub use protocol::{Command, Reply, Response};
