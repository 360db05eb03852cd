use thiserror::Error;

/// Top-level error type for the Skycast gateways.
#[derive(Debug, Error)]
pub enum SkycastError {
    #[error("agent service not ready")]
    NotReady,

    #[error("failed to launch agent service: {0}")]
    LaunchFailure(String),

    #[error("agent service exited abnormally: {0}")]
    AbnormalExit(String),

    #[error("agent pipe I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("upstream request failed: {0}")]
    Upstream(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
