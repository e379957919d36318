//! CLI error types.

use thiserror::Error;

/// CLI errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Configuration is invalid or missing required fields.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// An error occurred in the orchestration layer.
    #[error(transparent)]
    Orchestrator(#[from] orchestrator::Error),

    /// Spawning or shutting down the MCP server failed.
    #[error(transparent)]
    Server(#[from] orchestrator::ServerError),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
