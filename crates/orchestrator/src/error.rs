use crate::model::ModelError;
use crate::server::ServerError;
use thiserror::Error;

/// Orchestrator errors.
///
/// Prompt resolution never surfaces here: absence and lookup failure are
/// recovered inside the dispatcher (and logged), because tool availability
/// must not depend on prompt infrastructure.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Tool discovery failed. Fatal to connect; no partial catalog is used.
    #[error("tool discovery failed: {0}")]
    Discovery(#[source] ServerError),

    /// A remote tool invocation failed; the rest of its batch was abandoned.
    /// Turns appended before the failure stay in the conversation.
    #[error("tool '{name}' failed: {source}")]
    ToolExecution {
        name: String,
        #[source]
        source: ServerError,
    },

    /// A completion call to the model failed. No automatic retry.
    #[error(transparent)]
    Completion(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, Error>;
