//! Prompt lookup bound to tools by naming convention.

use crate::model::ToolCall;
use crate::server::{PromptMessage, ServerError, ToolServer};
use serde_json::Value;
use tracing::{debug, warn};

/// Maps a tool name to the key its bound prompt is registered under.
///
/// The convention lives behind this trait so it can be swapped for an
/// explicit table without touching the dispatcher.
pub trait PromptBinding: Send + Sync {
    fn prompt_key(&self, tool_name: &str) -> String;
}

/// The `tool:` prefix convention: the prompt for tool `T` is `tool:T`.
///
/// Exact name, case-sensitive, no normalization. Servers that register their
/// prompts under other names simply never get them auto-injected.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixBinding;

impl PromptBinding for PrefixBinding {
    fn prompt_key(&self, tool_name: &str) -> String {
        format!("tool:{tool_name}")
    }
}

/// A prompt lookup keyed off one tool call.
#[derive(Debug, Clone)]
pub struct PromptRequest {
    pub tool_name: String,
    /// The arguments the model supplied for the tool call, reused verbatim.
    pub arguments: Value,
}

impl PromptRequest {
    pub fn from_call(call: &ToolCall) -> Self {
        Self {
            tool_name: call.name.clone(),
            arguments: call.input.clone(),
        }
    }
}

/// Outcome of a prompt lookup.
#[derive(Debug)]
pub enum PromptLookup {
    /// The prompt exists; its messages (possibly none) are injected in order.
    Found(Vec<PromptMessage>),
    /// No prompt is registered under the bound key. Not an error.
    Absent,
    /// The lookup itself failed. The dispatcher treats this like
    /// [`PromptLookup::Absent`] — tool availability never depends on prompt
    /// infrastructure — but the case stays distinguishable for callers.
    Failed(ServerError),
}

/// Resolves the prompt bound to a tool, tolerating absence.
pub struct PromptResolver {
    binding: Box<dyn PromptBinding>,
}

impl std::fmt::Debug for PromptResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptResolver").finish_non_exhaustive()
    }
}

impl PromptResolver {
    /// Resolver using the [`PrefixBinding`] convention.
    pub fn new() -> Self {
        Self::with_binding(PrefixBinding)
    }

    pub fn with_binding(binding: impl PromptBinding + 'static) -> Self {
        Self {
            binding: Box::new(binding),
        }
    }

    /// Look up the prompt for one tool call. Never touches the conversation;
    /// the dispatcher appends whatever this returns.
    pub async fn resolve<S: ToolServer>(
        &self,
        server: &S,
        request: &PromptRequest,
    ) -> PromptLookup {
        let key = self.binding.prompt_key(&request.tool_name);
        match server.get_prompt(&key, &request.arguments).await {
            Ok(messages) => {
                debug!(key = %key, count = messages.len(), "prompt resolved");
                PromptLookup::Found(messages)
            }
            Err(ServerError::NotFound(_)) => {
                debug!(key = %key, "no prompt bound");
                PromptLookup::Absent
            }
            Err(error) => {
                warn!(key = %key, %error, "prompt lookup failed; continuing without injection");
                PromptLookup::Failed(error)
            }
        }
    }
}

impl Default for PromptResolver {
    fn default() -> Self {
        Self::new()
    }
}
