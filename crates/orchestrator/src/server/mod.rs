//! The remote tool/prompt server contract.
//!
//! A [`ToolServer`] exposes two independent registries: callable tools and
//! named prompts. The orchestration core only ever consumes this trait; the
//! MCP transport lives behind [`McpServer`] and tests use [`StaticToolServer`].

mod mcp;
mod static_server;

pub use mcp::{McpServer, McpServerConfig};
pub use static_server::StaticToolServer;

use crate::model::Role;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use thiserror::Error;

/// Errors from server operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ServerError {
    /// The named tool or prompt is not registered on the server.
    #[error("not found: {0}")]
    NotFound(String),

    /// Spawning the server or completing the handshake failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The transport dropped or timed out mid-request.
    #[error("transport: {0}")]
    Transport(String),

    /// The server sent a response the client could not make sense of.
    #[error("protocol: {0}")]
    Protocol(String),

    /// The server reported a tool execution failure.
    #[error("execution failed: {0}")]
    Execution(String),
}

/// A tool as discovered from the server, before catalog normalization.
///
/// Immutable once fetched; refreshed only by re-running discovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: Option<Value>,
}

/// Role of a prompt message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    User,
    Assistant,
}

impl From<PromptRole> for Role {
    fn from(role: PromptRole) -> Self {
        match role {
            PromptRole::User => Role::User,
            PromptRole::Assistant => Role::Assistant,
        }
    }
}

/// One message of a fetched prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: PromptRole,
    pub text: String,
}

impl PromptMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: PromptRole::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: PromptRole::Assistant,
            text: text.into(),
        }
    }
}

/// The client-side contract a tool/prompt server must satisfy.
///
/// `get_prompt` distinguishes a missing registration
/// ([`ServerError::NotFound`]) from every other failure; the prompt resolver
/// relies on that split. An `Ok` with zero messages is a valid prompt.
pub trait ToolServer: Send + Sync {
    /// List the tools the server exposes. Zero tools is not an error.
    fn list_tools(
        &self,
    ) -> impl Future<Output = Result<Vec<ToolDescriptor>, ServerError>> + Send;

    /// Fetch a prompt by registered name, rendering it with `arguments`.
    fn get_prompt(
        &self,
        name: &str,
        arguments: &Value,
    ) -> impl Future<Output = Result<Vec<PromptMessage>, ServerError>> + Send;

    /// Invoke a tool, returning its serialized content blocks.
    fn call_tool(
        &self,
        name: &str,
        arguments: &Value,
    ) -> impl Future<Output = Result<Value, ServerError>> + Send;
}
