//! Tiller orchestration core — binds server-registered prompts to tools
//! around an LLM completion loop.
//!
//! The protocol this client speaks (MCP) keeps two independent registries:
//! callable tools and named prompt templates. This crate discovers the tools,
//! offers them to the model as callable functions, and — before executing any
//! tool the model requests — fetches the prompt registered under
//! `tool:<tool name>` and injects its messages into the conversation. Tool
//! results are folded back in and the conversation is resubmitted until the
//! model answers in plain text.
//!
//! # Overview
//!
//! - **Session**: owns the conversation and drives the per-query loop.
//! - **ToolCatalog**: the discovered tools, normalized for function calling.
//! - **PromptResolver**: looks up a tool's bound prompt, tolerating absence.
//! - **Dispatcher**: executes one response's tool calls, in order, with
//!   prompt injection before each result.
//! - **Backend**: trait over LLM providers ([`AnthropicBackend`] included).
//! - **ToolServer**: trait over tool/prompt servers ([`McpServer`] speaks MCP
//!   to a child process; [`StaticToolServer`] serves in-process
//!   registrations).
//!
//! # Example
//!
//! ```ignore
//! use orchestrator::{AnthropicBackend, McpServer, McpServerConfig, Session};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = AnthropicBackend::builder("sk-ant-api01-...", "claude-sonnet-4-20250514")
//!     .system("You are a weather assistant.")
//!     .build();
//! let server = McpServer::spawn(McpServerConfig::new("mcp-weather")).await?;
//!
//! let mut session = Session::connect(backend, server).await?;
//! let answer = session.process_query("What's the weather in Tokyo?").await?;
//! println!("{answer}");
//!
//! let server = session.disconnect();
//! let _ = server.shutdown().await;
//! # Ok(())
//! # }
//! ```

mod catalog;
mod conversation;
mod dispatch;
mod error;
pub mod model;
mod prompt;
mod providers;
pub mod server;
mod session;

// Core model types
pub use model::{
    Backend, Message, ModelError, ModelRequest, ModelResponse, Part, Role, ToolCall, ToolChoice,
    ToolResult, ToolSpec, Usage,
};

// Provider backends
pub use providers::{AnthropicBackend, AnthropicBackendBuilder};

// Tool/prompt server contract and implementations
pub use server::{
    McpServer, McpServerConfig, PromptMessage, PromptRole, ServerError, StaticToolServer,
    ToolDescriptor, ToolServer,
};

// Orchestration components
pub use catalog::ToolCatalog;
pub use conversation::Conversation;
pub use dispatch::Dispatcher;
pub use prompt::{PrefixBinding, PromptBinding, PromptLookup, PromptRequest, PromptResolver};
pub use session::Session;

// Error types
pub use error::{Error, Result};
