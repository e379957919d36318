//! MCP-backed tool server using the official rmcp SDK.

use super::{PromptMessage, PromptRole, ServerError, ToolDescriptor, ToolServer};
use rmcp::{
    ServiceExt,
    model::{CallToolRequestParams, ErrorCode, GetPromptRequestParams, PromptMessageContent},
    service::{RoleClient, RunningService},
    transport::{ConfigureCommandExt, TokioChildProcess},
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tokio::process::Command;
use tracing::{debug, info};

/// Configuration for spawning an MCP server process.
#[derive(Debug, Clone, Deserialize)]
pub struct McpServerConfig {
    /// The command to run (e.g. "mcp-weather").
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Extra environment variables for the server process.
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl McpServerConfig {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            env: HashMap::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// A [`ToolServer`] connected to an MCP server over stdio.
pub struct McpServer {
    service: RunningService<RoleClient, ()>,
}

impl McpServer {
    /// Spawn the server process and complete the MCP handshake.
    pub async fn spawn(config: McpServerConfig) -> Result<Self, ServerError> {
        let transport = TokioChildProcess::new(Command::new(&config.command).configure(|cmd| {
            for arg in &config.args {
                cmd.arg(arg);
            }
            for (key, value) in &config.env {
                cmd.env(key, value);
            }
        }))
        .map_err(|e| ServerError::ConnectionFailed(e.to_string()))?;

        let service = ()
            .serve(transport)
            .await
            .map_err(|e| ServerError::ConnectionFailed(e.to_string()))?;

        info!(command = %config.command, "MCP server connected");
        Ok(Self { service })
    }

    /// Shut down the connection and terminate the server process.
    pub async fn shutdown(self) -> Result<(), ServerError> {
        self.service
            .cancel()
            .await
            .map_err(|e| ServerError::Transport(e.to_string()))?;
        Ok(())
    }
}

impl ToolServer for McpServer {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ServerError> {
        let response = self
            .service
            .list_tools(Default::default())
            .await
            .map_err(map_service_error)?;

        debug!(count = response.tools.len(), "listed tools");
        Ok(response.tools.into_iter().map(descriptor_from_wire).collect())
    }

    async fn get_prompt(
        &self,
        name: &str,
        arguments: &Value,
    ) -> Result<Vec<PromptMessage>, ServerError> {
        let params = GetPromptRequestParams {
            meta: None,
            name: name.to_owned().into(),
            arguments: arguments.as_object().cloned(),
        };

        let result = self
            .service
            .get_prompt(params)
            .await
            .map_err(map_service_error)?;

        Ok(result.messages.into_iter().map(prompt_message_from_wire).collect())
    }

    async fn call_tool(&self, name: &str, arguments: &Value) -> Result<Value, ServerError> {
        debug!(tool = name, "calling tool");

        let params = CallToolRequestParams {
            meta: None,
            name: name.to_owned().into(),
            arguments: arguments.as_object().cloned(),
            task: None,
        };

        let result = self
            .service
            .call_tool(params)
            .await
            .map_err(map_service_error)?;

        serde_json::to_value(&result.content)
            .map_err(|e| ServerError::Protocol(format!("serialize result: {e}")))
    }
}

fn descriptor_from_wire(tool: rmcp::model::Tool) -> ToolDescriptor {
    ToolDescriptor {
        name: tool.name.to_string(),
        description: tool.description.map(|d| d.to_string()),
        input_schema: Some(Value::Object((*tool.input_schema).clone())),
    }
}

fn prompt_message_from_wire(message: rmcp::model::PromptMessage) -> PromptMessage {
    let role = match message.role {
        rmcp::model::PromptMessageRole::User => PromptRole::User,
        rmcp::model::PromptMessageRole::Assistant => PromptRole::Assistant,
    };
    let text = match message.content {
        PromptMessageContent::Text { text } => text,
        // Non-text prompt content is rare; carry it as its JSON form.
        other => serde_json::to_string(&other).unwrap_or_default(),
    };
    PromptMessage { role, text }
}

/// The protocol reports an unknown tool or prompt as `INVALID_PARAMS`; that
/// is the machine-readable absence signal. Everything else stays an error.
fn map_service_error(error: rmcp::ServiceError) -> ServerError {
    match error {
        rmcp::ServiceError::McpError(data) if data.code == ErrorCode::INVALID_PARAMS => {
            ServerError::NotFound(data.message.to_string())
        }
        rmcp::ServiceError::McpError(data) => ServerError::Protocol(data.message.to_string()),
        other => ServerError::Transport(other.to_string()),
    }
}
