//! In-memory tool server for tests and embedding.

use super::{PromptMessage, ServerError, ToolDescriptor, ToolServer};
use serde_json::Value;
use std::collections::HashMap;

type ToolHandler = Box<dyn Fn(&Value) -> Result<Value, ServerError> + Send + Sync>;

/// A [`ToolServer`] backed by in-process registrations.
///
/// Useful for testing the orchestration loop without a server process, or
/// for embedding local tools behind the same contract as remote ones.
#[derive(Default)]
pub struct StaticToolServer {
    tools: Vec<ToolDescriptor>,
    handlers: HashMap<String, ToolHandler>,
    prompts: HashMap<String, Vec<PromptMessage>>,
}

impl StaticToolServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool with its handler.
    pub fn with_tool(
        mut self,
        descriptor: ToolDescriptor,
        handler: impl Fn(&Value) -> Result<Value, ServerError> + Send + Sync + 'static,
    ) -> Self {
        self.handlers
            .insert(descriptor.name.clone(), Box::new(handler));
        self.tools.push(descriptor);
        self
    }

    /// Register a prompt under an exact name.
    pub fn with_prompt(mut self, name: impl Into<String>, messages: Vec<PromptMessage>) -> Self {
        self.prompts.insert(name.into(), messages);
        self
    }
}

impl ToolServer for StaticToolServer {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ServerError> {
        Ok(self.tools.clone())
    }

    async fn get_prompt(
        &self,
        name: &str,
        _arguments: &Value,
    ) -> Result<Vec<PromptMessage>, ServerError> {
        self.prompts
            .get(name)
            .cloned()
            .ok_or_else(|| ServerError::NotFound(format!("prompt '{name}'")))
    }

    async fn call_tool(&self, name: &str, arguments: &Value) -> Result<Value, ServerError> {
        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| ServerError::NotFound(format!("tool '{name}'")))?;
        handler(arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn descriptor(name: &str) -> ToolDescriptor {
        ToolDescriptor {
            name: name.into(),
            description: Some(format!("{name} tool")),
            input_schema: None,
        }
    }

    #[tokio::test]
    async fn registered_tool_is_listed_and_callable() {
        let server = StaticToolServer::new()
            .with_tool(descriptor("echo"), |args| Ok(args.clone()));

        let tools = server.list_tools().await.unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "echo");

        let result = server.call_tool("echo", &json!({"x": 1})).await.unwrap();
        assert_eq!(result, json!({"x": 1}));
    }

    #[tokio::test]
    async fn unknown_tool_and_prompt_are_not_found() {
        let server = StaticToolServer::new();

        let err = server.call_tool("missing", &Value::Null).await.unwrap_err();
        assert!(matches!(err, ServerError::NotFound(_)));

        let err = server.get_prompt("tool:missing", &Value::Null).await.unwrap_err();
        assert!(matches!(err, ServerError::NotFound(_)));
    }

    #[tokio::test]
    async fn empty_prompt_is_found_not_absent() {
        let server = StaticToolServer::new().with_prompt("tool:echo", vec![]);
        let messages = server.get_prompt("tool:echo", &Value::Null).await.unwrap();
        assert!(messages.is_empty());
    }
}
