//! Tool discovery and the function-calling catalog.

use crate::error::{Error, Result};
use crate::model::ToolSpec;
use crate::server::{ToolDescriptor, ToolServer};
use serde_json::{Value, json};
use tracing::info;

/// The function-calling view of a server's tools.
///
/// Entries are derived from discovery, never hand-edited. A refresh replaces
/// the catalog wholesale; on failure the previous entries are kept untouched
/// and no partial catalog exists.
#[derive(Debug, Default)]
pub struct ToolCatalog {
    entries: Vec<ToolSpec>,
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-run discovery against the server. One outbound call; zero tools is
    /// an empty catalog, not an error.
    pub async fn refresh<S: ToolServer>(&mut self, server: &S) -> Result<()> {
        let descriptors = server.list_tools().await.map_err(Error::Discovery)?;
        self.entries = descriptors.into_iter().map(spec_from_descriptor).collect();
        info!(tools = self.entries.len(), "tool catalog refreshed");
        Ok(())
    }

    /// Look up one entry by exact tool name.
    pub fn describe(&self, name: &str) -> Option<&ToolSpec> {
        self.entries.iter().find(|spec| spec.name == name)
    }

    /// The entries handed to the model on every completion call.
    pub fn specs(&self) -> &[ToolSpec] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Project a raw descriptor into the function-calling shape.
///
/// The model never sees a null or empty description (the name stands in) and
/// never sees a missing schema (an empty object schema stands in).
fn spec_from_descriptor(descriptor: ToolDescriptor) -> ToolSpec {
    let ToolDescriptor {
        name,
        description,
        input_schema,
    } = descriptor;

    ToolSpec {
        description: description
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| name.clone()),
        schema: input_schema.unwrap_or_else(empty_object_schema),
        name,
    }
}

fn empty_object_schema() -> Value {
    json!({"type": "object", "properties": {}})
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::{ServerError, StaticToolServer};
    use serde_json::json;

    #[test]
    fn missing_description_defaults_to_name() {
        let spec = spec_from_descriptor(ToolDescriptor {
            name: "forecast".into(),
            description: None,
            input_schema: Some(json!({"type": "object"})),
        });
        assert_eq!(spec.description, "forecast");
    }

    #[test]
    fn empty_description_defaults_to_name() {
        let spec = spec_from_descriptor(ToolDescriptor {
            name: "forecast".into(),
            description: Some(String::new()),
            input_schema: None,
        });
        assert_eq!(spec.description, "forecast");
    }

    #[test]
    fn missing_schema_defaults_to_empty_object() {
        let spec = spec_from_descriptor(ToolDescriptor {
            name: "forecast".into(),
            description: Some("Get a forecast".into()),
            input_schema: None,
        });
        assert_eq!(spec.schema, json!({"type": "object", "properties": {}}));
        assert_eq!(spec.description, "Get a forecast");
    }

    #[tokio::test]
    async fn refresh_replaces_entries_wholesale() {
        let first = StaticToolServer::new().with_tool(
            ToolDescriptor {
                name: "old".into(),
                description: None,
                input_schema: None,
            },
            |_| Ok(Value::Null),
        );
        let second = StaticToolServer::new().with_tool(
            ToolDescriptor {
                name: "new".into(),
                description: None,
                input_schema: None,
            },
            |_| Ok(Value::Null),
        );

        let mut catalog = ToolCatalog::new();
        catalog.refresh(&first).await.unwrap();
        assert!(catalog.describe("old").is_some());

        catalog.refresh(&second).await.unwrap();
        assert!(catalog.describe("old").is_none());
        assert!(catalog.describe("new").is_some());
    }

    #[tokio::test]
    async fn zero_tools_is_an_empty_catalog() {
        let server = StaticToolServer::new();
        let mut catalog = ToolCatalog::new();
        catalog.refresh(&server).await.unwrap();
        assert!(catalog.is_empty());
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_entries() {
        struct FailingServer;

        impl ToolServer for FailingServer {
            async fn list_tools(&self) -> std::result::Result<Vec<ToolDescriptor>, ServerError> {
                Err(ServerError::Transport("connection reset".into()))
            }

            async fn get_prompt(
                &self,
                _name: &str,
                _arguments: &Value,
            ) -> std::result::Result<Vec<crate::server::PromptMessage>, ServerError> {
                Err(ServerError::Transport("connection reset".into()))
            }

            async fn call_tool(
                &self,
                _name: &str,
                _arguments: &Value,
            ) -> std::result::Result<Value, ServerError> {
                Err(ServerError::Transport("connection reset".into()))
            }
        }

        let working = StaticToolServer::new().with_tool(
            ToolDescriptor {
                name: "forecast".into(),
                description: None,
                input_schema: None,
            },
            |_| Ok(Value::Null),
        );

        let mut catalog = ToolCatalog::new();
        catalog.refresh(&working).await.unwrap();

        let err = catalog.refresh(&FailingServer).await.unwrap_err();
        assert!(matches!(err, Error::Discovery(_)));
        assert!(catalog.describe("forecast").is_some());
    }
}
