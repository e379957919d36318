//! Sequential tool-call dispatch with prompt injection.

use crate::conversation::Conversation;
use crate::error::{Error, Result};
use crate::model::{Message, ToolCall, ToolResult};
use crate::prompt::{PromptLookup, PromptRequest, PromptResolver};
use crate::server::ToolServer;
use tracing::debug;

/// Executes the tool calls from one model response, in the order the model
/// listed them.
///
/// Calls run strictly sequentially, never concurrently: each call's prompt
/// injection and result append are part of the conversation's meaning, and a
/// later call's resolution must see all prior appends.
pub struct Dispatcher<'a, S: ToolServer> {
    server: &'a S,
    resolver: &'a PromptResolver,
}

impl<'a, S: ToolServer> Dispatcher<'a, S> {
    pub fn new(server: &'a S, resolver: &'a PromptResolver) -> Self {
        Self { server, resolver }
    }

    /// Process one batch against the conversation.
    ///
    /// On a tool execution failure the remaining calls are abandoned — a
    /// partially executed batch is ambiguous for the model's next turn — and
    /// the turns appended so far stay in place. Callers wanting best-effort
    /// continuation must wrap individual calls themselves.
    pub async fn run(&self, conversation: &mut Conversation, calls: &[ToolCall]) -> Result<()> {
        for call in calls {
            self.dispatch_one(conversation, call).await?;
        }
        Ok(())
    }

    async fn dispatch_one(&self, conversation: &mut Conversation, call: &ToolCall) -> Result<()> {
        let request = PromptRequest::from_call(call);
        let injected = match self.resolver.resolve(self.server, &request).await {
            PromptLookup::Found(messages) => messages,
            // Absence, or a lookup failure the resolver already logged.
            // Neither blocks the tool.
            PromptLookup::Absent | PromptLookup::Failed(_) => Vec::new(),
        };

        debug!(tool = %call.name, id = %call.id, "executing tool");
        let content = self
            .server
            .call_tool(&call.name, &call.input)
            .await
            .map_err(|source| Error::ToolExecution {
                name: call.name.clone(),
                source,
            })?;

        // Appends land only for a call that executed: an aborted call must
        // leave no trace, and its prompt still precedes its result turn.
        for message in injected {
            conversation.append(Message::new(message.role.into(), message.text));
        }
        conversation.append(Message::tool_result(ToolResult {
            tool_call_id: call.id.clone(),
            content,
        }));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Part, Role};
    use crate::server::{PromptMessage, ServerError, StaticToolServer, ToolDescriptor};
    use serde_json::{Value, json};

    fn descriptor(name: &str) -> ToolDescriptor {
        ToolDescriptor {
            name: name.into(),
            description: None,
            input_schema: None,
        }
    }

    fn call(id: &str, name: &str) -> ToolCall {
        ToolCall {
            id: id.into(),
            name: name.into(),
            input: json!({"city": "tokyo"}),
        }
    }

    /// Seed the conversation with the assistant turn that requested `calls`,
    /// as the orchestration loop does before dispatching.
    fn seed(conversation: &mut Conversation, calls: &[ToolCall]) {
        conversation.append(Message::from_parts(
            Role::Assistant,
            calls.iter().cloned().map(Part::ToolCall).collect(),
        ));
    }

    fn roles(conversation: &Conversation) -> Vec<Role> {
        conversation.snapshot().iter().map(|m| m.role).collect()
    }

    #[tokio::test]
    async fn prompt_messages_land_before_the_tool_result() {
        let server = StaticToolServer::new()
            .with_tool(descriptor("forecast"), |_| Ok(json!("sunny")))
            .with_prompt(
                "tool:forecast",
                vec![
                    PromptMessage::user("Prefer metric units."),
                    PromptMessage::assistant("Understood."),
                ],
            );
        let resolver = PromptResolver::new();
        let mut conversation = Conversation::new();
        let calls = [call("c1", "forecast")];
        seed(&mut conversation, &calls);

        Dispatcher::new(&server, &resolver)
            .run(&mut conversation, &calls)
            .await
            .unwrap();

        // assistant(tool-call), prompt user, prompt assistant, tool result
        assert_eq!(
            roles(&conversation),
            vec![Role::Assistant, Role::User, Role::Assistant, Role::Tool]
        );
        assert_eq!(conversation.snapshot()[1].text(), "Prefer metric units.");
        assert_eq!(conversation.snapshot()[2].text(), "Understood.");
    }

    #[tokio::test]
    async fn absent_prompt_never_blocks_execution() {
        let server =
            StaticToolServer::new().with_tool(descriptor("forecast"), |_| Ok(json!("sunny")));
        let resolver = PromptResolver::new();
        let mut conversation = Conversation::new();
        let calls = [call("c1", "forecast")];
        seed(&mut conversation, &calls);

        Dispatcher::new(&server, &resolver)
            .run(&mut conversation, &calls)
            .await
            .unwrap();

        assert_eq!(roles(&conversation), vec![Role::Assistant, Role::Tool]);
    }

    #[tokio::test]
    async fn failed_prompt_lookup_never_blocks_execution() {
        struct BrokenPrompts(StaticToolServer);

        impl ToolServer for BrokenPrompts {
            async fn list_tools(&self) -> std::result::Result<Vec<ToolDescriptor>, ServerError> {
                self.0.list_tools().await
            }

            async fn get_prompt(
                &self,
                _name: &str,
                _arguments: &Value,
            ) -> std::result::Result<Vec<PromptMessage>, ServerError> {
                Err(ServerError::Transport("socket closed".into()))
            }

            async fn call_tool(
                &self,
                name: &str,
                arguments: &Value,
            ) -> std::result::Result<Value, ServerError> {
                self.0.call_tool(name, arguments).await
            }
        }

        let server = BrokenPrompts(
            StaticToolServer::new().with_tool(descriptor("forecast"), |_| Ok(json!("sunny"))),
        );
        let resolver = PromptResolver::new();
        let mut conversation = Conversation::new();
        let calls = [call("c1", "forecast")];
        seed(&mut conversation, &calls);

        Dispatcher::new(&server, &resolver)
            .run(&mut conversation, &calls)
            .await
            .unwrap();

        assert_eq!(roles(&conversation), vec![Role::Assistant, Role::Tool]);
    }

    #[tokio::test]
    async fn batch_turns_are_grouped_per_call_in_order() {
        let server = StaticToolServer::new()
            .with_tool(descriptor("forecast"), |_| Ok(json!("sunny")))
            .with_tool(descriptor("alerts"), |_| Ok(json!("none")))
            .with_prompt("tool:forecast", vec![PromptMessage::user("metric")])
            .with_prompt("tool:alerts", vec![PromptMessage::user("severe only")]);
        let resolver = PromptResolver::new();
        let mut conversation = Conversation::new();
        let calls = [call("r1", "forecast"), call("r2", "alerts")];
        seed(&mut conversation, &calls);

        Dispatcher::new(&server, &resolver)
            .run(&mut conversation, &calls)
            .await
            .unwrap();

        // prompt-R1, result-R1, prompt-R2, result-R2 — never interleaved.
        let turns = conversation.snapshot();
        assert_eq!(turns.len(), 5);
        assert_eq!(turns[1].text(), "metric");
        assert!(matches!(&turns[2].parts[0], Part::ToolResult(r) if r.tool_call_id == "r1"));
        assert_eq!(turns[3].text(), "severe only");
        assert!(matches!(&turns[4].parts[0], Part::ToolResult(r) if r.tool_call_id == "r2"));
    }

    #[tokio::test]
    async fn execution_failure_aborts_the_rest_of_the_batch() {
        let server = StaticToolServer::new()
            .with_tool(descriptor("forecast"), |_| Ok(json!("sunny")))
            .with_tool(descriptor("alerts"), |_| {
                Err(ServerError::Execution("upstream down".into()))
            })
            .with_prompt("tool:forecast", vec![PromptMessage::user("metric")])
            .with_prompt("tool:alerts", vec![PromptMessage::user("severe only")]);
        let resolver = PromptResolver::new();
        let mut conversation = Conversation::new();
        let calls = [call("r1", "forecast"), call("r2", "alerts")];
        seed(&mut conversation, &calls);

        let err = Dispatcher::new(&server, &resolver)
            .run(&mut conversation, &calls)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ToolExecution { ref name, .. } if name == "alerts"));

        // R1's prompt and result survive; nothing from R2 appears.
        let turns = conversation.snapshot();
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[1].text(), "metric");
        assert!(matches!(&turns[2].parts[0], Part::ToolResult(r) if r.tool_call_id == "r1"));
        assert!(!turns.iter().any(|t| t.text() == "severe only"));
    }
}
