//! The append-only conversation log.

use crate::model::Message;

/// Ordered log of turns; the context sent to the model verbatim.
///
/// Turns are immutable once appended. The core never reorders or prunes;
/// retention and windowing belong to the caller. Mutation goes through
/// `&mut self`, so one writer at a time is enforced by the borrow checker.
#[derive(Debug, Default)]
pub struct Conversation {
    turns: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one turn. Infallible; insertion order is meaningful.
    ///
    /// Debug builds assert that a tool-result turn correlates to an earlier
    /// tool call — an orphaned result is a programming error.
    pub fn append(&mut self, turn: Message) {
        #[cfg(debug_assertions)]
        self.assert_correlated(&turn);
        self.turns.push(turn);
    }

    /// Immutable view of every turn, in insertion order.
    pub fn snapshot(&self) -> &[Message] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    #[cfg(debug_assertions)]
    fn assert_correlated(&self, turn: &Message) {
        use crate::model::Part;

        for part in &turn.parts {
            if let Part::ToolResult(result) = part {
                let requested = self
                    .turns
                    .iter()
                    .flat_map(|t| &t.parts)
                    .any(|p| matches!(p, Part::ToolCall(call) if call.id == result.tool_call_id));
                debug_assert!(
                    requested,
                    "tool result '{}' has no matching tool call",
                    result.tool_call_id
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Message, Part, Role, ToolCall, ToolResult};
    use serde_json::{Value, json};

    #[test]
    fn append_preserves_insertion_order() {
        let mut conversation = Conversation::new();
        conversation.append(Message::user("first"));
        conversation.append(Message::assistant("second"));
        conversation.append(Message::user("third"));

        let turns = conversation.snapshot();
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].text(), "first");
        assert_eq!(turns[1].text(), "second");
        assert_eq!(turns[2].text(), "third");
    }

    #[test]
    fn correlated_tool_result_is_accepted() {
        let mut conversation = Conversation::new();
        conversation.append(Message::from_parts(
            Role::Assistant,
            vec![Part::ToolCall(ToolCall {
                id: "call-1".into(),
                name: "forecast".into(),
                input: Value::Null,
            })],
        ));
        conversation.append(Message::tool_result(ToolResult {
            tool_call_id: "call-1".into(),
            content: json!([{"type": "text", "text": "sunny"}]),
        }));
        assert_eq!(conversation.len(), 2);
    }

    #[test]
    #[should_panic(expected = "no matching tool call")]
    fn orphaned_tool_result_panics_in_debug() {
        let mut conversation = Conversation::new();
        conversation.append(Message::tool_result(ToolResult {
            tool_call_id: "never-requested".into(),
            content: Value::Null,
        }));
    }
}
