//! Session management: the per-query orchestration loop.

use crate::catalog::ToolCatalog;
use crate::conversation::Conversation;
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::model::{Backend, Message, ModelRequest, ToolChoice};
use crate::prompt::PromptResolver;
use crate::server::ToolServer;
use tracing::{debug, info};
use uuid::Uuid;

/// A conversation session bound to one model backend and one tool server.
///
/// `process_query` runs to completion across all completion calls and tool
/// dispatches before another query may start; the `&mut self` receiver is the
/// single-writer guarantee over the shared conversation log.
#[derive(Debug)]
pub struct Session<B: Backend, S: ToolServer> {
    pub id: Uuid,
    backend: B,
    server: S,
    catalog: ToolCatalog,
    resolver: PromptResolver,
    conversation: Conversation,
}

impl<B: Backend, S: ToolServer> Session<B, S> {
    /// Connect: run tool discovery and build the catalog.
    ///
    /// A discovery failure is fatal here; a session never starts with a
    /// partial catalog.
    pub async fn connect(backend: B, server: S) -> Result<Self> {
        let mut catalog = ToolCatalog::new();
        catalog.refresh(&server).await?;

        let id = Uuid::new_v4();
        info!(session = %id, tools = catalog.len(), "session connected");

        Ok(Self {
            id,
            backend,
            server,
            catalog,
            resolver: PromptResolver::new(),
            conversation: Conversation::new(),
        })
    }

    /// Replace the prompt resolver (e.g. to swap the binding convention).
    pub fn with_resolver(mut self, resolver: PromptResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Tools currently offered to the model.
    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    /// The conversation so far.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Re-run tool discovery against the server.
    pub async fn refresh_tools(&mut self) -> Result<()> {
        self.catalog.refresh(&self.server).await
    }

    /// Run one query to completion and return the final assistant text.
    ///
    /// Appends the user turn, then alternates completion calls and tool
    /// dispatch until a response carries no tool calls. Tool calls within one
    /// response are dispatched in the order the model listed them.
    pub async fn process_query(&mut self, text: &str) -> Result<String> {
        self.conversation.append(Message::user(text));

        loop {
            let response = self
                .backend
                .complete(ModelRequest {
                    messages: self.conversation.snapshot(),
                    tools: self.catalog.specs(),
                    tool_choice: ToolChoice::Auto,
                })
                .await?;

            let message = response.message;
            let answer = message.text();
            let calls = message.tool_calls();
            self.conversation.append(message);

            if calls.is_empty() {
                return Ok(answer);
            }

            debug!(session = %self.id, calls = calls.len(), "model requested tools");
            Dispatcher::new(&self.server, &self.resolver)
                .run(&mut self.conversation, &calls)
                .await?;
        }
    }

    /// End the session, handing the server back so its transport can be shut
    /// down by the caller.
    pub fn disconnect(self) -> S {
        info!(session = %self.id, "session disconnected");
        self.server
    }
}
