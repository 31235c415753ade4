//! Chat session — the append-only conversation of one invocation.

use std::sync::Arc;
use suricata_core::{Invoker, InvokerError, Message, SessionId};
use tracing::debug;

/// Ordered message history plus fixed system instructions.
///
/// A session is owned by exactly one in-flight invocation and dropped when
/// it returns. Messages can be appended but never edited or removed.
pub struct ChatSession {
    id: SessionId,
    system: String,
    messages: Vec<Message>,
    invoker: Arc<dyn Invoker>,
}

impl ChatSession {
    /// Create an empty session bound to `invoker`.
    pub fn new(invoker: Arc<dyn Invoker>, system: impl Into<String>) -> Self {
        Self {
            id: SessionId::new(),
            system: system.into(),
            messages: Vec::new(),
            invoker,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// The system instructions sent with every call.
    pub fn system(&self) -> &str {
        &self.system
    }

    /// The history so far, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Append a message to the history.
    pub fn add(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Send `text` as a user turn and record the backend's reply.
    ///
    /// When the invoker fails the error is returned unchanged; the user turn
    /// stays in the history and no agent turn is added.
    pub async fn invoke(&mut self, text: impl Into<String>) -> Result<String, InvokerError> {
        self.add(Message::user(text));

        debug!(
            session_id = %self.id,
            invoker = self.invoker.name(),
            messages = self.messages.len(),
            "Calling invoker"
        );

        let reply = self.invoker.invoke(&self.system, &self.messages).await?;
        self.add(Message::agent(reply.clone()));

        Ok(reply)
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("id", &self.id)
            .field("system", &self.system)
            .field("messages", &self.messages)
            .field("invoker", &self.invoker.name())
            .finish()
    }
}
