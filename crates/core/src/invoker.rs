//! Invoker trait — the abstraction over text-completion backends.
//!
//! An Invoker turns a system prompt plus an ordered message history into
//! completion text. It holds no conversational state of its own: everything
//! the backend needs to see is passed in on every call.
//!
//! Implementations (HTTP adapters for specific model providers) live outside
//! this workspace.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::InvokerError;
use crate::message::Message;

/// The core Invoker trait.
///
/// The runtime calls `invoke()` once per turn without knowing which backend
/// answers.
#[async_trait]
pub trait Invoker: Send + Sync {
    /// A human-readable name for this backend (used in logs).
    fn name(&self) -> &str {
        "invoker"
    }

    /// Send the system prompt and the full history, get the completion text.
    async fn invoke(
        &self,
        system_prompt: &str,
        messages: &[Message],
    ) -> std::result::Result<String, InvokerError>;
}

#[async_trait]
impl<T: Invoker + ?Sized> Invoker for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn invoke(
        &self,
        system_prompt: &str,
        messages: &[Message],
    ) -> std::result::Result<String, InvokerError> {
        (**self).invoke(system_prompt, messages).await
    }
}
