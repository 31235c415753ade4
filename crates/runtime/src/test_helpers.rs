//! Shared test helpers for runtime tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use suricata_core::{Invoker, InvokerError, Message};

/// One recorded call to a [`ScriptedInvoker`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system: String,
    pub messages: Vec<Message>,
}

/// An invoker that replays scripted replies in order.
///
/// Every call is recorded. Calls beyond the script fail with
/// `InvokerError::Other("unexpected call")`.
pub struct ScriptedInvoker {
    replies: Mutex<VecDeque<Result<String, InvokerError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedInvoker {
    pub fn new<S: Into<String>>(replies: impl IntoIterator<Item = S>) -> Self {
        Self::with_results(replies.into_iter().map(|r| Ok(r.into())))
    }

    pub fn with_results(results: impl IntoIterator<Item = Result<String, InvokerError>>) -> Self {
        Self {
            replies: Mutex::new(results.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Invoker for ScriptedInvoker {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn invoke(&self, system_prompt: &str, messages: &[Message]) -> Result<String, InvokerError> {
        self.calls.lock().unwrap().push(RecordedCall {
            system: system_prompt.to_string(),
            messages: messages.to_vec(),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(InvokerError::Other("unexpected call".into())))
    }
}
