//! Runtime events — observable progress of an invocation.
//!
//! Events are published as the agent loop advances. Subscribers (metrics,
//! audit logs, UIs) can follow a session without being wired into the loop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// All runtime events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RuntimeEvent {
    /// The backend answered a turn
    ReplyReceived {
        session_id: String,
        turn: u32,
        reply_chars: usize,
        timestamp: DateTime<Utc>,
    },

    /// A tool was executed
    ToolInvoked {
        session_id: String,
        tool_name: String,
        success: bool,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// The invocation reached a terminal state
    InvocationFinished {
        session_id: String,
        tool_calls: u32,
        success: bool,
        error_message: Option<String>,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for runtime events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<RuntimeEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: RuntimeEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<RuntimeEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
