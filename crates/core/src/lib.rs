//! # Suricata Core
//!
//! Domain types, traits, and error definitions for the Suricata agent runtime.
//! This crate has **no framework dependencies**: it defines the contracts
//! the runtime drives and that callers implement.
//!
//! ## Design Philosophy
//!
//! Every collaborator of the runtime (text backend, tool decoder, tool
//! invoker) is a trait here. Implementations are injected per runtime or per
//! request, never looked up globally.

pub mod error;
pub mod event;
pub mod invoker;
pub mod message;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ErrorKind, InvokerError, ProtocolError, Result, ToolError};
pub use event::{EventBus, RuntimeEvent};
pub use invoker::Invoker;
pub use message::{Message, Role, SessionId};
pub use tool::{ToolDecoder, ToolInvoker, ToolResponse, ToolSpec};
