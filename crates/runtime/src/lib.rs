//! The agent runtime — typed input in, schema-checked output out.
//!
//! One invocation runs as follows:
//!
//! 1. **Validate** the input against its schema (if any)
//! 2. **Render** the prompt template and the full structured prompt
//! 3. **Send** it to the invoker in a fresh chat session
//! 4. **If tools are configured**: follow the backend's tool calls, feeding
//!    each result back, until it answers with `done`
//! 5. **Decode** the final answer and check it against the output schema
//!
//! Nothing survives between invocations; a [`Runtime`] can be shared freely.

pub mod json;
pub mod prompt;
pub mod registry;
pub mod request;
pub mod runtime;
pub mod session;
pub mod template;

#[cfg(test)]
mod test_helpers;

pub use prompt::{PromptBuilder, PromptSections};
pub use registry::{Tool, ToolRegistry};
pub use request::Request;
pub use runtime::Runtime;
pub use session::ChatSession;
pub use tokio_util::sync::CancellationToken;
