//! Dynamic tools — tools that work on plain JSON values.
//!
//! A [`ToolRegistry`] is both the tool decoder and the tool invoker of a
//! request: arguments are checked against the tool's input schema when the
//! backend's call is decoded, then handed to the tool as a `Value`.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use suricata_core::{ToolDecoder, ToolError, ToolInvoker, ToolSpec};

use crate::json;

/// A capability the backend can call by name.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "add", "weather").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the backend).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's arguments.
    fn input_schema(&self) -> Value;

    /// Execute the tool with arguments that already match `input_schema`.
    async fn execute(&self, arguments: Value) -> std::result::Result<Value, ToolError>;

    /// Convert this tool into the spec rendered in the prompt.
    fn to_spec(&self) -> ToolSpec {
        ToolSpec::new(self.name(), self.description(), self.input_schema())
    }
}

/// Registered tools, kept in registration order.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Replaces any existing tool with the same name in place.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        match self.tools.iter().position(|t| t.name() == tool.name()) {
            Some(idx) => self.tools[idx] = tool,
            None => self.tools.push(tool),
        }
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// Specs of every tool, in registration order.
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.to_spec()).collect()
    }

    /// List all registered tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl ToolDecoder<Value> for ToolRegistry {
    fn decode(&self, name: &str, raw_args: &[u8]) -> std::result::Result<Value, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        json::decode_tool_args(name, raw_args, &tool.input_schema())
    }
}

#[async_trait]
impl ToolInvoker<Value> for ToolRegistry {
    async fn invoke(&self, name: &str, args: Value) -> std::result::Result<Value, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        tool.execute(args).await
    }
}
