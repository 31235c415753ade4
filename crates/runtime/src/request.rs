//! Per-invocation request configuration.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use suricata_core::{Error, Result, ToolDecoder, ToolInvoker, ToolSpec};

use crate::json;
use crate::registry::ToolRegistry;

/// Everything one invocation needs besides the invoker.
///
/// `I` is the input value, rendered into the prompt and the template.
/// `A` is the decoded tool-argument type: a generated enum of every tool's
/// input, or `serde_json::Value` when tools are handled dynamically.
pub struct Request<I, A: Send + 'static = Value> {
    /// Instructions used as the session's system prompt and the prompt's
    /// `[SYSTEM INSTRUCTIONS]` section
    pub instructions: String,

    /// Tera template expanded against `input` into the `[USER PROMPT]`
    pub prompt_template: String,

    pub input: I,

    /// Schema `input` must satisfy before anything is sent
    pub input_schema: Option<Value>,

    /// Schema the final answer must satisfy
    pub output_schema: Value,

    /// Tools offered to the backend, in prompt order
    pub tools: Vec<ToolSpec>,

    /// Leave the `[INPUT]` section out of the prompt
    pub skip_input: bool,

    pub tool_decoder: Option<Arc<dyn ToolDecoder<A>>>,
    pub tool_invoker: Option<Arc<dyn ToolInvoker<A>>>,
}

impl<I, A: Send + 'static> Request<I, A> {
    /// Create a request without tools.
    pub fn new(prompt_template: impl Into<String>, input: I, output_schema: Value) -> Self {
        Self {
            instructions: String::new(),
            prompt_template: prompt_template.into(),
            input,
            input_schema: None,
            output_schema,
            tools: Vec::new(),
            skip_input: false,
            tool_decoder: None,
            tool_invoker: None,
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn with_input_schema(mut self, schema: Value) -> Self {
        self.input_schema = Some(schema);
        self
    }

    /// Omit the `[INPUT]` section from the prompt.
    pub fn skip_input(mut self) -> Self {
        self.skip_input = true;
        self
    }

    /// Offer `tools` to the backend, decoded by `decoder` and run by `invoker`.
    pub fn with_tools(
        mut self,
        tools: Vec<ToolSpec>,
        decoder: Arc<dyn ToolDecoder<A>>,
        invoker: Arc<dyn ToolInvoker<A>>,
    ) -> Self {
        self.tools = tools;
        self.tool_decoder = Some(decoder);
        self.tool_invoker = Some(invoker);
        self
    }

    /// Whether the agent loop is used for this request.
    pub fn has_tools(&self) -> bool {
        !self.tools.is_empty()
    }

    /// Reject requests the runtime cannot honor.
    ///
    /// Every schema is compiled here, so an unusable one surfaces as
    /// [`Error::InvalidSchema`] before the backend is called.
    pub fn validate(&self) -> Result<()> {
        json::check_schema(&self.output_schema)?;
        if let Some(schema) = &self.input_schema {
            json::check_schema(schema)?;
        }

        if !self.has_tools() {
            return Ok(());
        }

        let mut seen = HashSet::new();
        for tool in &self.tools {
            if tool.name.is_empty() {
                return Err(Error::config("tool specification without a name"));
            }
            if !seen.insert(tool.name.as_str()) {
                return Err(Error::config(format!("duplicate tool name '{}'", tool.name)));
            }
            json::check_schema(&tool.input_schema).map_err(|e| match e {
                Error::InvalidSchema(reason) => {
                    Error::InvalidSchema(format!("tool '{}': {reason}", tool.name))
                }
                other => other,
            })?;
        }

        if self.tool_decoder.is_none() || self.tool_invoker.is_none() {
            return Err(Error::config(
                "tools are configured but the tool decoder or tool invoker is missing",
            ));
        }

        Ok(())
    }
}

impl<I> Request<I, Value> {
    /// Offer every tool of `registry`; it decodes and runs them too.
    pub fn with_registry(self, registry: Arc<ToolRegistry>) -> Self {
        let tools = registry.specs();
        self.with_tools(tools, registry.clone(), registry)
    }
}
