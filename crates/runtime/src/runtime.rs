//! The runtime: turns one typed request into a conversation and drives the
//! tool-calling loop until the backend reports a final answer.
//!
//! Every invocation owns a fresh [`ChatSession`], so one `Runtime` can serve
//! concurrent invocations without their histories mixing.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use suricata_config::RuntimeConfig;
use suricata_core::{
    Error, EventBus, Invoker, ProtocolError, Result, RuntimeEvent, ToolDecoder, ToolInvoker,
    ToolResponse,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::json;
use crate::prompt::{PromptBuilder, PromptSections};
use crate::request::Request;
use crate::session::ChatSession;
use crate::template;

/// The agent runtime, bound to one text invoker.
#[derive(Clone)]
pub struct Runtime {
    /// The text-completion backend
    invoker: Arc<dyn Invoker>,

    /// Maximum tool calls per invocation (`None` = unbounded)
    max_turns: Option<u32>,

    /// Label between tool name and result in a tool output turn
    tool_output_label: String,

    /// Prefix of a tool error turn
    tool_error_prefix: String,

    /// Event bus for runtime events
    event_bus: Option<Arc<EventBus>>,
}

impl Runtime {
    /// Create a runtime with an unbounded tool-calling loop.
    pub fn new(invoker: Arc<dyn Invoker>) -> Self {
        let defaults = RuntimeConfig::default();
        Self {
            invoker,
            max_turns: None,
            tool_output_label: defaults.tool_output_label,
            tool_error_prefix: defaults.tool_error_prefix,
            event_bus: None,
        }
    }

    /// Create a runtime from loaded configuration, with its own event bus.
    pub fn from_config(invoker: Arc<dyn Invoker>, config: &RuntimeConfig) -> Self {
        Self {
            invoker,
            max_turns: config.max_turns,
            tool_output_label: config.tool_output_label.clone(),
            tool_error_prefix: config.tool_error_prefix.clone(),
            event_bus: Some(Arc::new(EventBus::new(config.event_capacity))),
        }
    }

    /// Fail invocations whose backend requests more than `max` tool calls.
    pub fn with_max_turns(mut self, max: u32) -> Self {
        self.max_turns = Some(max);
        self
    }

    /// Publish runtime events on `bus`.
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn event_bus(&self) -> Option<&Arc<EventBus>> {
        self.event_bus.as_ref()
    }

    pub fn max_turns(&self) -> Option<u32> {
        self.max_turns
    }

    /// Run `request` to completion and return its decoded output.
    pub async fn invoke<I, O, A>(&self, request: Request<I, A>) -> Result<O>
    where
        I: Serialize,
        O: DeserializeOwned,
        A: Send + 'static,
    {
        self.invoke_with_cancel(request, &CancellationToken::new())
            .await
    }

    /// Like [`Runtime::invoke`], stopping with [`Error::Cancelled`] once
    /// `cancel` fires.
    ///
    /// The token is polled between turns. A backend or tool call already in
    /// flight runs to completion, but no further call is started.
    pub async fn invoke_with_cancel<I, O, A>(
        &self,
        request: Request<I, A>,
        cancel: &CancellationToken,
    ) -> Result<O>
    where
        I: Serialize,
        O: DeserializeOwned,
        A: Send + 'static,
    {
        request.validate()?;
        if let Some(schema) = &request.input_schema {
            json::validate_input(&request.input, schema)?;
        }
        let prompt = Self::prepare_prompt(&request)?;

        let mut invocation = Invocation {
            runtime: self,
            request: &request,
            session: ChatSession::new(self.invoker.clone(), request.instructions.clone()),
            cancel,
            turn: 0,
            tool_calls: 0,
        };

        info!(
            session_id = %invocation.session.id(),
            tools = request.tools.len(),
            prompt_chars = prompt.len(),
            "Starting invocation"
        );

        let result = invocation.run(prompt).await;
        invocation.finish(&result);
        result
    }

    /// Expand the template and render the full prompt.
    fn prepare_prompt<I: Serialize, A: Send + 'static>(request: &Request<I, A>) -> Result<String> {
        let user_prompt = template::render(&request.prompt_template, &request.input)?;

        let input = if request.skip_input {
            None
        } else {
            Some(serde_json::to_string(&request.input)?)
        };

        let sections = PromptSections {
            instructions: &request.instructions,
            tools: &request.tools,
            input: input.as_deref(),
            output_schema: &request.output_schema,
        };
        Ok(PromptBuilder::new().build(&user_prompt, &sections))
    }

    fn publish(&self, event: RuntimeEvent) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event);
        }
    }
}

/// State of one in-flight invocation.
struct Invocation<'a, I, A: Send + 'static> {
    runtime: &'a Runtime,
    request: &'a Request<I, A>,
    session: ChatSession,
    cancel: &'a CancellationToken,
    /// Backend replies received so far
    turn: u32,
    /// Tool calls dispatched so far
    tool_calls: u32,
}

impl<I, A: Send + 'static> Invocation<'_, I, A> {
    async fn run<O: DeserializeOwned>(&mut self, prompt: String) -> Result<O> {
        let reply = self.send(prompt).await?;

        if !self.request.has_tools() {
            return json::decode_reply(&reply, &self.request.output_schema);
        }

        self.agent_loop(reply).await
    }

    /// Alternate between backend replies and tool calls until `done`.
    async fn agent_loop<O: DeserializeOwned>(&mut self, mut reply: String) -> Result<O> {
        let (decoder, invoker) = match (&self.request.tool_decoder, &self.request.tool_invoker) {
            (Some(decoder), Some(invoker)) => (decoder.clone(), invoker.clone()),
            _ => {
                return Err(Error::config(
                    "tools are configured but the tool decoder or tool invoker is missing",
                ));
            }
        };

        loop {
            self.check_cancelled()?;

            debug!(
                session_id = %self.session.id(),
                turn = self.turn,
                "Agent loop iteration"
            );

            let raw = json::extract_json(&reply).ok_or(ProtocolError::NoJsonFound)?;

            let (name, args) = match ToolResponse::parse(raw)? {
                ToolResponse::Done { out } => {
                    let raw_out = serde_json::to_vec(&out)?;
                    return json::decode_validated(&raw_out, &self.request.output_schema);
                }
                ToolResponse::Call { name, args } => (name, args),
            };

            if let Some(limit) = self.runtime.max_turns {
                if self.tool_calls >= limit {
                    warn!(
                        session_id = %self.session.id(),
                        limit,
                        "Tool call limit reached"
                    );
                    return Err(Error::TurnLimitExceeded { limit });
                }
            }

            let feedback = self
                .call_tool(decoder.as_ref(), invoker.as_ref(), &name, &args)
                .await?;

            self.check_cancelled()?;
            reply = self.send(feedback).await?;
        }
    }

    /// Decode and run one tool call, returning the turn to feed back.
    ///
    /// Decoding failures are fatal; execution failures become an error turn.
    async fn call_tool(
        &mut self,
        decoder: &dyn ToolDecoder<A>,
        invoker: &dyn ToolInvoker<A>,
        name: &str,
        args: &Value,
    ) -> Result<String> {
        let raw_args = serde_json::to_vec(args)?;
        let typed = decoder
            .decode(name, &raw_args)
            .map_err(|source| ProtocolError::ToolDecode {
                tool_name: name.to_string(),
                source,
            })?;

        self.tool_calls += 1;
        debug!(session_id = %self.session.id(), tool = name, "Executing tool call");

        let start = Instant::now();
        let result = invoker.invoke(name, typed).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        self.runtime.publish(RuntimeEvent::ToolInvoked {
            session_id: self.session.id().to_string(),
            tool_name: name.to_string(),
            success: result.is_ok(),
            duration_ms,
            timestamp: Utc::now(),
        });

        Ok(match result {
            Ok(output) => format!("{name} {}: {output}", self.runtime.tool_output_label),
            Err(e) => {
                warn!(tool = %name, error = %e, "Tool execution failed");
                // Reported to the backend so it can recover
                format!("{}{e}", self.runtime.tool_error_prefix)
            }
        })
    }

    async fn send(&mut self, text: String) -> Result<String> {
        let reply = self.session.invoke(text).await?;
        self.turn += 1;

        self.runtime.publish(RuntimeEvent::ReplyReceived {
            session_id: self.session.id().to_string(),
            turn: self.turn,
            reply_chars: reply.len(),
            timestamp: Utc::now(),
        });

        Ok(reply)
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            warn!(session_id = %self.session.id(), turn = self.turn, "Invocation cancelled");
            return Err(Error::Cancelled);
        }
        Ok(())
    }

    fn finish<O>(&self, result: &Result<O>) {
        match result {
            Ok(_) => info!(
                session_id = %self.session.id(),
                turns = self.turn,
                tool_calls = self.tool_calls,
                "Invocation completed"
            ),
            Err(e) => warn!(
                session_id = %self.session.id(),
                turns = self.turn,
                error = %e,
                "Invocation failed"
            ),
        }

        self.runtime.publish(RuntimeEvent::InvocationFinished {
            session_id: self.session.id().to_string(),
            tool_calls: self.tool_calls,
            success: result.is_ok(),
            error_message: result.as_ref().err().map(|e| e.to_string()),
            timestamp: Utc::now(),
        });
    }
}
