//! Tool contracts — how the backend asks for external capabilities.
//!
//! The backend never calls a tool directly. It replies with a JSON object
//! naming the tool and its arguments, the runtime decodes the arguments into
//! a typed value with a [`ToolDecoder`], and hands that value to a
//! [`ToolInvoker`]. The invoker's result is fed back to the backend as the
//! next turn.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ProtocolError, ToolError};

/// A tool description rendered into the prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Unique name within a request
    pub name: String,

    /// Description of what the tool does (sent to the backend)
    pub description: String,

    /// JSON Schema describing the tool's arguments
    pub input_schema: Value,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// The backend's structured reply while tools are configured.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResponse {
    /// `{"name": ..., "args": {...}}`: call another tool.
    Call { name: String, args: Value },
    /// `{"done": true, "out": {...}}`: the final answer.
    Done { out: Value },
}

/// Loose wire shape; both branches share one object.
#[derive(Debug, Deserialize)]
struct WireToolResponse {
    #[serde(default)]
    done: Option<bool>,
    #[serde(default)]
    out: Option<Value>,
    /// `null` counts as absent
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    args: Option<Value>,
}

impl ToolResponse {
    /// Decode a JSON object into a tool response.
    ///
    /// The tool-call branch requires a non-empty `name` and non-null `args`.
    pub fn parse(raw: &str) -> std::result::Result<Self, ProtocolError> {
        let wire: WireToolResponse =
            serde_json::from_str(raw).map_err(|_| ProtocolError::MalformedReply(raw.to_string()))?;

        if wire.done.unwrap_or(false) {
            return Ok(ToolResponse::Done {
                out: wire.out.unwrap_or(Value::Null),
            });
        }

        let name = wire.name.unwrap_or_default();
        if name.is_empty() {
            return Err(ProtocolError::MissingToolName);
        }

        match wire.args {
            Some(args) => Ok(ToolResponse::Call { name, args }),
            None => Err(ProtocolError::MissingToolArgs(name)),
        }
    }
}

/// Maps a tool name and its raw JSON arguments to a typed value.
///
/// Fails with [`ToolError::UnknownTool`] for an unrecognized name and
/// [`ToolError::ArgumentMismatch`] when the bytes don't fit the tool's input.
pub trait ToolDecoder<A>: Send + Sync {
    fn decode(&self, name: &str, raw_args: &[u8]) -> std::result::Result<A, ToolError>;
}

impl<A, F> ToolDecoder<A> for F
where
    F: Fn(&str, &[u8]) -> std::result::Result<A, ToolError> + Send + Sync,
{
    fn decode(&self, name: &str, raw_args: &[u8]) -> std::result::Result<A, ToolError> {
        self(name, raw_args)
    }
}

/// Executes a decoded tool call.
#[async_trait]
pub trait ToolInvoker<A: Send + 'static>: Send + Sync {
    /// Run `name` with its decoded arguments and return a serializable result.
    async fn invoke(&self, name: &str, args: A) -> std::result::Result<Value, ToolError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_tool_call() {
        let resp = ToolResponse::parse(r#"{"name":"tool1","args":{"val":"x"},"done":false}"#).unwrap();
        assert_eq!(
            resp,
            ToolResponse::Call {
                name: "tool1".into(),
                args: json!({"val": "x"}),
            }
        );
    }

    #[test]
    fn parse_final_answer() {
        let resp = ToolResponse::parse(r#"{"done":true,"out":{"result":"final"}}"#).unwrap();
        assert_eq!(
            resp,
            ToolResponse::Done {
                out: json!({"result": "final"})
            }
        );
    }

    #[test]
    fn done_without_out_is_null() {
        let resp = ToolResponse::parse(r#"{"done":true}"#).unwrap();
        assert_eq!(resp, ToolResponse::Done { out: Value::Null });
    }

    #[test]
    fn missing_name_rejected() {
        let err = ToolResponse::parse(r#"{"args":{}}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::MissingToolName));
    }

    #[test]
    fn null_name_is_missing_name() {
        let err = ToolResponse::parse(r#"{"name":null,"args":{}}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::MissingToolName));

        let err = ToolResponse::parse(r#"{"done":null,"name":"","args":{}}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::MissingToolName));
    }

    #[test]
    fn null_args_rejected() {
        let err = ToolResponse::parse(r#"{"name":"add","args":null}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::MissingToolArgs(name) if name == "add"));
    }

    #[test]
    fn wrong_field_types_are_malformed() {
        let err = ToolResponse::parse(r#"{"done":"yes"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedReply(_)));
    }

    #[test]
    fn closures_are_decoders() {
        let decoder = |name: &str, raw: &[u8]| -> std::result::Result<String, ToolError> {
            if name != "echo" {
                return Err(ToolError::UnknownTool(name.into()));
            }
            Ok(String::from_utf8_lossy(raw).into_owned())
        };
        assert_eq!(decoder.decode("echo", b"{}").unwrap(), "{}");
        assert!(matches!(
            decoder.decode("nope", b"{}"),
            Err(ToolError::UnknownTool(_))
        ));
    }
}
