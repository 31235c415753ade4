//! Error types for the Suricata runtime.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Every terminal condition of an invocation maps to exactly one variant of
//! [`Error`], and [`Error::kind`] groups them into the categories callers
//! usually branch on.

use thiserror::Error;

/// The top-level error type for all runtime operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Configuration / validation ---
    #[error("Template error: {0}")]
    Template(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Model output ---
    #[error("Invalid output: {0}")]
    InvalidOutput(String),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Turn limit exceeded: backend requested more than {limit} tool calls")]
    TurnLimitExceeded { limit: u32 },

    // --- Backend ---
    #[error("Invoker error: {0}")]
    Invoker(#[from] InvokerError),

    // --- Operator ---
    #[error("Invocation cancelled")]
    Cancelled,

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request itself is unusable; no backend call was made.
    Configuration,
    /// The backend produced output that violates the reply contract.
    Protocol,
    /// The text-completion backend failed.
    Backend,
    /// The caller cancelled the invocation.
    Cancelled,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Template(_)
            | Error::InvalidInput(_)
            | Error::InvalidSchema(_)
            | Error::Config { .. }
            | Error::Serialization(_) => ErrorKind::Configuration,
            Error::InvalidOutput(_) | Error::Protocol(_) | Error::TurnLimitExceeded { .. } => {
                ErrorKind::Protocol
            }
            Error::Invoker(_) => ErrorKind::Backend,
            Error::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Whether the model's final answer failed output validation.
    pub fn is_invalid_output(&self) -> bool {
        matches!(self, Error::InvalidOutput(_))
    }

    /// Whether this error reports a cancelled invocation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Build a [`Error::Config`] from a message.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
        }
    }
}

/// Violations of the tool-response reply contract.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("no valid JSON found in response")]
    NoJsonFound,

    #[error("invalid JSON format: {0}")]
    MalformedReply(String),

    #[error("tool response missing 'name'")]
    MissingToolName,

    #[error("tool '{0}' missing 'args'")]
    MissingToolArgs(String),

    #[error("tool unmarshal for '{tool_name}': {source}")]
    ToolDecode {
        tool_name: String,
        #[source]
        source: ToolError,
    },
}

/// Failures reported by a text-completion backend.
#[derive(Debug, Clone, Error)]
pub enum InvokerError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by backend, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Empty completion from backend")]
    EmptyCompletion,

    #[error("{0}")]
    Other(String),
}

/// Failures of the tool decoder and tool invoker collaborators.
#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("invalid arguments for '{tool_name}': {reason}")]
    ArgumentMismatch { tool_name: String, reason: String },

    #[error("{reason}")]
    ExecutionFailed { tool_name: String, reason: String },
}

impl ToolError {
    /// Shorthand for an execution failure of `tool_name`.
    pub fn execution(tool_name: impl Into<String>, reason: impl ToString) -> Self {
        ToolError::ExecutionFailed {
            tool_name: tool_name.into(),
            reason: reason.to_string(),
        }
    }
}
