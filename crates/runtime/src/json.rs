//! JSON utilities: locating a JSON object inside free-form model text and
//! checking payloads against JSON Schema documents.
//!
//! Validation always happens on the raw [`Value`] first; typed targets are
//! only materialized from payloads that already satisfy their schema.

use serde::Serialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::Value;
use suricata_core::{Error, Result, ToolError};

/// Return the first brace-balanced substring of `input` that parses as JSON.
///
/// Depth is tracked by counting `{` and `}` only; braces inside string
/// literals are counted too. Every time the depth returns to zero the
/// substring from the opening brace is tried. When no balanced prefix from
/// one opening brace parses, the scan restarts at the next `{`.
pub fn extract_json(input: &str) -> Option<&str> {
    let mut from = 0;
    while let Some(offset) = input[from..].find('{') {
        let start = from + offset;
        if let Some(candidate) = parseable_from(input, start) {
            return Some(candidate);
        }
        from = start + 1;
    }
    None
}

fn parseable_from(input: &str, start: usize) -> Option<&str> {
    let mut depth: isize = 0;
    for (i, byte) in input.as_bytes()[start..].iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    let candidate = &input[start..=start + i];
                    if serde_json::from_str::<IgnoredAny>(candidate).is_ok() {
                        return Some(candidate);
                    }
                } else if depth < 0 {
                    return None;
                }
            }
            _ => {}
        }
    }
    None
}

/// Check that `schema` compiles, failing with [`Error::InvalidSchema`].
pub fn check_schema(schema: &Value) -> Result<()> {
    jsonschema::Validator::new(schema)
        .map(|_| ())
        .map_err(|e| Error::InvalidSchema(e.to_string()))
}

/// Collect every schema violation of `instance`.
///
/// Fails with [`Error::InvalidSchema`] when `schema` is not a usable schema.
fn violations(schema: &Value, instance: &Value) -> Result<Vec<String>> {
    let validator = jsonschema::Validator::new(schema)
        .map_err(|e| Error::InvalidSchema(e.to_string()))?;
    if validator.is_valid(instance) {
        return Ok(Vec::new());
    }
    Ok(validator.iter_errors(instance).map(|e| e.to_string()).collect())
}

fn ensure_valid(schema: &Value, instance: &Value) -> Result<()> {
    let found = violations(schema, instance)?;
    if found.is_empty() {
        Ok(())
    } else {
        Err(Error::InvalidOutput(found.join("; ")))
    }
}

/// Validate a raw JSON payload against `schema`.
///
/// Malformed JSON and schema violations both fail with
/// [`Error::InvalidOutput`].
pub fn validate_raw(data: &[u8], schema: &Value) -> Result<()> {
    let instance: Value =
        serde_json::from_slice(data).map_err(|e| Error::InvalidOutput(e.to_string()))?;
    ensure_valid(schema, &instance)
}

/// Serialize `value` and validate the result against `schema`.
pub fn validate<T: Serialize + ?Sized>(value: &T, schema: &Value) -> Result<()> {
    let instance = serde_json::to_value(value)?;
    ensure_valid(schema, &instance)
}

/// Validate a caller-supplied input value. Violations are reported as
/// [`Error::InvalidInput`].
pub fn validate_input<T: Serialize + ?Sized>(value: &T, schema: &Value) -> Result<()> {
    validate(value, schema).map_err(|e| match e {
        Error::InvalidOutput(reason) => Error::InvalidInput(reason),
        other => other,
    })
}

/// Validate `data` against `schema`, then decode it into `T`.
pub fn decode_validated<T: DeserializeOwned>(data: &[u8], schema: &Value) -> Result<T> {
    let instance: Value =
        serde_json::from_slice(data).map_err(|e| Error::InvalidOutput(e.to_string()))?;
    ensure_valid(schema, &instance)?;
    serde_json::from_value(instance).map_err(|e| Error::InvalidOutput(e.to_string()))
}

/// Locate the JSON object in a model reply and decode it as the final output.
pub fn decode_reply<T: DeserializeOwned>(reply: &str, schema: &Value) -> Result<T> {
    let raw = extract_json(reply)
        .ok_or_else(|| Error::InvalidOutput("no JSON object found in reply".into()))?;
    decode_validated(raw.as_bytes(), schema)
}

/// Decode raw tool arguments into `T` after checking the tool's input schema.
///
/// Intended for hand-written or generated [`suricata_core::ToolDecoder`]s.
pub fn decode_tool_args<T: DeserializeOwned>(
    tool_name: &str,
    raw_args: &[u8],
    schema: &Value,
) -> std::result::Result<T, ToolError> {
    decode_validated(raw_args, schema).map_err(|e| ToolError::ArgumentMismatch {
        tool_name: tool_name.to_string(),
        reason: e.to_string(),
    })
}
