//! User prompt templates.
//!
//! A template is expanded against the request's input value with Tera. A
//! fresh `Tera` instance is built for every render, so rendering shares no
//! state between invocations.

use serde::Serialize;
use serde_json::Value;
use suricata_core::{Error, Result};
use tera::{Context, Tera};

const TEMPLATE_NAME: &str = "prompt";

/// Render `template` against `input`.
///
/// Object inputs expose their fields at the top level (`{{ name }}`); any
/// other input is available as `{{ input }}`.
pub fn render<T: Serialize + ?Sized>(template: &str, input: &T) -> Result<String> {
    let mut tera = Tera::default();
    tera.add_raw_template(TEMPLATE_NAME, template)
        .map_err(|e| Error::Template(format!("template parse: {}", describe(&e))))?;

    let context = build_context(input)?;
    tera.render(TEMPLATE_NAME, &context)
        .map_err(|e| Error::Template(format!("template execute: {}", describe(&e))))
}

fn build_context<T: Serialize + ?Sized>(input: &T) -> Result<Context> {
    let value = serde_json::to_value(input)?;
    match value {
        Value::Object(_) => Context::from_value(value)
            .map_err(|e| Error::Template(format!("template context: {}", describe(&e)))),
        other => {
            let mut context = Context::new();
            context.insert("input", &other);
            Ok(context)
        }
    }
}

/// Tera nests the useful message in the error's source chain.
fn describe(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
