//! Prompt builder — renders the single instructional prompt of a request.
//!
//! Sections always appear in the same order, and a section is omitted only
//! when its trigger is off:
//!
//! | Section                 | Present when                 |
//! |-------------------------|------------------------------|
//! | `[SYSTEM INSTRUCTIONS]` | instructions are non-empty   |
//! | `[WORKFLOW]`            | at least one tool            |
//! | `[TOOLS]`               | at least one tool            |
//! | `[INPUT]`               | input is not skipped         |
//! | `[OUTPUT FORMAT]`       | always                       |
//! | `[GUIDELINES]`          | always                       |
//! | `[USER PROMPT]`         | always, last                 |
//!
//! Backends are tuned against this exact layout, so headers, blank lines and
//! wording are reproduced byte for byte.

use serde_json::Value;
use suricata_core::ToolSpec;

const WORKFLOW: &str = concat!(
    "\n[WORKFLOW]\n",
    "\n",
    "1. You will be given the conversation so far, including:\n",
    "   - The original user request.\n",
    "   - Your previous reasoning and tool calls.\n",
    "   - Tool outputs or error messages.\n",
    "\n",
    "2. After receiving a tool output or error, you must:\n",
    "   - Analyze if the goal is achieved.\n",
    "   - If more steps are required, call another tool with correct parameters.\n",
    "   - If the goal is complete, provide a clear, final answer to the user.\n",
);

const OUTPUT_FORMAT_SINGLE: &str = concat!(
    "\n[OUTPUT FORMAT]\n",
    "\n",
    "Return ONLY a valid JSON object matching the following schema:\n",
    "\n",
);

const OUTPUT_FORMAT_TOOLS: &str = concat!(
    "\n[OUTPUT FORMAT]\n",
    "\n",
    "After each tool output or error, you must return exactly one JSON object, following these rules:\n",
    "\n",
    "1. If more steps are required (tool call):\n",
    "\n",
    "{\n",
    "\t\"name\": \"<tool name>\",\n",
    "\t\"args\": {...}\n",
    "}\n",
    "\n",
    "- \"name\": The exact name of the tool to call (must be one of the tools listed in the TOOLS section).\n",
    "- \"args\": A JSON object that matches the input schema for the selected tool exactly.\n",
    "- Do not include extra fields or omit required fields.\n",
    "\n",
    "2. If goal is achieved (final output):\n",
    "\n",
    "{\n",
    "\t\"done\": true,\n",
    "\t\"out\": {...}\n",
    "}\n",
    "\n",
    "where \"out\" is a JSON object strictly matching the following JSON schema:\n",
    "\n",
);

const GUIDELINES: &str = concat!(
    "\n\n[GUIDELINES]:\n",
    "\n",
    "- Do not include any extra text.\n",
    "- Do not include markdown or code fences.\n",
    "- Ensure the JSON is syntactically valid.\n",
    "- All fields must be present, even if empty.\n",
    "\n",
);

/// The request fields the prompt depends on.
#[derive(Debug, Clone, Copy)]
pub struct PromptSections<'a> {
    pub instructions: &'a str,
    pub tools: &'a [ToolSpec],
    /// Serialized input; `None` when the request skips its input section
    pub input: Option<&'a str>,
    pub output_schema: &'a Value,
}

/// Accumulates prompt sections into one string.
#[derive(Debug, Default)]
pub struct PromptBuilder {
    buf: String,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the full prompt, ending with the already-expanded user prompt.
    pub fn build(mut self, user_prompt: &str, sections: &PromptSections<'_>) -> String {
        let has_tools = !sections.tools.is_empty();

        self.write_instructions(sections.instructions);
        if has_tools {
            self.buf.push_str(WORKFLOW);
            self.write_tools(sections.tools);
        }
        if let Some(input) = sections.input {
            self.write_input(input);
        }
        self.write_output_format(sections.output_schema, has_tools);
        self.buf.push_str(GUIDELINES);
        self.write_user_prompt(user_prompt);

        self.buf
    }

    fn write_instructions(&mut self, instructions: &str) {
        if instructions.is_empty() {
            return;
        }
        self.buf.push_str("[SYSTEM INSTRUCTIONS]\n\n");
        self.buf.push_str(instructions);
        self.buf.push_str("\n\n");
    }

    fn write_tools(&mut self, tools: &[ToolSpec]) {
        self.buf.push_str("\n[TOOLS]\n\n");
        for tool in tools {
            self.buf.push_str(&format!(
                "Tool: {}\nDescription: {}\nInputSchema: {}\n\n",
                tool.name, tool.description, tool.input_schema
            ));
        }
    }

    fn write_input(&mut self, input: &str) {
        self.buf.push_str("\n[INPUT]:\n\n");
        self.buf.push_str(input);
        self.buf.push('\n');
    }

    fn write_output_format(&mut self, schema: &Value, has_tools: bool) {
        if has_tools {
            self.buf.push_str(OUTPUT_FORMAT_TOOLS);
        } else {
            self.buf.push_str(OUTPUT_FORMAT_SINGLE);
        }
        self.buf.push_str(&schema.to_string());
    }

    fn write_user_prompt(&mut self, prompt: &str) {
        self.buf.push_str("[USER PROMPT]\n\n");
        self.buf.push_str(prompt);
        self.buf.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn search_tool() -> ToolSpec {
        ToolSpec::new(
            "search",
            "Search for information",
            json!({
                "type": "object",
                "properties": {"query": {"type": "string"}},
                "required": ["query"]
            }),
        )
    }

    fn position(prompt: &str, header: &str) -> usize {
        prompt
            .find(header)
            .unwrap_or_else(|| panic!("missing {header} in:\n{prompt}"))
    }

    #[test]
    fn full_prompt_contains_every_section_in_order() {
        let schema = json!({"type": "object", "properties": {"answer": {"type": "string"}}});
        let tools = [search_tool()];
        let sections = PromptSections {
            instructions: "Follow these system rules.",
            tools: &tools,
            input: Some(r#"{"query":"test search"}"#),
            output_schema: &schema,
        };

        let prompt = PromptBuilder::new().build("What is AI?", &sections);

        let order = [
            "[SYSTEM INSTRUCTIONS]",
            "[WORKFLOW]",
            "[TOOLS]",
            "[INPUT]",
            "[OUTPUT FORMAT]",
            "[GUIDELINES]",
            "[USER PROMPT]",
        ]
        .map(|h| position(&prompt, h));
        assert!(order.windows(2).all(|w| w[0] < w[1]), "sections out of order");

        assert!(prompt.contains("Tool: search\nDescription: Search for information\nInputSchema: "));
        assert!(prompt.contains(r#"{"query":"test search"}"#));
        assert!(prompt.contains("\t\"done\": true,"));
        assert!(prompt.ends_with("[USER PROMPT]\n\nWhat is AI?\n"));
    }

    #[test]
    fn minimal_prompt_is_byte_exact() {
        let schema = json!({"type": "object"});
        let sections = PromptSections {
            instructions: "",
            tools: &[],
            input: None,
            output_schema: &schema,
        };

        let prompt = PromptBuilder::new().build("Say hi", &sections);

        let expected = concat!(
            "\n[OUTPUT FORMAT]\n\n",
            "Return ONLY a valid JSON object matching the following schema:\n\n",
            "{\"type\":\"object\"}",
            "\n\n[GUIDELINES]:\n\n",
            "- Do not include any extra text.\n",
            "- Do not include markdown or code fences.\n",
            "- Ensure the JSON is syntactically valid.\n",
            "- All fields must be present, even if empty.\n\n",
            "[USER PROMPT]\n\nSay hi\n",
        );
        assert_eq!(prompt, expected);
    }

    #[test]
    fn tools_prompt_is_byte_exact() {
        let tools = [ToolSpec::new(
            "search",
            "Search for information",
            json!({"properties": {"query": {"type": "string"}}}),
        )];
        let schema = json!({"type": "object"});
        let sections = PromptSections {
            instructions: "Follow these system rules.",
            tools: &tools,
            input: Some(r#"{"query":"test search"}"#),
            output_schema: &schema,
        };

        let prompt = PromptBuilder::new().build("What is AI?", &sections);

        let expected = concat!(
            "[SYSTEM INSTRUCTIONS]\n\n",
            "Follow these system rules.\n\n",
            "\n[WORKFLOW]\n\n",
            "1. You will be given the conversation so far, including:\n",
            "   - The original user request.\n",
            "   - Your previous reasoning and tool calls.\n",
            "   - Tool outputs or error messages.\n\n",
            "2. After receiving a tool output or error, you must:\n",
            "   - Analyze if the goal is achieved.\n",
            "   - If more steps are required, call another tool with correct parameters.\n",
            "   - If the goal is complete, provide a clear, final answer to the user.\n",
            "\n[TOOLS]\n\n",
            "Tool: search\n",
            "Description: Search for information\n",
            "InputSchema: {\"properties\":{\"query\":{\"type\":\"string\"}}}\n\n",
            "\n[INPUT]:\n\n",
            "{\"query\":\"test search\"}\n",
            "\n[OUTPUT FORMAT]\n\n",
            "After each tool output or error, you must return exactly one JSON object, following these rules:\n\n",
            "1. If more steps are required (tool call):\n\n",
            "{\n\t\"name\": \"<tool name>\",\n\t\"args\": {...}\n}\n\n",
            "- \"name\": The exact name of the tool to call (must be one of the tools listed in the TOOLS section).\n",
            "- \"args\": A JSON object that matches the input schema for the selected tool exactly.\n",
            "- Do not include extra fields or omit required fields.\n\n",
            "2. If goal is achieved (final output):\n\n",
            "{\n\t\"done\": true,\n\t\"out\": {...}\n}\n\n",
            "where \"out\" is a JSON object strictly matching the following JSON schema:\n\n",
            "{\"type\":\"object\"}",
            "\n\n[GUIDELINES]:\n\n",
            "- Do not include any extra text.\n",
            "- Do not include markdown or code fences.\n",
            "- Ensure the JSON is syntactically valid.\n",
            "- All fields must be present, even if empty.\n\n",
            "[USER PROMPT]\n\nWhat is AI?\n",
        );
        assert_eq!(prompt, expected);
    }

    #[test]
    fn skip_input_omits_input_section() {
        let schema = json!({"type": "object"});
        let sections = PromptSections {
            instructions: "Test skip input",
            tools: &[],
            input: None,
            output_schema: &schema,
        };
        let prompt = PromptBuilder::new().build("Check input skipping", &sections);
        assert!(!prompt.contains("[INPUT]"));
        assert!(prompt.starts_with("[SYSTEM INSTRUCTIONS]\n\nTest skip input\n\n"));
    }

    #[test]
    fn no_tools_omits_workflow_and_tools() {
        let schema = json!({"type": "object"});
        let sections = PromptSections {
            instructions: "",
            tools: &[],
            input: Some(r#"{"test":"value"}"#),
            output_schema: &schema,
        };
        let prompt = PromptBuilder::new().build("Simple test", &sections);
        assert!(!prompt.contains("[WORKFLOW]"));
        assert!(!prompt.contains("[TOOLS]"));
        assert!(!prompt.contains("[SYSTEM INSTRUCTIONS]"));
        assert!(prompt.contains("Return ONLY a valid JSON object"));
        assert!(prompt.contains("\n[INPUT]:\n\n{\"test\":\"value\"}\n"));
    }
}
