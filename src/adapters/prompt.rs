//! Prompt construction and structured-output parsing shared by all adapters.

use serde_json::Value;

use crate::domain::{CommandContext, CommandOutput};

/// Explanation attached when the backend gives none
pub const FALLBACK_EXPLANATION: &str = "Generated command";

const BASE_INSTRUCTION: &str = "You are a shell command assistant. \
When given a natural language description, respond only with the exact shell command to run \
and a one-line explanation. \
Respond in JSON format with 'command' and 'explanation' fields. \
The 'command' should be the exact shell command(s) to run. \
The 'explanation' should briefly describe what the command does in one line. \
If the command is destructive or otherwise dangerous, say so explicitly in the explanation.";

/// System instruction, followed by one line per present context key
pub fn system_prompt(context: Option<&CommandContext>) -> String {
    let mut prompt = BASE_INSTRUCTION.to_string();

    let lines = context.map(CommandContext::prompt_lines).unwrap_or_default();
    if !lines.is_empty() {
        prompt.push_str("\n\nContext:\n");
        prompt.push_str(&lines.join("\n"));
    }

    prompt
}

/// Interpret the model's text as `{command, explanation}`.
///
/// Falls back to the whole trimmed text as the command when the text is not
/// a JSON object with a string `command` field.
pub fn parse_command_text(text: &str) -> CommandOutput {
    if let Some(output) = parse_structured(strip_code_fence(text)) {
        return output;
    }

    CommandOutput {
        command: text.trim().to_string(),
        explanation: Some(FALLBACK_EXPLANATION.to_string()),
    }
}

fn parse_structured(text: &str) -> Option<CommandOutput> {
    let value: Value = serde_json::from_str(text).ok()?;
    let object = value.as_object()?;
    let command = object.get("command")?.as_str()?;

    let explanation = object
        .get("explanation")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .unwrap_or(FALLBACK_EXPLANATION);

    Some(CommandOutput {
        command: command.trim().to_string(),
        explanation: Some(explanation.to_string()),
    })
}

/// Strip a surrounding ``` fence (with optional language tag)
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(inner) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the language tag line, if any
    match inner.find('\n') {
        Some(idx) => inner[idx + 1..].trim(),
        None => strip_inline_tag(inner.trim()),
    }
}

/// Drop a language tag sitting on the same line as the fence
fn strip_inline_tag(inner: &str) -> &str {
    match inner.split_once(char::is_whitespace) {
        Some((tag, rest))
            if !tag.is_empty()
                && tag.chars().all(|c| c.is_ascii_alphanumeric())
                && rest.trim_start().starts_with('{') =>
        {
            rest.trim()
        }
        _ => inner,
    }
}
