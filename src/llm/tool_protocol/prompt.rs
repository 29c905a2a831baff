use super::{DIRECTIVE_MARKER, contains_directive};
use crate::tools::ToolSpec;
use std::fmt::Write;

const EXAMPLE_CALL: &str = r#"TOOL_CALL: fitbit_log_meal({"meal_type": "breakfast", "foods": [{"name": "scrambled eggs", "quantity": 2, "unit": "large", "calories": 140}]})"#;

/// Append the tool catalogue and the `TOOL_CALL:` rules to a system prompt.
#[must_use]
pub fn augment_system_prompt_with_tools(system_prompt: &str, tools: &[ToolSpec]) -> String {
    let mut augmented = String::from(system_prompt);
    if tools.is_empty() {
        return augmented;
    }

    augmented.push_str("\n\n## Available Tools\n\n");
    for tool in tools {
        let parameters = match serde_json::to_string(&tool.parameters) {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(
                    tool = tool.name,
                    "Failed to serialize tool parameters: {error}"
                );
                "{}".to_string()
            }
        };
        let _ = writeln!(
            augmented,
            "- {}: {} Parameters: {}",
            tool.name, tool.description, parameters
        );
    }

    augmented.push_str("\n## Tool Call Format\n\n");
    augmented.push_str(
        "When the user describes a meal, log it by calling a tool. Do not just say you will log it.\n",
    );
    let _ = writeln!(augmented, "Use exactly: {DIRECTIVE_MARKER} tool_name(json)");
    let _ = writeln!(augmented, "Example: {EXAMPLE_CALL}\n");
    augmented.push_str("Rules:\n");
    augmented.push_str("1. Make only one tool call per response.\n");
    augmented.push_str("2. The arguments must be complete, valid JSON.\n");
    augmented.push_str("3. End the line right after the closing parenthesis: no semicolons or commentary.\n");
    augmented.push_str("4. Give every food item a calorie estimate.\n");
    augmented.push_str("5. Do not repeat a tool call.\n");
    augmented
}

/// Text a provider shows the model for a tool result turn.
///
/// Results that suggest a follow-up call get an explicit hint; the suggestion
/// only runs if the model issues it itself.
pub fn render_tool_result(output: &str) -> String {
    let mut rendered = format!("Tool Result:\n{output}\n");
    if contains_directive(output) {
        rendered.push_str(
            "\nThe tool result above suggests a tool call. If it is still needed, issue it yourself using the exact format shown.\n",
        );
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec(name: &str) -> ToolSpec {
        ToolSpec {
            name: name.to_string(),
            description: format!("{name} description."),
            parameters: json!({"type": "object"}),
        }
    }

    #[test]
    fn lists_tools_and_rules() {
        let prompt = augment_system_prompt_with_tools(
            "You are a nutrition assistant.",
            &[spec("fitbit_login"), spec("view_daily_summary")],
        );
        assert!(prompt.starts_with("You are a nutrition assistant."));
        assert!(prompt.contains("- fitbit_login: fitbit_login description."));
        assert!(prompt.contains("- view_daily_summary:"));
        assert!(prompt.contains("TOOL_CALL: tool_name(json)"));
    }

    #[test]
    fn no_tools_leaves_prompt_untouched() {
        assert_eq!(augment_system_prompt_with_tools("base", &[]), "base");
    }

    #[test]
    fn directive_results_get_hint() {
        let plain = render_tool_result("Saved.");
        assert!(!plain.contains("suggests a tool call"));
        let suggested = render_tool_result("Token expired.\nTOOL_CALL: fitbit_login({})");
        assert!(suggested.contains("suggests a tool call"));
    }
}
