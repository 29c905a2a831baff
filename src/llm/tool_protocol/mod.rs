//! The `TOOL_CALL: name({...})` text protocol.
//!
//! Models embed tool calls in plain text. The primary grammar is
//! `TOOL_CALL: <identifier>(<json>)`; when a reply contains none, a few
//! looser shapes are tried in order (fenced `tool_call` blocks, prose
//! `Call <name> with {...}`, and bare `<name>({...})` for registered tools).

mod fallback;
mod prompt;
mod scan;

pub use prompt::{augment_system_prompt_with_tools, render_tool_result};

use super::types::ToolInvocationRequest;
use regex::Regex;
use scan::{arguments_to_json, clean_arguments, scan_balanced};
use std::collections::HashSet;
use std::sync::LazyLock;

/// Marker that introduces a tool call in model output.
pub const DIRECTIVE_MARKER: &str = "TOOL_CALL:";

static DIRECTIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"TOOL_CALL:\s*(\w+)\s*\(").expect("DIRECTIVE_RE pattern is invalid")
});

/// A parsed call before ids are assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawCall {
    pub name: String,
    pub arguments: String,
}

/// Finds tool invocation requests in free-form model output.
pub trait ToolCallExtractor: Send + Sync {
    fn extract(&self, text: &str, known_tools: &[&str]) -> Vec<ToolInvocationRequest>;
}

/// Default [`ToolCallExtractor`] for the `TOOL_CALL:` text protocol.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextToolProtocol;

impl ToolCallExtractor for TextToolProtocol {
    fn extract(&self, text: &str, known_tools: &[&str]) -> Vec<ToolInvocationRequest> {
        extract_tool_calls(text, known_tools)
    }
}

/// Whether the text contains a `TOOL_CALL:` marker at all.
pub fn contains_directive(text: &str) -> bool {
    text.contains(DIRECTIVE_MARKER)
}

/// Extract tool calls in order of appearance, with ids `call_1`, `call_2`, ...
///
/// `known_tools` only gates the bare `name({...})` fallback; other grammars
/// report any identifier and leave unknown names to the registry.
#[must_use]
pub fn extract_tool_calls(text: &str, known_tools: &[&str]) -> Vec<ToolInvocationRequest> {
    let mut calls = directive_calls(text);

    if calls.is_empty() {
        calls = fallback::fenced_calls(text);
    }
    if calls.is_empty() {
        calls = fallback::prose_calls(text);
    }
    if calls.is_empty() {
        let known: HashSet<&str> = known_tools.iter().copied().collect();
        calls = fallback::bare_calls(text, &known);
    }

    if !calls.is_empty() {
        tracing::debug!(count = calls.len(), "Extracted tool calls from model output");
    }

    calls
        .into_iter()
        .enumerate()
        .map(|(index, call)| ToolInvocationRequest {
            id: format!("call_{}", index + 1),
            name: call.name,
            raw_arguments: call.arguments,
        })
        .collect()
}

fn directive_calls(text: &str) -> Vec<RawCall> {
    let mut calls = Vec::new();
    let mut cursor = 0;
    while let Some(caps) = DIRECTIVE_RE.captures_at(text, cursor) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let span = scan_balanced(text, whole.end(), '(', ')');
        if !span.balanced {
            tracing::debug!(
                tool = name.as_str(),
                "Unbalanced tool call arguments, taking the remainder"
            );
        }
        calls.push(RawCall {
            name: name.as_str().to_string(),
            arguments: arguments_to_json(clean_arguments(span.inner)),
        });
        cursor = span.end;
    }
    calls
}

#[cfg(test)]
mod tests;
