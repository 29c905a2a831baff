use crate::error::LlmError;
use crate::tools::ToolResult;
use crate::ui::style;
use std::sync::{Mutex, PoisonError};

/// Something the conversation loop wants the user to see.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    AssistantReply(String),
    ToolStarted { name: String, arguments: String },
    ToolFinished { name: String, result: ToolResult },
    /// A tool result that itself proposes another `TOOL_CALL:`; not executed.
    ToolSuggestedAction { name: String },
    ToolRoundLimit { rounds: usize },
    ProviderError {
        provider: String,
        message: String,
        remediation: String,
        recoverable: bool,
    },
}

impl SessionEvent {
    pub fn provider_error(error: &LlmError) -> Self {
        Self::ProviderError {
            provider: error.provider().to_string(),
            message: error.to_string(),
            remediation: error.remediation(),
            recoverable: error.is_recoverable(),
        }
    }
}

/// Receives session output.
pub trait SessionSink: Send + Sync {
    fn on_event(&self, event: &SessionEvent);
}

#[derive(Debug, Default)]
pub struct NullSessionSink;

impl SessionSink for NullSessionSink {
    fn on_event(&self, _event: &SessionEvent) {}
}

/// Collects events in memory.
#[derive(Debug, Default)]
pub struct RecordingSessionSink {
    events: Mutex<Vec<SessionEvent>>,
}

impl RecordingSessionSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SessionEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SessionSink for RecordingSessionSink {
    fn on_event(&self, event: &SessionEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

/// Prints events to the terminal.
pub struct CliSessionSink {
    assistant_name: String,
}

impl CliSessionSink {
    pub fn new(assistant_name: impl Into<String>) -> Self {
        Self {
            assistant_name: assistant_name.into(),
        }
    }
}

impl SessionSink for CliSessionSink {
    fn on_event(&self, event: &SessionEvent) {
        match event {
            SessionEvent::AssistantReply(text) => {
                println!("{}: {text}", style::agent(&self.assistant_name));
            }
            SessionEvent::ToolStarted { name, arguments } => {
                println!("{}: {name}({arguments})", style::bullet("tool"));
            }
            SessionEvent::ToolFinished { name, result } => {
                if result.success {
                    println!("{} {name}\n{}\n", style::ok("ok"), result.output);
                } else {
                    println!("{} {name}\n{}\n", style::failure("failed"), result.render());
                }
            }
            SessionEvent::ToolSuggestedAction { name } => {
                println!(
                    "{}",
                    style::muted(format!("{name} suggested another action; waiting for the assistant"))
                );
            }
            SessionEvent::ToolRoundLimit { rounds } => {
                println!(
                    "{}",
                    style::warning(format!(
                        "Stopped after {rounds} consecutive tool rounds. Tell me how to continue."
                    ))
                );
            }
            SessionEvent::ProviderError {
                message,
                remediation,
                recoverable,
                ..
            } => {
                eprintln!("{} {message}", style::failure("LLM error:"));
                if *recoverable {
                    eprintln!("{} {remediation}", style::warning("Suggestion:"));
                    eprint!("{}", style::muted("\nPress Enter to continue or Ctrl+C to quit..."));
                }
            }
        }
    }
}
