use super::input::UserInput;
use super::sink::{SessionEvent, SessionSink};
use crate::config::schema::DEFAULT_MAX_TOOL_ROUNDS;
use crate::error::{AgentError, LlmError};
use crate::llm::tool_protocol::{
    TextToolProtocol, ToolCallExtractor, augment_system_prompt_with_tools, contains_directive,
};
use crate::llm::{ConversationTurn, Provider, ToolInvocationRequest};
use crate::tools::ToolRegistry;
use serde_json::Value;
use std::sync::Arc;

/// Where the conversation loop is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    AwaitingUserInput,
    AwaitingModelResponse,
    ExecutingTools(Vec<ToolInvocationRequest>),
    Terminated,
}

/// One interactive conversation: user lines in, model replies and tool runs out.
pub struct Session {
    provider: Box<dyn Provider>,
    registry: Arc<ToolRegistry>,
    extractor: Box<dyn ToolCallExtractor>,
    system_prompt: String,
    max_tool_rounds: usize,
    history: Vec<ConversationTurn>,
    state: SessionState,
    tool_rounds: usize,
}

impl Session {
    /// `system_prompt` is extended with the registry's tool list and the
    /// `TOOL_CALL:` rules.
    pub fn new(provider: Box<dyn Provider>, registry: Arc<ToolRegistry>, system_prompt: &str) -> Self {
        let system_prompt = augment_system_prompt_with_tools(system_prompt, &registry.specs());
        Self {
            provider,
            registry,
            extractor: Box::new(TextToolProtocol),
            system_prompt,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            history: Vec::new(),
            state: SessionState::AwaitingUserInput,
            tool_rounds: 0,
        }
    }

    pub fn with_extractor(mut self, extractor: Box<dyn ToolCallExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds.max(1);
        self
    }

    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Drive the conversation until input ends or a non-recoverable provider
    /// error occurs.
    pub async fn run(
        &mut self,
        input: &mut dyn UserInput,
        sink: &dyn SessionSink,
    ) -> Result<(), AgentError> {
        loop {
            let state = std::mem::replace(&mut self.state, SessionState::Terminated);
            self.state = match state {
                SessionState::AwaitingUserInput => self.read_user_line(input).await?,
                SessionState::AwaitingModelResponse => {
                    match self.request_model(input, sink).await {
                        Ok(next) => next,
                        Err(e) => {
                            self.state = SessionState::Terminated;
                            return Err(e);
                        }
                    }
                }
                SessionState::ExecutingTools(calls) => self.execute_tools(calls, sink).await,
                SessionState::Terminated => return Ok(()),
            };
        }
    }

    async fn read_user_line(&mut self, input: &mut dyn UserInput) -> Result<SessionState, AgentError> {
        let Some(line) = input.next_line().await? else {
            tracing::debug!("Input closed, ending session");
            return Ok(SessionState::Terminated);
        };
        let line = line.trim();
        if line.is_empty() {
            return Ok(SessionState::AwaitingUserInput);
        }
        self.history.push(ConversationTurn::user(line));
        self.tool_rounds = 0;
        Ok(SessionState::AwaitingModelResponse)
    }

    async fn request_model(
        &mut self,
        input: &mut dyn UserInput,
        sink: &dyn SessionSink,
    ) -> Result<SessionState, AgentError> {
        let response = match self.provider.generate(&self.system_prompt, &self.history).await {
            Ok(response) => response,
            Err(error) => return self.handle_provider_error(error, input, sink).await,
        };

        let text = response.text;
        let names = self.registry.names();
        let known: Vec<&str> = names.iter().map(String::as_str).collect();
        let calls = self.extractor.extract(&text, &known);
        tracing::debug!(calls = calls.len(), "Parsed model reply");

        if !text.trim().is_empty() {
            self.history.push(ConversationTurn::assistant(text.clone()));
            sink.on_event(&SessionEvent::AssistantReply(text));
        }

        if calls.is_empty() {
            return Ok(SessionState::AwaitingUserInput);
        }
        if self.tool_rounds >= self.max_tool_rounds {
            tracing::warn!(rounds = self.tool_rounds, "Tool round limit reached");
            sink.on_event(&SessionEvent::ToolRoundLimit {
                rounds: self.tool_rounds,
            });
            return Ok(SessionState::AwaitingUserInput);
        }
        Ok(SessionState::ExecutingTools(calls))
    }

    async fn handle_provider_error(
        &mut self,
        error: LlmError,
        input: &mut dyn UserInput,
        sink: &dyn SessionSink,
    ) -> Result<SessionState, AgentError> {
        sink.on_event(&SessionEvent::provider_error(&error));
        if !error.is_recoverable() {
            tracing::error!(kind = %error.kind(), "Provider failure is not recoverable");
            return Err(error.into());
        }

        tracing::warn!(kind = %error.kind(), "Recoverable provider failure: {error}");
        // Wait for the user to acknowledge before prompting again.
        match input.next_line().await? {
            Some(_) => Ok(SessionState::AwaitingUserInput),
            None => Ok(SessionState::Terminated),
        }
    }

    async fn execute_tools(
        &mut self,
        calls: Vec<ToolInvocationRequest>,
        sink: &dyn SessionSink,
    ) -> SessionState {
        self.tool_rounds += 1;
        for call in calls {
            sink.on_event(&SessionEvent::ToolStarted {
                name: call.name.clone(),
                arguments: call.raw_arguments.clone(),
            });

            let args = call.arguments().unwrap_or_else(|e| {
                tracing::warn!(id = %call.id, "Unparseable tool arguments: {e}");
                Value::Object(serde_json::Map::new())
            });
            tracing::info!(id = %call.id, tool = %call.name, "Executing tool");
            let result = self.registry.execute(&call.name, args).await;
            let rendered = result.render();

            sink.on_event(&SessionEvent::ToolFinished {
                name: call.name.clone(),
                result,
            });
            if contains_directive(&rendered) {
                sink.on_event(&SessionEvent::ToolSuggestedAction { name: call.name });
            }
            self.history.push(ConversationTurn::tool_result(&rendered));
        }
        SessionState::AwaitingModelResponse
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::input::ScriptedInput;
    use crate::agent::sink::{NullSessionSink, RecordingSessionSink};
    use crate::llm::ProviderResponse;
    use crate::llm::types::Role;
    use crate::tools::{Tool, ToolResult};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replies from a fixed script and records each history it was shown.
    struct ScriptedProvider {
        replies: Mutex<VecDeque<Result<String, LlmError>>>,
        seen: Arc<Mutex<Vec<Vec<ConversationTurn>>>>,
    }

    impl ScriptedProvider {
        fn new(replies: Vec<Result<&str, LlmError>>) -> (Self, Arc<Mutex<Vec<Vec<ConversationTurn>>>>) {
            let seen = Arc::new(Mutex::new(Vec::new()));
            let provider = Self {
                replies: Mutex::new(
                    replies
                        .into_iter()
                        .map(|r| r.map(str::to_string))
                        .collect(),
                ),
                seen: Arc::clone(&seen),
            };
            (provider, seen)
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(
            &self,
            _system_prompt: &str,
            history: &[ConversationTurn],
        ) -> Result<ProviderResponse, LlmError> {
            self.seen.lock().unwrap().push(history.to_vec());
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("(no more replies)".to_string()));
            reply.map(ProviderResponse::text_only)
        }
    }

    struct CountingTool {
        calls: Arc<Mutex<Vec<serde_json::Value>>>,
    }

    #[async_trait]
    impl Tool for CountingTool {
        fn name(&self) -> &str {
            "count"
        }

        fn description(&self) -> &str {
            "Counts invocations"
        }

        fn parameters_schema(&self) -> serde_json::Value {
            json!({"type": "object"})
        }

        async fn execute(&self, args: serde_json::Value) -> anyhow::Result<ToolResult> {
            let mut calls = self.calls.lock().unwrap();
            calls.push(args);
            Ok(ToolResult::ok(format!("counted {}", calls.len())))
        }
    }

    fn registry() -> (Arc<ToolRegistry>, Arc<Mutex<Vec<serde_json::Value>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let registry = ToolRegistry::new();
        registry.register(Box::new(CountingTool {
            calls: Arc::clone(&calls),
        }));
        (Arc::new(registry), calls)
    }

    fn unavailable() -> LlmError {
        LlmError::ServiceUnavailable {
            provider: "scripted".into(),
            message: "down".into(),
        }
    }

    #[tokio::test]
    async fn plain_reply_returns_to_user() {
        let (provider, seen) = ScriptedProvider::new(vec![Ok("Hello there")]);
        let (registry, _) = registry();
        let mut session = Session::new(Box::new(provider), registry, "Be helpful.");
        let mut input = ScriptedInput::new(["hi"]);

        session.run(&mut input, &NullSessionSink).await.unwrap();

        assert_eq!(*session.state(), SessionState::Terminated);
        assert_eq!(
            session.history(),
            &[ConversationTurn::user("hi"), ConversationTurn::assistant("Hello there")]
        );
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn blank_lines_are_ignored() {
        let (provider, seen) = ScriptedProvider::new(vec![Ok("ok")]);
        let (registry, _) = registry();
        let mut session = Session::new(Box::new(provider), registry, "");
        let mut input = ScriptedInput::new(["", "   ", "real"]);

        session.run(&mut input, &NullSessionSink).await.unwrap();
        assert_eq!(seen.lock().unwrap().len(), 1);
        assert_eq!(session.history()[0], ConversationTurn::user("real"));
    }

    #[tokio::test]
    async fn tool_calls_run_in_order_and_feed_back() {
        let (provider, seen) = ScriptedProvider::new(vec![
            Ok("Logging now.\nTOOL_CALL: count({\"n\": 1})\nTOOL_CALL: count({\"n\": 2})"),
            Ok("All done."),
        ]);
        let (registry, calls) = registry();
        let mut session = Session::new(Box::new(provider), registry, "");
        let mut input = ScriptedInput::new(["log it"]);
        let sink = RecordingSessionSink::new();

        session.run(&mut input, &sink).await.unwrap();

        assert_eq!(*calls.lock().unwrap(), vec![json!({"n": 1}), json!({"n": 2})]);
        let second_view = &seen.lock().unwrap()[1];
        assert_eq!(second_view.len(), 4);
        assert_eq!(second_view[2].tool_output(), Some("counted 1"));
        assert_eq!(second_view[3].tool_output(), Some("counted 2"));
        assert_eq!(session.history().last().unwrap().content, "All done.");

        let finished = sink
            .events()
            .iter()
            .filter(|e| matches!(e, SessionEvent::ToolFinished { .. }))
            .count();
        assert_eq!(finished, 2);
    }

    #[tokio::test]
    async fn unknown_tool_reports_error_result() {
        let (provider, seen) =
            ScriptedProvider::new(vec![Ok("TOOL_CALL: nope({})"), Ok("Sorry.")]);
        let (registry, _) = registry();
        let mut session = Session::new(Box::new(provider), registry, "");
        let mut input = ScriptedInput::new(["go"]);

        session.run(&mut input, &NullSessionSink).await.unwrap();
        let view = &seen.lock().unwrap()[1];
        assert_eq!(
            view.last().unwrap().tool_output(),
            Some("Error: tool 'nope' not found")
        );
    }

    #[tokio::test]
    async fn recoverable_error_waits_for_acknowledgement() {
        let (provider, seen) = ScriptedProvider::new(vec![Err(unavailable()), Ok("Back again")]);
        let (registry, _) = registry();
        let mut session = Session::new(Box::new(provider), registry, "");
        let mut input = ScriptedInput::new(["first", "", "second"]);
        let sink = RecordingSessionSink::new();

        session.run(&mut input, &sink).await.unwrap();

        // The empty acknowledgement line is consumed, not sent to the model.
        assert_eq!(seen.lock().unwrap().len(), 2);
        assert!(sink.events().iter().any(|e| matches!(
            e,
            SessionEvent::ProviderError { recoverable: true, .. }
        )));
        let roles: Vec<Role> = session.history().iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::User, Role::User, Role::Assistant]);
    }

    #[tokio::test]
    async fn fatal_error_terminates() {
        let fatal = LlmError::InvalidRequest {
            provider: "scripted".into(),
            message: "bad prompt".into(),
        };
        let (provider, _) = ScriptedProvider::new(vec![Err(fatal)]);
        let (registry, _) = registry();
        let mut session = Session::new(Box::new(provider), registry, "");
        let mut input = ScriptedInput::new(["hi", "never read"]);

        let err = session.run(&mut input, &NullSessionSink).await.unwrap_err();
        assert!(matches!(err, AgentError::Llm(LlmError::InvalidRequest { .. })));
        assert_eq!(*session.state(), SessionState::Terminated);
        assert_eq!(input.remaining(), 1);
    }

    #[tokio::test]
    async fn tool_rounds_are_capped() {
        let looping = "TOOL_CALL: count({})";
        let (provider, _) = ScriptedProvider::new(vec![Ok(looping), Ok(looping), Ok(looping)]);
        let (registry, calls) = registry();
        let mut session =
            Session::new(Box::new(provider), registry, "").with_max_tool_rounds(2);
        let mut input = ScriptedInput::new(["loop"]);
        let sink = RecordingSessionSink::new();

        session.run(&mut input, &sink).await.unwrap();

        assert_eq!(calls.lock().unwrap().len(), 2);
        assert!(
            sink.events()
                .contains(&SessionEvent::ToolRoundLimit { rounds: 2 })
        );
    }

    #[tokio::test]
    async fn system_prompt_lists_tools() {
        let (provider, _) = ScriptedProvider::new(vec![]);
        let (registry, _) = registry();
        let session = Session::new(Box::new(provider), registry, "Base prompt.");
        assert!(session.system_prompt().starts_with("Base prompt."));
        assert!(session.system_prompt().contains("count"));
        assert!(session.system_prompt().contains("TOOL_CALL:"));
    }
}
