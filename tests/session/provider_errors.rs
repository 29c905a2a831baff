use super::scripted_provider::ScriptedProvider;
use meal_agent::AgentError;
use meal_agent::agent::{RecordingSessionSink, ScriptedInput, Session, SessionEvent, SessionState};
use meal_agent::error::LlmError;
use meal_agent::tools::ToolRegistry;
use std::sync::Arc;

fn quota() -> LlmError {
    LlmError::QuotaExceeded {
        provider: "gemini".into(),
        message: "quota exhausted for today".into(),
    }
}

#[tokio::test]
async fn recoverable_failure_shows_remediation_and_continues() {
    let (provider, seen) = ScriptedProvider::new([Err(quota()), Ok("Hi again")]);
    let mut session = Session::new(Box::new(provider), Arc::new(ToolRegistry::new()), "");
    let mut input = ScriptedInput::new(["hello", "ok", "hello again"]);
    let sink = RecordingSessionSink::new();

    session.run(&mut input, &sink).await.unwrap();

    assert_eq!(seen.lock().unwrap().len(), 2);
    let remediation = sink.events().into_iter().find_map(|e| match e {
        SessionEvent::ProviderError {
            remediation,
            recoverable: true,
            ..
        } => Some(remediation),
        _ => None,
    });
    assert!(remediation.unwrap().contains("quota"));
}

#[tokio::test]
async fn unknown_error_with_network_keyword_is_recoverable() {
    let flaky = LlmError::Unknown {
        provider: "ollama".into(),
        message: "network unreachable".into(),
    };
    let (provider, _) = ScriptedProvider::new([Err::<&str, _>(flaky)]);
    let mut session = Session::new(Box::new(provider), Arc::new(ToolRegistry::new()), "");
    let mut input = ScriptedInput::new(["hello"]);

    // Acknowledgement never comes: input ends and the session closes cleanly.
    session
        .run(&mut input, &RecordingSessionSink::new())
        .await
        .unwrap();
    assert_eq!(*session.state(), SessionState::Terminated);
}

#[tokio::test]
async fn unclassified_failure_ends_the_session() {
    let broken = LlmError::Unknown {
        provider: "ollama".into(),
        message: "model produced invalid output".into(),
    };
    let (provider, _) = ScriptedProvider::new([Err::<&str, _>(broken)]);
    let mut session = Session::new(Box::new(provider), Arc::new(ToolRegistry::new()), "");
    let mut input = ScriptedInput::new(["hello", "unused"]);
    let sink = RecordingSessionSink::new();

    let err = session.run(&mut input, &sink).await.unwrap_err();
    assert!(matches!(err, AgentError::Llm(LlmError::Unknown { .. })));
    assert!(sink.events().iter().any(|e| matches!(
        e,
        SessionEvent::ProviderError {
            recoverable: false,
            ..
        }
    )));
}

#[tokio::test]
async fn rejected_api_key_keeps_the_session_alive() {
    let bad_key = LlmError::InvalidRequest {
        provider: "gemini".into(),
        message: "API key not valid. Please pass a valid API key.".into(),
    };
    let (provider, seen) = ScriptedProvider::new([Err(bad_key), Ok("Welcome back")]);
    let mut session = Session::new(Box::new(provider), Arc::new(ToolRegistry::new()), "");
    let mut input = ScriptedInput::new(["hello", "", "hello again"]);
    let sink = RecordingSessionSink::new();

    session.run(&mut input, &sink).await.unwrap();

    assert_eq!(seen.lock().unwrap().len(), 2);
    assert_eq!(*session.state(), SessionState::Terminated);
    let remediation = sink.events().into_iter().find_map(|e| match e {
        SessionEvent::ProviderError {
            remediation,
            recoverable: true,
            ..
        } => Some(remediation),
        _ => None,
    });
    assert!(remediation.unwrap().contains("GEMINI_API_KEY"));
}
