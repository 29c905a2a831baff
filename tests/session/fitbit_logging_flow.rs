use super::scripted_provider::ScriptedProvider;
use meal_agent::agent::{RecordingSessionSink, ScriptedInput, Session, SessionEvent};
use meal_agent::auth::{CredentialStore, FitbitCredentials};
use meal_agent::config::Config;
use meal_agent::error::LlmError;
use meal_agent::tools::default_registry;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LOG_BREAKFAST: &str = r#"Sounds tasty! Logging it now.
TOOL_CALL: fitbit_log_meal({"meal_type": "breakfast", "foods": [{"name": "scrambled eggs", "quantity": 2, "unit": "large", "calories": 180}], "toast": [{"name": "whole wheat toast", "quantity": "1", "calories": "80"}], "total_calories": 260, "date": "2024-06-01"})"#;

fn config_for(server: &MockServer, tmp: &TempDir) -> Config {
    let mut config = Config {
        data_dir: tmp.path().to_path_buf(),
        ..Config::default()
    };
    config.fitbit.api_base = server.uri();
    config
}

fn signed_in(config: &Config) -> Arc<CredentialStore> {
    let store = CredentialStore::open(config.credentials_path()).unwrap();
    store
        .save(FitbitCredentials {
            access_token: "access".into(),
            refresh_token: Some("refresh".into()),
            user_id: Some("ABC".into()),
            expires_at: None,
        })
        .unwrap();
    Arc::new(store)
}

#[tokio::test]
async fn described_meal_is_logged_item_by_item() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/1/user/ABC/foods/log.json"))
        .and(body_string_contains("mealTypeId=1"))
        .and(body_string_contains("date=2024-06-01"))
        .respond_with(ResponseTemplate::new(201))
        .expect(2)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let config = config_for(&server, &tmp);
    let registry = Arc::new(default_registry(&config, &signed_in(&config)));

    let (provider, seen) = ScriptedProvider::new([
        Ok::<_, LlmError>(LOG_BREAKFAST),
        Ok("Logged 260 calories for breakfast."),
    ]);
    let mut session = Session::new(Box::new(provider), registry, "You log meals.");
    let mut input = ScriptedInput::new(["I had two scrambled eggs and a slice of toast"]);
    let sink = RecordingSessionSink::new();

    session.run(&mut input, &sink).await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    let tool_result = seen[1].last().unwrap().tool_output().unwrap();
    assert!(tool_result.starts_with("Successfully logged breakfast to Fitbit"));
    assert!(tool_result.contains("- whole wheat toast (1 slices): ~80 cal"));
    assert!(tool_result.contains("Total: ~260 calories"));

    assert!(sink.events().iter().any(|e| matches!(
        e,
        SessionEvent::ToolFinished { name, result } if name == "fitbit_log_meal" && result.success
    )));
}

#[tokio::test]
async fn expired_token_suggestion_is_not_auto_executed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let config = config_for(&server, &tmp);
    let registry = Arc::new(default_registry(&config, &signed_in(&config)));

    let (provider, seen) = ScriptedProvider::new([
        Ok::<_, LlmError>(LOG_BREAKFAST),
        Ok("Your Fitbit session expired. Shall I reconnect?"),
    ]);
    let mut session = Session::new(Box::new(provider), registry, "");
    let mut input = ScriptedInput::new(["eggs and toast for breakfast"]);
    let sink = RecordingSessionSink::new();

    session.run(&mut input, &sink).await.unwrap();

    let seen = seen.lock().unwrap();
    let tool_result = seen[1].last().unwrap().tool_output().unwrap();
    assert!(tool_result.contains("TOOL_CALL: fitbit_login({})"));

    let started: Vec<String> = sink
        .events()
        .into_iter()
        .filter_map(|e| match e {
            SessionEvent::ToolStarted { name, .. } => Some(name),
            _ => None,
        })
        .collect();
    assert_eq!(started, vec!["fitbit_log_meal"]);
    assert!(
        sink.events()
            .contains(&SessionEvent::ToolSuggestedAction {
                name: "fitbit_log_meal".into()
            })
    );
}

#[tokio::test]
async fn calorie_mismatch_is_reported_to_the_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let config = config_for(&server, &tmp);
    let registry = Arc::new(default_registry(&config, &signed_in(&config)));

    let reply = r#"TOOL_CALL: fitbit_log_meal({"meal_type": "lunch", "foods": [{"name": "burrito", "calories": 700}], "total_calories": 900})"#;
    let (provider, seen) = ScriptedProvider::new([Ok::<_, LlmError>(reply), Ok("Let me fix that.")]);
    let mut session = Session::new(Box::new(provider), registry, "");
    let mut input = ScriptedInput::new(["burrito for lunch"]);

    session
        .run(&mut input, &meal_agent::agent::NullSessionSink)
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(
        seen[1].last().unwrap().tool_output(),
        Some("Error: calorie mismatch: calculated 700 calories but expected 900 calories")
    );
}
