use super::*;
use serde_json::{Value, json};

const KNOWN: [&str; 3] = ["fitbit_log_meal", "fitbit_login", "view_daily_summary"];

fn args(request: &ToolInvocationRequest) -> Value {
    serde_json::from_str(&request.raw_arguments).unwrap()
}

#[test]
fn primary_grammar_extracts_name_and_json() {
    let text = r#"Logging that now.
TOOL_CALL: fitbit_log_meal({"meal_type": "breakfast", "foods": [{"name": "eggs", "quantity": 2, "unit": "large", "calories": 140}]})"#;

    let calls = extract_tool_calls(text, &KNOWN);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].id, "call_1");
    assert_eq!(calls[0].name, "fitbit_log_meal");
    assert_eq!(args(&calls[0])["foods"][0]["calories"], 140);
}

#[test]
fn whitespace_around_identifier_is_tolerated() {
    let calls = extract_tool_calls("TOOL_CALL:   fitbit_login   ({})", &KNOWN);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].name, "fitbit_login");
    assert_eq!(calls[0].raw_arguments, "{}");
}

#[test]
fn parens_inside_strings_do_not_end_arguments() {
    let text = r#"TOOL_CALL: fitbit_log_meal({"meal_type": "lunch", "notes": "soup (tomato) :)", "foods": [{"name": "soup", "calories": 90}]}) done"#;
    let calls = extract_tool_calls(text, &KNOWN);
    assert_eq!(args(&calls[0])["notes"], "soup (tomato) :)");
}

#[test]
fn trailing_semicolon_is_removed() {
    let calls = extract_tool_calls(r#"TOOL_CALL: view_daily_summary({"date": "2024-02-03"});"#, &KNOWN);
    assert_eq!(args(&calls[0]), json!({"date": "2024-02-03"}));

    let calls = extract_tool_calls(r#"TOOL_CALL: view_daily_summary({"date": "2024-02-03"} ;)"#, &KNOWN);
    assert_eq!(args(&calls[0]), json!({"date": "2024-02-03"}));
}

#[test]
fn empty_arguments_become_empty_object() {
    let calls = extract_tool_calls("TOOL_CALL: fitbit_login()", &KNOWN);
    assert_eq!(calls[0].raw_arguments, "{}");
}

#[test]
fn invalid_json_is_wrapped_as_input() {
    let calls = extract_tool_calls(
        r#"TOOL_CALL: fitbit_log_meal({"meal_type": "lunch", "foods": [)"#,
        &KNOWN,
    );
    assert_eq!(calls.len(), 1);
    let value = args(&calls[0]);
    assert_eq!(value["input"], r#"{"meal_type": "lunch", "foods": ["#);
}

#[test]
fn unbalanced_call_takes_remainder() {
    let calls = extract_tool_calls(
        r#"TOOL_CALL: fitbit_log_meal({"meal_type": "dinner", "foods": [{"name": "pie""#,
        &KNOWN,
    );
    assert_eq!(calls.len(), 1);
    assert_eq!(
        args(&calls[0])["input"],
        r#"{"meal_type": "dinner", "foods": [{"name": "pie""#
    );
}

#[test]
fn multiple_calls_keep_order_and_sequential_ids() {
    let text = "TOOL_CALL: fitbit_login({})\nthen\nTOOL_CALL: view_daily_summary({})";
    let calls = extract_tool_calls(text, &KNOWN);
    let names: Vec<&str> = calls.iter().map(|c| c.name.as_str()).collect();
    let ids: Vec<&str> = calls.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(names, ["fitbit_login", "view_daily_summary"]);
    assert_eq!(ids, ["call_1", "call_2"]);
}

#[test]
fn markers_inside_consumed_arguments_are_not_rescanned() {
    let text = r#"TOOL_CALL: save_meal_locally({"meal_data": {"notes": "TOOL_CALL: fitbit_login({})"}})"#;
    let calls = extract_tool_calls(text, &KNOWN);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].name, "save_meal_locally");
}

#[test]
fn unknown_names_are_still_reported_by_primary_grammar() {
    let calls = extract_tool_calls("TOOL_CALL: order_pizza({})", &KNOWN);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].name, "order_pizza");
}

#[test]
fn fallbacks_are_ignored_when_primary_matches() {
    let text = "TOOL_CALL: fitbit_login({})\nCall view_daily_summary with {}";
    let calls = extract_tool_calls(text, &KNOWN);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].name, "fitbit_login");
}

#[test]
fn fenced_block_fallback() {
    let text = "Here you go:\n```tool_call\nview_daily_summary({\"date\": \"2024-04-01\"})\n```";
    let calls = extract_tool_calls(text, &KNOWN);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].id, "call_1");
    assert_eq!(args(&calls[0])["date"], "2024-04-01");
}

#[test]
fn prose_fallback() {
    let text = r#"I will Call fitbit_log_meal with {"meal_type": "snack", "foods": [{"name": "apple", "calories": 95}]}"#;
    let calls = extract_tool_calls(text, &KNOWN);
    assert_eq!(calls.len(), 1);
    assert_eq!(args(&calls[0])["foods"][0]["name"], "apple");
}

#[test]
fn bare_fallback_only_for_known_tools() {
    let text = r#"Sure: view_daily_summary({"date": "2024-01-01"})"#;
    assert_eq!(extract_tool_calls(text, &KNOWN).len(), 1);
    assert!(extract_tool_calls(text, &["fitbit_login"]).is_empty());
}

#[test]
fn plain_replies_have_no_calls() {
    assert!(extract_tool_calls("Great choice! That's about 300 calories.", &KNOWN).is_empty());
    assert!(extract_tool_calls("", &KNOWN).is_empty());
}

#[test]
fn directive_detection() {
    assert!(contains_directive("please run TOOL_CALL: fitbit_login({})"));
    assert!(!contains_directive("tool call"));
}

#[test]
fn extractor_trait_delegates() {
    let extractor: &dyn ToolCallExtractor = &TextToolProtocol;
    let calls = extractor.extract("TOOL_CALL: fitbit_login({})", &KNOWN);
    assert_eq!(calls.len(), 1);
}
