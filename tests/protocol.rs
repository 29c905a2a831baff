use meal_agent::llm::{TextToolProtocol, ToolCallExtractor, contains_directive};
use meal_agent::nutrition::{MealCategory, normalize_meal};
use meal_agent::tools::args::unwrap_arguments;

const KNOWN: [&str; 2] = ["fitbit_log_meal", "save_meal_locally"];

#[test]
fn model_reply_to_canonical_meal() {
    let reply = r#"Great choice! I'll log that.

TOOL_CALL: fitbit_log_meal({"mealType": "evening", "items": [{"food": "pad thai (large)", "amount": "one", "cals": "650"}], "notes": "takeout"});"#;

    let calls = TextToolProtocol.extract(reply, &KNOWN);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].id, "call_1");

    let args = unwrap_arguments(calls[0].arguments().unwrap()).unwrap();
    let meal = normalize_meal(&args).unwrap();
    assert_eq!(meal.category, MealCategory::Dinner);
    assert_eq!(meal.items[0].name, "pad thai (large)");
    assert!((meal.items[0].quantity - 1.0).abs() < f64::EPSILON);
    assert!((meal.total_calories() - 650.0).abs() < f64::EPSILON);
    assert_eq!(meal.notes, "takeout");
}

#[test]
fn truncated_call_is_wrapped_then_rejected_by_the_tool_layer() {
    let reply = r#"TOOL_CALL: fitbit_log_meal({"meal_type": "lunch", "foods": [{"name": "soup""#;
    let calls = TextToolProtocol.extract(reply, &KNOWN);
    assert_eq!(calls.len(), 1);

    let args = calls[0].arguments().unwrap();
    assert!(args.get("input").is_some());
    let err = unwrap_arguments(args).unwrap_err();
    assert!(err.to_string().contains("truncated or invalid JSON"));
}

#[test]
fn fallback_grammars_only_when_no_directive() {
    let prose = r#"Call save_meal_locally with {"meal_data": {"meal_type": "snack"}}"#;
    assert!(!contains_directive(prose));
    let calls = TextToolProtocol.extract(prose, &KNOWN);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].name, "save_meal_locally");

    let bare_unknown = r#"other_tool({"a": 1})"#;
    assert!(TextToolProtocol.extract(bare_unknown, &KNOWN).is_empty());
}

#[test]
fn canonical_meal_round_trips_through_normalizer() {
    let reply = r#"TOOL_CALL: fitbit_log_meal({"meal": "AM", "foods": {"name": "oatmeal", "quantity": "1/2", "unit": "Cup", "calories": 150}})"#;
    let calls = TextToolProtocol.extract(reply, &KNOWN);
    let meal = normalize_meal(&calls[0].arguments().unwrap()).unwrap();
    assert_eq!(meal.items[0].unit, "cups");
    assert!((meal.items[0].quantity - 0.5).abs() < f64::EPSILON);
    assert_eq!(normalize_meal(&meal.to_raw()).unwrap(), meal);
}
