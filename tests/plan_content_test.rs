use chrono::NaiveDate;

use funtrip_api::models::itinerary::{DailyPlan, ItineraryContent, PlanActivity};
use funtrip_api::services::itinerary_generation_service::{
    extract_json_payload, next_version, parse_plan_content, GenerationError,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn activity(cost_usd: Option<f64>, duration: Option<i64>) -> PlanActivity {
    PlanActivity {
        time: "9:00 AM".to_string(),
        name: "Museum visit".to_string(),
        description: None,
        location: None,
        estimated_duration_minutes: duration,
        transportation: None,
        cost_usd,
    }
}

/// Valid two-day content for 2025-09-01..2025-09-02.
fn two_day_content() -> ItineraryContent {
    ItineraryContent {
        title: "Two Days in Paris".to_string(),
        duration_days: 2,
        daily_plans: vec![
            DailyPlan {
                day_number: 1,
                day_date: date(2025, 9, 1),
                theme: None,
                activities: vec![activity(Some(10.0), Some(30)), activity(None, Some(60))],
            },
            DailyPlan {
                day_number: 2,
                day_date: date(2025, 9, 2),
                theme: Some("Landmarks".to_string()),
                activities: vec![activity(Some(5.0), None)],
            },
        ],
        notes: None,
    }
}

// --- extraction ---

#[test]
fn extracts_fenced_json_block() {
    let raw = "Here is your itinerary:\n```json\n{\"title\": \"x\"}\n```\nEnjoy your trip!";
    assert_eq!(extract_json_payload(raw), "{\"title\": \"x\"}");
}

#[test]
fn extracts_fenced_block_without_language_tag() {
    let raw = "```\n{\"title\": \"x\"}\n```";
    assert_eq!(extract_json_payload(raw), "{\"title\": \"x\"}");
}

#[test]
fn extracts_single_brace_span_from_surrounding_commentary() {
    let raw = "Sure! Here you go: {\"title\": \"x\"} Hope that helps.";
    assert_eq!(extract_json_payload(raw), "{\"title\": \"x\"}");
}

#[test]
fn plain_json_passes_through_unchanged() {
    let raw = "{\"title\": \"x\"}";
    assert_eq!(extract_json_payload(raw), raw);
}

#[test]
fn text_without_braces_passes_through_unchanged() {
    let raw = "I could not produce an itinerary.";
    assert_eq!(extract_json_payload(raw), raw);
}

#[test]
fn unbalanced_braces_pass_through_unchanged() {
    let raw = "{\"title\": \"x\"";
    assert_eq!(extract_json_payload(raw), raw);
}

// --- parsing ---

#[test]
fn non_json_reply_is_a_format_error() {
    let err = parse_plan_content("definitely not json").unwrap_err();
    match err {
        GenerationError::Format(msg) => assert!(msg.contains("not valid JSON")),
        other => panic!("expected Format error, got {:?}", other),
    }
}

#[test]
fn json_missing_required_fields_is_a_format_error() {
    let err = parse_plan_content("{\"title\": \"x\"}").unwrap_err();
    match err {
        GenerationError::Format(msg) => assert!(msg.contains("missing or ill-typed")),
        other => panic!("expected Format error, got {:?}", other),
    }
}

#[test]
fn well_formed_content_parses() {
    let content = parse_plan_content(
        &serde_json::to_string(&two_day_content()).expect("serializes"),
    )
    .unwrap();
    assert_eq!(content.duration_days, 2);
    assert_eq!(content.daily_plans.len(), 2);
}

// --- validation ---

#[test]
fn valid_content_has_no_violations() {
    let violations = two_day_content().validate_against_window(date(2025, 9, 1), date(2025, 9, 2));
    assert!(violations.is_empty(), "unexpected: {:?}", violations);
}

#[test]
fn negative_cost_is_rejected() {
    let mut content = two_day_content();
    content.daily_plans[0].activities[0].cost_usd = Some(-1.0);

    let violations = content.validate_against_window(date(2025, 9, 1), date(2025, 9, 2));
    assert!(violations.iter().any(|v| v.field.contains("cost_usd")));
}

#[test]
fn too_short_activity_duration_is_rejected() {
    let mut content = two_day_content();
    content.daily_plans[1].activities[0].estimated_duration_minutes = Some(2);

    let violations = content.validate_against_window(date(2025, 9, 1), date(2025, 9, 2));
    assert!(violations
        .iter()
        .any(|v| v.field.contains("estimated_duration_minutes")));
}

#[test]
fn duration_days_must_match_plan_count_and_window() {
    let mut content = two_day_content();
    content.duration_days = 5;

    let violations = content.validate_against_window(date(2025, 9, 1), date(2025, 9, 2));
    assert!(violations.iter().any(|v| v.field == "duration_days"));
    assert!(violations.iter().any(|v| v.field == "daily_plans"));
}

#[test]
fn day_numbers_must_be_contiguous_from_one() {
    let mut content = two_day_content();
    content.daily_plans[1].day_number = 3;

    let violations = content.validate_against_window(date(2025, 9, 1), date(2025, 9, 2));
    assert!(violations
        .iter()
        .any(|v| v.field == "daily_plans[1].day_number"));
}

#[test]
fn day_dates_must_follow_the_trip_start() {
    let mut content = two_day_content();
    content.daily_plans[1].day_date = date(2025, 9, 5);

    let violations = content.validate_against_window(date(2025, 9, 1), date(2025, 9, 2));
    assert!(violations
        .iter()
        .any(|v| v.field == "daily_plans[1].day_date"));
}

// --- aggregation ---

#[test]
fn totals_treat_missing_values_as_zero() {
    // costs [10.0, None, 5.0], durations [30, 60, None]
    let (cost, minutes) = two_day_content().estimated_totals();
    assert_eq!(cost, 15.0);
    assert_eq!(minutes, 90);
}

#[test]
fn totals_are_zero_for_an_empty_plan_list() {
    let content = ItineraryContent {
        title: "Empty".to_string(),
        duration_days: 1,
        daily_plans: vec![],
        notes: None,
    };
    assert_eq!(content.estimated_totals(), (0.0, 0));
}

// --- versioning ---

#[test]
fn first_generation_gets_version_one() {
    assert_eq!(next_version(None), 1);
}

#[test]
fn later_generations_increment_the_highest_stored_version() {
    assert_eq!(next_version(Some(1)), 2);
    assert_eq!(next_version(Some(7)), 8);
}
