use chrono::NaiveDate;

use funtrip_api::models::trip::{GuestTripRequest, Trip};
use funtrip_api::services::itinerary_generation_service::GenerationError;
use funtrip_api::services::prompt_service::{build_itinerary_prompt, trip_duration_days};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn paris_trip() -> Trip {
    Trip {
        id: None,
        user_id: None,
        name: "European Adventure".to_string(),
        city: "Paris, France".to_string(),
        stay_address: Some("123 Rue de Rivoli, 75001 Paris".to_string()),
        start_date: date(2025, 9, 1),
        end_date: date(2025, 9, 3),
        num_travelers: 2,
        budget_per_person: Some(50.0),
        activity_preferences: Some(vec!["museums".to_string(), "food".to_string()]),
        created_at: None,
        updated_at: None,
    }
}

#[test]
fn duration_counts_both_endpoints() {
    assert_eq!(
        trip_duration_days(date(2025, 9, 1), date(2025, 9, 3)).unwrap(),
        3
    );
    assert_eq!(
        trip_duration_days(date(2025, 9, 1), date(2025, 9, 1)).unwrap(),
        1
    );
}

#[test]
fn reversed_date_range_is_rejected() {
    let err = trip_duration_days(date(2025, 9, 3), date(2025, 9, 1)).unwrap_err();
    assert!(matches!(err, GenerationError::InvalidDateRange { .. }));

    let mut trip = paris_trip();
    trip.start_date = date(2025, 9, 10);
    trip.end_date = date(2025, 9, 5);
    assert!(matches!(
        build_itinerary_prompt(&trip),
        Err(GenerationError::InvalidDateRange { .. })
    ));
}

#[test]
fn prompt_states_total_budget_and_duration() {
    let prompt = build_itinerary_prompt(&paris_trip()).unwrap();

    // 50.0 per person x 2 travelers
    assert!(prompt.contains("$100.00"));
    assert!(prompt.contains("Trip Duration: 3 days"));
    assert!(prompt.contains("2025-09-01"));
    assert!(prompt.contains("2025-09-02")); // second example day
    assert!(prompt.contains("2025-09-03"));
}

#[test]
fn prompt_includes_trip_details_and_rules() {
    let prompt = build_itinerary_prompt(&paris_trip()).unwrap();

    assert!(prompt.contains("Trip Name: \"European Adventure\""));
    assert!(prompt.contains("Destination City: \"Paris, France\""));
    assert!(prompt.contains("User activity preferences: museums, food. "));
    assert!(prompt.contains("The user is staying at 123 Rue de Rivoli, 75001 Paris."));
    assert!(prompt.contains("12-hour format"));
    assert!(prompt.contains("MUST NOT exceed the total trip budget"));
}

#[test]
fn optional_sections_are_omitted_when_fields_are_absent() {
    let mut trip = paris_trip();
    trip.budget_per_person = None;
    trip.activity_preferences = None;
    trip.stay_address = None;

    let prompt = build_itinerary_prompt(&trip).unwrap();
    assert!(!prompt.contains("Total trip budget"));
    assert!(!prompt.contains("User activity preferences"));
    assert!(!prompt.contains("The user is staying at"));
    assert!(prompt.contains("General city area"));
}

#[test]
fn blank_stay_address_is_treated_as_absent() {
    let mut trip = paris_trip();
    trip.stay_address = Some("   ".to_string());

    let prompt = build_itinerary_prompt(&trip).unwrap();
    assert!(!prompt.contains("The user is staying at"));
    assert!(prompt.contains("General city area"));
}

#[test]
fn guest_and_stored_trips_produce_identical_prompts() {
    let trip = paris_trip();
    let guest = GuestTripRequest {
        name: trip.name.clone(),
        city: trip.city.clone(),
        stay_address: trip.stay_address.clone(),
        start_date: trip.start_date,
        end_date: trip.end_date,
        num_travelers: trip.num_travelers,
        budget_per_person: trip.budget_per_person,
        activity_preferences: trip.activity_preferences.clone(),
    };

    let stored_prompt = build_itinerary_prompt(&trip).unwrap();
    let guest_prompt = build_itinerary_prompt(&guest).unwrap();
    assert_eq!(stored_prompt, guest_prompt);
}
