use chrono::{DateTime, NaiveDate, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Trip {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: Option<ObjectId>,
    pub name: String,
    pub city: String,
    pub stay_address: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub num_travelers: u32,
    pub budget_per_person: Option<f64>,
    pub activity_preferences: Option<Vec<String>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_num_travelers() -> u32 {
    1
}

/// Payload for creating a trip.
#[derive(Debug, Deserialize)]
pub struct TripPayload {
    pub name: String,
    pub city: String,
    pub stay_address: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default = "default_num_travelers")]
    pub num_travelers: u32,
    pub budget_per_person: Option<f64>,
    pub activity_preferences: Option<Vec<String>>,
}

impl TripPayload {
    pub fn validate(&self) -> Result<(), String> {
        validate_trip_fields(
            &self.name,
            &self.city,
            self.start_date,
            self.end_date,
            self.num_travelers,
            self.budget_per_person,
        )
    }
}

/// Payload for updating a trip. All fields optional; `city` and
/// `stay_address` are immutable after creation and not accepted here.
#[derive(Debug, Deserialize)]
pub struct TripUpdate {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub num_travelers: Option<u32>,
    pub budget_per_person: Option<f64>,
    pub activity_preferences: Option<Vec<String>>,
}

impl TripUpdate {
    /// Applies the provided fields onto an existing trip record.
    pub fn apply_to(&self, trip: &mut Trip) {
        if let Some(name) = &self.name {
            trip.name = name.clone();
        }
        if let Some(start_date) = self.start_date {
            trip.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            trip.end_date = end_date;
        }
        if let Some(num_travelers) = self.num_travelers {
            trip.num_travelers = num_travelers;
        }
        if let Some(budget) = self.budget_per_person {
            trip.budget_per_person = Some(budget);
        }
        if let Some(preferences) = &self.activity_preferences {
            trip.activity_preferences = Some(preferences.clone());
        }
    }
}

/// Trip fields submitted directly by an unauthenticated guest. Nothing is
/// stored; the fields only feed one generation call.
#[derive(Debug, Deserialize, Serialize)]
pub struct GuestTripRequest {
    pub name: String,
    pub city: String,
    pub stay_address: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default = "default_num_travelers")]
    pub num_travelers: u32,
    pub budget_per_person: Option<f64>,
    pub activity_preferences: Option<Vec<String>>,
}

impl GuestTripRequest {
    pub fn validate(&self) -> Result<(), String> {
        validate_trip_fields(
            &self.name,
            &self.city,
            self.start_date,
            self.end_date,
            self.num_travelers,
            self.budget_per_person,
        )
    }
}

fn validate_trip_fields(
    name: &str,
    city: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
    num_travelers: u32,
    budget_per_person: Option<f64>,
) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Trip name must not be empty".to_string());
    }
    if city.trim().is_empty() {
        return Err("Destination city must not be empty".to_string());
    }
    if end_date < start_date {
        return Err(format!(
            "end_date ({}) must not be before start_date ({})",
            end_date, start_date
        ));
    }
    if num_travelers < 1 {
        return Err("num_travelers must be at least 1".to_string());
    }
    if let Some(budget) = budget_per_person {
        if budget < 0.0 {
            return Err("budget_per_person must not be negative".to_string());
        }
    }
    Ok(())
}
