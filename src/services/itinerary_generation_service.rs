use chrono::{NaiveDate, Utc};
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::{Client, Collection};
use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::db::mongo::DATABASE;
use crate::models::itinerary::{Itinerary, ItineraryContent, SchemaViolation};
use crate::models::trip::{GuestTripRequest, Trip};
use crate::services::gemini_service::{GeminiError, GenerativeModel};
use crate::services::prompt_service::{build_itinerary_prompt, TripView};

#[derive(Debug)]
pub enum GenerationError {
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
    Upstream(GeminiError),
    Format(String),
    Schema(Vec<SchemaViolation>),
    NotFound,
    Storage(mongodb::error::Error),
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationError::InvalidDateRange { start, end } => write!(
                f,
                "Invalid date range: end_date ({}) is before start_date ({})",
                end, start
            ),
            GenerationError::Upstream(err) => write!(f, "Model call failed: {}", err),
            GenerationError::Format(msg) => write!(f, "Model reply unusable: {}", msg),
            GenerationError::Schema(violations) => {
                let detail: Vec<String> = violations.iter().map(|v| v.to_string()).collect();
                write!(
                    f,
                    "Model reply violated the plan schema: {}",
                    detail.join("; ")
                )
            }
            GenerationError::NotFound => write!(f, "Trip not found"),
            GenerationError::Storage(err) => write!(f, "Storage error: {}", err),
        }
    }
}

impl Error for GenerationError {}

impl From<GeminiError> for GenerationError {
    fn from(err: GeminiError) -> Self {
        GenerationError::Upstream(err)
    }
}

impl From<mongodb::error::Error> for GenerationError {
    fn from(err: mongodb::error::Error) -> Self {
        GenerationError::Storage(err)
    }
}

/// Extracts the JSON document embedded in a raw model reply.
///
/// Tries a fenced code block first, then falls back to scanning from the
/// first `{` to the last `}`. Best-effort: the brace scan assumes a single
/// top-level object, so a stray brace in surrounding commentary can skew
/// the boundary. When no delimiter is found at all, the whole reply is
/// returned and will fail JSON parsing downstream.
pub fn extract_json_payload(raw: &str) -> &str {
    if let Some(block) = fenced_block(raw) {
        if !block.is_empty() {
            return block;
        }
    }

    match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if end > start => &raw[start..=end],
        _ => raw,
    }
}

fn fenced_block(raw: &str) -> Option<&str> {
    let open = raw.find("```")?;
    let after_fence = &raw[open + 3..];
    // the rest of the fence line is a language tag ("json"), skip it
    let body_start = after_fence.find('\n')? + 1;
    let body = &after_fence[body_start..];
    let close = body.find("```")?;
    Some(body[..close].trim())
}

/// Parses an extracted candidate into plan content. Distinguishes text that
/// is not JSON at all from JSON that does not fit the schema.
pub fn parse_plan_content(candidate: &str) -> Result<ItineraryContent, GenerationError> {
    let value: serde_json::Value = serde_json::from_str(candidate)
        .map_err(|e| GenerationError::Format(format!("reply was not valid JSON: {}", e)))?;

    serde_json::from_value(value).map_err(|e| {
        GenerationError::Format(format!(
            "reply was valid JSON but had missing or ill-typed fields: {}",
            e
        ))
    })
}

/// Next version for a trip given the highest stored one.
pub fn next_version(latest_stored: Option<i32>) -> i32 {
    latest_stored.map_or(1, |version| version + 1)
}

/// Runs the generation pipeline: prompt, model call, extraction, validation,
/// aggregation, and (for stored trips) versioned persistence.
pub struct ItineraryGenerator {
    model: Arc<dyn GenerativeModel>,
}

impl ItineraryGenerator {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    async fn generate_content(
        &self,
        trip: &dyn TripView,
    ) -> Result<(ItineraryContent, f64, i64), GenerationError> {
        let prompt = build_itinerary_prompt(trip)?;
        let raw_reply = self.model.generate(&prompt).await?;

        let candidate = extract_json_payload(&raw_reply);
        let content = parse_plan_content(candidate)?;

        let violations = content.validate_against_window(trip.start_date(), trip.end_date());
        if !violations.is_empty() {
            eprintln!(
                "Generated plan failed validation with {} violation(s)",
                violations.len()
            );
            return Err(GenerationError::Schema(violations));
        }

        let (total_cost, total_minutes) = content.estimated_totals();
        Ok((content, total_cost, total_minutes))
    }

    /// Generates and persists a new itinerary version for a stored trip.
    /// The trip must belong to `user_id`; an absent trip and a foreign trip
    /// are reported identically.
    pub async fn generate_for_trip(
        &self,
        mongo: &Client,
        trip_id: ObjectId,
        user_id: ObjectId,
    ) -> Result<Itinerary, GenerationError> {
        let trips: Collection<Trip> = mongo.database(DATABASE).collection("Trips");
        let trip = trips
            .find_one(doc! { "_id": trip_id, "user_id": user_id })
            .await?
            .ok_or(GenerationError::NotFound)?;

        let (content, total_cost, total_minutes) = self.generate_content(&trip).await?;

        let itineraries: Collection<Itinerary> = mongo.database(DATABASE).collection("Itineraries");
        let latest = itineraries
            .find_one(doc! { "trip_id": trip_id })
            .sort(doc! { "version": -1 })
            .await?
            .map(|itinerary| itinerary.version);

        let mut record = Itinerary {
            id: None,
            trip_id,
            user_id,
            generated_at: Utc::now(),
            version: next_version(latest),
            plan_data: content,
            total_estimated_cost: total_cost,
            total_estimated_duration_minutes: total_minutes,
        };

        let inserted = itineraries.insert_one(&record).await?;
        record.id = inserted.inserted_id.as_object_id();

        Ok(record)
    }

    /// Same pipeline for an unauthenticated guest: nothing is stored, the
    /// identifiers are synthetic, and the version is always 1.
    pub async fn generate_for_guest(
        &self,
        fields: &GuestTripRequest,
    ) -> Result<Itinerary, GenerationError> {
        let (content, total_cost, total_minutes) = self.generate_content(fields).await?;

        Ok(Itinerary {
            id: Some(ObjectId::new()),
            trip_id: ObjectId::new(),
            user_id: ObjectId::new(),
            generated_at: Utc::now(),
            version: 1,
            plan_data: content,
            total_estimated_cost: total_cost,
            total_estimated_duration_minutes: total_minutes,
        })
    }
}
