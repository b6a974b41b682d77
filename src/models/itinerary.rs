use chrono::{DateTime, Duration, NaiveDate, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;

const MIN_ACTIVITY_DURATION_MINUTES: i64 = 5;

/// One stored (or, for guests, returned) generation result for a trip.
/// `version` counts generations per trip starting at 1; the two totals are
/// derived from `plan_data`, never set directly.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Itinerary {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub trip_id: ObjectId,
    pub user_id: ObjectId,
    pub generated_at: DateTime<Utc>,
    pub version: i32,
    pub plan_data: ItineraryContent,
    pub total_estimated_cost: f64,
    pub total_estimated_duration_minutes: i64,
}

/// The structured document the model is asked to produce.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ItineraryContent {
    pub title: String,
    pub duration_days: i64,
    pub daily_plans: Vec<DailyPlan>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DailyPlan {
    pub day_number: i64,
    pub day_date: NaiveDate,
    pub theme: Option<String>,
    pub activities: Vec<PlanActivity>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PlanActivity {
    pub time: String,
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub estimated_duration_minutes: Option<i64>,
    pub transportation: Option<String>,
    pub cost_usd: Option<f64>,
}

/// A single field-level problem found while checking generated content.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaViolation {
    pub field: String,
    pub reason: String,
}

impl SchemaViolation {
    fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaViolation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

impl ItineraryContent {
    /// Checks the document against its own constraints and against the trip
    /// window it was generated for. Returns every violation found; the
    /// document is only usable when the list comes back empty.
    pub fn validate_against_window(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Vec<SchemaViolation> {
        let mut violations = Vec::new();

        if self.title.trim().is_empty() {
            violations.push(SchemaViolation::new("title", "must not be empty"));
        }
        if self.duration_days < 1 {
            violations.push(SchemaViolation::new("duration_days", "must be at least 1"));
        }

        let expected_days = (end_date - start_date).num_days() + 1;
        if self.duration_days != expected_days {
            violations.push(SchemaViolation::new(
                "duration_days",
                format!(
                    "expected {} for {} through {}, got {}",
                    expected_days, start_date, end_date, self.duration_days
                ),
            ));
        }
        if self.daily_plans.len() as i64 != self.duration_days {
            violations.push(SchemaViolation::new(
                "daily_plans",
                format!(
                    "expected {} entries to match duration_days, got {}",
                    self.duration_days,
                    self.daily_plans.len()
                ),
            ));
        }

        for (idx, plan) in self.daily_plans.iter().enumerate() {
            let path = format!("daily_plans[{}]", idx);
            let expected_number = idx as i64 + 1;

            if plan.day_number < 1 {
                violations.push(SchemaViolation::new(
                    format!("{}.day_number", path),
                    "must be at least 1",
                ));
            }
            if plan.day_number != expected_number {
                violations.push(SchemaViolation::new(
                    format!("{}.day_number", path),
                    format!(
                        "days must be contiguous starting at 1, expected {}, got {}",
                        expected_number, plan.day_number
                    ),
                ));
            }

            let expected_date = start_date + Duration::days(idx as i64);
            if plan.day_date != expected_date {
                violations.push(SchemaViolation::new(
                    format!("{}.day_date", path),
                    format!("expected {}, got {}", expected_date, plan.day_date),
                ));
            }

            for (activity_idx, activity) in plan.activities.iter().enumerate() {
                let activity_path = format!("{}.activities[{}]", path, activity_idx);

                if activity.time.trim().is_empty() {
                    violations.push(SchemaViolation::new(
                        format!("{}.time", activity_path),
                        "must not be empty",
                    ));
                }
                if activity.name.trim().is_empty() {
                    violations.push(SchemaViolation::new(
                        format!("{}.name", activity_path),
                        "must not be empty",
                    ));
                }
                if let Some(minutes) = activity.estimated_duration_minutes {
                    if minutes < MIN_ACTIVITY_DURATION_MINUTES {
                        violations.push(SchemaViolation::new(
                            format!("{}.estimated_duration_minutes", activity_path),
                            format!(
                                "must be at least {} minutes, got {}",
                                MIN_ACTIVITY_DURATION_MINUTES, minutes
                            ),
                        ));
                    }
                }
                if let Some(cost) = activity.cost_usd {
                    if cost < 0.0 {
                        violations.push(SchemaViolation::new(
                            format!("{}.cost_usd", activity_path),
                            format!("must not be negative, got {}", cost),
                        ));
                    }
                }
            }
        }

        violations
    }

    /// Sums estimated cost and duration over every activity of every day.
    /// Missing values contribute nothing.
    pub fn estimated_totals(&self) -> (f64, i64) {
        let mut total_cost = 0.0;
        let mut total_minutes = 0;

        for plan in &self.daily_plans {
            for activity in &plan.activities {
                if let Some(cost) = activity.cost_usd {
                    total_cost += cost;
                }
                if let Some(minutes) = activity.estimated_duration_minutes {
                    total_minutes += minutes;
                }
            }
        }

        (total_cost, total_minutes)
    }
}
