use async_trait::async_trait;
use serde_json::json;

use funtrip_api::services::gemini_service::{GeminiError, GenerativeModel};

/// Test double that returns a fixed reply regardless of the prompt.
pub struct CannedModel {
    pub reply: String,
}

#[async_trait]
impl GenerativeModel for CannedModel {
    async fn generate(&self, _prompt: &str) -> Result<String, GeminiError> {
        Ok(self.reply.clone())
    }
}

/// Test double that fails the way an overloaded upstream does.
pub struct FailingModel;

#[async_trait]
impl GenerativeModel for FailingModel {
    async fn generate(&self, _prompt: &str) -> Result<String, GeminiError> {
        Err(GeminiError::ResponseError(
            "generateContent failed with status 503: model overloaded".to_string(),
        ))
    }
}

/// A valid three-day plan for 2025-09-01 through 2025-09-03.
/// Totals: cost 15.0 USD, duration 135 minutes.
pub fn sample_plan_json() -> String {
    json!({
        "title": "Lisbon Light & Tile Trails",
        "duration_days": 3,
        "daily_plans": [
            {
                "day_number": 1,
                "day_date": "2025-09-01",
                "theme": "Arrival and Alfama",
                "activities": [
                    {
                        "time": "3:00 PM",
                        "name": "Check-in at accommodation",
                        "description": "Settle in and drop your bags.",
                        "location": "Baixa",
                        "estimated_duration_minutes": 30,
                        "transportation": "Metro",
                        "cost_usd": 10.0
                    },
                    {
                        "time": "7:30 PM",
                        "name": "Dinner in Alfama",
                        "description": "Grilled sardines in a narrow lane.",
                        "location": "Alfama",
                        "estimated_duration_minutes": 60,
                        "transportation": "Walk",
                        "cost_usd": null
                    }
                ]
            },
            {
                "day_number": 2,
                "day_date": "2025-09-02",
                "theme": "Belém",
                "activities": [
                    {
                        "time": "9:00 AM",
                        "name": "Jerónimos Monastery",
                        "description": "Manueline cloisters and quiet courtyards.",
                        "location": "Belém",
                        "estimated_duration_minutes": null,
                        "transportation": "Tram 15",
                        "cost_usd": 5.0
                    }
                ]
            },
            {
                "day_number": 3,
                "day_date": "2025-09-03",
                "theme": "Miradouros",
                "activities": [
                    {
                        "time": "10:00 AM",
                        "name": "Viewpoint walk",
                        "description": "A slow loop over the city's hills.",
                        "location": "Graça",
                        "estimated_duration_minutes": 45,
                        "transportation": "Walk",
                        "cost_usd": 0.0
                    }
                ]
            }
        ],
        "notes": "Carry a transit card; most viewpoints are free."
    })
    .to_string()
}

/// Guest request matching `sample_plan_json`'s trip window.
pub fn guest_fields() -> serde_json::Value {
    json!({
        "name": "Lisbon Long Weekend",
        "city": "Lisbon, Portugal",
        "stay_address": "Rua Augusta 100, Lisbon",
        "start_date": "2025-09-01",
        "end_date": "2025-09-03",
        "num_travelers": 2,
        "budget_per_person": 50.0,
        "activity_preferences": ["history", "food"]
    })
}
