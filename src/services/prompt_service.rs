use chrono::{Duration, NaiveDate, Utc};

use crate::models::trip::{GuestTripRequest, Trip};
use crate::services::itinerary_generation_service::GenerationError;

/// The trip fields the prompt needs, whether they come from a stored `Trip`
/// or from raw guest input. Both flows go through the same builder, so
/// equivalent fields produce identical prompts.
pub trait TripView {
    fn name(&self) -> &str;
    fn city(&self) -> &str;
    fn stay_address(&self) -> Option<&str>;
    fn start_date(&self) -> NaiveDate;
    fn end_date(&self) -> NaiveDate;
    fn num_travelers(&self) -> u32;
    fn budget_per_person(&self) -> Option<f64>;
    fn activity_preferences(&self) -> Option<&[String]>;
}

impl TripView for Trip {
    fn name(&self) -> &str {
        &self.name
    }
    fn city(&self) -> &str {
        &self.city
    }
    fn stay_address(&self) -> Option<&str> {
        self.stay_address.as_deref()
    }
    fn start_date(&self) -> NaiveDate {
        self.start_date
    }
    fn end_date(&self) -> NaiveDate {
        self.end_date
    }
    fn num_travelers(&self) -> u32 {
        self.num_travelers
    }
    fn budget_per_person(&self) -> Option<f64> {
        self.budget_per_person
    }
    fn activity_preferences(&self) -> Option<&[String]> {
        self.activity_preferences.as_deref()
    }
}

impl TripView for GuestTripRequest {
    fn name(&self) -> &str {
        &self.name
    }
    fn city(&self) -> &str {
        &self.city
    }
    fn stay_address(&self) -> Option<&str> {
        self.stay_address.as_deref()
    }
    fn start_date(&self) -> NaiveDate {
        self.start_date
    }
    fn end_date(&self) -> NaiveDate {
        self.end_date
    }
    fn num_travelers(&self) -> u32 {
        self.num_travelers
    }
    fn budget_per_person(&self) -> Option<f64> {
        self.budget_per_person
    }
    fn activity_preferences(&self) -> Option<&[String]> {
        self.activity_preferences.as_deref()
    }
}

/// Duration in days, counting both endpoints.
pub fn trip_duration_days(start: NaiveDate, end: NaiveDate) -> Result<i64, GenerationError> {
    if end < start {
        return Err(GenerationError::InvalidDateRange { start, end });
    }
    Ok((end - start).num_days() + 1)
}

/// Builds the instruction text sent to the generative model: trip details,
/// generation rules, and an example of the exact JSON document expected
/// back, with real dates from the trip window.
pub fn build_itinerary_prompt(trip: &dyn TripView) -> Result<String, GenerationError> {
    let start_date = trip.start_date();
    let end_date = trip.end_date();
    let duration_days = trip_duration_days(start_date, end_date)?;

    let preferences_str = match trip.activity_preferences() {
        Some(preferences) if !preferences.is_empty() => {
            format!("User activity preferences: {}. ", preferences.join(", "))
        }
        _ => String::new(),
    };

    let budget_str = match trip.budget_per_person() {
        Some(budget) => {
            let total_trip_budget = budget * f64::from(trip.num_travelers());
            format!(
                "Total trip budget for all travelers: ${:.2} USD. ",
                total_trip_budget
            )
        }
        None => String::new(),
    };

    let stay_address = trip
        .stay_address()
        .map(str::trim)
        .filter(|address| !address.is_empty());
    let stay_address_str = match stay_address {
        Some(address) => format!(
            "The user is staying at {}. Please factor this location into daily travel logistics and start/end points for activities.",
            address
        ),
        None => String::new(),
    };
    let accommodation_location_example = match stay_address {
        Some(address) => format!("at {}", address),
        None => "General city area".to_string(),
    };

    let today = Utc::now().format("%Y-%m-%d").to_string();
    let second_day = start_date + Duration::days(1);

    Ok(format!(
        r#"You are an expert AI trip planner. Your task is to create a detailed, daily itinerary for a trip based on the provided user details.
Today's Date: {today}

**Trip Details:**
- Trip Name: "{name}"
- Destination City: "{city}"
- Number of Travelers: {num_travelers}
- Start Date: {start_date}
- End Date: {end_date}
- Trip Duration: {duration_days} days
{preferences_str}{budget_str}
{stay_address_str}

**Important Instructions for Itinerary Generation:**
1.  **Natural Language Only:** Write descriptions that sound like a high-quality travel guide. **Do NOT** explicitly mention that an activity was chosen because of a specific user preference. Avoid repetitive use of preference keywords (e.g., do not keep saying "perfect for photography" or "great for history lovers").
    * **BAD:** "Visit the ancient palace, which is perfect for your history preference."
    * **BAD:** "Walk down the street, ideal for photography."
    * **GOOD:** "Explore the ancient palace and admire its centuries-old architecture."
    * **GOOD:** "Stroll down the vibrant street, capturing the colorful lights and bustling atmosphere."
2.  **Output Format:** Your entire response MUST be a valid JSON object strictly adhering to the following schema structure. Do NOT include any additional text, markdown, or commentary outside of the JSON. Ensure all required fields are present and types match.
3.  **Daily Plans:** Provide a plan for each day of the trip ({duration_days} days).
4.  **Activities:** Each day must have a list of activities.
    * `time`: **Provide specific times in 12-hour format (e.g., '9:00 AM', '1:30 PM', '7:00 PM'). Do NOT use general periods like Morning/Afternoon/Lunch/Evening/Night.**
    * `name`: A concise name for the activity.
    * `description`: A brief (1-2 sentence) description.
    * `location`: A general location (e.g., "Eiffel Tower area") or a specific address if a well-known landmark. Assume travel time between locations.
    * `estimated_duration_minutes`: Provide a reasonable estimate (integer, >= 5).
    * `transportation`: Suggest how to get there (e.g., "Walk", "Metro", "Taxi", "Bus", "Uber/Lyft").
    * `cost_usd`: Provide an estimated cost in USD (float, >= 0) if applicable (e.g., for tickets, meals, transport). Use 0.0 for free activities.
5.  **Dates:** Ensure the `day_date` in each `DailyPlan` is accurate and sequential starting from the trip's start date. **Crucially, ensure `day_date` is formatted as a strict "YYYY-MM-DD" string.**
6.  **Personalization (Implicit):** Use the activity preferences to **select** the types of activities, but do not explicitly label them in the final text.
7.  **Budget Constraint:** The **total estimated cost of the itinerary MUST NOT exceed the total trip budget**. It should ideally stay within or just below the total budget.
8.  **Logistics:** Consider distances between attractions within a day. Group activities geographically to minimize travel.
9.  **Realism:** Suggest realistic opening hours, typical durations, and general costs for well-known attractions. If specific times/costs are unknown, provide reasonable estimates or leave optional fields `null`.
10.  **Comprehensive Itinerary:** Include typical travel events like checking into accommodation (if applicable) and major meals (breakfast, lunch, dinner) where appropriate.

**Output Schema (Strictly follow this structure. Do not deviate.):**
```json
{{
  "title": "A creative, fun, and descriptive title based on the itinerary's main themes and highlights (e.g., 'Parisian Romance & Art Extravaganza')",
  "duration_days": {duration_days},
  "daily_plans": [
    {{
      "day_number": 1,
      "day_date": "{start_date}",
      "theme": "Arrival and Exploration",
      "activities": [
        {{
          "time": "3:00 PM",
          "name": "Check-in at accommodation",
          "description": "Settle into your accommodation.",
          "location": "{accommodation_location_example}",
          "estimated_duration_minutes": 60,
          "transportation": "Taxi/Public Transport from Airport",
          "cost_usd": 0.0
        }},
        {{
          "time": "7:30 PM",
          "name": "Welcome Dinner",
          "description": "Enjoy a casual dinner at a local restaurant.",
          "location": "Near your accommodation",
          "estimated_duration_minutes": 90,
          "transportation": "Walk",
          "cost_usd": 30.0
        }}
      ]
    }},
    {{
      "day_number": 2,
      "day_date": "{second_day}",
      "theme": "Culture and Landmarks",
      "activities": [
        {{
          "time": "9:00 AM",
          "name": "Main City Landmark (e.g., Museum, Historical Site)",
          "description": "Explore the city's main cultural attraction.",
          "location": "Specific address or landmark name",
          "estimated_duration_minutes": 180,
          "transportation": "Public Transport",
          "cost_usd": 20.0
        }},
        {{
          "time": "12:30 PM",
          "name": "Local Cafe",
          "description": "Grab a quick and authentic lunch.",
          "location": "Near landmark",
          "estimated_duration_minutes": 60,
          "transportation": "Walk",
          "cost_usd": 15.0
        }}
      ]
    }}
  ],
  "notes": "General tips for your trip, e.g., currency, emergency numbers, local customs. Ensure this is concise."
}}
```
Ensure the `day_date` fields are strictly `YYYY-MM-DD` strings. Provide actual dates based on the trip's start date. The `title`, `duration_days`, `daily_plans`, and `notes` fields must always be present in the final JSON output."#,
        today = today,
        name = trip.name(),
        city = trip.city(),
        num_travelers = trip.num_travelers(),
        start_date = start_date,
        end_date = end_date,
        duration_days = duration_days,
        preferences_str = preferences_str,
        budget_str = budget_str,
        stay_address_str = stay_address_str,
        accommodation_location_example = accommodation_location_example,
        second_day = second_day,
    ))
}
