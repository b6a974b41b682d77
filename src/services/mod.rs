pub mod gemini_service;
pub mod itinerary_generation_service;
pub mod prompt_service;
