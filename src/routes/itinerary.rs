use actix_web::{web, HttpResponse, Responder};
use bson::doc;
use futures::TryStreamExt;
use mongodb::{bson::oid::ObjectId, Client};
use serde_json::json;
use std::sync::Arc;

use crate::db::mongo::DATABASE;
use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::itinerary::Itinerary;
use crate::models::trip::{GuestTripRequest, Trip};
use crate::services::itinerary_generation_service::{GenerationError, ItineraryGenerator};

fn generation_error_response(err: GenerationError) -> HttpResponse {
    match err {
        GenerationError::NotFound => HttpResponse::NotFound().body("Trip not found"),
        GenerationError::InvalidDateRange { .. } => HttpResponse::BadRequest().body(err.to_string()),
        GenerationError::Format(detail) => {
            eprintln!("Generation format failure: {}", detail);
            HttpResponse::BadRequest().json(json!({
                "error": "Itinerary generation failed",
                "detail": detail,
            }))
        }
        GenerationError::Schema(violations) => {
            eprintln!(
                "Generation schema failure with {} violation(s)",
                violations.len()
            );
            HttpResponse::BadRequest().json(json!({
                "error": "Itinerary generation failed",
                "violations": violations,
            }))
        }
        GenerationError::Upstream(err) => {
            eprintln!("Model call failed: {}", err);
            HttpResponse::BadGateway().body("Itinerary service is temporarily unavailable")
        }
        GenerationError::Storage(err) => {
            eprintln!("Failed to persist itinerary: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to save itinerary")
        }
    }
}

/*
    POST /api/itineraries/generate/{trip_id}
*/
pub async fn generate_for_trip(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    generator: web::Data<ItineraryGenerator>,
    path: web::Path<String>,
) -> impl Responder {
    let client = data.into_inner();

    let trip_id = match ObjectId::parse_str(&path.into_inner()) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid trip ID"),
    };
    let user_id = match ObjectId::parse_str(&user.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };

    match generator.generate_for_trip(&client, trip_id, user_id).await {
        Ok(itinerary) => HttpResponse::Created().json(itinerary),
        Err(err) => generation_error_response(err),
    }
}

/*
    POST /api/itineraries/guest/generate

    Stateless: the same pipeline as the persisted flow, but nothing is
    written and the returned identifiers are synthetic.
*/
pub async fn generate_for_guest(
    generator: web::Data<ItineraryGenerator>,
    input: web::Json<GuestTripRequest>,
) -> impl Responder {
    let fields = input.into_inner();
    if let Err(msg) = fields.validate() {
        return HttpResponse::BadRequest().body(msg);
    }

    match generator.generate_for_guest(&fields).await {
        Ok(itinerary) => HttpResponse::Ok().json(itinerary),
        Err(err) => generation_error_response(err),
    }
}

/*
    GET /api/itineraries/trip/{trip_id}
*/
pub async fn get_for_trip(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
) -> impl Responder {
    let client = data.into_inner();
    let trips: mongodb::Collection<Trip> = client.database(DATABASE).collection("Trips");
    let itineraries: mongodb::Collection<Itinerary> =
        client.database(DATABASE).collection("Itineraries");

    let trip_id = match ObjectId::parse_str(&path.into_inner()) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid trip ID"),
    };
    let user_id = match ObjectId::parse_str(&user.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };

    match trips
        .find_one(doc! { "_id": trip_id, "user_id": user_id })
        .await
    {
        Ok(Some(_)) => {}
        Ok(None) => return HttpResponse::NotFound().body("Trip not found"),
        Err(err) => {
            eprintln!("Failed to retrieve trip: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to retrieve itineraries");
        }
    }

    let cursor = itineraries
        .find(doc! { "trip_id": trip_id })
        .sort(doc! { "version": -1 })
        .await;

    match cursor {
        Ok(cursor) => match cursor.try_collect::<Vec<Itinerary>>().await {
            Ok(results) => HttpResponse::Ok().json(results),
            Err(err) => {
                eprintln!("Failed to collect itineraries: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to retrieve itineraries")
            }
        },
        Err(err) => {
            eprintln!("Failed to retrieve itineraries: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to retrieve itineraries")
        }
    }
}

/*
    GET /api/itineraries/{id}
*/
pub async fn get_by_id(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<Itinerary> =
        client.database(DATABASE).collection("Itineraries");

    let itinerary_id = match ObjectId::parse_str(&path.into_inner()) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid itinerary ID"),
    };
    let user_id = match ObjectId::parse_str(&user.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };

    match collection
        .find_one(doc! { "_id": itinerary_id, "user_id": user_id })
        .await
    {
        Ok(Some(itinerary)) => HttpResponse::Ok().json(itinerary),
        Ok(None) => HttpResponse::NotFound().body("Itinerary not found"),
        Err(err) => {
            eprintln!("Failed to retrieve itinerary: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to retrieve itinerary")
        }
    }
}

/*
    DELETE /api/itineraries/{id}
*/
pub async fn delete(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<Itinerary> =
        client.database(DATABASE).collection("Itineraries");

    let itinerary_id = match ObjectId::parse_str(&path.into_inner()) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid itinerary ID"),
    };
    let user_id = match ObjectId::parse_str(&user.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };

    match collection
        .delete_one(doc! { "_id": itinerary_id, "user_id": user_id })
        .await
    {
        Ok(result) if result.deleted_count == 0 => {
            HttpResponse::NotFound().body("Itinerary not found")
        }
        Ok(_) => HttpResponse::NoContent().finish(),
        Err(err) => {
            eprintln!("Failed to delete itinerary: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to delete itinerary")
        }
    }
}
