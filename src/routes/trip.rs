use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::Client;
use std::sync::Arc;

use crate::db::mongo::DATABASE;
use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::itinerary::Itinerary;
use crate::models::trip::{Trip, TripPayload, TripUpdate};

fn parse_object_id(raw: &str, what: &str) -> Result<ObjectId, HttpResponse> {
    ObjectId::parse_str(raw)
        .map_err(|_| HttpResponse::BadRequest().body(format!("Invalid {} ID", what)))
}

/*
    POST /api/trips
*/
pub async fn create(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    input: web::Json<TripPayload>,
) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<Trip> = client.database(DATABASE).collection("Trips");

    let payload = input.into_inner();
    if let Err(msg) = payload.validate() {
        return HttpResponse::BadRequest().body(msg);
    }

    let user_id = match parse_object_id(&user.user_id, "user") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let curr_time = Utc::now();
    let mut trip = Trip {
        id: None,
        user_id: Some(user_id),
        name: payload.name,
        city: payload.city,
        stay_address: payload.stay_address,
        start_date: payload.start_date,
        end_date: payload.end_date,
        num_travelers: payload.num_travelers,
        budget_per_person: payload.budget_per_person,
        activity_preferences: payload.activity_preferences,
        created_at: Some(curr_time),
        updated_at: Some(curr_time),
    };

    match collection.insert_one(&trip).await {
        Ok(result) => {
            trip.id = result.inserted_id.as_object_id();
            HttpResponse::Created().json(trip)
        }
        Err(err) => {
            eprintln!("Failed to insert trip: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to create trip.")
        }
    }
}

/*
    GET /api/trips
*/
pub async fn list(user: AuthenticatedUser, data: web::Data<Arc<Client>>) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<Trip> = client.database(DATABASE).collection("Trips");

    let user_id = match parse_object_id(&user.user_id, "user") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match collection.find(doc! { "user_id": user_id }).await {
        Ok(cursor) => match cursor.try_collect::<Vec<Trip>>().await {
            Ok(trips) => HttpResponse::Ok().json(trips),
            Err(err) => {
                eprintln!("Failed to collect trips: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to retrieve trips")
            }
        },
        Err(err) => {
            eprintln!("Failed to retrieve trips: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to retrieve trips")
        }
    }
}

/*
    GET /api/trips/{id}
*/
pub async fn get_by_id(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<Trip> = client.database(DATABASE).collection("Trips");

    let trip_id = match parse_object_id(&path.into_inner(), "trip") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let user_id = match parse_object_id(&user.user_id, "user") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    // scoped by owner: a foreign trip looks identical to a missing one
    match collection
        .find_one(doc! { "_id": trip_id, "user_id": user_id })
        .await
    {
        Ok(Some(trip)) => HttpResponse::Ok().json(trip),
        Ok(None) => HttpResponse::NotFound().body("Trip not found"),
        Err(err) => {
            eprintln!("Failed to retrieve trip: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to retrieve trip")
        }
    }
}

/*
    PUT /api/trips/{id}

    `city` and `stay_address` are fixed at creation; any values sent for
    them are ignored.
*/
pub async fn update(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
    input: web::Json<TripUpdate>,
) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<Trip> = client.database(DATABASE).collection("Trips");

    let trip_id = match parse_object_id(&path.into_inner(), "trip") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let user_id = match parse_object_id(&user.user_id, "user") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let mut trip = match collection
        .find_one(doc! { "_id": trip_id, "user_id": user_id })
        .await
    {
        Ok(Some(trip)) => trip,
        Ok(None) => return HttpResponse::NotFound().body("Trip not found"),
        Err(err) => {
            eprintln!("Failed to retrieve trip: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to update trip");
        }
    };

    input.into_inner().apply_to(&mut trip);

    // the merged record must still satisfy the creation constraints
    let check = TripPayload {
        name: trip.name.clone(),
        city: trip.city.clone(),
        stay_address: trip.stay_address.clone(),
        start_date: trip.start_date,
        end_date: trip.end_date,
        num_travelers: trip.num_travelers,
        budget_per_person: trip.budget_per_person,
        activity_preferences: None,
    };
    if let Err(msg) = check.validate() {
        return HttpResponse::BadRequest().body(msg);
    }

    trip.updated_at = Some(Utc::now());

    match collection
        .replace_one(doc! { "_id": trip_id, "user_id": user_id }, &trip)
        .await
    {
        Ok(_) => HttpResponse::Ok().json(trip),
        Err(err) => {
            eprintln!("Failed to update trip: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to update trip")
        }
    }
}

/*
    DELETE /api/trips/{id}

    Deletes the trip's itineraries first so no orphans remain.
*/
pub async fn delete(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
) -> impl Responder {
    let client = data.into_inner();
    let trips: mongodb::Collection<Trip> = client.database(DATABASE).collection("Trips");
    let itineraries: mongodb::Collection<Itinerary> =
        client.database(DATABASE).collection("Itineraries");

    let trip_id = match parse_object_id(&path.into_inner(), "trip") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let user_id = match parse_object_id(&user.user_id, "user") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match trips
        .find_one(doc! { "_id": trip_id, "user_id": user_id })
        .await
    {
        Ok(Some(_)) => {}
        Ok(None) => return HttpResponse::NotFound().body("Trip not found"),
        Err(err) => {
            eprintln!("Failed to retrieve trip: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to delete trip");
        }
    }

    if let Err(err) = itineraries.delete_many(doc! { "trip_id": trip_id }).await {
        eprintln!("Failed to delete itineraries for trip: {:?}", err);
        return HttpResponse::InternalServerError().body("Failed to delete trip");
    }

    match trips
        .delete_one(doc! { "_id": trip_id, "user_id": user_id })
        .await
    {
        Ok(_) => HttpResponse::NoContent().finish(),
        Err(err) => {
            eprintln!("Failed to delete trip: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to delete trip")
        }
    }
}
