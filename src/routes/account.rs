use actix_web::{web, HttpResponse, Responder};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use mongodb::bson::doc;
use mongodb::bson::oid::ObjectId;
use mongodb::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::db::mongo::DATABASE;
use crate::middleware::auth::Claims;
use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::user::{User, UserProfile};

const TOKEN_TTL_MINUTES: i64 = 60;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl RegisterRequest {
    fn validate(&self) -> Result<(), String> {
        if self.username.len() < 2 || self.username.len() > 30 {
            return Err("Username must be 2-30 characters".to_string());
        }
        if !self.email.contains('@') {
            return Err("Email address is not valid".to_string());
        }
        if self.password.len() < 8 {
            return Err("Password must be at least 8 characters".to_string());
        }
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err("First and last name must not be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username_or_email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

pub async fn register(
    data: web::Data<Arc<Client>>,
    input: web::Json<RegisterRequest>,
) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<User> = client.database(DATABASE).collection("Users");

    let payload = input.into_inner();
    if let Err(msg) = payload.validate() {
        return HttpResponse::BadRequest().body(msg);
    }

    // No unique indexes are assumed, so collisions are checked up front
    match collection
        .find_one(doc! { "username": &payload.username })
        .await
    {
        Ok(Some(_)) => return HttpResponse::BadRequest().body("Username already registered"),
        Ok(None) => {}
        Err(err) => {
            eprintln!("Database error: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to create account.");
        }
    }
    match collection.find_one(doc! { "email": &payload.email }).await {
        Ok(Some(_)) => return HttpResponse::BadRequest().body("Email already registered"),
        Ok(None) => {}
        Err(err) => {
            eprintln!("Database error: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to create account.");
        }
    }

    let hashed = match bcrypt::hash(&payload.password, bcrypt::DEFAULT_COST) {
        Ok(hashed) => hashed,
        Err(err) => {
            eprintln!("Failed to hash password: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to create account.");
        }
    };

    let curr_time = Utc::now();
    let mut user = User {
        id: None,
        username: payload.username,
        email: payload.email,
        password: hashed,
        first_name: payload.first_name,
        last_name: payload.last_name,
        is_active: true,
        is_verified: false,
        last_login: None,
        created_at: Some(curr_time),
        updated_at: Some(curr_time),
    };

    match collection.insert_one(&user).await {
        Ok(result) => {
            user.id = result.inserted_id.as_object_id();
            HttpResponse::Created().json(UserProfile::from(user))
        }
        Err(err) => {
            eprintln!("Failed to insert document: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to create account.")
        }
    }
}

pub async fn login(data: web::Data<Arc<Client>>, input: web::Json<LoginRequest>) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<User> = client.database(DATABASE).collection("Users");

    let payload = input.into_inner();
    let filter = doc! {
        "$or": [
            { "username": &payload.username_or_email },
            { "email": &payload.username_or_email },
        ]
    };

    match collection.find_one(filter).await {
        Ok(Some(user)) => {
            if !bcrypt::verify(&payload.password, &user.password).unwrap_or(false) {
                // same response as an unknown account, so nothing leaks
                return HttpResponse::Unauthorized().body("Incorrect username or password");
            }

            let user_id = match user.id {
                Some(id) => id,
                None => {
                    eprintln!("Stored user is missing an _id");
                    return HttpResponse::InternalServerError().body("Failed to sign in.");
                }
            };

            let update = doc! {
                "$set": { "last_login": Utc::now().to_rfc3339() }
            };
            if let Err(err) = collection
                .update_one(doc! { "_id": user_id }, update)
                .await
            {
                eprintln!("Failed to update last_login: {:?}", err);
            }

            match issue_token(&user.username, user_id) {
                Ok(token) => HttpResponse::Ok().json(TokenResponse {
                    access_token: token,
                    token_type: "bearer".to_string(),
                    expires_in: TOKEN_TTL_MINUTES * 60,
                }),
                Err(err) => {
                    eprintln!("Token generation failed: {:?}", err);
                    HttpResponse::InternalServerError().body("Failed to sign in.")
                }
            }
        }
        Ok(None) => HttpResponse::Unauthorized().body("Incorrect username or password"),
        Err(err) => {
            eprintln!("Database error: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to sign in.")
        }
    }
}

pub async fn me(user: AuthenticatedUser, data: web::Data<Arc<Client>>) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<User> = client.database(DATABASE).collection("Users");

    let user_id = match ObjectId::parse_str(&user.user_id) {
        Ok(user_id) => user_id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };

    match collection.find_one(doc! { "_id": user_id }).await {
        Ok(Some(user)) => HttpResponse::Ok().json(UserProfile::from(user)),
        Ok(None) => HttpResponse::NotFound().body("User not found"),
        Err(err) => {
            eprintln!("Failed to fetch user: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch user")
        }
    }
}

pub fn issue_token(
    username: &str,
    user_id: ObjectId,
) -> Result<String, jsonwebtoken::errors::Error> {
    let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| "default_secret".to_string());
    let now = Utc::now();

    let claims = Claims {
        sub: username.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::minutes(TOKEN_TTL_MINUTES)).timestamp() as usize,
        user_id: user_id.to_hex(),
    };

    let header = Header::new(Algorithm::HS256);
    encode(&header, &claims, &EncodingKey::from_secret(secret.as_ref()))
}
