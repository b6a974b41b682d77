use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use funtrip_api::db;
use funtrip_api::middleware;
use funtrip_api::routes;
use funtrip_api::services::gemini_service::GeminiClient;
use funtrip_api::services::itinerary_generation_service::ItineraryGenerator;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    println!("Application starting...");

    env_logger::init_from_env(Env::default().default_filter_or("info"));

    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    } else {
        println!("Release mode");
    }

    let host = std::env::var("HOST").unwrap_or_else(|_| HOST.to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| PORT.to_string())
        .parse()
        .unwrap_or(PORT);
    println!("Attempting to bind to {}:{}", host, port);

    let mongo_uri = std::env::var("MONGODB_URI").expect("MONGODB_URI must be set");
    let client = db::mongo::create_mongo_client(&mongo_uri).await;
    println!("MongoDB connection established");

    let model = GeminiClient::from_env().expect("GEMINI_API_KEY must be set");
    let generator = web::Data::new(ItineraryGenerator::new(Arc::new(model)));

    println!("Starting HTTP server...");

    HttpServer::new(move || {
        let cors = match std::env::var("FRONTEND_URL") {
            Ok(origin) => Cors::default()
                .allowed_origin(&origin)
                .allow_any_method()
                .allow_any_header()
                .supports_credentials()
                .max_age(3600),
            Err(_) => Cors::permissive(),
        };

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .route("/health", web::get().to(|| async { "OK" }))
            .app_data(web::Data::new(client.clone()))
            .app_data(generator.clone())
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/auth")
                            .route("/register", web::post().to(routes::account::register))
                            .route("/login", web::post().to(routes::account::login))
                            .service(
                                web::scope("")
                                    .wrap(middleware::auth::AuthMiddleware)
                                    .route("/me", web::get().to(routes::account::me)),
                            ),
                    )
                    .service(
                        web::scope("/trips")
                            .wrap(middleware::auth::AuthMiddleware)
                            .route("", web::post().to(routes::trip::create))
                            .route("", web::get().to(routes::trip::list))
                            .route("/{id}", web::get().to(routes::trip::get_by_id))
                            .route("/{id}", web::put().to(routes::trip::update))
                            .route("/{id}", web::delete().to(routes::trip::delete)),
                    )
                    .service(
                        web::scope("/itineraries")
                            // Public guest flow, throttled per caller address
                            .service(
                                web::scope("/guest")
                                    .wrap(middleware::rate_limit::GuestRateLimit::default())
                                    .route(
                                        "/generate",
                                        web::post().to(routes::itinerary::generate_for_guest),
                                    ),
                            )
                            // Protected routes
                            .service(
                                web::scope("")
                                    .wrap(middleware::auth::AuthMiddleware)
                                    .route(
                                        "/generate/{trip_id}",
                                        web::post().to(routes::itinerary::generate_for_trip),
                                    )
                                    .route(
                                        "/trip/{trip_id}",
                                        web::get().to(routes::itinerary::get_for_trip),
                                    )
                                    .route("/{id}", web::get().to(routes::itinerary::get_by_id))
                                    .route("/{id}", web::delete().to(routes::itinerary::delete)),
                            ),
                    ),
            )
    })
    .bind((host, port))?
    .run()
    .await
}
