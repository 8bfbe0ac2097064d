mod api;
mod database;
mod middleware;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::env;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn cors_origins() -> Vec<String> {
    env::var("CORS_ORIGINS")
        .unwrap_or_else(|_| {
            // The frontends the original deployment serves
            "http://localhost:5173,https://suggestify-bd.web.app,https://suggestify-bd.firebaseapp.com"
                .to_string()
        })
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Get configuration from environment
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "5000".to_string());
    let mongodb_uri =
        env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    let database_name = env::var("MONGODB_DATABASE").unwrap_or_else(|_| "Suggestify".to_string());

    log::info!("🚀 Starting Suggestify Service...");
    log::info!("📊 Database: {}", database_name);

    // Initialize MongoDB connection
    let db = database::MongoDB::new(&mongodb_uri, &database_name)
        .await
        .expect("Failed to connect to MongoDB");

    let db_data = web::Data::new(db.clone());

    log::info!("✅ MongoDB connected successfully");

    let origins = cors_origins();

    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);

    // Start HTTP server
    HttpServer::new(move || {
        // Cookie auth across origins needs credentials support
        let cors = origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .supports_credentials()
            .max_age(3600);

        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(db_data.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone()),
            )
            // Liveness & health
            .route("/", web::get().to(api::health::root))
            .route("/health", web::get().to(api::health::health_check))
            // Auth
            .route("/jwt", web::post().to(api::auth::issue_token))
            .route("/logout", web::post().to(api::auth::logout))
            // Queries
            .route("/add-query", web::post().to(api::queries::add_query))
            .route("/queries", web::get().to(api::queries::search_queries))
            .route("/queries-home", web::get().to(api::queries::home_queries))
            .route("/queries/{email}", web::get().to(api::queries::queries_by_owner))
            .route("/query/{id}", web::get().to(api::queries::get_query))
            .route("/query/{id}", web::delete().to(api::queries::delete_query))
            .route("/update-query/{id}", web::put().to(api::queries::update_query))
            // Recommendations
            .route("/add-recommand", web::post().to(api::recommendations::add_recommendation))
            .route(
                "/recommendations/{queryId}",
                web::get().to(api::recommendations::recommendations_for_query),
            )
            .route(
                "/recommand/{email}",
                web::get().to(api::recommendations::recommendations_received),
            )
            .route(
                "/recommand-request/{email}",
                web::get().to(api::recommendations::recommendations_made),
            )
            .route(
                "/delete-recommand/{id}",
                web::delete().to(api::recommendations::delete_recommendation),
            )
    })
    .bind(format!("{}:{}", host, port))?
    .run()
    .await
}
