use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use cats_social::config::Settings;
use cats_social::core::MatchEngine;
use cats_social::routes::{self, auth::JwtVerifier, matches::AppState};
use cats_social::services::{PgMatchRepository, PgProfileStore, PostgresClient};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    // Initialize logging
    let filter = EnvFilter::try_new(&settings.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if settings.logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting cats-social match service...");

    // Initialize PostgreSQL client
    let postgres = PostgresClient::from_settings(&settings.database)
        .await
        .map_err(|e| {
            error!("Failed to connect to PostgreSQL: {}", e);
            std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
        })?;

    info!(
        "PostgreSQL client initialized (max: {} connections)",
        settings.database.max_connections.unwrap_or(10)
    );

    let profiles = Arc::new(PgProfileStore::new(&postgres));
    let matches = Arc::new(PgMatchRepository::new(postgres));
    let bounds = settings.matching.message_bounds();
    let engine = MatchEngine::new(matches, profiles, bounds);

    info!("Match engine initialized with message bounds: {:?}", bounds);

    // Build application state
    let app_state = AppState {
        engine,
        verifier: JwtVerifier::new(&settings.auth.jwt_secret),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
