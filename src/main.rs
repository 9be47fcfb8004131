use actix_web::http::StatusCode;
use actix_web::middleware::{ErrorHandlers, Logger};
use actix_web::{App, HttpResponse, HttpServer, Responder, get, web};
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info};
use serde_json::json;

mod config;
mod connection;
mod database;
mod engage;
mod feed;
mod middleware;
mod post;
mod router;
mod state;
mod uploader;
mod user;
mod utils;

use config::AppConfig;
use database::Database;
use middleware::auth::TokenVerifier;
use middleware::error_handler::handle_error;
use middleware::not_found::not_found;
use router::index::routes;
use state::{AppState, Stores};
use utils::helpers::envelope;

#[get("/")]
async fn default() -> impl Responder {
    HttpResponse::Ok().json(envelope(
        "Welcome to the social-connect server",
        StatusCode::OK.as_u16(),
        json!({}),
    ))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    let database = Database::init(&config).await.map_err(|e| {
        error!("Failed to connect to MongoDB: {}", e);
        std::io::Error::other(e)
    })?;
    database.ensure_indexes().await.map_err(|e| {
        error!("Failed to create indexes: {}", e);
        std::io::Error::other(e)
    })?;

    let state = AppState::new(Stores::mongo(&database, &config));
    let verifier = web::Data::new(TokenVerifier::new(&config.jwt_secret));

    info!("Starting server on http://{}:{}", config.host, config.port);

    HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(Logger::default())
            .wrap(Logger::new("%a %{User-Agent}i"))
            .app_data(verifier.clone())
            .configure(|cfg| state.configure(cfg))
            .configure(routes)
            .wrap(
                ErrorHandlers::new()
                    .handler(StatusCode::NOT_FOUND, not_found)
                    .default_handler(handle_error),
            )
            .service(default)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    // Only reached once the server shuts down
    info!("Server has stopped");

    Ok(())
}
