//! # Folio Server
//!
//! The main entry point for the Actix-web HTTP server.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

use folio_core::ports::{PasswordService, TokenService};
use folio_infra::{Argon2PasswordService, JwtTokenService};

mod config;
mod handlers;
mod middleware;
mod state;
mod syndication;
mod telemetry;

use config::AppConfig;
use middleware::RequestIdMiddleware;
use middleware::error::AppError;
use state::AppState;
use telemetry::{TelemetryConfig, init_telemetry};

/// Register shared state, services and extractor settings.
pub fn configure_app(
    cfg: &mut web::ServiceConfig,
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
) {
    cfg.app_data(state)
        .app_data(token_service)
        .app_data(password_service)
        .app_data(web::JsonConfig::default().error_handler(|err, _req| {
            AppError::BadRequest(err.to_string()).into()
        }))
        .app_data(web::QueryConfig::default().error_handler(|err, _req| {
            AppError::BadRequest(err.to_string()).into()
        }))
        .app_data(web::PathConfig::default().error_handler(|err, _req| {
            AppError::NotFound(err.to_string()).into()
        }))
        .configure(handlers::configure_routes);
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting Folio server on {}:{}",
        config.host,
        config.port
    );

    let state = web::Data::new(AppState::new(&config).await);
    let token_service: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));
    let token_service = web::Data::new(token_service);
    let password_service: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());
    let password_service = web::Data::new(password_service);

    HttpServer::new(move || {
        let state = state.clone();
        let token_service = token_service.clone();
        let password_service = password_service.clone();

        App::new()
            .wrap(TracingLogger::default())
            .wrap(RequestIdMiddleware)
            .configure(move |cfg| configure_app(cfg, state, token_service, password_service))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
