//! LearnHub server binary.
//!
//! Bootstraps tracing, loads and validates configuration, connects the
//! PostgreSQL pool, wires the adapters into the shared application state,
//! and serves the axum router.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use learnhub::adapters::http::{api_router, AppState};
use learnhub::adapters::identity::{IdentityProviderAuthorizer, IdentityProviderConfig};
use learnhub::adapters::postgres::{
    PostgresCourseStore, PostgresEnrollmentStore, PostgresPurchaseStore, PostgresUserStore,
    PostgresWebhookReceipts,
};
use learnhub::adapters::stripe::{StripeConfig, StripeGateway};
use learnhub::application::handlers::enrollment::EnrollmentApplier;
use learnhub::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone())),
        )
        .init();

    tracing::info!(
        environment = ?config.server.environment,
        "Starting LearnHub backend"
    );

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let enrollments = Arc::new(PostgresEnrollmentStore::new(pool.clone()));
    let applier = Arc::new(EnrollmentApplier::new(enrollments.clone()));

    let gateway = Arc::new(StripeGateway::new(StripeConfig::new(SecretString::new(
        config.payment.stripe_api_key.clone(),
    ))));

    let state = AppState {
        courses: Arc::new(PostgresCourseStore::new(pool.clone())),
        users: Arc::new(PostgresUserStore::new(pool.clone())),
        purchases: Arc::new(PostgresPurchaseStore::new(pool.clone())),
        enrollments,
        receipts: Arc::new(PostgresWebhookReceipts::new(pool.clone())),
        gateway,
        authorizer: Arc::new(IdentityProviderAuthorizer::new(IdentityProviderConfig::new(
            config.identity.api_url.clone(),
            SecretString::new(config.identity.api_key.clone()),
        ))),
        applier,
        payment_webhook_secret: SecretString::new(config.payment.stripe_webhook_secret.clone()),
        identity_webhook_secret: SecretString::new(config.identity.webhook_secret.clone()),
        currency: config.payment.currency_lower(),
        checkout_success_url: config.payment.checkout_success_url.clone(),
        checkout_cancel_url: config.payment.checkout_cancel_url.clone(),
    };

    let app = api_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(cors_layer(&config));

    let addr = config.server.socket_addr();
    tracing::info!(%addr, "Listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins = config.server.cors_origins_list();
    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        let parsed: Vec<axum::http::HeaderValue> =
            origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new().allow_origin(parsed)
    }
}
