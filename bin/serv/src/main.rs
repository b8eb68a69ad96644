use std::net::SocketAddr;

use axum::{Router, middleware, routing::get};
use compass_api::{ApiConfig, ApiState};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real deployments set the environment directly
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env()?;
    config.validate()?;

    compass_api::tracing::init_tracing(&config.env);

    let metrics_handle = compass_api::metrics::init_metrics()?;
    tracing::info!("Prometheus metrics exporter initialized");

    let pool = compass_db::create_pool(&config.database_url, config.db_max_connections).await?;
    compass_db::ensure_db_and_migrate(&config.database_url, &pool).await?;
    tracing::info!("Database migrations applied");

    compass_api::auth::service::bootstrap_admin(&pool, &config).await?;

    let state = ApiState::new(&config, pool)?;

    let _job_handles =
        compass_api::jobs::start_background_jobs(state.pool.clone(), config.horoscope_stale_minutes);
    tracing::info!("Background jobs started (token cleanup, stale horoscope expiry)");

    let cors = compass_api::middleware::cors::create_cors_layer(config.parsed_allowed_origins());

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Scrape endpoint carries its own state
    let metrics_app = Router::new()
        .route("/metrics", get(compass_api::metrics::metrics_handler))
        .with_state(metrics_handle);

    let app = compass_api::router::router()
        .with_state(state)
        .merge(metrics_app)
        .layer(cors)
        .layer(trace_layer)
        .layer(middleware::from_fn(compass_api::metrics::track_metrics))
        .layer(middleware::from_fn(
            compass_api::middleware::request_id::request_id_middleware,
        ));

    let app = compass_api::middleware::security_headers::apply_security_headers(app, config.env);

    let bind_address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!(environment = ?config.env, "Server listening on http://{bind_address}");

    // Rate limiting keys on the peer address
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
