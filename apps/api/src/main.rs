use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use scheduling_cell::policy::SchedulingPolicy;
use shared_config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting surgery booking API server");

    let config = Arc::new(AppConfig::from_env());

    let policy = SchedulingPolicy::from_config(&config).context("invalid scheduling policy")?;
    let catalogue = policy.procedure_catalogue().context("invalid procedure catalogue")?;
    info!(
        "Loaded {} procedures, open {}-{} in {} minute slots",
        catalogue.all().len(),
        policy.business_hours.open.format("%H:%M"),
        policy.business_hours.close.format("%H:%M"),
        policy.slot_granularity_minutes
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router::create_router(config.clone(), Arc::new(catalogue), Arc::new(policy))
        .context("failed to build appointment routes")?
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    let addr: SocketAddr = config
        .bind_addr
        .parse()
        .with_context(|| format!("invalid BIND_ADDR '{}'", config.bind_addr))?;
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await.context("failed to bind listener")?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
