//! Catalog API - REST server

use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_catalog::{DaprEventSink, EventPublisher, EventSink};
use std::sync::Arc;
use tracing::{info, warn};

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!("Connecting to MongoDB at {}", config.mongodb.redacted_url());

    let mongo_client =
        database::mongodb::connect_from_config_with_retry(&config.mongodb, None).await?;

    let db = mongo_client.database(config.mongodb.database());

    let health = database::mongodb::check_health_detailed(&mongo_client).await;
    info!(
        healthy = health.healthy,
        response_time_ms = health.response_time_ms,
        "Successfully connected to MongoDB database: {}",
        config.mongodb.database()
    );

    // Product announcements go through a bounded queue drained by one task
    let (publisher, dispatcher) = if config.catalog.events_enabled {
        let sink: Arc<dyn EventSink> = Arc::new(DaprEventSink::new(&config.dapr));
        let (publisher, handle) =
            EventPublisher::spawn(sink, config.catalog.event_queue_capacity);
        info!(
            topic = %config.catalog.product_registered_topic,
            pubsub = %config.dapr.pubsub_name,
            "Product announcements enabled via {}",
            config.dapr.base_url()
        );
        (Some(publisher), Some(handle))
    } else {
        info!("Product announcements disabled");
        (None, None)
    };

    let state = AppState {
        config: config.clone(),
        mongo_client,
        db,
        publisher,
    };

    api::init_indexes(&state).await?;

    let api_routes = api::routes(&state);
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes).await?;
    let app = router.merge(health_router(state.config.app));

    info!(
        "Starting {} v{} on port {}",
        config.app.name, config.app.version, config.server.port
    );

    let AppState {
        mongo_client,
        publisher,
        ..
    } = state;

    let result = create_production_app(
        app,
        &config.server,
        config.server.shutdown_timeout(),
        async move {
            info!("Shutting down: closing MongoDB connections");
            drop(mongo_client);
            info!("MongoDB connection closed");
        },
    )
    .await;

    // The router is gone, so this is the last sender; the dispatcher drains and exits
    drop(publisher);
    if let Some(handle) = dispatcher {
        match tokio::time::timeout(config.server.shutdown_timeout(), handle).await {
            Ok(Ok(())) => info!("Event dispatcher drained"),
            Ok(Err(e)) => warn!(error = %e, "Event dispatcher task failed"),
            Err(_) => warn!("Event dispatcher did not drain before the shutdown timeout"),
        }
    }

    result.map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Catalog API shutdown complete");
    Ok(())
}
