//! Products API routes

use axum::Router;
use domain_catalog::{handlers, CatalogService, MongoProductRepository};

use crate::state::AppState;

/// Create products router
pub fn router(state: &AppState) -> Router {
    let repository = MongoProductRepository::new(&state.db);
    let mut service = CatalogService::new(repository, state.config.catalog.clone());
    if let Some(publisher) = state.publisher.clone() {
        service = service.with_publisher(publisher);
    }
    handlers::router(service)
}

/// Initialize products indexes
pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    let repository = MongoProductRepository::new(&state.db);
    repository.init_indexes().await?;
    Ok(())
}
