//! Catalog Domain
//!
//! Product catalog backed by MongoDB: create, fetch, list, partially update and
//! delete products, announcing each new product to an event sink.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐      ┌────────────────┐
//! │   Service   │ ───► │ EventPublisher │ ─► EventSink (Dapr)
//! └──────┬──────┘      └────────────────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + MongoDB / in-memory)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Product, invariants, category, mapper
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_catalog::{handlers, CatalogConfig, CatalogService, MongoProductRepository};
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("catalog");
//!
//! let repository = MongoProductRepository::new(&db);
//! repository.init_indexes().await?;
//! let service = CatalogService::new(repository, CatalogConfig::default());
//!
//! let router = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod category;
pub mod config;
pub mod dto;
pub mod error;
pub mod events;
pub mod handlers;
pub mod mapper;
pub mod memory;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use self::category::Category;
pub use self::config::{CatalogConfig, DaprConfig};
pub use self::dto::{
    CreateProductRequest, CreateProductResponse, ProductResponse, UpdateProductRequest,
};
pub use self::error::{ProductError, ProductResult};
pub use self::events::{DaprEventSink, EventPublisher, EventSink, ProductCreated, PublishError};
pub use self::handlers::ApiDoc;
pub use self::memory::InMemoryProductRepository;
pub use self::models::{Product, ProductId, ProductPatch, ProductRecord};
pub use self::mongodb::MongoProductRepository;
pub use self::repository::{ProductRepository, ProductStream};
pub use self::service::CatalogService;
