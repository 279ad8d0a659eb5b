//! Catalog Service - Business logic layer

use futures_util::{Stream, StreamExt};
use std::sync::Arc;
use tracing::instrument;

use crate::config::CatalogConfig;
use crate::dto::{CreateProductRequest, CreateProductResponse, ProductResponse, UpdateProductRequest};
use crate::error::{ProductError, ProductResult};
use crate::events::{EventPublisher, ProductCreated};
use crate::mapper;
use crate::models::{Product, ProductId};
use crate::repository::ProductRepository;

/// Catalog mutation engine.
///
/// Holds no locks of its own: concurrent updates are serialized by the
/// repository's version check and duplicate SKUs by its unique index.
pub struct CatalogService<R: ProductRepository> {
    repository: Arc<R>,
    publisher: Option<EventPublisher>,
    config: CatalogConfig,
}

impl<R: ProductRepository + 'static> CatalogService<R> {
    /// Create a service that does not announce created products
    pub fn new(repository: R, config: CatalogConfig) -> Self {
        Self {
            repository: Arc::new(repository),
            publisher: None,
            config,
        }
    }

    /// Announce created products through `publisher`
    pub fn with_publisher(mut self, publisher: EventPublisher) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Create a new product and announce it.
    ///
    /// The announcement is queued only after the write succeeds and cannot
    /// fail this call.
    #[instrument(skip(self, input), fields(sku = %input.sku))]
    pub async fn create_product(
        &self,
        input: CreateProductRequest,
    ) -> ProductResult<CreateProductResponse> {
        let product = mapper::from_create_request(input)?;
        let saved = self.repository.save(mapper::to_record(&product)).await?;
        let saved = mapper::from_record(saved)?;

        if let Some(publisher) = &self.publisher {
            publisher.publish(
                &self.config.product_registered_topic,
                saved.sku(),
                &ProductCreated::new(saved.sku()),
            );
        }

        mapper::to_create_response(&saved)
    }

    /// Get a product by ID
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: &ProductId) -> ProductResult<ProductResponse> {
        let product = self.fetch(id).await?;
        mapper::to_response(&product)
    }

    /// Every stored product, lazily, in store order
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
    ) -> ProductResult<impl Stream<Item = ProductResult<ProductResponse>> + Send + 'static> {
        let records = self.repository.find_all().await?;

        Ok(records.map(|record| {
            let product = mapper::from_record(record?)?;
            mapper::to_response(&product)
        }))
    }

    /// Apply the present fields of `input`.
    ///
    /// A request that changes nothing returns the stored product without a
    /// write, so neither `updatedAt` nor the version moves.
    #[instrument(skip(self, input))]
    pub async fn update_product(
        &self,
        id: &ProductId,
        input: UpdateProductRequest,
    ) -> ProductResult<ProductResponse> {
        let current = self.fetch(id).await?;
        let candidate = current.merge(mapper::patch_from_update_request(input))?;

        if candidate == current {
            tracing::debug!(product_id = %id, "Update changes nothing, skipping write");
            return mapper::to_response(&current);
        }

        let saved = self.repository.save(mapper::to_record(&candidate)).await?;
        mapper::to_response(&mapper::from_record(saved)?)
    }

    /// Delete a product
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: &ProductId) -> ProductResult<()> {
        let record = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ProductError::NotFound(id.clone()))?;

        self.repository.delete(&record).await
    }

    async fn fetch(&self, id: &ProductId) -> ProductResult<Product> {
        let record = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ProductError::NotFound(id.clone()))?;

        mapper::from_record(record)
    }
}

impl<R: ProductRepository> Clone for CatalogService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            publisher: self.publisher.clone(),
            config: self.config.clone(),
        }
    }
}
