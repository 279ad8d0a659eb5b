//! In-process ProductRepository with the same contract as the MongoDB one.

use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use futures_util::stream::{self, StreamExt};
use mongodb::bson::oid::ObjectId;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::instrument;

use crate::error::{ProductError, ProductResult};
use crate::models::{ProductId, ProductRecord};
use crate::repository::{ProductRepository, ProductStream, require_id};

/// Records keyed by ObjectId hex, so iteration follows insertion order.
#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<BTreeMap<String, ProductRecord>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.products.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.products.read().await.is_empty()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    #[instrument(skip(self, record), fields(sku = %record.sku))]
    async fn save(&self, mut record: ProductRecord) -> ProductResult<ProductRecord> {
        // Millisecond precision, like BSON datetimes.
        let now = Utc::now().trunc_subsecs(3);
        let mut products = self.products.write().await;

        let Some(id) = record.id.clone() else {
            if products.values().any(|p| p.sku == record.sku) {
                return Err(ProductError::DuplicateSku(record.sku));
            }

            let id = ObjectId::new().to_hex();
            record.id = Some(ProductId::new(id.clone()));
            record.created_at = Some(now);
            record.updated_at = Some(now);
            record.version = Some(0);
            products.insert(id, record.clone());

            return Ok(record);
        };

        let stored = products
            .get_mut(id.as_str())
            .ok_or_else(|| ProductError::NotFound(id.clone()))?;

        if stored.version != record.version {
            return Err(ProductError::VersionConflict(id));
        }

        stored.name = record.name;
        stored.description = record.description;
        stored.price = record.price;
        stored.stock = record.stock;
        stored.category = record.category;
        stored.updated_at = Some(now);
        stored.version = stored.version.map(|v| v + 1);

        Ok(stored.clone())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &ProductId) -> ProductResult<Option<ProductRecord>> {
        Ok(self.products.read().await.get(id.as_str()).cloned())
    }

    async fn find_all(&self) -> ProductResult<ProductStream> {
        let snapshot: Vec<ProductRecord> = self.products.read().await.values().cloned().collect();
        Ok(stream::iter(snapshot.into_iter().map(Ok)).boxed())
    }

    #[instrument(skip(self, record), fields(product_id = ?record.id))]
    async fn delete(&self, record: &ProductRecord) -> ProductResult<()> {
        let id = require_id(record)?;

        match self.products.write().await.remove(id.as_str()) {
            Some(_) => Ok(()),
            None => Err(ProductError::NotFound(id.clone())),
        }
    }
}
