//! MongoDB implementation of ProductRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use mongodb::{
    bson::{self, doc, oid::ObjectId},
    options::{IndexOptions, ReturnDocument},
    Collection, Database, IndexModel,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::instrument;

use crate::error::{ProductError, ProductResult};
use crate::models::{ProductId, ProductRecord};
use crate::repository::{require_id, ProductRepository, ProductStream};

const COLLECTION: &str = "products";

/// Stored shape. Price is a decimal string so no precision is lost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ProductDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    sku: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
    price: String,
    stock: i32,
    #[serde(default)]
    category: Option<String>,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
    version: i64,
}

impl ProductDocument {
    fn new(record: ProductRecord, id: ObjectId, now: bson::DateTime) -> Self {
        Self {
            id,
            sku: record.sku,
            name: record.name,
            description: record.description,
            price: record.price.to_string(),
            stock: record.stock,
            category: record.category,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    fn into_record(self) -> ProductResult<ProductRecord> {
        let price = Decimal::from_str(&self.price).map_err(|e| {
            ProductError::Internal(format!("product {} has invalid price: {}", self.id, e))
        })?;

        Ok(ProductRecord {
            id: Some(ProductId::new(self.id.to_hex())),
            sku: self.sku,
            name: self.name,
            description: self.description,
            price,
            stock: self.stock,
            category: self.category,
            created_at: Some(to_chrono(self.created_at)?),
            updated_at: Some(to_chrono(self.updated_at)?),
            version: Some(self.version),
        })
    }
}

fn to_chrono(value: bson::DateTime) -> ProductResult<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(value.timestamp_millis()).ok_or_else(|| {
        ProductError::Internal(format!("timestamp {} out of range", value.timestamp_millis()))
    })
}

/// Ids that are not ObjectIds can never match a stored product.
fn parse_id(id: &ProductId) -> Option<ObjectId> {
    ObjectId::parse_str(id.as_str()).ok()
}

/// MongoDB implementation of the ProductRepository
pub struct MongoProductRepository {
    collection: Collection<ProductDocument>,
}

impl MongoProductRepository {
    /// Create a new MongoProductRepository
    pub fn new(db: &Database) -> Self {
        let collection = db.collection::<ProductDocument>(COLLECTION);
        Self { collection }
    }

    /// Create the unique SKU index. Concurrent duplicate creates rely on it.
    pub async fn init_indexes(&self) -> ProductResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "sku": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("idx_sku_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(index).await?;
        tracing::info!("Product indexes created successfully");
        Ok(())
    }

    async fn insert(&self, record: ProductRecord) -> ProductResult<ProductRecord> {
        let sku = record.sku.clone();
        let document = ProductDocument::new(record, ObjectId::new(), bson::DateTime::now());

        self.collection
            .insert_one(&document)
            .await
            .map_err(|e| ProductError::from_write(e, &sku))?;

        tracing::info!(product_id = %document.id, sku = %sku, "Product created");
        document.into_record()
    }

    async fn update(&self, id: &ProductId, record: ProductRecord) -> ProductResult<ProductRecord> {
        let oid = parse_id(id).ok_or_else(|| ProductError::NotFound(id.clone()))?;
        let version = record.version.ok_or_else(|| {
            ProductError::Internal(format!("product {} has no version to update against", id))
        })?;

        let filter = doc! { "_id": oid, "version": version };
        let update = doc! {
            "$set": {
                "name": &record.name,
                "description": record.description.as_deref(),
                "price": record.price.to_string(),
                "stock": record.stock,
                "category": record.category.as_deref(),
                "updated_at": bson::DateTime::now(),
            },
            "$inc": { "version": 1_i64 },
        };

        let updated = self
            .collection
            .find_one_and_update(filter, update)
            .return_document(ReturnDocument::After)
            .await?;

        match updated {
            Some(document) => {
                tracing::info!(product_id = %id, version = version + 1, "Product updated");
                document.into_record()
            }
            None => {
                let exists = self.collection.count_documents(doc! { "_id": oid }).await? > 0;
                if exists {
                    Err(ProductError::VersionConflict(id.clone()))
                } else {
                    Err(ProductError::NotFound(id.clone()))
                }
            }
        }
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[instrument(skip(self, record), fields(sku = %record.sku, product_id = ?record.id))]
    async fn save(&self, record: ProductRecord) -> ProductResult<ProductRecord> {
        match record.id.clone() {
            None => self.insert(record).await,
            Some(id) => self.update(&id, record).await,
        }
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &ProductId) -> ProductResult<Option<ProductRecord>> {
        let Some(oid) = parse_id(id) else {
            return Ok(None);
        };

        self.collection
            .find_one(doc! { "_id": oid })
            .await?
            .map(ProductDocument::into_record)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> ProductResult<ProductStream> {
        let cursor = self.collection.find(doc! {}).await?;

        Ok(cursor
            .map(|result| result.map_err(ProductError::from).and_then(ProductDocument::into_record))
            .boxed())
    }

    #[instrument(skip(self, record), fields(product_id = ?record.id))]
    async fn delete(&self, record: &ProductRecord) -> ProductResult<()> {
        let id = require_id(record)?;
        let oid = parse_id(id).ok_or_else(|| ProductError::NotFound(id.clone()))?;

        let result = self.collection.delete_one(doc! { "_id": oid }).await?;
        if result.deleted_count == 0 {
            return Err(ProductError::NotFound(id.clone()));
        }

        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ProductRecord {
        ProductRecord {
            sku: "SKU-1".to_string(),
            name: "Juice".to_string(),
            description: Some("Orange".to_string()),
            price: Decimal::from_str("9.990").unwrap(),
            stock: 10,
            category: Some("BEVERAGES".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_document_starts_at_version_zero() {
        let now = bson::DateTime::from_millis(1_700_000_000_123);
        let document = ProductDocument::new(record(), ObjectId::new(), now);

        assert_eq!(document.version, 0);
        assert_eq!(document.created_at, now);
        assert_eq!(document.updated_at, now);
        assert_eq!(document.price, "9.990");
    }

    #[test]
    fn test_document_into_record_keeps_price_scale() {
        let oid = ObjectId::new();
        let now = bson::DateTime::from_millis(1_700_000_000_123);
        let record = ProductDocument::new(record(), oid, now).into_record().unwrap();

        assert_eq!(record.id, Some(ProductId::new(oid.to_hex())));
        assert_eq!(record.price.to_string(), "9.990");
        assert_eq!(record.version, Some(0));
        assert_eq!(
            record.created_at.unwrap().timestamp_millis(),
            1_700_000_000_123
        );
    }

    #[test]
    fn test_corrupt_price_is_internal() {
        let mut document =
            ProductDocument::new(record(), ObjectId::new(), bson::DateTime::now());
        document.price = "nine".to_string();

        assert!(matches!(
            document.into_record(),
            Err(ProductError::Internal(_))
        ));
    }

    #[test]
    fn test_document_bson_field_names() {
        let document = ProductDocument::new(record(), ObjectId::new(), bson::DateTime::now());
        let bson_doc = bson::to_document(&document).unwrap();

        assert!(bson_doc.get_object_id("_id").is_ok());
        assert!(bson_doc.get_datetime("created_at").is_ok());
        assert_eq!(bson_doc.get_i64("version").unwrap(), 0);
        assert_eq!(bson_doc.get_str("price").unwrap(), "9.990");
    }

    #[test]
    fn test_parse_id() {
        assert!(parse_id(&ProductId::new("65f1c0ffee65f1c0ffee0001")).is_some());
        assert!(parse_id(&ProductId::new("not-an-object-id")).is_none());
    }
}
