use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::error::{ProductError, ProductResult};
use crate::models::{ProductId, ProductRecord};

/// Lazily produced records, in store order.
pub type ProductStream = BoxStream<'static, ProductResult<ProductRecord>>;

/// Repository trait for product persistence
///
/// Implementations own identifiers, timestamps and the version counter:
/// - `save` with no id inserts, assigning id, `created_at`, `updated_at` and version 0.
///   A taken SKU fails with `DuplicateSku`.
/// - `save` with an id replaces the mutable fields only if the stored version
///   still equals `record.version`, then bumps the version and `updated_at`.
///   A stale version fails with `VersionConflict`, a vanished record with `NotFound`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert or conditionally update, returning the stored record
    async fn save(&self, record: ProductRecord) -> ProductResult<ProductRecord>;

    /// Get a product by ID
    async fn find_by_id(&self, id: &ProductId) -> ProductResult<Option<ProductRecord>>;

    /// Stream every product
    async fn find_all(&self) -> ProductResult<ProductStream>;

    /// Hard delete. Fails with `NotFound` if nothing was removed.
    async fn delete(&self, record: &ProductRecord) -> ProductResult<()>;
}

pub(crate) fn require_id(record: &ProductRecord) -> ProductResult<&ProductId> {
    record
        .id
        .as_ref()
        .ok_or_else(|| ProductError::Internal("product has not been saved yet".to_string()))
}
