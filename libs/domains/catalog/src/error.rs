use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use mongodb::error::{ErrorKind, WriteFailure};
use thiserror::Error;

use crate::models::{ProductId, ProductInvariantError};

/// Mongo server code for a unique index violation.
const DUPLICATE_KEY: i32 = 11000;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Product {0} not found")]
    NotFound(ProductId),

    #[error("Product {0} was modified concurrently")]
    VersionConflict(ProductId),

    #[error("Product with SKU '{0}' already exists")]
    DuplicateSku(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

impl ProductError {
    /// Classify a driver error raised by an insert, mapping unique index
    /// violations on `sku` to [`ProductError::DuplicateSku`].
    pub fn from_write(err: mongodb::error::Error, sku: &str) -> Self {
        if is_duplicate_key(&err) {
            ProductError::DuplicateSku(sku.to_string())
        } else {
            err.into()
        }
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY,
        _ => false,
    }
}

impl From<ProductInvariantError> for ProductError {
    fn from(err: ProductInvariantError) -> Self {
        ProductError::Validation(err.to_string())
    }
}

impl From<mongodb::error::Error> for ProductError {
    fn from(err: mongodb::error::Error) -> Self {
        ProductError::Database(err.to_string())
    }
}

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::Validation(msg) => AppError::InvalidInput(msg),
            ProductError::NotFound(id) => AppError::NotFound(format!("Product {} not found", id)),
            ProductError::VersionConflict(id) => AppError::Conflict(format!(
                "Product {} was modified concurrently, reload and retry",
                id
            )),
            ProductError::DuplicateSku(sku) => {
                AppError::Conflict(format!("Product with SKU '{}' already exists", sku))
            }
            ProductError::Database(msg) => AppError::InternalServerError(msg),
            ProductError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn status_of(err: ProductError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        let id = ProductId::new("65f1c0ffee65f1c0ffee0001");

        assert_eq!(
            status_of(ProductError::Validation("name cannot be blank".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(ProductError::NotFound(id.clone())), StatusCode::NOT_FOUND);
        assert_eq!(status_of(ProductError::VersionConflict(id)), StatusCode::CONFLICT);
        assert_eq!(
            status_of(ProductError::DuplicateSku("SKU-1".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(ProductError::Database("socket closed".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(ProductError::Internal("missing id".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_invariant_error_becomes_validation() {
        let err: ProductError = ProductInvariantError::Negative { field: "price" }.into();
        assert!(matches!(err, ProductError::Validation(msg) if msg.contains("price")));
    }

    #[test]
    fn test_non_write_driver_error_is_database() {
        let driver = mongodb::error::Error::from(std::io::Error::other("connection reset"));
        assert!(matches!(
            ProductError::from_write(driver, "SKU-1"),
            ProductError::Database(_)
        ));
    }
}
