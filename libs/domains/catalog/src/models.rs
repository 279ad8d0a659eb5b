use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::category::Category;

pub const SKU_MAX_CHARS: usize = 64;
pub const NAME_MAX_CHARS: usize = 140;
pub const DESCRIPTION_MAX_CHARS: usize = 2000;

/// Store-assigned product identifier (24 hex characters for MongoDB).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Structural rule a product failed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductInvariantError {
    #[error("{field} cannot be blank")]
    Blank { field: &'static str },

    #[error("{field} must be at most {max} characters, got {actual}")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("{field} must be >= 0")]
    Negative { field: &'static str },
}

/// Raw product fields, checked by [`Product::new`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductParts {
    pub id: Option<ProductId>,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub category: Option<Category>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub version: Option<i64>,
}

/// Catalog entry. Every value of this type satisfies the product invariants:
/// non-blank sku and name, bounded text lengths, non-negative price and stock.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    parts: ProductParts,
}

impl Product {
    pub fn new(parts: ProductParts) -> Result<Self, ProductInvariantError> {
        check_text("sku", &parts.sku, SKU_MAX_CHARS)?;
        check_text("name", &parts.name, NAME_MAX_CHARS)?;
        if let Some(description) = &parts.description {
            check_len("description", description, DESCRIPTION_MAX_CHARS)?;
        }
        if parts.price < Decimal::ZERO {
            return Err(ProductInvariantError::Negative { field: "price" });
        }
        if parts.stock < 0 {
            return Err(ProductInvariantError::Negative { field: "stock" });
        }

        Ok(Self { parts })
    }

    /// Overlay the present fields of `patch` on this product.
    ///
    /// The result is re-checked, so a patch can never produce an invalid product.
    pub fn merge(&self, patch: ProductPatch) -> Result<Product, ProductInvariantError> {
        let mut parts = self.parts.clone();

        if let Some(name) = patch.name {
            parts.name = name;
        }
        if let Some(description) = patch.description {
            parts.description = Some(description);
        }
        if let Some(price) = patch.price {
            parts.price = price;
        }
        if let Some(category) = patch.category {
            parts.category = category;
        }

        Product::new(parts)
    }

    pub fn id(&self) -> Option<&ProductId> {
        self.parts.id.as_ref()
    }

    pub fn sku(&self) -> &str {
        &self.parts.sku
    }

    pub fn name(&self) -> &str {
        &self.parts.name
    }

    pub fn description(&self) -> Option<&str> {
        self.parts.description.as_deref()
    }

    pub fn price(&self) -> Decimal {
        self.parts.price
    }

    pub fn stock(&self) -> i32 {
        self.parts.stock
    }

    pub fn category(&self) -> Option<Category> {
        self.parts.category
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.parts.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.parts.updated_at
    }

    pub fn version(&self) -> Option<i64> {
        self.parts.version
    }

    pub fn parts(&self) -> &ProductParts {
        &self.parts
    }

    pub fn into_parts(self) -> ProductParts {
        self.parts
    }
}

fn check_text(field: &'static str, value: &str, max: usize) -> Result<(), ProductInvariantError> {
    if value.trim().is_empty() {
        return Err(ProductInvariantError::Blank { field });
    }
    check_len(field, value, max)
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), ProductInvariantError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(ProductInvariantError::TooLong { field, max, actual });
    }
    Ok(())
}

/// Fields an update may override. `None` leaves the current value in place.
///
/// `category: Some(None)` clears the category.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<Option<Category>>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.category.is_none()
    }
}

/// Product as the repository stores it. Category is kept by name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductRecord {
    pub id: Option<ProductId>,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub category: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub version: Option<i64>,
}
