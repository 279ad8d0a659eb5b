//! Wire shapes for the products API.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::category::Category;

/// DTO for creating a new product
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    /// Stock keeping unit, unique across the catalog
    #[validate(length(min = 1, max = 64))]
    #[schema(example = "SKU-1")]
    pub sku: String,
    #[validate(length(min = 1, max = 140))]
    #[schema(example = "Juice")]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    /// Must be >= 0. Read from the JSON number text, no float rounding.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    #[schema(value_type = f64, example = 9.99)]
    pub price: Decimal,
    /// Defaults to 0
    #[validate(range(min = 0))]
    pub stock: Option<i32>,
    /// Category name such as `GROCERY`; unrecognized values are stored as none
    #[validate(length(max = 64))]
    pub category: Option<String>,
}

/// DTO for a partial update. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[validate(length(max = 140))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[serde(default, with = "rust_decimal::serde::arbitrary_precision_option")]
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    /// An unrecognized name clears the category
    #[validate(length(max = 64))]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    #[schema(example = "65f1c0ffee65f1c0ffee0001")]
    pub id: String,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    #[schema(value_type = f64)]
    pub price: Decimal,
    pub stock: i32,
    pub category: Option<Category>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductResponse {
    pub id: String,
    pub created_at: DateTime<Utc>,
}
