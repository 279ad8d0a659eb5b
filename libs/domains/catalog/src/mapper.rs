//! Conversions between wire, domain and stored shapes. No I/O.

use crate::category::Category;
use crate::dto::{CreateProductRequest, CreateProductResponse, ProductResponse, UpdateProductRequest};
use crate::error::{ProductError, ProductResult};
use crate::models::{Product, ProductInvariantError, ProductParts, ProductPatch, ProductRecord};

/// Normalize a create request into a new, unsaved product.
pub fn from_create_request(req: CreateProductRequest) -> Result<Product, ProductInvariantError> {
    Product::new(ProductParts {
        id: None,
        sku: req.sku.trim().to_string(),
        name: req.name.trim().to_string(),
        description: req.description.map(|d| d.trim().to_string()),
        price: req.price,
        stock: req.stock.unwrap_or(0),
        category: Category::resolve(req.category.as_deref()),
        created_at: None,
        updated_at: None,
        version: None,
    })
}

/// Present fields become overrides. A present but unrecognized category
/// clears the current one.
pub fn patch_from_update_request(req: UpdateProductRequest) -> ProductPatch {
    ProductPatch {
        name: req.name.map(|n| n.trim().to_string()),
        description: req.description.map(|d| d.trim().to_string()),
        price: req.price,
        category: req.category.map(|c| Category::resolve(Some(&c))),
    }
}

pub fn to_record(product: &Product) -> ProductRecord {
    let parts = product.parts();
    ProductRecord {
        id: parts.id.clone(),
        sku: parts.sku.clone(),
        name: parts.name.clone(),
        description: parts.description.clone(),
        price: parts.price,
        stock: parts.stock,
        category: parts.category.map(|c| c.to_string()),
        created_at: parts.created_at,
        updated_at: parts.updated_at,
        version: parts.version,
    }
}

/// Rebuild a product from storage. A stored category that is no longer
/// recognized resolves to none; a record that breaks the invariants is a
/// data integrity problem, not a caller error.
pub fn from_record(record: ProductRecord) -> ProductResult<Product> {
    let id = record.id.clone();
    Product::new(ProductParts {
        id: record.id,
        sku: record.sku,
        name: record.name,
        description: record.description,
        price: record.price,
        stock: record.stock,
        category: Category::resolve(record.category.as_deref()),
        created_at: record.created_at,
        updated_at: record.updated_at,
        version: record.version,
    })
    .map_err(|e| {
        ProductError::Internal(format!(
            "stored product {} is invalid: {}",
            id.as_ref().map(|id| id.as_str()).unwrap_or("<unsaved>"),
            e
        ))
    })
}

pub fn to_response(product: &Product) -> ProductResult<ProductResponse> {
    let id = product
        .id()
        .ok_or_else(|| ProductError::Internal("product id missing when mapping to response".into()))?;
    let (created_at, updated_at) = product
        .created_at()
        .zip(product.updated_at())
        .ok_or_else(|| {
            ProductError::Internal(format!("product {} is missing timestamps", id))
        })?;

    Ok(ProductResponse {
        id: id.to_string(),
        sku: product.sku().to_string(),
        name: product.name().to_string(),
        description: product.description().map(str::to_string),
        price: product.price(),
        stock: product.stock(),
        category: product.category(),
        created_at,
        updated_at,
    })
}

pub fn to_create_response(product: &Product) -> ProductResult<CreateProductResponse> {
    let id = product
        .id()
        .ok_or_else(|| ProductError::Internal("product id missing after save".into()))?;
    let created_at = product
        .created_at()
        .ok_or_else(|| ProductError::Internal(format!("product {} has no createdAt", id)))?;

    Ok(CreateProductResponse {
        id: id.to_string(),
        created_at,
    })
}
