//! HTTP handlers for the Catalog API

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use axum_helpers::{
    errors::responses::{
        BadRequestValidationResponse, ConflictResponse, InternalServerErrorResponse,
        NotFoundResponse,
    },
    ValidatedJson,
};
use futures_util::TryStreamExt;
use std::future::Future;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::category::Category;
use crate::dto::{CreateProductRequest, CreateProductResponse, ProductResponse, UpdateProductRequest};
use crate::error::{ProductError, ProductResult};
use crate::models::ProductId;
use crate::repository::ProductRepository;
use crate::service::CatalogService;

/// OpenAPI documentation for the Catalog API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        create_product,
        get_product,
        update_product,
        delete_product,
    ),
    components(
        schemas(
            CreateProductRequest, UpdateProductRequest, ProductResponse,
            CreateProductResponse, Category
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Products", description = "Product catalog endpoints")
    )
)]
pub struct ApiDoc;

/// Create the products router with all HTTP endpoints
pub fn router<R: ProductRepository + 'static>(service: CatalogService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/{id}",
            get(get_product)
                .patch(update_product)
                .delete(delete_product),
        )
        .with_state(shared_service)
}

/// Runs a mutation on its own task so a dropped client connection cannot
/// cancel a store write halfway through.
async fn detached<T, F>(work: F) -> ProductResult<T>
where
    T: Send + 'static,
    F: Future<Output = ProductResult<T>> + Send + 'static,
{
    tokio::spawn(work)
        .await
        .map_err(|e| ProductError::Internal(format!("mutation task failed: {e}")))?
}

/// List every product
#[utoipa::path(
    get,
    path = "",
    tag = "Products",
    responses(
        (status = 200, description = "All products", body = Vec<ProductResponse>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: ProductRepository + 'static>(
    State(service): State<Arc<CatalogService<R>>>,
) -> ProductResult<Json<Vec<ProductResponse>>> {
    let products: Vec<ProductResponse> = service.list_products().await?.try_collect().await?;
    Ok(Json(products))
}

/// Create a new product
#[utoipa::path(
    post,
    path = "",
    tag = "Products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = CreateProductResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<R: ProductRepository + 'static>(
    State(service): State<Arc<CatalogService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateProductRequest>,
) -> ProductResult<impl IntoResponse> {
    let created = detached(async move { service.create_product(input).await }).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = String, Path, description = "Product ID (24 hex characters)")
    ),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<R: ProductRepository + 'static>(
    State(service): State<Arc<CatalogService<R>>>,
    Path(id): Path<String>,
) -> ProductResult<Json<ProductResponse>> {
    let product = service.get_product(&ProductId::from(id)).await?;
    Ok(Json(product))
}

/// Partially update a product
///
/// Absent fields are left untouched; `{}` returns the product unchanged.
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = String, Path, description = "Product ID (24 hex characters)")
    ),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<R: ProductRepository + 'static>(
    State(service): State<Arc<CatalogService<R>>>,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<UpdateProductRequest>,
) -> ProductResult<Json<ProductResponse>> {
    let id = ProductId::from(id);
    let product = detached(async move { service.update_product(&id, input).await }).await?;
    Ok(Json(product))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = String, Path, description = "Product ID (24 hex characters)")
    ),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<R: ProductRepository + 'static>(
    State(service): State<Arc<CatalogService<R>>>,
    Path(id): Path<String>,
) -> ProductResult<impl IntoResponse> {
    let id = ProductId::from(id);
    detached(async move { service.delete_product(&id).await }).await?;
    Ok(StatusCode::NO_CONTENT)
}
