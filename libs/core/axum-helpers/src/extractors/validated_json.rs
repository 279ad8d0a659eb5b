//! JSON extractor with automatic validation using the validator crate.

use crate::errors::AppError;
use axum::{
    extract::{FromRequest, Json, Request},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON extractor that runs `Validate` before the handler sees the value.
///
/// Malformed JSON is rejected through [`AppError::JsonExtractorRejection`];
/// validation failures produce a 400 with per-field details.
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct CreateProductRequest {
///     #[validate(length(min = 1, max = 64))]
///     sku: String,
/// }
///
/// async fn create(ValidatedJson(payload): ValidatedJson<CreateProductRequest>) -> String {
///     payload.sku
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::from(e).into_response())?;

        data.validate()
            .map_err(|e| AppError::ValidationError(e).into_response())?;

        Ok(ValidatedJson(data))
    }
}
