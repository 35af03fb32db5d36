/// API route modules
pub mod auth;
pub mod brochure;
pub mod diagnostics;
pub mod health;
pub mod leads;

use crate::error::ServerError;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

/// JSON body extractor whose rejections render as `{message}` like every other error
pub struct ApiJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(rejection_to_error(&rejection)),
        }
    }
}

fn rejection_to_error(rejection: &JsonRejection) -> ServerError {
    tracing::debug!("Rejected request body: {}", rejection.body_text());
    ServerError::BadRequest(rejection.body_text())
}
