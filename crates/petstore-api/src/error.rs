//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  /// Store failure or cancellation. The detail is logged, never returned.
  #[error("store error: {0}")]
  Store(#[source] petstore_core::Error),
}

impl From<petstore_core::Error> for ApiError {
  fn from(err: petstore_core::Error) -> Self {
    use petstore_core::Error as Core;
    match err {
      Core::NotFound(m) => ApiError::NotFound(m),
      Core::BadRequest(m) => ApiError::BadRequest(m),
      Core::Conflict(m) => ApiError::Conflict(m),
      other @ (Core::Internal(_) | Core::Cancelled) => ApiError::Store(other),
    }
  }
}

/// Classify a backend error through the shared taxonomy.
pub fn store_error<E: Into<petstore_core::Error>>(err: E) -> ApiError { ApiError::from(err.into()) }

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_owned())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
