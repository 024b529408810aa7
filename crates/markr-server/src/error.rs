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
  /// The document was rejected before anything was staged.
  #[error(transparent)]
  Document(#[from] markr_xml::Error),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<markr_core::Error> for ApiError {
  fn from(e: markr_core::Error) -> Self {
    match e {
      markr_core::Error::TestNotFound(_) => ApiError::NotFound(e.to_string()),
      markr_core::Error::Store(inner) => ApiError::Store(inner),
    }
  }
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::Document(markr_xml::Error::UnsupportedMediaType(_)) => {
        StatusCode::UNSUPPORTED_MEDIA_TYPE
      }
      ApiError::Document(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
  }
}
