//! Error types and axum `IntoResponse` implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::dataset::FetchError;

/// A failure that aborts a whole delivery. Per-record failures never surface
/// here; the reconciler counts them instead.
#[derive(Debug, Error)]
pub enum Error {
  #[error("payload carries neither a dataset id nor a record list")]
  MissingDatasetIdentifier,

  #[error("malformed payload: {0}")]
  MalformedPayload(String),

  #[error("dataset fetch failed: {0}")]
  Dataset(#[from] FetchError),

  #[error("request body too large")]
  PayloadTooLarge,

  #[error("failed to read request body: {0}")]
  BodyRead(String),

  #[error("method not allowed")]
  MethodNotAllowed,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      Error::MissingDatasetIdentifier => {
        (StatusCode::BAD_REQUEST, "Missing dataset identifier")
      }
      Error::MalformedPayload(_) => (StatusCode::BAD_REQUEST, "Malformed payload"),
      Error::Dataset(_) => {
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch dataset")
      }
      Error::BodyRead(_) => (StatusCode::BAD_REQUEST, "Failed to read request body"),
      Error::PayloadTooLarge => {
        (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
      }
      Error::MethodNotAllowed => {
        return (
          StatusCode::METHOD_NOT_ALLOWED,
          Json(json!({ "error": "Method not allowed" })),
        )
          .into_response();
      }
    };
    (
      status,
      Json(json!({ "message": message, "error": self.to_string() })),
    )
      .into_response()
  }
}
