//! OPTIONS handler — CORS preflight.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
};

/// Empty 200; the CORS headers come from the router's header layers.
pub fn handler() -> Response { StatusCode::OK.into_response() }
