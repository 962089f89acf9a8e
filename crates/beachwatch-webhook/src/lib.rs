//! Webhook layer for beachwatch.
//!
//! Exposes an axum [`Router`] that accepts scraper deliveries on `/` and
//! `/webhook`, reconciles their records into any [`BeachStore`] and prunes
//! conditions past the retention window.

pub mod dataset;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod reconcile;

pub use error::{Error, Result};

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  body::Body,
  extract::{DefaultBodyLimit, FromRequest as _, Request, State},
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
  routing::any,
};
use beachwatch_core::{
  identity::{IdentityPolicy, IdentityStrategy},
  store::BeachStore,
};
use bytes::Bytes;
use serde::Deserialize;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use dataset::DatasetSource;
use handlers::{options, webhook};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `BEACHWATCH_*` environment variables. Every key has a default.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                 String,
  pub port:                 u16,
  pub store_path:           PathBuf,
  pub identity_policy:      IdentityStrategy,
  pub retention_hours:      u32,
  pub prune_enabled:        bool,
  pub dataset_api_base:     String,
  pub dataset_api_token:    Option<String>,
  pub dataset_timeout_secs: u64,
  pub max_body_bytes:       usize,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                 "0.0.0.0".to_string(),
      port:                 8080,
      store_path:           PathBuf::from("beachwatch.sqlite3"),
      identity_policy:      IdentityStrategy::default(),
      retention_hours:      24,
      prune_enabled:        true,
      dataset_api_base:     "https://api.apify.com/v2".to_string(),
      dataset_api_token:    None,
      dataset_timeout_secs: 30,
      max_body_bytes:       8 * 1024 * 1024,
    }
  }
}

impl ServerConfig {
  /// The pruning window, or `None` when pruning is disabled.
  pub fn retention(&self) -> Option<chrono::Duration> {
    self
      .prune_enabled
      .then(|| chrono::Duration::hours(i64::from(self.retention_hours)))
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: BeachStore, D: DatasetSource> {
  pub store:    Arc<S>,
  pub datasets: Arc<D>,
  pub policy:   Arc<dyn IdentityPolicy>,
  pub config:   Arc<ServerConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build an axum [`Router`] for the webhook receiver.
///
/// Every response, errors included, carries the CORS headers.
pub fn router<S, D>(state: AppState<S, D>) -> Router
where
  S: BeachStore + Clone + 'static,
  D: DatasetSource + Clone + 'static,
{
  let body_limit = state.config.max_body_bytes;
  Router::new()
    .route("/",        any(delivery_handler::<S, D>))
    .route("/webhook", any(delivery_handler::<S, D>))
    .layer(DefaultBodyLimit::max(body_limit))
    .layer(SetResponseHeaderLayer::overriding(
      header::ACCESS_CONTROL_ALLOW_ORIGIN,
      HeaderValue::from_static("*"),
    ))
    .layer(SetResponseHeaderLayer::overriding(
      header::ACCESS_CONTROL_ALLOW_HEADERS,
      HeaderValue::from_static("Content-Type"),
    ))
    .layer(SetResponseHeaderLayer::overriding(
      header::ACCESS_CONTROL_ALLOW_METHODS,
      HeaderValue::from_static("POST, OPTIONS"),
    ))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Dispatch helpers ────────────────────────────────────────────────────────

/// Buffer the body under the router's [`DefaultBodyLimit`]. Only a body over
/// the limit is a 413; a stream that breaks off is a 400.
async fn collect_body(req: Request<Body>) -> Result<Bytes, Response> {
  Bytes::from_request(req, &()).await.map_err(|rejection| {
    let err = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
      Error::PayloadTooLarge
    } else {
      Error::BodyRead(rejection.body_text())
    };
    err.into_response()
  })
}

// ─── Route handlers ──────────────────────────────────────────────────────────

async fn delivery_handler<S, D>(
  State(state): State<AppState<S, D>>,
  req: Request<Body>,
) -> Response
where
  S: BeachStore + Clone + 'static,
  D: DatasetSource + Clone + 'static,
{
  match req.method().as_str() {
    "OPTIONS" => options::handler(),
    "POST" => {
      let body = match collect_body(req).await {
        Ok(b) => b,
        Err(e) => return e,
      };
      webhook::handler(&state, &body).await.into_response_or_err()
    }
    _ => Error::MethodNotAllowed.into_response(),
  }
}

// ─── Helper trait ────────────────────────────────────────────────────────────

trait IntoResponseOrErr {
  fn into_response_or_err(self) -> Response;
}

impl IntoResponseOrErr for Result<Response, Error> {
  fn into_response_or_err(self) -> Response {
    match self {
      Ok(r)  => r,
      Err(e) => {
        tracing::warn!(error = %e, "delivery rejected");
        e.into_response()
      }
    }
  }
}

// ─── Integration tests ────────────────────────────────────────────────────────
