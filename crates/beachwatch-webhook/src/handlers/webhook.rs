//! POST handler — one delivery.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use beachwatch_core::store::BeachStore;
use chrono::Utc;
use serde::Serialize;

use crate::{
  AppState,
  dataset::DatasetSource,
  error::Error,
  extract::extract_records,
  reconcile::{Reconciler, Summary},
};

#[derive(Debug, Serialize)]
struct DeliveryResponse {
  success: bool,
  results: Summary,
}

pub async fn handler<S, D>(
  state: &AppState<S, D>,
  body: &[u8],
) -> Result<Response, Error>
where
  S: BeachStore + Clone + 'static,
  D: DatasetSource + Clone + 'static,
{
  let records = extract_records(body, state.datasets.as_ref()).await?;

  let reconciler = Reconciler::new(state.store.clone(), state.policy.clone())
    .with_retention(state.config.retention());
  let results = reconciler.run(&records, Utc::now()).await;

  Ok((StatusCode::OK, Json(DeliveryResponse { success: true, results })).into_response())
}
