//! Where indirect deliveries get their records from.
//!
//! A delivery that names a dataset id carries no records itself; the
//! [`DatasetSource`] resolves the id to the scraped items.

use std::{future::Future, time::Duration};

use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
  #[error("request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("http status {status} for dataset {dataset_id}")]
  HttpStatus { status: u16, dataset_id: String },
}

/// Resolves a dataset id to its items.
///
/// The returned value is whatever the source holds; the caller checks that
/// it is an array.
pub trait DatasetSource: Send + Sync {
  fn fetch_items<'a>(
    &'a self,
    dataset_id: &'a str,
  ) -> impl Future<Output = Result<Value, FetchError>> + Send + 'a;
}

// ─── HTTP source ─────────────────────────────────────────────────────────────

/// Reads `GET {base}/datasets/{id}/items?format=json&clean=true`.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct HttpDatasetSource {
  client:   Client,
  base_url: String,
  token:    Option<String>,
}

impl HttpDatasetSource {
  pub fn new(
    base_url: impl Into<String>,
    token: Option<String>,
    timeout: Duration,
  ) -> Result<Self, FetchError> {
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self { client, base_url: base_url.into(), token })
  }

  fn items_url(&self, dataset_id: &str) -> String {
    format!(
      "{}/datasets/{dataset_id}/items",
      self.base_url.trim_end_matches('/')
    )
  }
}

impl DatasetSource for HttpDatasetSource {
  async fn fetch_items<'a>(&'a self, dataset_id: &'a str) -> Result<Value, FetchError> {
    let mut req = self
      .client
      .get(self.items_url(dataset_id))
      .query(&[("format", "json"), ("clean", "true")]);
    if let Some(token) = &self.token {
      req = req.bearer_auth(token);
    }

    let resp = req.send().await?;
    let status = resp.status();
    if !status.is_success() {
      return Err(FetchError::HttpStatus {
        status:     status.as_u16(),
        dataset_id: dataset_id.to_owned(),
      });
    }

    tracing::debug!(dataset_id, "fetched dataset items");
    Ok(resp.json().await?)
  }
}
