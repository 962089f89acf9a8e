//! Turning a webhook body into the list of raw records to reconcile.
//!
//! Two payload shapes arrive in practice. A run-finished notification names a
//! dataset (`resource.defaultDatasetId`) whose items must be fetched; a direct
//! delivery carries the records inline under `eventData.data` or `data`. The
//! dataset id wins when both are present.

use serde_json::Value;

use crate::{
  Error, Result,
  dataset::DatasetSource,
};

/// Where the records of a delivery live.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
  Dataset(String),
  Inline(Vec<Value>),
}

/// Parse the body and locate its records without any I/O.
pub fn parse_payload(body: &[u8]) -> Result<Payload> {
  let value: Value = serde_json::from_slice(body)
    .map_err(|e| Error::MalformedPayload(format!("body is not JSON: {e}")))?;
  if !value.is_object() {
    return Err(Error::MalformedPayload("body is not a JSON object".into()));
  }

  if let Some(id) = value
    .pointer("/resource/defaultDatasetId")
    .and_then(Value::as_str)
    .map(str::trim)
    .filter(|id| !id.is_empty())
  {
    return Ok(Payload::Dataset(id.to_owned()));
  }

  let inline = [value.pointer("/eventData/data"), value.get("data")]
    .into_iter()
    .flatten()
    .find(|v| !v.is_null());

  match inline {
    Some(Value::Array(records)) => Ok(Payload::Inline(records.clone())),
    Some(_) => Err(Error::MalformedPayload("record list is not an array".into())),
    None => Err(Error::MissingDatasetIdentifier),
  }
}

/// Resolve the body to its records, fetching from `source` when the payload
/// only names a dataset.
pub async fn extract_records<D: DatasetSource>(
  body: &[u8],
  source: &D,
) -> Result<Vec<Value>> {
  match parse_payload(body)? {
    Payload::Inline(records) => Ok(records),
    Payload::Dataset(id) => match source.fetch_items(&id).await? {
      Value::Array(records) => {
        tracing::info!(dataset_id = %id, records = records.len(), "fetched dataset");
        Ok(records)
      }
      _ => Err(Error::MalformedPayload(format!("dataset {id} is not an array"))),
    },
  }
}
