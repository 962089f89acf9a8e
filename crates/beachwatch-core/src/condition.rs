//! BeachCondition — the append-only fact row.
//!
//! A condition is an observation of one beach at one point in time. Rows are
//! never updated; the retention pruner is the only thing that deletes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::record::ScrapedRecord;

/// Flag status stored when the record does not carry one.
pub const DEFAULT_FLAG_STATUS: &str = "green";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeachCondition {
  pub condition_id:      Uuid,
  pub beach_id:          Uuid,
  /// When the source observed the beach; ingestion time if it did not say.
  pub recorded_at:       DateTime<Utc>,
  pub ingested_at:       DateTime<Utc>,
  /// Occupancy as a percentage. `None` means no data, not an empty beach.
  pub occupancy:         Option<i32>,
  pub occupancy_label:   Option<String>,
  pub flag_status:       String,
  pub has_jellyfish:     Option<bool>,
  pub air_temperature:   Option<f64>,
  pub water_temperature: Option<f64>,
  pub wind_speed:        Option<f64>,
  pub wave_height:       Option<f64>,
}

/// Input to [`crate::store::BeachStore::record_condition`]. The id and
/// `ingested_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCondition {
  pub beach_id:          Uuid,
  pub recorded_at:       DateTime<Utc>,
  pub occupancy:         Option<i32>,
  pub occupancy_label:   Option<String>,
  pub flag_status:       String,
  pub has_jellyfish:     Option<bool>,
  pub air_temperature:   Option<f64>,
  pub water_temperature: Option<f64>,
  pub wind_speed:        Option<f64>,
  pub wave_height:       Option<f64>,
}

impl NewCondition {
  /// Carry the measurements of `record` onto `beach_id`. Missing readings
  /// stay `None`; only the flag status has a default.
  pub fn from_record(
    beach_id: Uuid,
    record: &ScrapedRecord,
    ingested_at: DateTime<Utc>,
  ) -> Self {
    Self {
      beach_id,
      recorded_at: record.recorded_at.unwrap_or(ingested_at),
      occupancy: record.occupancy,
      occupancy_label: record.occupancy_label.clone(),
      flag_status: record
        .flag_status
        .clone()
        .unwrap_or_else(|| DEFAULT_FLAG_STATUS.to_owned()),
      has_jellyfish: record.has_jellyfish,
      air_temperature: record.air_temperature,
      water_temperature: record.water_temperature,
      wind_speed: record.wind_speed,
      wave_height: record.wave_height,
    }
  }
}
