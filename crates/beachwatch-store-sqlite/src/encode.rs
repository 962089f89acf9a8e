//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings (microsecond
//! precision, `Z` suffix) so that SQL string comparison orders them
//! chronologically; the retention pruner relies on this. UUIDs are stored as
//! hyphenated lowercase strings.

use beachwatch_core::{beach::Beach, condition::BeachCondition};
use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawBeach::from_row`].
pub const BEACH_COLUMNS: &str = "beach_id, identity_key, place_id, name, \
  municipality, source_url, latitude, longitude, created_at, updated_at";

/// Raw values read directly from a `beaches` row.
pub struct RawBeach {
  pub beach_id:     String,
  pub identity_key: String,
  pub place_id:     String,
  pub name:         String,
  pub municipality: String,
  pub source_url:   Option<String>,
  pub latitude:     Option<f64>,
  pub longitude:    Option<f64>,
  pub created_at:   String,
  pub updated_at:   String,
}

impl RawBeach {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      beach_id:     row.get(0)?,
      identity_key: row.get(1)?,
      place_id:     row.get(2)?,
      name:         row.get(3)?,
      municipality: row.get(4)?,
      source_url:   row.get(5)?,
      latitude:     row.get(6)?,
      longitude:    row.get(7)?,
      created_at:   row.get(8)?,
      updated_at:   row.get(9)?,
    })
  }

  pub fn into_beach(self) -> Result<Beach> {
    Ok(Beach {
      beach_id:     decode_uuid(&self.beach_id)?,
      identity_key: self.identity_key,
      place_id:     self.place_id,
      name:         self.name,
      municipality: self.municipality,
      source_url:   self.source_url,
      latitude:     self.latitude,
      longitude:    self.longitude,
      created_at:   decode_dt(&self.created_at)?,
      updated_at:   decode_dt(&self.updated_at)?,
    })
  }
}

/// Column list matching [`RawCondition::from_row`].
pub const CONDITION_COLUMNS: &str = "condition_id, beach_id, recorded_at, \
  ingested_at, occupancy, occupancy_label, flag_status, has_jellyfish, \
  air_temperature, water_temperature, wind_speed, wave_height";

/// Raw values read directly from a `beach_conditions` row.
pub struct RawCondition {
  pub condition_id:      String,
  pub beach_id:          String,
  pub recorded_at:       String,
  pub ingested_at:       String,
  pub occupancy:         Option<i32>,
  pub occupancy_label:   Option<String>,
  pub flag_status:       String,
  pub has_jellyfish:     Option<bool>,
  pub air_temperature:   Option<f64>,
  pub water_temperature: Option<f64>,
  pub wind_speed:        Option<f64>,
  pub wave_height:       Option<f64>,
}

impl RawCondition {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      condition_id:      row.get(0)?,
      beach_id:          row.get(1)?,
      recorded_at:       row.get(2)?,
      ingested_at:       row.get(3)?,
      occupancy:         row.get(4)?,
      occupancy_label:   row.get(5)?,
      flag_status:       row.get(6)?,
      has_jellyfish:     row.get(7)?,
      air_temperature:   row.get(8)?,
      water_temperature: row.get(9)?,
      wind_speed:        row.get(10)?,
      wave_height:       row.get(11)?,
    })
  }

  pub fn into_condition(self) -> Result<BeachCondition> {
    Ok(BeachCondition {
      condition_id:      decode_uuid(&self.condition_id)?,
      beach_id:          decode_uuid(&self.beach_id)?,
      recorded_at:       decode_dt(&self.recorded_at)?,
      ingested_at:       decode_dt(&self.ingested_at)?,
      occupancy:         self.occupancy,
      occupancy_label:   self.occupancy_label,
      flag_status:       self.flag_status,
      has_jellyfish:     self.has_jellyfish,
      air_temperature:   self.air_temperature,
      water_temperature: self.water_temperature,
      wind_speed:        self.wind_speed,
      wave_height:       self.wave_height,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn encoded_timestamps_sort_chronologically() {
    let a = Utc.with_ymd_and_hms(2026, 7, 1, 8, 0, 0).unwrap();
    let b = a + chrono::Duration::microseconds(1);
    let c = a + chrono::Duration::milliseconds(500);
    let (ea, eb, ec) = (encode_dt(a), encode_dt(b), encode_dt(c));
    assert_eq!(ea.len(), eb.len());
    assert_eq!(eb.len(), ec.len());
    assert!(ea < eb && eb < ec);
    assert_eq!(decode_dt(&eb).unwrap(), b);
  }
}
