//! Lenient reading of scraped records.
//!
//! The crawler's output is loosely typed: field names drift between camelCase
//! and snake_case, numbers arrive as strings with units and booleans arrive in
//! Spanish. [`ScrapedRecord::from_json`] never fails; anything it cannot read
//! is treated as absent.

use chrono::{DateTime, Datelike as _, NaiveDateTime, Utc};
use url::Url;
use serde_json::Value;

use crate::{Error, Result, identity::BeachIdentity};

const NAME_KEYS: &[&str] = &["name", "beach_name", "beachName"];
const MUNICIPALITY_KEYS: &[&str] = &["municipality", "town", "city"];
const SOURCE_URL_KEYS: &[&str] = &["source_url", "sourceUrl", "url"];
const FLAG_KEYS: &[&str] = &["flag_status", "flagStatus", "flag"];
const JELLYFISH_KEYS: &[&str] = &["has_jellyfish", "hasJellyfish", "jellyfish"];
const OCCUPANCY_KEYS: &[&str] = &["occupancy", "occupancy_percent"];
const AIR_TEMPERATURE_KEYS: &[&str] = &["air_temperature", "airTemperature"];
const WATER_TEMPERATURE_KEYS: &[&str] = &["water_temperature", "waterTemperature"];
const WIND_SPEED_KEYS: &[&str] = &["wind_speed", "windSpeed"];
const WAVE_HEIGHT_KEYS: &[&str] = &["wave_height", "waveHeight"];
const RECORDED_AT_KEYS: &[&str] =
  &["scraped_at", "scrapedAt", "recorded_at", "recordedAt"];

/// One scraped record with every field optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrapedRecord {
  pub name:              Option<String>,
  pub municipality:      Option<String>,
  pub source_url:        Option<String>,
  pub flag_status:       Option<String>,
  pub has_jellyfish:     Option<bool>,
  pub occupancy:         Option<i32>,
  pub occupancy_label:   Option<String>,
  pub air_temperature:   Option<f64>,
  pub water_temperature: Option<f64>,
  pub wind_speed:        Option<f64>,
  pub wave_height:       Option<f64>,
  pub recorded_at:       Option<DateTime<Utc>>,
}

impl ScrapedRecord {
  pub fn from_json(value: &Value) -> Self {
    let (occupancy, occupancy_label) = read_occupancy(value);
    Self {
      name: json_string(value, NAME_KEYS),
      municipality: json_string(value, MUNICIPALITY_KEYS),
      source_url: json_string(value, SOURCE_URL_KEYS),
      flag_status: json_string(value, FLAG_KEYS).map(|f| f.to_lowercase()),
      has_jellyfish: json_bool(value, JELLYFISH_KEYS),
      occupancy,
      occupancy_label,
      air_temperature: json_f64(value, AIR_TEMPERATURE_KEYS),
      water_temperature: json_f64(value, WATER_TEMPERATURE_KEYS),
      wind_speed: json_f64(value, WIND_SPEED_KEYS),
      wave_height: json_f64(value, WAVE_HEIGHT_KEYS),
      recorded_at: json_string(value, RECORDED_AT_KEYS)
        .as_deref()
        .and_then(parse_timestamp),
    }
  }

  /// Settle on a display name and return the identity fields.
  ///
  /// - [`Error::MissingIdentity`] when there is neither a name nor a URL.
  /// - [`Error::NameNotDerivable`] when only a URL is present and its last
  ///   path segment yields no name.
  pub fn identity(&self) -> Result<BeachIdentity> {
    let (name, name_derived) = match (&self.name, &self.source_url) {
      (Some(name), _) => (name.clone(), false),
      (None, Some(url)) => {
        let name =
          name_from_url(url).ok_or_else(|| Error::NameNotDerivable(url.clone()))?;
        (name, true)
      }
      (None, None) => return Err(Error::MissingIdentity),
    };
    Ok(BeachIdentity {
      name,
      name_derived,
      municipality: self.municipality.clone(),
      source_url: self.source_url.clone(),
    })
  }

  /// Name or URL, whichever is present; used to label log lines.
  pub fn label(&self) -> &str {
    self
      .name
      .as_deref()
      .or(self.source_url.as_deref())
      .unwrap_or("<unnamed>")
  }
}

// ─── Name derivation ─────────────────────────────────────────────────────────

/// Title-case the last path segment of `url`, with `-` and `_` as word
/// breaks. `https://x.es/playas/cala-millor` → `Cala Millor`.
pub fn name_from_url(url: &str) -> Option<String> {
  let segment = match Url::parse(url) {
    Ok(parsed) => parsed.path_segments()?.rfind(|s| !s.is_empty())?.to_owned(),
    // No scheme: treat the input as a bare path.
    Err(_) => url
      .split(['?', '#'])
      .next()
      .unwrap_or(url)
      .split('/')
      .rfind(|s| !s.is_empty())?
      .to_owned(),
  };
  let segment = segment
    .strip_suffix(".html")
    .or_else(|| segment.strip_suffix(".htm"))
    .unwrap_or(&segment);

  let words: Vec<String> = segment
    .split(['-', '_'])
    .filter(|w| !w.is_empty())
    .map(title_case)
    .collect();

  if words.is_empty() { None } else { Some(words.join(" ")) }
}

fn title_case(word: &str) -> String {
  let mut chars = word.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
    None => String::new(),
  }
}

// ─── JSON helpers ────────────────────────────────────────────────────────────

fn json_field<'a>(value: &'a Value, keys: &[&str]) -> impl Iterator<Item = &'a Value> {
  keys
    .iter()
    .filter_map(move |key| value.get(key))
    .filter(|v| !v.is_null())
}

fn json_string(value: &Value, keys: &[&str]) -> Option<String> {
  json_field(value, keys).find_map(|v| {
    let s = match v {
      Value::String(s) => s.trim().to_owned(),
      Value::Number(n) => n.to_string(),
      _ => return None,
    };
    (!s.is_empty()).then_some(s)
  })
}

fn json_f64(value: &Value, keys: &[&str]) -> Option<f64> {
  json_field(value, keys).find_map(|v| match v {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => leading_number(s),
    _ => None,
  })
}

fn json_bool(value: &Value, keys: &[&str]) -> Option<bool> {
  json_field(value, keys).find_map(|v| match v {
    Value::Bool(b) => Some(*b),
    Value::Number(n) => match n.as_i64() {
      Some(0) => Some(false),
      Some(1) => Some(true),
      _ => None,
    },
    Value::String(s) => match s.trim().to_lowercase().as_str() {
      "true" | "yes" | "si" | "sí" | "1" => Some(true),
      "false" | "no" | "0" => Some(false),
      _ => None,
    },
    _ => None,
  })
}

/// Numeric occupancy plus the source's display string, if it sent one.
///
/// The first key holding a number or a non-blank string wins. Numbers outside
/// `0..=100` are not percentages and read as absent.
fn read_occupancy(value: &Value) -> (Option<i32>, Option<String>) {
  json_field(value, OCCUPANCY_KEYS)
    .find_map(|v| match v {
      Value::Number(n) => Some((n.as_f64().and_then(percent), None)),
      Value::String(s) if !s.trim().is_empty() => {
        let label = s.trim().to_owned();
        Some((leading_number(&label).and_then(percent), Some(label)))
      }
      _ => None,
    })
    .unwrap_or((None, None))
}

fn percent(value: f64) -> Option<i32> {
  (0.0..=100.0).contains(&value).then(|| value.round() as i32)
}

/// Parse the numeric prefix of strings like `"24,5 °C"` or `"45%"`.
fn leading_number(s: &str) -> Option<f64> {
  let s = s.trim();
  let end = s
    .char_indices()
    .find(|&(i, c)| {
      !(c.is_ascii_digit() || c == '.' || c == ',' || (i == 0 && (c == '-' || c == '+')))
    })
    .map(|(i, _)| i)
    .unwrap_or(s.len());
  s[..end].replace(',', ".").parse().ok()
}

/// Stored timestamps are fixed-width, so years past 9999 (or before year 0)
/// read as absent and the condition falls back to ingestion time.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
  let parsed = match DateTime::parse_from_rfc3339(s) {
    Ok(dt) => dt.with_timezone(&Utc),
    Err(_) => ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
      .iter()
      .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())?
      .and_utc(),
  };
  (0..=9999).contains(&parsed.year()).then_some(parsed)
}
