//! Beach — the slowly-changing dimension row.
//!
//! One row per identity key. Coordinates are populated out-of-band and are
//! never written by the ingestion path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::{BeachIdentity, IdentityPolicy};

/// Municipality stored on insert when the record does not name one.
pub const DEFAULT_MUNICIPALITY: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beach {
  pub beach_id:     Uuid,
  pub identity_key: String,
  pub place_id:     String,
  pub name:         String,
  pub municipality: String,
  pub source_url:   Option<String>,
  pub latitude:     Option<f64>,
  pub longitude:    Option<f64>,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
}

/// Input to [`crate::store::BeachStore::upsert_beach`].
///
/// `None` fields never overwrite stored values; on insert a missing
/// municipality becomes [`DEFAULT_MUNICIPALITY`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBeach {
  pub identity_key: String,
  pub place_id:     String,
  pub name:         String,
  /// `name` was derived from the URL; it is used on insert but never
  /// replaces a stored name.
  pub name_derived: bool,
  pub municipality: Option<String>,
  pub source_url:   Option<String>,
}

impl NewBeach {
  /// Build the upsert input for `identity`, or `None` when `policy` cannot
  /// key it.
  pub fn from_identity(
    identity: BeachIdentity,
    policy: &dyn IdentityPolicy,
  ) -> Option<Self> {
    let identity_key = policy.identity_key(&identity)?;
    let place_id = policy.place_id(&identity);
    Some(Self {
      identity_key,
      place_id,
      name: identity.name,
      name_derived: identity.name_derived,
      municipality: identity.municipality,
      source_url: identity.source_url,
    })
  }
}

/// Result of an insert-or-merge.
#[derive(Debug, Clone, PartialEq)]
pub struct Upserted {
  pub beach:   Beach,
  /// `true` when the row did not exist before this call.
  pub created: bool,
}
