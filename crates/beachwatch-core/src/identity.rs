//! Identity policies — how a scraped record is matched to a beach row.
//!
//! A policy turns the validated identity fields of a record into the exact
//! string stored in `beaches.identity_key`. Stores enforce uniqueness on that
//! key, so one deployment must keep one policy: switching policies on a
//! populated store produces a second row for every beach.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, beach::DEFAULT_MUNICIPALITY, slug::slugify};

/// Separates components of a composite identity key.
pub const KEY_SEPARATOR: char = '\u{1f}';

/// The identity fields of a record once validation has settled on a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeachIdentity {
  pub name:         String,
  /// The record had no name and `name` came from its URL.
  pub name_derived: bool,
  pub municipality: Option<String>,
  pub source_url:   Option<String>,
}

/// Strategy for deriving the lookup key and the `place_id` slug.
pub trait IdentityPolicy: Send + Sync {
  /// The exact-match lookup key, or `None` when the record lacks the field
  /// this policy keys on.
  fn identity_key(&self, identity: &BeachIdentity) -> Option<String>;

  /// The stable slug stored alongside a newly created beach.
  fn place_id(&self, identity: &BeachIdentity) -> String;
}

// ─── Built-in strategies ─────────────────────────────────────────────────────

/// The built-in policies, selectable from configuration. Deserialises through
/// [`FromStr`], so an unknown name fails config loading with
/// [`Error::UnknownIdentityPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum IdentityStrategy {
  /// Exact match on `name`.
  Name,
  /// Exact match on `(name, municipality)`; a missing municipality keys as
  /// `"Unknown"`.
  #[default]
  NameMunicipality,
  /// Exact match on `source_url`.
  SourceUrl,
}

impl IdentityPolicy for IdentityStrategy {
  fn identity_key(&self, identity: &BeachIdentity) -> Option<String> {
    match self {
      Self::Name => Some(identity.name.clone()),
      Self::NameMunicipality => {
        let municipality = identity
          .municipality
          .as_deref()
          .unwrap_or(DEFAULT_MUNICIPALITY);
        Some(format!("{}{KEY_SEPARATOR}{municipality}", identity.name))
      }
      Self::SourceUrl => identity.source_url.clone(),
    }
  }

  fn place_id(&self, identity: &BeachIdentity) -> String {
    match (self, identity.municipality.as_deref()) {
      (Self::NameMunicipality, Some(municipality)) => {
        slugify(&format!("{} {municipality}", identity.name))
      }
      _ => slugify(&identity.name),
    }
  }
}

impl IdentityStrategy {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Name => "name",
      Self::NameMunicipality => "name_municipality",
      Self::SourceUrl => "source_url",
    }
  }
}

impl fmt::Display for IdentityStrategy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for IdentityStrategy {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "name" => Ok(Self::Name),
      "name_municipality" => Ok(Self::NameMunicipality),
      "source_url" => Ok(Self::SourceUrl),
      other => Err(Error::UnknownIdentityPolicy(other.to_owned())),
    }
  }
}

impl TryFrom<String> for IdentityStrategy {
  type Error = Error;

  fn try_from(s: String) -> Result<Self, Self::Error> {
    s.parse()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn muro() -> BeachIdentity {
    BeachIdentity {
      name:         "Playa de Muro".into(),
      name_derived: false,
      municipality: Some("Muro".into()),
      source_url:   Some("https://example.com/playas/playa-de-muro".into()),
    }
  }

  #[test]
  fn name_municipality_keys_on_both_fields() {
    let policy = IdentityStrategy::NameMunicipality;
    assert_eq!(
      policy.identity_key(&muro()).as_deref(),
      Some("Playa de Muro\u{1f}Muro")
    );
    assert_eq!(policy.place_id(&muro()), "playa_de_muro_muro");
  }

  #[test]
  fn missing_municipality_keys_as_unknown() {
    let identity = BeachIdentity { municipality: None, ..muro() };
    let policy = IdentityStrategy::NameMunicipality;
    assert_eq!(
      policy.identity_key(&identity).as_deref(),
      Some("Playa de Muro\u{1f}Unknown")
    );
    assert_eq!(policy.place_id(&identity), "playa_de_muro");
  }

  #[test]
  fn name_policy_ignores_municipality() {
    let policy = IdentityStrategy::Name;
    assert_eq!(policy.identity_key(&muro()).as_deref(), Some("Playa de Muro"));
    assert_eq!(policy.place_id(&muro()), "playa_de_muro");
  }

  #[test]
  fn source_url_policy_requires_url() {
    let policy = IdentityStrategy::SourceUrl;
    assert_eq!(
      policy.identity_key(&muro()).as_deref(),
      Some("https://example.com/playas/playa-de-muro")
    );
    let identity = BeachIdentity { source_url: None, ..muro() };
    assert!(policy.identity_key(&identity).is_none());
  }

  #[test]
  fn parses_from_config_strings() {
    for strategy in [
      IdentityStrategy::Name,
      IdentityStrategy::NameMunicipality,
      IdentityStrategy::SourceUrl,
    ] {
      assert_eq!(strategy.as_str().parse::<IdentityStrategy>().unwrap(), strategy);
    }
    assert!(matches!(
      "fuzzy".parse::<IdentityStrategy>(),
      Err(Error::UnknownIdentityPolicy(_))
    ));
  }

  #[test]
  fn deserialises_through_from_str() {
    let strategy: IdentityStrategy =
      serde_json::from_value(serde_json::json!("source_url")).unwrap();
    assert_eq!(strategy, IdentityStrategy::SourceUrl);

    let err = serde_json::from_value::<IdentityStrategy>(serde_json::json!("fuzzy"))
      .unwrap_err();
    assert!(err.to_string().contains("unknown identity policy"), "{err}");
  }
}
