//! The `BeachStore` trait.
//!
//! Implemented by storage backends (e.g. `beachwatch-store-sqlite`). The
//! webhook layer depends on this abstraction, never on a concrete backend, so
//! tests can swap in an in-memory store or a wrapper that injects failures.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  beach::{Beach, NewBeach, Upserted},
  condition::{BeachCondition, NewCondition},
};

/// Abstraction over a beach/condition store backend.
///
/// Beaches are keyed by a unique `identity_key`. Conditions are append-only;
/// the only delete is [`BeachStore::prune_conditions`].
///
/// All methods return `Send` futures so the trait can be used from axum
/// handlers on a multi-threaded runtime.
pub trait BeachStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Beaches ───────────────────────────────────────────────────────────

  /// Look up a beach by its exact identity key.
  fn find_beach<'a>(
    &'a self,
    identity_key: &'a str,
  ) -> impl Future<Output = Result<Option<Beach>, Self::Error>> + Send + 'a;

  /// Insert the beach if its identity key is unseen, otherwise merge the
  /// non-`None` fields of `input` into the stored row and bump `updated_at`.
  ///
  /// Must be atomic with respect to concurrent callers using the same key:
  /// two racing calls produce one row, one `created: true` result and one
  /// `created: false` result.
  fn upsert_beach(
    &self,
    input: NewBeach,
  ) -> impl Future<Output = Result<Upserted, Self::Error>> + Send + '_;

  /// All beaches, ordered by name.
  fn list_beaches(
    &self,
  ) -> impl Future<Output = Result<Vec<Beach>, Self::Error>> + Send + '_;

  // ── Conditions ────────────────────────────────────────────────────────

  /// Append a condition row. `condition_id` and `ingested_at` are assigned
  /// by the store.
  fn record_condition(
    &self,
    input: NewCondition,
  ) -> impl Future<Output = Result<BeachCondition, Self::Error>> + Send + '_;

  /// All conditions for a beach, oldest `recorded_at` first.
  fn list_conditions(
    &self,
    beach_id: Uuid,
  ) -> impl Future<Output = Result<Vec<BeachCondition>, Self::Error>> + Send + '_;

  /// Delete every condition with `recorded_at` strictly before `cutoff`.
  /// Returns the number of rows removed.
  fn prune_conditions(
    &self,
    cutoff: DateTime<Utc>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
