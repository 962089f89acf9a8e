//! Per-record reconciliation of a delivery against the store.
//!
//! Records are processed strictly in input order, one at a time. A record
//! either lands in the store (creating or updating its beach and appending a
//! condition), is skipped because it cannot be identified, or fails. Failures
//! are isolated: they are logged, counted and the batch moves on. After the
//! loop the retention pruner runs whatever happened to the records.

use std::sync::Arc;

use beachwatch_core::{
  beach::NewBeach,
  condition::NewCondition,
  identity::IdentityPolicy,
  record::ScrapedRecord,
  store::BeachStore,
};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ─── Summary ─────────────────────────────────────────────────────────────────

/// Counters for one delivery. `created + updated + skipped + errors` always
/// equals `total`; `processed` is the number of conditions appended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
  pub total:     usize,
  pub created:   usize,
  pub updated:   usize,
  pub processed: usize,
  pub skipped:   usize,
  pub errors:    usize,
  /// Conditions removed by retention; `None` when pruning is disabled or
  /// failed.
  pub pruned:    Option<u64>,
}

impl Summary {
  fn tally(&mut self, outcome: &Outcome) {
    match outcome {
      Outcome::Created => {
        self.created += 1;
        self.processed += 1;
      }
      Outcome::Updated => {
        self.updated += 1;
        self.processed += 1;
      }
      Outcome::Skipped(_) => self.skipped += 1,
    }
  }
}

/// How a single record ended, short of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
  Created,
  Updated,
  Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
  /// Neither a name nor a URL.
  NoIdentity,
  /// The identity policy keys on a field the record lacks.
  NoPolicyKey,
}

/// Why a single record failed.
#[derive(Debug, Error)]
pub enum RecordError<E: std::error::Error + 'static> {
  #[error(transparent)]
  Identity(beachwatch_core::Error),

  #[error("upsert failed: {0}")]
  Upsert(#[source] E),

  /// The beach was written but its condition was not. The beach write is
  /// kept.
  #[error("condition insert failed for beach {beach_id}: {source}")]
  Condition { beach_id: uuid::Uuid, source: E },
}

// ─── Reconciler ──────────────────────────────────────────────────────────────

/// Applies deliveries to a [`BeachStore`] under one identity policy.
pub struct Reconciler<S> {
  store:     Arc<S>,
  policy:    Arc<dyn IdentityPolicy>,
  retention: Option<Duration>,
}

impl<S: BeachStore> Reconciler<S> {
  pub fn new(store: Arc<S>, policy: Arc<dyn IdentityPolicy>) -> Self {
    Self { store, policy, retention: None }
  }

  /// Prune conditions older than `retention` after every run. `None`
  /// disables pruning.
  pub fn with_retention(mut self, retention: Option<Duration>) -> Self {
    self.retention = retention;
    self
  }

  /// Reconcile every record, then prune. Never fails as a whole.
  pub async fn run(&self, records: &[Value], now: DateTime<Utc>) -> Summary {
    let mut summary = Summary { total: records.len(), ..Summary::default() };

    for (index, raw) in records.iter().enumerate() {
      let record = ScrapedRecord::from_json(raw);
      match self.reconcile_one(&record, now).await {
        Ok(outcome) => {
          if let Outcome::Skipped(reason) = outcome {
            tracing::info!(record = index, ?reason, "skipping record");
          }
          summary.tally(&outcome);
        }
        Err(e) => {
          tracing::warn!(
            record = index,
            identity = record.label(),
            error = %e,
            "record failed"
          );
          summary.errors += 1;
        }
      }
    }

    summary.pruned = self.prune(now).await;

    tracing::info!(
      total = summary.total,
      created = summary.created,
      updated = summary.updated,
      skipped = summary.skipped,
      errors = summary.errors,
      pruned = ?summary.pruned,
      "delivery reconciled"
    );
    summary
  }

  /// Validate, resolve and write a single record.
  pub async fn reconcile_one(
    &self,
    record: &ScrapedRecord,
    now: DateTime<Utc>,
  ) -> Result<Outcome, RecordError<S::Error>> {
    let identity = match record.identity() {
      Ok(identity) => identity,
      Err(beachwatch_core::Error::MissingIdentity) => {
        return Ok(Outcome::Skipped(SkipReason::NoIdentity));
      }
      Err(e) => return Err(RecordError::Identity(e)),
    };

    let Some(input) = NewBeach::from_identity(identity, self.policy.as_ref()) else {
      return Ok(Outcome::Skipped(SkipReason::NoPolicyKey));
    };
    let identity_key = input.identity_key.clone();

    let upserted = self
      .store
      .upsert_beach(input)
      .await
      .map_err(RecordError::Upsert)?;
    let beach_id = upserted.beach.beach_id;

    self
      .store
      .record_condition(NewCondition::from_record(beach_id, record, now))
      .await
      .map_err(|source| RecordError::Condition { beach_id, source })?;

    tracing::debug!(
      %beach_id,
      identity_key = identity_key.as_str(),
      created = upserted.created,
      "condition recorded"
    );
    Ok(if upserted.created { Outcome::Created } else { Outcome::Updated })
  }

  /// Delete conditions older than the retention window. Failures are logged
  /// and reported as `None`.
  pub async fn prune(&self, now: DateTime<Utc>) -> Option<u64> {
    let retention = self.retention?;
    match self.store.prune_conditions(now - retention).await {
      Ok(removed) => Some(removed),
      Err(e) => {
        tracing::error!(error = %e, "pruning conditions failed");
        None
      }
    }
  }
}
