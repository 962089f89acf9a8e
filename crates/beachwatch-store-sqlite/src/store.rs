//! [`SqliteStore`] — the SQLite implementation of [`BeachStore`].

use std::path::Path;

use chrono::{DateTime, SubsecRound as _, Utc};
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use uuid::Uuid;

use beachwatch_core::{
  beach::{Beach, DEFAULT_MUNICIPALITY, NewBeach, Upserted},
  condition::{BeachCondition, NewCondition},
  store::BeachStore,
};

use crate::{
  Result,
  encode::{
    BEACH_COLUMNS, CONDITION_COLUMNS, RawBeach, RawCondition, encode_dt,
    encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A beach store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted and every
/// call runs on the same background thread.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, used by tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── BeachStore impl ─────────────────────────────────────────────────────────

impl BeachStore for SqliteStore {
  type Error = crate::Error;

  // ── Beaches ───────────────────────────────────────────────────────────────

  async fn find_beach<'a>(&'a self, identity_key: &'a str) -> Result<Option<Beach>> {
    let key = identity_key.to_owned();

    let raw: Option<RawBeach> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {BEACH_COLUMNS} FROM beaches WHERE identity_key = ?1"),
            rusqlite::params![key],
            RawBeach::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawBeach::into_beach).transpose()
  }

  async fn upsert_beach(&self, input: NewBeach) -> Result<Upserted> {
    let beach_id     = encode_uuid(Uuid::new_v4());
    let now          = encode_dt(Utc::now());
    let merge_name   = (!input.name_derived).then(|| input.name.clone());
    let municipality = input.municipality;
    let insert_muni  = municipality
      .clone()
      .unwrap_or_else(|| DEFAULT_MUNICIPALITY.to_owned());

    let (raw, created): (RawBeach, bool) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        // The unique index on identity_key decides the race; a conflicting
        // insert returns no row and falls through to the merge.
        let inserted: Option<RawBeach> = tx
          .query_row(
            &format!(
              "INSERT INTO beaches (
                 beach_id, identity_key, place_id, name, municipality,
                 source_url, created_at, updated_at
               ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
               ON CONFLICT(identity_key) DO NOTHING
               RETURNING {BEACH_COLUMNS}"
            ),
            rusqlite::params![
              beach_id,
              input.identity_key,
              input.place_id,
              input.name,
              insert_muni,
              input.source_url,
              now,
            ],
            RawBeach::from_row,
          )
          .optional()?;

        let result = match inserted {
          Some(raw) => (raw, true),
          None => {
            let raw = tx.query_row(
              &format!(
                "UPDATE beaches SET
                   name         = COALESCE(?1, name),
                   municipality = COALESCE(?2, municipality),
                   source_url   = COALESCE(?3, source_url),
                   updated_at   = ?4
                 WHERE identity_key = ?5
                 RETURNING {BEACH_COLUMNS}"
              ),
              rusqlite::params![
                merge_name,
                municipality,
                input.source_url,
                now,
                input.identity_key,
              ],
              RawBeach::from_row,
            )?;
            (raw, false)
          }
        };

        tx.commit()?;
        Ok(result)
      })
      .await?;

    Ok(Upserted { beach: raw.into_beach()?, created })
  }

  async fn list_beaches(&self) -> Result<Vec<Beach>> {
    let raws: Vec<RawBeach> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {BEACH_COLUMNS} FROM beaches ORDER BY name, municipality"
        ))?;
        let rows = stmt
          .query_map([], RawBeach::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBeach::into_beach).collect()
  }

  // ── Conditions ────────────────────────────────────────────────────────────

  async fn record_condition(&self, input: NewCondition) -> Result<BeachCondition> {
    let condition = BeachCondition {
      condition_id:      Uuid::new_v4(),
      beach_id:          input.beach_id,
      recorded_at:       input.recorded_at.trunc_subsecs(6),
      ingested_at:       Utc::now().trunc_subsecs(6),
      occupancy:         input.occupancy,
      occupancy_label:   input.occupancy_label,
      flag_status:       input.flag_status,
      has_jellyfish:     input.has_jellyfish,
      air_temperature:   input.air_temperature,
      water_temperature: input.water_temperature,
      wind_speed:        input.wind_speed,
      wave_height:       input.wave_height,
    };

    let condition_id_str = encode_uuid(condition.condition_id);
    let beach_id_str     = encode_uuid(condition.beach_id);
    let recorded_at_str  = encode_dt(condition.recorded_at);
    let ingested_at_str  = encode_dt(condition.ingested_at);
    let row              = condition.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO beach_conditions ({CONDITION_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
          ),
          rusqlite::params![
            condition_id_str,
            beach_id_str,
            recorded_at_str,
            ingested_at_str,
            row.occupancy,
            row.occupancy_label,
            row.flag_status,
            row.has_jellyfish,
            row.air_temperature,
            row.water_temperature,
            row.wind_speed,
            row.wave_height,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(condition)
  }

  async fn list_conditions(&self, beach_id: Uuid) -> Result<Vec<BeachCondition>> {
    let beach_id_str = encode_uuid(beach_id);

    let raws: Vec<RawCondition> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CONDITION_COLUMNS} FROM beach_conditions
           WHERE beach_id = ?1
           ORDER BY recorded_at, ingested_at"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![beach_id_str], RawCondition::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCondition::into_condition).collect()
  }

  async fn prune_conditions(&self, cutoff: DateTime<Utc>) -> Result<u64> {
    let cutoff_str = encode_dt(cutoff);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM beach_conditions WHERE recorded_at < ?1",
          rusqlite::params![cutoff_str],
        )?)
      })
      .await?;

    Ok(removed as u64)
  }
}
