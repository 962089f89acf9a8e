//! Integration tests for `SqliteStore` against an in-memory database.

use beachwatch_core::{
  beach::NewBeach,
  condition::NewCondition,
  store::BeachStore,
};
use chrono::{Duration, TimeZone, Utc};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn muro() -> NewBeach {
  NewBeach {
    identity_key: "Playa de Muro\u{1f}Muro".into(),
    place_id:     "playa_de_muro_muro".into(),
    name:         "Playa de Muro".into(),
    name_derived: false,
    municipality: Some("Muro".into()),
    source_url:   None,
  }
}

fn reading(beach_id: Uuid, recorded_at: chrono::DateTime<Utc>) -> NewCondition {
  NewCondition {
    beach_id,
    recorded_at,
    occupancy:         Some(45),
    occupancy_label:   Some("Medium".into()),
    flag_status:       "yellow".into(),
    has_jellyfish:     Some(true),
    air_temperature:   Some(28.5),
    water_temperature: Some(24.0),
    wind_speed:        None,
    wave_height:       None,
  }
}

// ─── Beaches ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_creates_then_merges() {
  let s = store().await;

  let first = s.upsert_beach(muro()).await.unwrap();
  assert!(first.created);
  assert_eq!(first.beach.place_id, "playa_de_muro_muro");
  assert_eq!(first.beach.municipality, "Muro");
  assert!(first.beach.latitude.is_none());

  let second = s
    .upsert_beach(NewBeach {
      source_url: Some("https://example.com/playa-de-muro".into()),
      ..muro()
    })
    .await
    .unwrap();
  assert!(!second.created);
  assert_eq!(second.beach.beach_id, first.beach.beach_id);
  assert_eq!(
    second.beach.source_url.as_deref(),
    Some("https://example.com/playa-de-muro")
  );
  assert_eq!(second.beach.created_at, first.beach.created_at);
  assert!(second.beach.updated_at >= first.beach.updated_at);

  assert_eq!(s.list_beaches().await.unwrap().len(), 1);
}

#[tokio::test]
async fn missing_fields_do_not_overwrite() {
  let s = store().await;
  s.upsert_beach(NewBeach {
    source_url: Some("https://example.com/playa-de-muro".into()),
    ..muro()
  })
  .await
  .unwrap();

  let merged = s
    .upsert_beach(NewBeach { source_url: None, ..muro() })
    .await
    .unwrap();
  assert_eq!(
    merged.beach.source_url.as_deref(),
    Some("https://example.com/playa-de-muro")
  );
  assert_eq!(merged.beach.municipality, "Muro");
}

#[tokio::test]
async fn missing_municipality_inserts_unknown() {
  let s = store().await;
  let beach = s
    .upsert_beach(NewBeach {
      identity_key: "Cala Agulla\u{1f}Unknown".into(),
      place_id:     "cala_agulla".into(),
      name:         "Cala Agulla".into(),
      municipality: None,
      ..muro()
    })
    .await
    .unwrap()
    .beach;
  assert_eq!(beach.municipality, "Unknown");
}

#[tokio::test]
async fn derived_name_does_not_replace_stored_name() {
  let s = store().await;
  let key = "https://example.com/playas/es-trenc".to_owned();
  s.upsert_beach(NewBeach {
    identity_key: key.clone(),
    place_id:     "platja_des_trenc".into(),
    name:         "Platja des Trenc".into(),
    municipality: Some("Campos".into()),
    source_url:   Some(key.clone()),
    ..muro()
  })
  .await
  .unwrap();

  let merged = s
    .upsert_beach(NewBeach {
      identity_key: key.clone(),
      place_id:     "es_trenc".into(),
      name:         "Es Trenc".into(),
      name_derived: true,
      municipality: None,
      source_url:   Some(key),
    })
    .await
    .unwrap();
  assert!(!merged.created);
  assert_eq!(merged.beach.name, "Platja des Trenc");
  assert_eq!(merged.beach.place_id, "platja_des_trenc");
}

#[tokio::test]
async fn find_beach_by_identity_key() {
  let s = store().await;
  let created = s.upsert_beach(muro()).await.unwrap().beach;

  let found = s.find_beach("Playa de Muro\u{1f}Muro").await.unwrap();
  assert_eq!(found.map(|b| b.beach_id), Some(created.beach_id));

  assert!(s.find_beach("Playa de Muro").await.unwrap().is_none());
}

#[tokio::test]
async fn concurrent_upserts_produce_one_row() {
  let s = store().await;

  let mut handles = Vec::new();
  for _ in 0..8 {
    let s = s.clone();
    handles.push(tokio::spawn(async move { s.upsert_beach(muro()).await }));
  }

  let mut created = 0;
  for handle in handles {
    if handle.await.unwrap().unwrap().created {
      created += 1;
    }
  }

  assert_eq!(created, 1);
  assert_eq!(s.list_beaches().await.unwrap().len(), 1);
}

#[tokio::test]
async fn list_beaches_orders_by_name() {
  let s = store().await;
  for name in ["Sa Coma", "Cala Millor", "Playa de Muro"] {
    s.upsert_beach(NewBeach {
      identity_key: name.into(),
      name: name.into(),
      ..muro()
    })
    .await
    .unwrap();
  }
  let names: Vec<String> = s
    .list_beaches()
    .await
    .unwrap()
    .into_iter()
    .map(|b| b.name)
    .collect();
  assert_eq!(names, ["Cala Millor", "Playa de Muro", "Sa Coma"]);
}

// ─── Conditions ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn record_and_list_conditions() {
  let s = store().await;
  let beach = s.upsert_beach(muro()).await.unwrap().beach;
  let t0 = Utc.with_ymd_and_hms(2026, 7, 1, 8, 0, 0).unwrap();

  let later = s
    .record_condition(reading(beach.beach_id, t0 + Duration::hours(2)))
    .await
    .unwrap();
  let earlier = s
    .record_condition(NewCondition {
      occupancy: None,
      has_jellyfish: None,
      ..reading(beach.beach_id, t0)
    })
    .await
    .unwrap();

  let listed = s.list_conditions(beach.beach_id).await.unwrap();
  assert_eq!(listed.len(), 2);
  assert_eq!(listed[0], earlier);
  assert_eq!(listed[1], later);
  assert_eq!(listed[0].occupancy, None);
  assert_eq!(listed[0].has_jellyfish, None);
  assert_eq!(listed[1].occupancy, Some(45));
  assert_eq!(listed[1].flag_status, "yellow");
  assert_eq!(listed[1].water_temperature, Some(24.0));
}

#[tokio::test]
async fn condition_for_unknown_beach_fails() {
  let s = store().await;
  let result = s.record_condition(reading(Uuid::new_v4(), Utc::now())).await;
  assert!(matches!(result, Err(crate::Error::Database(_))));
}

#[tokio::test]
async fn prune_removes_only_strictly_older_rows() {
  let s = store().await;
  let beach = s.upsert_beach(muro()).await.unwrap().beach;
  let cutoff = Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap();

  for recorded_at in [
    cutoff - Duration::hours(30),
    cutoff - Duration::microseconds(1),
    cutoff,
    cutoff + Duration::hours(1),
  ] {
    s.record_condition(reading(beach.beach_id, recorded_at))
      .await
      .unwrap();
  }

  let removed = s.prune_conditions(cutoff).await.unwrap();
  assert_eq!(removed, 2);

  let remaining = s.list_conditions(beach.beach_id).await.unwrap();
  assert_eq!(remaining.len(), 2);
  assert!(remaining.iter().all(|c| c.recorded_at >= cutoff));

  // Pruning never touches beaches.
  assert_eq!(s.list_beaches().await.unwrap().len(), 1);
}
