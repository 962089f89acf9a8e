//! SQL schema for the beachwatch SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision for future migrations.

/// Full schema DDL; idempotent thanks to `CREATE … IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Slowly-changing dimension. One row per identity key; the UNIQUE
-- constraint is what makes insert-or-merge atomic.
CREATE TABLE IF NOT EXISTS beaches (
    beach_id      TEXT PRIMARY KEY,
    identity_key  TEXT NOT NULL UNIQUE,
    place_id      TEXT NOT NULL,
    name          TEXT NOT NULL,
    municipality  TEXT NOT NULL DEFAULT 'Unknown',
    source_url    TEXT,
    latitude      REAL,             -- populated out-of-band
    longitude     REAL,             -- populated out-of-band
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

-- Append-only fact log. Rows are never updated; the retention pruner is
-- the only DELETE issued against this table.
CREATE TABLE IF NOT EXISTS beach_conditions (
    condition_id       TEXT PRIMARY KEY,
    beach_id           TEXT NOT NULL REFERENCES beaches(beach_id) ON DELETE CASCADE,
    recorded_at        TEXT NOT NULL,   -- fixed-width RFC 3339 UTC
    ingested_at        TEXT NOT NULL,
    occupancy          INTEGER,         -- percent; NULL means no data
    occupancy_label    TEXT,
    flag_status        TEXT NOT NULL DEFAULT 'green',
    has_jellyfish      INTEGER,         -- 0/1, NULL when unknown
    air_temperature    REAL,
    water_temperature  REAL,
    wind_speed         REAL,
    wave_height        REAL
);

CREATE INDEX IF NOT EXISTS beaches_place_idx              ON beaches(place_id);
CREATE INDEX IF NOT EXISTS beach_conditions_beach_idx     ON beach_conditions(beach_id);
CREATE INDEX IF NOT EXISTS beach_conditions_recorded_idx  ON beach_conditions(recorded_at);

PRAGMA user_version = 1;
";
