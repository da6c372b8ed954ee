//! SQL schema for the launchdeck SQLite store.
//!
//! Executed once at connection startup. Schema migrations are out of scope;
//! `PRAGMA user_version` records the layout for when they are not.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS rockets (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    external_id      TEXT NOT NULL UNIQUE,
    name             TEXT NOT NULL,
    type             TEXT,
    active           INTEGER NOT NULL DEFAULT 1,
    stages           INTEGER,
    boosters         INTEGER,
    cost_per_launch  REAL,             -- USD
    success_rate_pct REAL,
    first_flight     TEXT,             -- YYYY-MM-DD
    country          TEXT,
    company          TEXT,
    wikipedia        TEXT,
    description      TEXT,
    flickr_images    TEXT NOT NULL DEFAULT '[]',
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS launchpads (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    external_id      TEXT NOT NULL UNIQUE,
    name             TEXT NOT NULL,
    full_name        TEXT,
    locality         TEXT,
    region           TEXT,
    latitude         REAL,
    longitude        REAL,
    launch_attempts  INTEGER NOT NULL DEFAULT 0,
    launch_successes INTEGER NOT NULL DEFAULT 0,
    status           TEXT,
    details          TEXT,
    images           TEXT NOT NULL DEFAULT '[]',
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL
);

-- Rocket and launchpad references are soft: matched by external ID string,
-- no foreign keys. Names are denormalised at sync time.
CREATE TABLE IF NOT EXISTS launches (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    external_id     TEXT NOT NULL UNIQUE,
    flight_number   INTEGER,
    name            TEXT NOT NULL,
    date_utc        TEXT,              -- fixed-width RFC 3339, UTC, millis
    date_local      TEXT,              -- RFC 3339 with the site's offset
    success         INTEGER,           -- NULL until upstream reports
    failures        TEXT NOT NULL DEFAULT '[]',
    upcoming        INTEGER NOT NULL DEFAULT 0,
    details         TEXT,
    rocket_id       TEXT,
    rocket_name     TEXT,
    launchpad_id    TEXT,
    launchpad_name  TEXT,
    links           TEXT NOT NULL DEFAULT '{}',
    payloads        TEXT NOT NULL DEFAULT '[]',
    crew            TEXT NOT NULL DEFAULT '[]',
    cores           TEXT NOT NULL DEFAULT '[]',
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS launches_date_success_idx ON launches(date_utc, success);
CREATE INDEX IF NOT EXISTS launches_upcoming_idx     ON launches(upcoming);
CREATE INDEX IF NOT EXISTS launches_rocket_idx       ON launches(rocket_id);
CREATE INDEX IF NOT EXISTS launches_launchpad_idx    ON launches(launchpad_id);

PRAGMA user_version = 1;
";
