//! SQL schema for the carpool SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS families (
    family_id      TEXT PRIMARY KEY,
    display_name   TEXT NOT NULL,
    created_at     TEXT NOT NULL,   -- ISO 8601 UTC
    active         INTEGER NOT NULL DEFAULT 1,
    children_count INTEGER NOT NULL DEFAULT 0,
    can_drive      INTEGER NOT NULL DEFAULT 1,
    group_ids      TEXT NOT NULL DEFAULT '[]'   -- JSON array of uuids
);

CREATE TABLE IF NOT EXISTS groups (
    group_id        TEXT PRIMARY KEY,
    name            TEXT NOT NULL,
    admin_family_id TEXT NOT NULL,
    member_ids      TEXT NOT NULL DEFAULT '[]', -- JSON array of uuids
    template        TEXT NOT NULL DEFAULT '[]'  -- JSON array of TimeSlot
);

-- One row per (family, group, week); a resubmission replaces the row.
CREATE TABLE IF NOT EXISTS preferences (
    family_id    TEXT NOT NULL,
    group_id     TEXT NOT NULL,
    week_start   TEXT NOT NULL,   -- ISO date, always a Monday
    submitted_at TEXT NOT NULL,
    tiers        TEXT NOT NULL DEFAULT '{}',   -- JSON slot_id -> tier
    PRIMARY KEY (family_id, group_id, week_start)
);

-- One row per (family, group). Rows are replaced whole, one transaction
-- per family, so readers never see a partially-updated record.
CREATE TABLE IF NOT EXISTS fairness_records (
    family_id            TEXT NOT NULL,
    group_id             TEXT NOT NULL,
    children_count       INTEGER NOT NULL,
    total_trips          INTEGER NOT NULL,
    total_weeks          INTEGER NOT NULL,
    fairness_debt        REAL NOT NULL,
    vacation_adjustments INTEGER NOT NULL,
    weekly_history       TEXT NOT NULL DEFAULT '[]',  -- JSON WeekEntry list
    adjustments          TEXT NOT NULL DEFAULT '[]',  -- JSON adjustment log
    period_started_at    TEXT NOT NULL,
    PRIMARY KEY (family_id, group_id)
);

-- The generated week, stored whole; replacing the row is the forced
-- regeneration path and is atomic under SQLite's writer lock.
CREATE TABLE IF NOT EXISTS week_schedules (
    group_id   TEXT NOT NULL,
    week_start TEXT NOT NULL,
    payload    TEXT NOT NULL,   -- JSON WeekSchedule
    PRIMARY KEY (group_id, week_start)
);

CREATE TABLE IF NOT EXISTS vacations (
    vacation_id       TEXT PRIMARY KEY,
    family_id         TEXT NOT NULL,
    group_id          TEXT NOT NULL,
    start_date        TEXT NOT NULL,
    end_date          TEXT NOT NULL,
    coverage_arranged INTEGER NOT NULL DEFAULT 0,
    backup_drivers    TEXT NOT NULL DEFAULT '[]'  -- JSON array of uuids
);

CREATE TABLE IF NOT EXISTS holidays (
    holiday_id             TEXT PRIMARY KEY,
    group_id               TEXT NOT NULL,
    name                   TEXT NOT NULL,
    start_date             TEXT NOT NULL,
    end_date               TEXT NOT NULL,
    auto_adjust_scheduling INTEGER NOT NULL DEFAULT 1
);

CREATE INDEX IF NOT EXISTS preferences_group_week_idx
    ON preferences(group_id, week_start);
CREATE INDEX IF NOT EXISTS fairness_group_idx  ON fairness_records(group_id);
CREATE INDEX IF NOT EXISTS vacations_group_idx ON vacations(group_id);
CREATE INDEX IF NOT EXISTS holidays_group_idx  ON holidays(group_id);

PRAGMA user_version = 1;
";
