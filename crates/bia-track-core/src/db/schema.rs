//! SQLite schema definition.

/// Complete database schema for BIA Track.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Measurement Log (Append-Only - Immutable after creation)
-- ============================================================================

CREATE TABLE IF NOT EXISTS measurements (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,       -- insertion order, never reused
    id TEXT NOT NULL UNIQUE,
    recorded_at TEXT NOT NULL,
    weight_kg REAL NOT NULL CHECK (weight_kg > 0),
    impedance_ohm INTEGER NOT NULL CHECK (impedance_ohm > 0),
    condition TEXT NOT NULL CHECK (length(condition) > 0),
    status TEXT NOT NULL CHECK (status IN (
        'stable',
        'edema_risk',
        'fluid_overload_risk',
        'preeclampsia_risk',
        'fluid_retention_risk'
    ))
);

-- Recency lookups are always scoped to one condition
CREATE INDEX IF NOT EXISTS idx_measurements_condition_seq ON measurements(condition, seq);

CREATE TRIGGER IF NOT EXISTS measurements_no_update BEFORE UPDATE ON measurements
BEGIN
    SELECT RAISE(ABORT, 'Measurements are append-only');
END;

CREATE TRIGGER IF NOT EXISTS measurements_no_delete BEFORE DELETE ON measurements
BEGIN
    SELECT RAISE(ABORT, 'Measurements are append-only');
END;

-- ============================================================================
-- Patient Profile (key/value)
-- ============================================================================

CREATE TABLE IF NOT EXISTS profile_info (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
