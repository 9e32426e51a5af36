//! Measurement models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::condition::{Condition, Status};

/// A stored weight / bio-impedance reading (immutable once appended).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Measurement {
    /// Monotonic sequence number assigned by the store (ordering key)
    pub seq: i64,
    /// External identity (UUID v4)
    pub id: String,
    /// Insertion timestamp, never earlier than the previous measurement's
    pub recorded_at: DateTime<Utc>,
    /// Body weight in kg
    pub weight_kg: f64,
    /// Bio-impedance in ohms
    pub impedance_ohm: u32,
    /// Monitored condition this reading belongs to
    pub condition: Condition,
    /// Classification computed against the previous reading of the same condition
    pub status: Status,
}

/// A classified reading waiting to be appended to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMeasurement {
    pub weight_kg: f64,
    pub impedance_ohm: u32,
    pub condition: Condition,
    pub status: Status,
}
