//! Fluid-retention risk classification.
//!
//! Two-point rule: a reading is at risk when weight rose **and** impedance
//! fell relative to the immediately preceding reading of the same condition.
//! Both comparisons are strict, so a tie on either axis is stable. No
//! smoothing, thresholds or longer trends are considered.

use crate::models::{Condition, Measurement, Status};

/// Classify a new reading against the previous one for its condition.
///
/// The first reading of a condition (no `previous`) is always stable.
pub fn classify(
    previous: Option<&Measurement>,
    weight_kg: f64,
    impedance_ohm: u32,
    condition: &Condition,
) -> Status {
    match previous {
        Some(prev) if weight_kg > prev.weight_kg && impedance_ohm < prev.impedance_ohm => {
            Status::AtRisk(condition.risk_kind())
        }
        _ => Status::Stable,
    }
}
