//! Trend aggregation: recent measurements shaped into plottable series.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::db::{Database, DbResult};
use crate::models::{Condition, Measurement};

/// Index-aligned, oldest-first series for one condition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Series {
    pub condition: Condition,
    pub timestamps: Vec<DateTime<Utc>>,
    pub weights: Vec<f64>,
    pub impedances: Vec<u32>,
}

impl Series {
    /// Build from oldest-first measurements; `None` when empty.
    pub fn from_measurements(condition: &Condition, measurements: &[Measurement]) -> Option<Self> {
        if measurements.is_empty() {
            return None;
        }

        Some(Self {
            condition: condition.clone(),
            timestamps: measurements.iter().map(|m| m.recorded_at).collect(),
            weights: measurements.iter().map(|m| m.weight_kg).collect(),
            impedances: measurements.iter().map(|m| m.impedance_ohm).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// (min, max) weight.
    pub fn weight_range(&self) -> (f64, f64) {
        self.weights
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), w| {
                (lo.min(*w), hi.max(*w))
            })
    }

    /// (min, max) impedance.
    pub fn impedance_range(&self) -> (u32, u32) {
        let min = self.impedances.iter().copied().min().unwrap_or(0);
        let max = self.impedances.iter().copied().max().unwrap_or(0);
        (min, max)
    }
}

/// Outcome of a trend query. `NoData` is an empty-state signal, not an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "series", rename_all = "snake_case")]
pub enum TrendSeries {
    NoData,
    Data(Series),
}

impl TrendSeries {
    pub fn is_no_data(&self) -> bool {
        matches!(self, TrendSeries::NoData)
    }

    pub fn as_series(&self) -> Option<&Series> {
        match self {
            TrendSeries::Data(series) => Some(series),
            TrendSeries::NoData => None,
        }
    }
}

/// Reads the trend window from the measurement store.
pub struct TrendAggregator<'a> {
    db: &'a Database,
}

impl<'a> TrendAggregator<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Most recent `window_size` readings for a condition, oldest first.
    ///
    /// Returns exactly what exists when fewer readings are stored.
    pub fn series_for(&self, condition: &Condition, window_size: usize) -> DbResult<TrendSeries> {
        let measurements = self.db.latest_measurements(condition, window_size)?;
        debug!(condition = %condition, window_size, points = measurements.len(), "trend window read");

        Ok(match Series::from_measurements(condition, &measurements) {
            Some(series) => TrendSeries::Data(series),
            None => TrendSeries::NoData,
        })
    }
}
