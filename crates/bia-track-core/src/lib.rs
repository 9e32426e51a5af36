//! BIA Track Core Library
//!
//! Local weight and bio-impedance (BIA) log with a fluid-retention risk flag
//! and trend reports for clinical review.
//!
//! # Architecture
//!
//! ```text
//! raw input (weight, impedance, condition)
//!          │
//!     Reading::parse ──── ValidationError (nothing stored)
//!          │
//!     risk::classify  ◄── previous reading of the same condition
//!          │
//!  ┌───────▼─────────────────────────┐
//!  │  measurements (append-only)     │
//!  │  seq = ordering key             │
//!  └───────┬─────────────────────────┘
//!          │
//!          ├──────────────────────┐
//!          ▼                      ▼
//!   TrendAggregator          full history
//!   (last N, oldest first)   (newest first)
//!          │                      │
//!          └──────────┬───────────┘
//!                     ▼
//!              ReportComposer
//!          (SVG chart + document)
//! ```
//!
//! # Core Rule
//!
//! **A reading is at risk only when weight rose and impedance fell** compared
//! with the immediately preceding reading of the same condition.
//!
//! # Modules
//!
//! - [`db`]: SQLite measurement store and profile table
//! - [`models`]: Domain types (Measurement, Condition, Status, Reading, Profile)
//! - [`risk`]: Two-point risk classifier
//! - [`trend`]: Trend window aggregation
//! - [`report`]: Chart rendering and report composition
//! - [`catalog`]: Localised labels
//! - [`config`]: Tracker configuration
//! - [`tracker`]: The pipeline front-ends drive

pub mod catalog;
pub mod config;
pub mod db;
pub mod models;
pub mod report;
pub mod risk;
pub mod tracker;
pub mod trend;

// Re-export commonly used types
pub use catalog::{BuiltinCatalog, Caption, LabelCatalog, Locale};
pub use config::TrackerConfig;
pub use db::Database;
pub use models::{
    Condition, Measurement, NewMeasurement, Profile, Reading, ReadingLimits, RiskKind, Status,
    ValidationError,
};
pub use report::{ReportArtifact, ReportComposer};
pub use tracker::{Dashboard, DashboardView, Tracker, TrackerError};
pub use trend::{Series, TrendAggregator, TrendSeries};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum BiaTrackError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Report failure: {0}")]
    ReportFailure(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<TrackerError> for BiaTrackError {
    fn from(e: TrackerError) -> Self {
        match e {
            TrackerError::Validation(_) => BiaTrackError::InvalidInput(e.to_string()),
            TrackerError::StorageUnavailable(_) => BiaTrackError::StorageUnavailable(e.to_string()),
            TrackerError::ReportComposeFailure(_) => BiaTrackError::ReportFailure(e.to_string()),
            TrackerError::Config(_) => BiaTrackError::ConfigError(e.to_string()),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for BiaTrackError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        BiaTrackError::StorageUnavailable(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a tracker backed by the file at `database_path`.
#[uniffi::export]
pub fn open_tracker(
    database_path: String,
    window_size: u32,
    locale: String,
) -> Result<Arc<BiaTrackCore>, BiaTrackError> {
    let config = ffi_config(Some(database_path), window_size, &locale)?;
    let tracker = Tracker::open(config)?;
    Ok(BiaTrackCore::wrap(tracker))
}

/// Create a tracker over an in-memory store (for testing).
#[uniffi::export]
pub fn open_tracker_in_memory(
    window_size: u32,
    locale: String,
) -> Result<Arc<BiaTrackCore>, BiaTrackError> {
    let config = ffi_config(None, window_size, &locale)?;
    let tracker = Tracker::in_memory(config)?;
    Ok(BiaTrackCore::wrap(tracker))
}

fn ffi_config(
    database_path: Option<String>,
    window_size: u32,
    locale: &str,
) -> Result<TrackerConfig, BiaTrackError> {
    let mut config = TrackerConfig {
        window_size: window_size as usize,
        locale: locale.parse().map_err(BiaTrackError::ConfigError)?,
        ..Default::default()
    };
    if let Some(path) = database_path {
        config.database_path = PathBuf::from(path);
    }
    Ok(config)
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe tracker wrapper for FFI.
#[derive(uniffi::Object)]
pub struct BiaTrackCore {
    tracker: Arc<Mutex<Tracker>>,
}

impl BiaTrackCore {
    fn wrap(tracker: Tracker) -> Arc<Self> {
        Arc::new(Self {
            tracker: Arc::new(Mutex::new(tracker)),
        })
    }
}

#[uniffi::export]
impl BiaTrackCore {
    // =========================================================================
    // Readings
    // =========================================================================

    /// Validate, classify and store a reading from raw form input.
    pub fn submit_reading(
        &self,
        weight: String,
        impedance: String,
        condition: String,
    ) -> Result<FfiMeasurement, BiaTrackError> {
        let tracker = self.tracker.lock()?;
        let measurement = tracker.submit_reading(&weight, &impedance, &condition)?;
        Ok(measurement.into())
    }

    /// Full history for a condition, newest first.
    pub fn history(&self, condition: String) -> Result<Vec<FfiMeasurement>, BiaTrackError> {
        let tracker = self.tracker.lock()?;
        let history = tracker.history(&Condition::from_tag(&condition))?;
        Ok(history.into_iter().map(|m| m.into()).collect())
    }

    /// Trend window for a condition; `None` when nothing has been recorded.
    pub fn trend(&self, condition: String) -> Result<Option<FfiSeries>, BiaTrackError> {
        let tracker = self.tracker.lock()?;
        let trend = tracker.trend(&Condition::from_tag(&condition))?;
        Ok(match trend {
            TrendSeries::Data(series) => Some(series.into()),
            TrendSeries::NoData => None,
        })
    }

    /// Condition tags with readings, in first-use order.
    pub fn conditions(&self) -> Result<Vec<String>, BiaTrackError> {
        let tracker = self.tracker.lock()?;
        let conditions = tracker.conditions()?;
        Ok(conditions.iter().map(|c| c.tag().to_string()).collect())
    }

    // =========================================================================
    // Profile
    // =========================================================================

    pub fn get_profile(&self) -> Result<FfiProfile, BiaTrackError> {
        let tracker = self.tracker.lock()?;
        Ok(tracker.profile()?.into())
    }

    pub fn set_profile(&self, name: String, contact: String) -> Result<(), BiaTrackError> {
        let tracker = self.tracker.lock()?;
        tracker.update_profile(&Profile::new(name, contact))?;
        Ok(())
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Current state for a condition.
    pub fn dashboard(&self, condition: String) -> Result<FfiDashboard, BiaTrackError> {
        let tracker = self.tracker.lock()?;
        let dashboard = tracker.dashboard(&Condition::from_tag(&condition))?;
        Ok(dashboard.into())
    }

    /// Compose a report for a condition.
    pub fn compose_report(&self, condition: String) -> Result<FfiReportArtifact, BiaTrackError> {
        let tracker = self.tracker.lock()?;
        let artifact = tracker.compose_report(&Condition::from_tag(&condition))?;
        artifact.try_into()
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe measurement.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMeasurement {
    pub seq: i64,
    pub id: String,
    /// RFC 3339
    pub recorded_at: String,
    pub weight_kg: f64,
    pub impedance_ohm: u32,
    pub condition: String,
    /// Stable status code (`stable`, `edema_risk`, ...)
    pub status: String,
}

impl From<Measurement> for FfiMeasurement {
    fn from(m: Measurement) -> Self {
        Self {
            seq: m.seq,
            id: m.id,
            recorded_at: m.recorded_at.to_rfc3339(),
            weight_kg: m.weight_kg,
            impedance_ohm: m.impedance_ohm,
            condition: m.condition.tag().to_string(),
            status: m.status.code().to_string(),
        }
    }
}

/// FFI-safe profile.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiProfile {
    pub name: String,
    pub contact: String,
}

impl From<Profile> for FfiProfile {
    fn from(profile: Profile) -> Self {
        Self {
            name: profile.name,
            contact: profile.contact,
        }
    }
}

/// FFI-safe trend series (index-aligned, oldest first).
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSeries {
    pub condition: String,
    pub timestamps: Vec<String>,
    pub weights: Vec<f64>,
    pub impedances: Vec<u32>,
}

impl From<Series> for FfiSeries {
    fn from(series: Series) -> Self {
        Self {
            condition: series.condition.tag().to_string(),
            timestamps: series.timestamps.iter().map(|t| t.to_rfc3339()).collect(),
            weights: series.weights,
            impedances: series.impedances,
        }
    }
}

/// FFI-safe history row with its display label.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiHistoryRow {
    pub seq: i64,
    pub recorded_at: String,
    pub weight_kg: f64,
    pub impedance_ohm: u32,
    pub status: String,
    pub status_label: String,
}

impl From<report::HistoryRow> for FfiHistoryRow {
    fn from(row: report::HistoryRow) -> Self {
        Self {
            seq: row.seq,
            recorded_at: row.recorded_at.to_rfc3339(),
            weight_kg: row.weight_kg,
            impedance_ohm: row.impedance_ohm,
            status: row.status.code().to_string(),
            status_label: row.status_label,
        }
    }
}

/// FFI-safe dashboard.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDashboard {
    pub profile: FfiProfile,
    pub condition: String,
    pub condition_label: String,
    pub latest: Option<FfiHistoryRow>,
    /// `None` when there is nothing to chart
    pub trend: Option<FfiSeries>,
    pub notice: Option<String>,
    pub history: Vec<FfiHistoryRow>,
}

impl From<Dashboard> for FfiDashboard {
    fn from(dashboard: Dashboard) -> Self {
        Self {
            profile: dashboard.profile.into(),
            condition: dashboard.condition.tag().to_string(),
            condition_label: dashboard.condition_label,
            latest: dashboard.latest.map(|r| r.into()),
            trend: match dashboard.trend {
                TrendSeries::Data(series) => Some(series.into()),
                TrendSeries::NoData => None,
            },
            notice: dashboard.notice,
            history: dashboard.history.into_iter().map(|r| r.into()).collect(),
        }
    }
}

/// FFI-safe report artifact.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiReportArtifact {
    pub file_name: String,
    pub generated_at: String,
    pub content_digest: String,
    /// HTML document bytes
    pub html: Vec<u8>,
    /// PDF document bytes
    pub pdf: Vec<u8>,
    pub pdf_file_name: String,
    pub text: String,
    pub chart_svg: String,
}

impl TryFrom<ReportArtifact> for FfiReportArtifact {
    type Error = BiaTrackError;

    fn try_from(artifact: ReportArtifact) -> Result<Self, Self::Error> {
        let pdf = artifact
            .to_pdf()
            .map_err(|e| BiaTrackError::ReportFailure(e.to_string()))?;
        Ok(Self {
            html: artifact.to_bytes(),
            pdf,
            pdf_file_name: artifact.pdf_file_name(),
            text: artifact.to_text(),
            chart_svg: artifact.chart_svg().to_string(),
            file_name: artifact.file_name,
            generated_at: artifact.generated_at.to_rfc3339(),
            content_digest: artifact.content_digest,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ffi_round_trip() {
        let core = open_tracker_in_memory(7, "en".into()).unwrap();

        core.set_profile("Jane".into(), "555".into()).unwrap();
        core.submit_reading("70".into(), "520".into(), "cardiac".into())
            .unwrap();
        let m = core
            .submit_reading("71,0".into(), "510".into(), "HF".into())
            .unwrap();
        assert_eq!(m.status, "edema_risk");
        assert_eq!(m.condition, "cardiac");

        let history = core.history("cardiac".into()).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].seq, m.seq);

        let trend = core.trend("cardiac".into()).unwrap().unwrap();
        assert_eq!(trend.weights, vec![70.0, 71.0]);
        assert!(core.trend("renal".into()).unwrap().is_none());

        let dashboard = core.dashboard("cardiac".into()).unwrap();
        assert_eq!(dashboard.profile.name, "Jane");
        assert_eq!(dashboard.latest.unwrap().status_label, "RISK: EDEMA!");

        let report = core.compose_report("cardiac".into()).unwrap();
        assert!(!report.html.is_empty());
        assert!(report.pdf.starts_with(b"%PDF"));
        assert!(report.pdf_file_name.ends_with(".pdf"));
        assert_eq!(report.content_digest.len(), 64);
    }

    #[test]
    fn test_ffi_errors() {
        let core = open_tracker_in_memory(7, "en".into()).unwrap();

        let result = core.submit_reading("abc".into(), "520".into(), "cardiac".into());
        assert!(matches!(result, Err(BiaTrackError::InvalidInput(_))));

        let result = core.compose_report("renal".into());
        assert!(matches!(result, Err(BiaTrackError::ReportFailure(_))));

        assert!(matches!(
            open_tracker_in_memory(0, "en".into()),
            Err(BiaTrackError::ConfigError(_))
        ));
        assert!(matches!(
            open_tracker_in_memory(7, "fr".into()),
            Err(BiaTrackError::ConfigError(_))
        ));
    }
}
