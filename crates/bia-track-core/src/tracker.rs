//! The tracker: one owned store plus the classify / trend / report pipeline.
//!
//! Front-ends (CLI, FFI) talk to a [`Tracker`] and never to the store
//! directly. Every submission is validated, classified against the previous
//! reading of its condition, then appended.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::{BuiltinCatalog, Caption, LabelCatalog};
use crate::config::{ConfigError, TrackerConfig};
use crate::db::{Database, DbError};
use crate::models::{Condition, Measurement, NewMeasurement, Profile, Reading, ValidationError};
use crate::report::{HistoryRow, ReportArtifact, ReportComposer, ReportError};
use crate::risk::classify;
use crate::trend::{TrendAggregator, TrendSeries};

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Invalid reading: {0}")]
    Validation(#[from] ValidationError),

    #[error("Measurement store unavailable: {0}")]
    StorageUnavailable(#[from] DbError),

    #[error("Report could not be composed: {0}")]
    ReportComposeFailure(#[from] ReportError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type TrackerResult<T> = Result<T, TrackerError>;

/// Everything a front-end shows for one condition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dashboard {
    pub profile: Profile,
    pub condition: Condition,
    pub condition_label: String,
    /// Most recent reading and its status label
    pub latest: Option<HistoryRow>,
    pub trend: TrendSeries,
    /// Empty-state message, set when there is nothing to chart
    pub notice: Option<String>,
    /// Newest first
    pub history: Vec<HistoryRow>,
}

/// Something that can display a [`Dashboard`].
pub trait DashboardView {
    fn render(&mut self, dashboard: &Dashboard);
}

pub struct Tracker {
    db: Database,
    config: TrackerConfig,
    catalog: BuiltinCatalog,
}

impl Tracker {
    /// Open the store at `config.database_path`.
    pub fn open(config: TrackerConfig) -> TrackerResult<Self> {
        config.validate()?;
        let db = Database::open(&config.database_path)?;
        Ok(Self::with_database(db, config))
    }

    /// Tracker over an in-memory store. `database_path` is ignored.
    pub fn in_memory(config: TrackerConfig) -> TrackerResult<Self> {
        config.validate()?;
        let db = Database::open_in_memory()?;
        Ok(Self::with_database(db, config))
    }

    /// Load config (file, then environment) and open the store it names.
    pub fn from_config_file(path: Option<&Path>) -> TrackerResult<Self> {
        Self::open(TrackerConfig::load(path)?)
    }

    pub fn with_database(db: Database, config: TrackerConfig) -> Self {
        let catalog = BuiltinCatalog::new(config.locale);
        Self {
            db,
            config,
            catalog,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn catalog(&self) -> &dyn LabelCatalog {
        &self.catalog
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Validate raw input, classify it and append it.
    ///
    /// Nothing is written when validation fails.
    pub fn submit_reading(
        &self,
        raw_weight: &str,
        raw_impedance: &str,
        raw_condition: &str,
    ) -> TrackerResult<Measurement> {
        let reading = Reading::parse(raw_weight, raw_impedance, raw_condition, &self.config.limits)
            .map_err(|e| {
                debug!(error = %e, "reading rejected");
                e
            })?;
        self.record(reading)
    }

    /// Classify an already validated reading and append it.
    pub fn record(&self, reading: Reading) -> TrackerResult<Measurement> {
        let previous = self.db.previous_measurement(&reading.condition)?;
        let status = classify(
            previous.as_ref(),
            reading.weight_kg,
            reading.impedance_ohm,
            &reading.condition,
        );

        let measurement = self.db.append_measurement(&NewMeasurement {
            weight_kg: reading.weight_kg,
            impedance_ohm: reading.impedance_ohm,
            condition: reading.condition,
            status,
        })?;

        info!(
            seq = measurement.seq,
            condition = %measurement.condition,
            weight_kg = measurement.weight_kg,
            impedance_ohm = measurement.impedance_ohm,
            status = %measurement.status,
            "reading recorded"
        );
        if measurement.status.is_at_risk() {
            warn!(
                seq = measurement.seq,
                condition = %measurement.condition,
                status = %measurement.status,
                "weight up and impedance down since previous reading"
            );
        }

        Ok(measurement)
    }

    pub fn profile(&self) -> TrackerResult<Profile> {
        Ok(self.db.get_profile()?)
    }

    pub fn update_profile(&self, profile: &Profile) -> TrackerResult<()> {
        self.db.set_profile(profile)?;
        info!("profile updated");
        Ok(())
    }

    /// Trend window for a condition, sized by `window_size`.
    pub fn trend(&self, condition: &Condition) -> TrackerResult<TrendSeries> {
        Ok(TrendAggregator::new(&self.db).series_for(condition, self.config.window_size)?)
    }

    /// Full history for a condition, newest first.
    pub fn history(&self, condition: &Condition) -> TrackerResult<Vec<Measurement>> {
        Ok(self.db.all_measurements(condition)?)
    }

    /// Condition tags with at least one reading, in first-use order.
    pub fn conditions(&self) -> TrackerResult<Vec<Condition>> {
        Ok(self.db.list_conditions()?)
    }

    /// Current state for a condition.
    pub fn dashboard(&self, condition: &Condition) -> TrackerResult<Dashboard> {
        let profile = self.profile()?;
        let trend = self.trend(condition)?;
        let history: Vec<HistoryRow> = self
            .history(condition)?
            .iter()
            .map(|m| HistoryRow::from_measurement(m, &self.catalog))
            .collect();

        let notice = trend
            .is_no_data()
            .then(|| self.catalog.caption(Caption::NoData).to_string());

        Ok(Dashboard {
            profile,
            condition: condition.clone(),
            condition_label: self.catalog.condition_label(condition),
            latest: history.first().cloned(),
            trend,
            notice,
            history,
        })
    }

    /// Rebuild the dashboard and hand it to `view`.
    pub fn refresh<V>(&self, condition: &Condition, view: &mut V) -> TrackerResult<()>
    where
        V: DashboardView + ?Sized,
    {
        let dashboard = self.dashboard(condition)?;
        view.render(&dashboard);
        Ok(())
    }

    /// Compose a report over the trend window and the full history.
    pub fn compose_report(&self, condition: &Condition) -> TrackerResult<ReportArtifact> {
        let profile = self.profile()?;
        let trend = self.trend(condition)?;
        let history = self.history(condition)?;

        let artifact = ReportComposer::new(&self.catalog)
            .with_chart_options(self.config.chart)
            .compose(&profile, condition, &trend, &history)?;
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Locale;
    use crate::models::{RiskKind, Status};

    fn setup_tracker() -> Tracker {
        Tracker::in_memory(TrackerConfig::default()).unwrap()
    }

    #[derive(Default)]
    struct RecordingView {
        rendered: Vec<Dashboard>,
    }

    impl DashboardView for RecordingView {
        fn render(&mut self, dashboard: &Dashboard) {
            self.rendered.push(dashboard.clone());
        }
    }

    #[test]
    fn test_submit_reading_classifies() {
        let tracker = setup_tracker();

        let first = tracker.submit_reading("70", "520", "cardiac").unwrap();
        let second = tracker.submit_reading("71", "510", "cardiac").unwrap();
        let third = tracker.submit_reading("70", "515", "cardiac").unwrap();

        assert_eq!(first.status, Status::Stable);
        assert_eq!(second.status, Status::AtRisk(RiskKind::Edema));
        assert_eq!(third.status, Status::Stable);
        assert!(first.seq < second.seq && second.seq < third.seq);
    }

    #[test]
    fn test_invalid_reading_writes_nothing() {
        let tracker = setup_tracker();
        tracker.submit_reading("70", "520", "renal").unwrap();

        let result = tracker.submit_reading("abc", "520", "renal");
        assert!(matches!(
            result,
            Err(TrackerError::Validation(ValidationError::NotANumber { .. }))
        ));

        let result = tracker.submit_reading("70", "520", "  ");
        assert!(matches!(
            result,
            Err(TrackerError::Validation(ValidationError::EmptyCondition))
        ));

        assert_eq!(tracker.database().count_measurements(None).unwrap(), 1);
    }

    #[test]
    fn test_conditions_are_independent() {
        let tracker = setup_tracker();
        tracker.submit_reading("70", "520", "cardiac").unwrap();
        // A renal reading that would be at risk against the cardiac one
        let renal = tracker.submit_reading("75", "400", "renal").unwrap();
        assert_eq!(renal.status, Status::Stable);

        let renal = tracker.submit_reading("76", "390", "kidney").unwrap();
        assert_eq!(renal.status, Status::AtRisk(RiskKind::FluidOverload));
    }

    #[test]
    fn test_trend_respects_window() {
        let config = TrackerConfig {
            window_size: 3,
            ..Default::default()
        };
        let tracker = Tracker::in_memory(config).unwrap();
        for w in ["60", "61", "62", "63", "64"] {
            tracker.submit_reading(w, "500", "cardiac").unwrap();
        }

        let trend = tracker.trend(&Condition::Cardiac).unwrap();
        assert_eq!(trend.as_series().unwrap().weights, vec![62.0, 63.0, 64.0]);
    }

    #[test]
    fn test_empty_dashboard() {
        let tracker = setup_tracker();
        let dashboard = tracker.dashboard(&Condition::Renal).unwrap();

        assert!(dashboard.latest.is_none());
        assert!(dashboard.trend.is_no_data());
        assert!(dashboard.history.is_empty());
        assert_eq!(
            dashboard.notice.as_deref(),
            Some("Enter data first to generate chart!")
        );
    }

    #[test]
    fn test_refresh_renders_latest() {
        let tracker = Tracker::in_memory(TrackerConfig {
            locale: Locale::Tr,
            ..Default::default()
        })
        .unwrap();
        tracker.update_profile(&Profile::new("Ayşe", "555")).unwrap();
        tracker.submit_reading("70", "520", "cardiac").unwrap();
        tracker.submit_reading("71", "510", "cardiac").unwrap();

        let mut view = RecordingView::default();
        tracker.refresh(&Condition::Cardiac, &mut view).unwrap();

        let dashboard = &view.rendered[0];
        assert_eq!(dashboard.profile.name, "Ayşe");
        assert_eq!(dashboard.condition_label, "Kalp yetmezliği");
        let latest = dashboard.latest.as_ref().unwrap();
        assert_eq!(latest.weight_kg, 71.0);
        assert_eq!(latest.status_label, "RİSK: ÖDEM!");
        assert!(dashboard.notice.is_none());
    }

    #[test]
    fn test_compose_report_without_data_fails() {
        let tracker = setup_tracker();
        let result = tracker.compose_report(&Condition::Renal);
        assert!(matches!(
            result,
            Err(TrackerError::ReportComposeFailure(ReportError::NoData(_)))
        ));
    }

    #[test]
    fn test_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("readings.db");
        let config_path = dir.path().join("config.json");
        std::fs::write(
            &config_path,
            format!(
                r#"{{ "database_path": {:?}, "window_size": 2 }}"#,
                db_path.to_string_lossy()
            ),
        )
        .unwrap();

        let tracker = Tracker::from_config_file(Some(&config_path)).unwrap();
        assert_eq!(tracker.config().window_size, 2);
        tracker.submit_reading("70", "520", "cardiac").unwrap();
        assert!(db_path.exists());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = TrackerConfig {
            window_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            Tracker::in_memory(config),
            Err(TrackerError::Config(_))
        ));
    }
}
