//! Report composition: trend chart plus history document.
//!
//! A composed [`ReportArtifact`] is deterministic in everything except its
//! file name and the `generated` metadata, so two compositions over the same
//! inputs share a content digest. It exports as HTML with the SVG chart inline
//! or as PDF with a raster chart.

mod chart;
mod document;
mod pdf;

pub use chart::*;
pub use document::*;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::info;

use crate::catalog::{Caption, LabelCatalog};
use crate::models::{Condition, Measurement, Profile};
use crate::trend::{Series, TrendSeries};

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("No data to report for condition: {0}")]
    NoData(String),

    #[error("Chart rendering failed: {0}")]
    Chart(String),

    #[error("Trend series is for {series}, report requested for {requested}")]
    ConditionMismatch { requested: String, series: String },

    #[error("PDF rendering failed: {0}")]
    Pdf(String),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ReportResult<T> = Result<T, ReportError>;

/// A composed report ready to export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportArtifact {
    pub file_name: String,
    pub generated_at: DateTime<Utc>,
    pub document: ReportDocument,
    /// Hex SHA-256 of the text content followed by the chart SVG
    pub content_digest: String,
    /// Charted window, kept so the PDF can rasterize it on demand
    pub series: Series,
    pub chart: ChartOptions,
}

impl ReportArtifact {
    pub fn chart_svg(&self) -> &str {
        &self.document.chart_svg
    }

    /// HTML byte stream.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.document.to_html(&self.generated_at).into_bytes()
    }

    pub fn to_text(&self) -> String {
        self.document.to_text()
    }

    /// Export to JSON.
    pub fn to_json(&self) -> ReportResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn history_csv(&self) -> String {
        self.document.history_csv()
    }

    /// PDF byte stream.
    ///
    /// Text content matches [`Self::to_text`]; the bytes themselves embed a
    /// creation date and document id, so they differ between calls.
    pub fn to_pdf(&self) -> ReportResult<Vec<u8>> {
        pdf::render_pdf(&self.document, &self.series, &self.chart)
    }

    /// File name for the PDF export: the HTML name with a `.pdf` extension.
    pub fn pdf_file_name(&self) -> String {
        Path::new(&self.file_name)
            .with_extension("pdf")
            .to_string_lossy()
            .into_owned()
    }

    /// Write the HTML into `dir` under the artifact's file name.
    pub fn write_to_dir(&self, dir: &Path) -> ReportResult<PathBuf> {
        let path = dir.join(&self.file_name);
        std::fs::write(&path, self.to_bytes())?;
        info!(path = %path.display(), "report written");
        Ok(path)
    }

    /// Write the PDF into `dir` under [`Self::pdf_file_name`].
    pub fn write_pdf_to_dir(&self, dir: &Path) -> ReportResult<PathBuf> {
        let path = dir.join(self.pdf_file_name());
        std::fs::write(&path, self.to_pdf()?)?;
        info!(path = %path.display(), "report written");
        Ok(path)
    }
}

/// Builds report artifacts with a given label catalogue.
pub struct ReportComposer<'a> {
    catalog: &'a dyn LabelCatalog,
    chart: ChartOptions,
}

impl<'a> ReportComposer<'a> {
    pub fn new(catalog: &'a dyn LabelCatalog) -> Self {
        Self {
            catalog,
            chart: ChartOptions::default(),
        }
    }

    /// Set the chart canvas size.
    pub fn with_chart_options(mut self, chart: ChartOptions) -> Self {
        self.chart = chart;
        self
    }

    /// Compose a report for one condition.
    ///
    /// `series` feeds the chart, `history` the listing; the listing is shown
    /// newest first whatever order it arrives in. A series recorded under a
    /// different condition is rejected with [`ReportError::ConditionMismatch`].
    pub fn compose(
        &self,
        profile: &Profile,
        condition: &Condition,
        series: &TrendSeries,
        history: &[Measurement],
    ) -> ReportResult<ReportArtifact> {
        let series = match series {
            TrendSeries::Data(series) => series,
            TrendSeries::NoData => return Err(ReportError::NoData(condition.tag().to_string())),
        };
        if &series.condition != condition {
            return Err(ReportError::ConditionMismatch {
                requested: condition.tag().to_string(),
                series: series.condition.tag().to_string(),
            });
        }

        let condition_label = self.catalog.condition_label(condition);
        let labels = ChartLabels {
            title: condition_label.clone(),
            weight: self.catalog.caption(Caption::Weight).to_string(),
            impedance: self.catalog.caption(Caption::Impedance).to_string(),
        };
        let chart_svg = render_chart(series, &labels, &self.chart)?;

        let document = ReportDocument::build(
            self.catalog,
            profile,
            condition.tag(),
            condition_label,
            chart_svg,
            history,
        );
        let content_digest = digest(&document);

        let generated_at = Utc::now();
        let file_name = format!(
            "Report_{}_{}_{}.html",
            sanitize_file_part(&profile.name),
            sanitize_file_part(condition.tag()),
            generated_at.format("%Y%m%d_%H%M%S")
        );

        info!(
            condition = %condition,
            points = series.len(),
            rows = document.history.len(),
            file_name = %file_name,
            "report composed"
        );

        Ok(ReportArtifact {
            file_name,
            generated_at,
            document,
            content_digest,
            series: series.clone(),
            chart: self.chart,
        })
    }
}

fn digest(document: &ReportDocument) -> String {
    let mut hasher = Sha256::new();
    hasher.update(document.to_text().as_bytes());
    hasher.update(document.chart_svg.as_bytes());
    hex::encode(hasher.finalize())
}

/// Keep letters and digits, collapse everything else to `_`.
fn sanitize_file_part(s: &str) -> String {
    let cleaned: String = s
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "unnamed".to_string()
    } else {
        cleaned
    }
}
