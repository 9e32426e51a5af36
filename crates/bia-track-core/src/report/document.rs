//! Report document: identity header, chart and history listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{Caption, LabelCatalog, Locale};
use crate::models::{Measurement, Profile, Status};

/// One line of the history listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryRow {
    pub seq: i64,
    pub recorded_at: DateTime<Utc>,
    pub weight_kg: f64,
    pub impedance_ohm: u32,
    pub status: Status,
    pub status_label: String,
}

impl HistoryRow {
    pub fn from_measurement(measurement: &Measurement, catalog: &dyn LabelCatalog) -> Self {
        Self {
            seq: measurement.seq,
            recorded_at: measurement.recorded_at,
            weight_kg: measurement.weight_kg,
            impedance_ohm: measurement.impedance_ohm,
            status: measurement.status,
            status_label: catalog.status_label(&measurement.status),
        }
    }

    pub fn text_line(&self) -> String {
        format!(
            "{} - W: {:.1} kg - BIA: {} Ω - {}",
            self.recorded_at.format("%Y-%m-%d %H:%M"),
            self.weight_kg,
            self.impedance_ohm,
            self.status_label
        )
    }
}

/// Captions resolved for the document's locale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentCaptions {
    pub patient: String,
    pub contact: String,
    pub condition: String,
    pub history: String,
    pub date: String,
    pub weight: String,
    pub impedance: String,
    pub status: String,
}

impl DocumentCaptions {
    pub fn from_catalog(catalog: &dyn LabelCatalog) -> Self {
        Self {
            patient: catalog.caption(Caption::Patient).to_string(),
            contact: catalog.caption(Caption::Contact).to_string(),
            condition: catalog.caption(Caption::Condition).to_string(),
            history: catalog.caption(Caption::History).to_string(),
            date: catalog.caption(Caption::Date).to_string(),
            weight: catalog.caption(Caption::Weight).to_string(),
            impedance: catalog.caption(Caption::Impedance).to_string(),
            status: catalog.caption(Caption::Status).to_string(),
        }
    }
}

/// Composed report content. Holds no generation time so that identical inputs
/// give identical documents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportDocument {
    pub locale: Locale,
    pub title: String,
    pub patient_name: String,
    pub contact: String,
    pub condition: String,
    pub condition_label: String,
    pub chart_svg: String,
    pub history: Vec<HistoryRow>,
    pub captions: DocumentCaptions,
}

impl ReportDocument {
    /// Assemble the document. History is listed newest first.
    pub fn build(
        catalog: &dyn LabelCatalog,
        profile: &Profile,
        condition_tag: &str,
        condition_label: String,
        chart_svg: String,
        history: &[Measurement],
    ) -> Self {
        let mut history: Vec<HistoryRow> = history
            .iter()
            .map(|m| HistoryRow::from_measurement(m, catalog))
            .collect();
        history.sort_by(|a, b| b.seq.cmp(&a.seq));

        Self {
            locale: catalog.locale(),
            title: catalog.caption(Caption::ReportTitle).to_string(),
            patient_name: profile.name.clone(),
            contact: profile.contact.clone(),
            condition: condition_tag.to_string(),
            condition_label,
            chart_svg,
            history,
            captions: DocumentCaptions::from_catalog(catalog),
        }
    }

    /// Textual content, one line per entry. The chart is not included.
    pub fn text_lines(&self) -> Vec<String> {
        let mut lines = vec![
            self.title.clone(),
            format!("{} {}", self.captions.patient, self.patient_name),
            format!("{} {}", self.captions.contact, self.contact),
            format!("{} {}", self.captions.condition, self.condition_label),
            self.captions.history.clone(),
        ];
        lines.extend(self.history.iter().map(HistoryRow::text_line));
        lines
    }

    pub fn to_text(&self) -> String {
        let mut text = self.text_lines().join("\n");
        text.push('\n');
        text
    }

    /// Self-contained HTML page with the chart inline.
    ///
    /// `generated_at` only lands in a `<meta>` tag.
    pub fn to_html(&self, generated_at: &DateTime<Utc>) -> String {
        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n");
        html.push_str(&format!("<html lang=\"{}\">\n<head>\n", self.locale.code()));
        html.push_str("<meta charset=\"utf-8\">\n");
        html.push_str(&format!(
            "<meta name=\"generated\" content=\"{}\">\n",
            generated_at.to_rfc3339()
        ));
        html.push_str(&format!("<title>{}</title>\n", escape_html(&self.title)));
        html.push_str("</head>\n<body>\n");
        html.push_str(&format!("<h1>{}</h1>\n", escape_html(&self.title)));

        html.push_str("<p class=\"identity\">\n");
        html.push_str(&format!(
            "<strong>{}</strong> {}<br>\n",
            escape_html(&self.captions.patient),
            escape_html(&self.patient_name)
        ));
        html.push_str(&format!(
            "<strong>{}</strong> {}<br>\n",
            escape_html(&self.captions.contact),
            escape_html(&self.contact)
        ));
        html.push_str(&format!(
            "<strong>{}</strong> {}\n",
            escape_html(&self.captions.condition),
            escape_html(&self.condition_label)
        ));
        html.push_str("</p>\n");

        html.push_str("<div class=\"chart\">\n");
        html.push_str(&self.chart_svg);
        html.push_str("\n</div>\n");

        html.push_str(&format!("<h2>{}</h2>\n", escape_html(&self.captions.history)));
        html.push_str("<table>\n<tr>");
        for header in [
            &self.captions.date,
            &self.captions.weight,
            &self.captions.impedance,
            &self.captions.status,
        ] {
            html.push_str(&format!("<th>{}</th>", escape_html(header)));
        }
        html.push_str("</tr>\n");
        for row in &self.history {
            html.push_str(&format!(
                "<tr class=\"{}\"><td>{}</td><td>{:.1}</td><td>{}</td><td>{}</td></tr>\n",
                row.status.code(),
                row.recorded_at.format("%Y-%m-%d %H:%M"),
                row.weight_kg,
                row.impedance_ohm,
                escape_html(&row.status_label)
            ));
        }
        html.push_str("</table>\n</body>\n</html>\n");
        html
    }

    /// History listing as CSV.
    pub fn history_csv(&self) -> String {
        history_csv(&self.condition, &self.history)
    }
}

/// History rows of one condition as CSV, in the order given.
pub fn history_csv(condition_tag: &str, rows: &[HistoryRow]) -> String {
    let mut csv = String::new();
    csv.push_str("seq,recorded_at,condition,weight_kg,impedance_ohm,status,status_label\n");

    for row in rows {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            row.seq,
            row.recorded_at.to_rfc3339(),
            escape_csv(condition_tag),
            row.weight_kg,
            row.impedance_ohm,
            row.status.code(),
            escape_csv(&row.status_label),
        ));
    }

    csv
}

/// Escape a string for CSV output.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BuiltinCatalog;
    use crate::models::{Condition, RiskKind};
    use chrono::TimeZone;

    fn measurement(seq: i64, weight_kg: f64, impedance_ohm: u32, status: Status) -> Measurement {
        Measurement {
            seq,
            id: format!("m-{}", seq),
            recorded_at: Utc.with_ymd_and_hms(2024, 3, seq as u32, 9, 15, 0).unwrap(),
            weight_kg,
            impedance_ohm,
            condition: Condition::Cardiac,
            status,
        }
    }

    fn document(profile: &Profile) -> ReportDocument {
        let catalog = BuiltinCatalog::default();
        let history = vec![
            measurement(1, 70.0, 520, Status::Stable),
            measurement(2, 71.0, 510, Status::AtRisk(RiskKind::Edema)),
            measurement(3, 70.0, 515, Status::Stable),
        ];
        ReportDocument::build(
            &catalog,
            profile,
            "cardiac",
            "Heart failure".into(),
            "<svg></svg>".into(),
            &history,
        )
    }

    #[test]
    fn test_history_newest_first() {
        let doc = document(&Profile::new("Jane", "555"));
        let seqs: Vec<i64> = doc.history.iter().map(|r| r.seq).collect();
        assert_eq!(seqs, vec![3, 2, 1]);
    }

    #[test]
    fn test_text_lines() {
        let doc = document(&Profile::new("Jane", "555"));
        let lines = doc.text_lines();

        assert_eq!(lines[0], "PATIENT REPORT");
        assert_eq!(lines[1], "Patient: Jane");
        assert_eq!(lines[2], "Contact: 555");
        assert_eq!(lines[3], "Condition: Heart failure");
        assert_eq!(lines[5], "2024-03-03 09:15 - W: 70.0 kg - BIA: 515 Ω - STATUS: STABLE");
        assert_eq!(lines[6], "2024-03-02 09:15 - W: 71.0 kg - BIA: 510 Ω - RISK: EDEMA!");
    }

    #[test]
    fn test_identity_verbatim_in_text_escaped_in_html() {
        let doc = document(&Profile::new("<b>O'Neil</b>", "+1 (555) 0100"));
        assert!(doc.to_text().contains("Patient: <b>O'Neil</b>"));

        let html = doc.to_html(&Utc::now());
        assert!(html.contains("&lt;b&gt;O&#39;Neil&lt;/b&gt;"));
        assert!(html.contains("+1 (555) 0100"));
        assert!(html.contains("<svg></svg>"));
    }

    #[test]
    fn test_html_differs_only_in_meta() {
        let doc = document(&Profile::new("Jane", "555"));
        let a = doc.to_html(&Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let b = doc.to_html(&Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());

        let strip = |html: &str| {
            html.lines()
                .filter(|l| !l.starts_with("<meta name=\"generated\""))
                .collect::<Vec<_>>()
                .join("\n")
        };
        assert_ne!(a, b);
        assert_eq!(strip(&a), strip(&b));
    }

    #[test]
    fn test_history_csv() {
        let doc = document(&Profile::default());
        let csv = doc.history_csv();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("seq,recorded_at"));
        assert!(lines[2].contains("edema_risk"));
    }

    #[test]
    fn test_history_csv_escapes_fields() {
        let row = HistoryRow {
            seq: 7,
            recorded_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 15, 0).unwrap(),
            weight_kg: 70.5,
            impedance_ohm: 510,
            status: Status::AtRisk(RiskKind::Edema),
            status_label: "RISK, \"EDEMA\"".into(),
        };
        let csv = history_csv("a,b", &[row]);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines[1],
            "7,2024-03-01T09:15:00+00:00,\"a,b\",70.5,510,edema_risk,\"RISK, \"\"EDEMA\"\"\""
        );
        assert_eq!(history_csv("cardiac", &[]).lines().count(), 1);
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("simple"), "simple");
        assert_eq!(escape_csv("with,comma"), "\"with,comma\"");
        assert_eq!(escape_csv("with\"quote"), "\"with\"\"quote\"");
    }
}
