//! Display strings for conditions, statuses and report captions.
//!
//! The core only relies on condition tags and status codes; everything a
//! person reads goes through a [`LabelCatalog`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{Condition, RiskKind, Status};

/// Supported display languages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Tr,
    De,
}

impl Locale {
    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Tr => "tr",
            Locale::De => "de",
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "tr" => Ok(Locale::Tr),
            "de" => Ok(Locale::De),
            other => Err(format!("unsupported locale: {}", other)),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Fixed captions used on reports and dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caption {
    ReportTitle,
    Patient,
    Contact,
    Condition,
    Weight,
    Impedance,
    History,
    Date,
    Status,
    NoData,
}

/// Source of every human-readable label.
pub trait LabelCatalog {
    fn locale(&self) -> Locale;

    fn condition_label(&self, condition: &Condition) -> String;

    fn status_label(&self, status: &Status) -> String;

    fn caption(&self, caption: Caption) -> &'static str;
}

/// Built-in English, Turkish and German labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuiltinCatalog {
    locale: Locale,
}

impl BuiltinCatalog {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }
}

impl LabelCatalog for BuiltinCatalog {
    fn locale(&self) -> Locale {
        self.locale
    }

    fn condition_label(&self, condition: &Condition) -> String {
        let label = match (condition, self.locale) {
            (Condition::Cardiac, Locale::En) => "Heart failure",
            (Condition::Cardiac, Locale::Tr) => "Kalp yetmezliği",
            (Condition::Cardiac, Locale::De) => "Herzinsuffizienz",
            (Condition::Renal, Locale::En) => "Kidney disease",
            (Condition::Renal, Locale::Tr) => "Böbrek hastalığı",
            (Condition::Renal, Locale::De) => "Nierenerkrankung",
            (Condition::Pregnancy, Locale::En) => "Pregnancy",
            (Condition::Pregnancy, Locale::Tr) => "Gebelik",
            (Condition::Pregnancy, Locale::De) => "Schwangerschaft",
            (Condition::Other(tag), _) => return tag.clone(),
        };
        label.to_string()
    }

    fn status_label(&self, status: &Status) -> String {
        let label = match (status, self.locale) {
            (Status::Stable, Locale::En) => "STATUS: STABLE",
            (Status::Stable, Locale::Tr) => "DURUM: STABİL",
            (Status::Stable, Locale::De) => "STATUS: STABIL",
            (Status::AtRisk(RiskKind::Edema), Locale::En) => "RISK: EDEMA!",
            (Status::AtRisk(RiskKind::Edema), Locale::Tr) => "RİSK: ÖDEM!",
            (Status::AtRisk(RiskKind::Edema), Locale::De) => "RISIKO: ÖDEM!",
            (Status::AtRisk(RiskKind::FluidOverload), Locale::En) => "RISK: FLUID OVERLOAD!",
            (Status::AtRisk(RiskKind::FluidOverload), Locale::Tr) => "RİSK: SIVI YÜKLENMESİ!",
            (Status::AtRisk(RiskKind::FluidOverload), Locale::De) => {
                "RISIKO: FLÜSSIGKEITSÜBERLADUNG!"
            }
            (Status::AtRisk(RiskKind::Preeclampsia), Locale::En) => "RISK: PREECLAMPSIA PATTERN!",
            (Status::AtRisk(RiskKind::Preeclampsia), Locale::Tr) => "RİSK: PREEKLAMPSİ BULGUSU!",
            (Status::AtRisk(RiskKind::Preeclampsia), Locale::De) => "RISIKO: PRÄEKLAMPSIE-MUSTER!",
            (Status::AtRisk(RiskKind::FluidRetention), Locale::En) => "RISK: FLUID RETENTION!",
            (Status::AtRisk(RiskKind::FluidRetention), Locale::Tr) => "RİSK: SIVI BİRİKİMİ!",
            (Status::AtRisk(RiskKind::FluidRetention), Locale::De) => {
                "RISIKO: FLÜSSIGKEITSRETENTION!"
            }
        };
        label.to_string()
    }

    fn caption(&self, caption: Caption) -> &'static str {
        match (caption, self.locale) {
            (Caption::ReportTitle, Locale::En) => "PATIENT REPORT",
            (Caption::ReportTitle, Locale::Tr) => "HASTA RAPORU",
            (Caption::ReportTitle, Locale::De) => "PATIENTENBERICHT",
            (Caption::Patient, Locale::En) => "Patient:",
            (Caption::Patient, Locale::Tr) => "Hasta:",
            (Caption::Patient, Locale::De) => "Patient:",
            (Caption::Contact, Locale::En) => "Contact:",
            (Caption::Contact, Locale::Tr) => "Tel:",
            (Caption::Contact, Locale::De) => "Tel:",
            (Caption::Condition, Locale::En) => "Condition:",
            (Caption::Condition, Locale::Tr) => "Tanı:",
            (Caption::Condition, Locale::De) => "Erkrankung:",
            (Caption::Weight, Locale::En) => "Weight (kg)",
            (Caption::Weight, Locale::Tr) => "Ağırlık (kg)",
            (Caption::Weight, Locale::De) => "Gewicht (kg)",
            (Caption::Impedance, Locale::En) => "BIA (Ohm Ω)",
            (Caption::Impedance, Locale::Tr) => "BİA (Ohm Ω)",
            (Caption::Impedance, Locale::De) => "BIA (Ohm Ω)",
            (Caption::History, Locale::En) => "Last Measurements:",
            (Caption::History, Locale::Tr) => "Son Ölçümler:",
            (Caption::History, Locale::De) => "Letzte Messungen:",
            (Caption::Date, Locale::En) => "Date",
            (Caption::Date, Locale::Tr) => "Tarih",
            (Caption::Date, Locale::De) => "Datum",
            (Caption::Status, Locale::En) => "Result",
            (Caption::Status, Locale::Tr) => "Sonuç",
            (Caption::Status, Locale::De) => "Ergebnis",
            (Caption::NoData, Locale::En) => "Enter data first to generate chart!",
            (Caption::NoData, Locale::Tr) => "Grafik oluşturmak için önce veri giriniz!",
            (Caption::NoData, Locale::De) => "Zuerst Daten eingeben!",
        }
    }
}
