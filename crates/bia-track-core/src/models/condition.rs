//! Monitored conditions and classification statuses.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The clinical context that scopes which measurements are compared.
///
/// Recognised tags map to a dedicated variant; anything else is kept verbatim
/// as `Other` and classified with the generic fluid-retention label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Condition {
    /// Heart failure monitoring (edema pattern)
    Cardiac,
    /// Kidney disease monitoring (fluid overload)
    Renal,
    /// Pregnancy-related monitoring (preeclampsia pattern)
    Pregnancy,
    /// Unrecognised tag, stored as given (lowercased, trimmed)
    Other(String),
}

impl Condition {
    /// Every recognised condition, in catalogue order.
    pub const KNOWN: [Condition; 3] = [Condition::Cardiac, Condition::Renal, Condition::Pregnancy];

    /// Resolve a tag (case-insensitive, aliases accepted).
    pub fn from_tag(tag: &str) -> Self {
        let canonical = tag.trim().to_lowercase();
        match canonical.as_str() {
            "cardiac" | "heart_failure" | "heart-failure" | "hf" => Condition::Cardiac,
            "renal" | "kidney" | "ckd" => Condition::Renal,
            "pregnancy" | "pregnancy_related" | "pregnancy-related" | "preeclampsia" => {
                Condition::Pregnancy
            }
            _ => Condition::Other(canonical),
        }
    }

    /// Stable storage tag.
    pub fn tag(&self) -> &str {
        match self {
            Condition::Cardiac => "cardiac",
            Condition::Renal => "renal",
            Condition::Pregnancy => "pregnancy",
            Condition::Other(tag) => tag,
        }
    }

    /// Risk description used when this condition shows the at-risk pattern.
    pub fn risk_kind(&self) -> RiskKind {
        match self {
            Condition::Cardiac => RiskKind::Edema,
            Condition::Renal => RiskKind::FluidOverload,
            Condition::Pregnancy => RiskKind::Preeclampsia,
            Condition::Other(_) => RiskKind::FluidRetention,
        }
    }

    /// Check if this is one of the catalogue conditions.
    pub fn is_known(&self) -> bool {
        !matches!(self, Condition::Other(_))
    }
}

impl From<String> for Condition {
    fn from(tag: String) -> Self {
        Condition::from_tag(&tag)
    }
}

impl From<Condition> for String {
    fn from(condition: Condition) -> Self {
        condition.tag().to_string()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Condition-specific description of the at-risk pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskKind {
    Edema,
    FluidOverload,
    Preeclampsia,
    FluidRetention,
}

/// Classification label attached to a measurement at insertion time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Status {
    Stable,
    AtRisk(RiskKind),
}

impl Status {
    /// Every storable status code.
    pub const CODES: [&'static str; 5] = [
        "stable",
        "edema_risk",
        "fluid_overload_risk",
        "preeclampsia_risk",
        "fluid_retention_risk",
    ];

    /// Storage code.
    pub fn code(&self) -> &'static str {
        match self {
            Status::Stable => "stable",
            Status::AtRisk(RiskKind::Edema) => "edema_risk",
            Status::AtRisk(RiskKind::FluidOverload) => "fluid_overload_risk",
            Status::AtRisk(RiskKind::Preeclampsia) => "preeclampsia_risk",
            Status::AtRisk(RiskKind::FluidRetention) => "fluid_retention_risk",
        }
    }

    /// Parse a storage code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "stable" => Some(Status::Stable),
            "edema_risk" => Some(Status::AtRisk(RiskKind::Edema)),
            "fluid_overload_risk" => Some(Status::AtRisk(RiskKind::FluidOverload)),
            "preeclampsia_risk" => Some(Status::AtRisk(RiskKind::Preeclampsia)),
            "fluid_retention_risk" => Some(Status::AtRisk(RiskKind::FluidRetention)),
            _ => None,
        }
    }

    pub fn is_at_risk(&self) -> bool {
        matches!(self, Status::AtRisk(_))
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.code().to_string()
    }
}

impl TryFrom<String> for Status {
    type Error = String;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        Status::from_code(&code).ok_or_else(|| format!("unknown status code: {}", code))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_aliases() {
        assert_eq!(Condition::from_tag("Cardiac"), Condition::Cardiac);
        assert_eq!(Condition::from_tag(" hf "), Condition::Cardiac);
        assert_eq!(Condition::from_tag("CKD"), Condition::Renal);
        assert_eq!(Condition::from_tag("preeclampsia"), Condition::Pregnancy);
        assert_eq!(
            Condition::from_tag("Lymphedema"),
            Condition::Other("lymphedema".into())
        );
    }

    #[test]
    fn test_condition_tag_round_trip() {
        for condition in Condition::KNOWN {
            assert_eq!(Condition::from_tag(condition.tag()), condition);
        }
    }

    #[test]
    fn test_risk_kind_per_condition() {
        assert_eq!(Condition::Cardiac.risk_kind(), RiskKind::Edema);
        assert_eq!(Condition::Renal.risk_kind(), RiskKind::FluidOverload);
        assert_eq!(Condition::Pregnancy.risk_kind(), RiskKind::Preeclampsia);
        assert_eq!(
            Condition::Other("lipedema".into()).risk_kind(),
            RiskKind::FluidRetention
        );
    }

    #[test]
    fn test_status_codes() {
        for code in Status::CODES {
            let status = Status::from_code(code).unwrap();
            assert_eq!(status.code(), code);
        }
        assert!(Status::from_code("risk").is_none());
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&Status::AtRisk(RiskKind::Edema)).unwrap();
        assert_eq!(json, "\"edema_risk\"");

        let parsed: Status = serde_json::from_str("\"stable\"").unwrap();
        assert_eq!(parsed, Status::Stable);

        assert!(serde_json::from_str::<Status>("\"unknown\"").is_err());
    }
}
