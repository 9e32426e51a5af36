//! Golden cases for risk classification over reading sequences.

use bia_track_core::{RiskKind, Status, Tracker, TrackerConfig};

struct GoldenCase {
    id: &'static str,
    condition: &'static str,
    readings: &'static [(&'static str, &'static str)],
    expected: &'static [&'static str],
}

const GOLDEN_CASES: &[GoldenCase] = &[
    GoldenCase {
        id: "cardiac-rise-then-recover",
        condition: "cardiac",
        readings: &[("70", "520"), ("71", "510"), ("70", "515")],
        expected: &["stable", "edema_risk", "stable"],
    },
    GoldenCase {
        id: "renal-sustained-gain",
        condition: "renal",
        readings: &[("82", "480"), ("82.6", "470"), ("83.1", "455"), ("83.1", "450")],
        expected: &["stable", "fluid_overload_risk", "fluid_overload_risk", "stable"],
    },
    GoldenCase {
        id: "pregnancy-alias",
        condition: "preeclampsia",
        readings: &[("64,5", "600"), ("65,0", "590")],
        expected: &["stable", "preeclampsia_risk"],
    },
    GoldenCase {
        id: "impedance-tie",
        condition: "hf",
        readings: &[("90", "400"), ("91", "400")],
        expected: &["stable", "stable"],
    },
    GoldenCase {
        id: "weight-loss-impedance-drop",
        condition: "ckd",
        readings: &[("75", "500"), ("74", "480")],
        expected: &["stable", "stable"],
    },
    GoldenCase {
        id: "generic-condition",
        condition: "lipedema",
        readings: &[("100", "300"), ("100.2", "299")],
        expected: &["stable", "fluid_retention_risk"],
    },
];

#[test]
fn test_golden_cases() {
    for case in GOLDEN_CASES {
        let tracker = Tracker::in_memory(TrackerConfig::default()).unwrap();

        let codes: Vec<&str> = case
            .readings
            .iter()
            .map(|(w, z)| {
                tracker
                    .submit_reading(w, z, case.condition)
                    .unwrap_or_else(|e| panic!("{}: {}", case.id, e))
                    .status
                    .code()
            })
            .collect();

        assert_eq!(codes, case.expected, "case {}", case.id);
    }
}

#[test]
fn test_codes_round_trip() {
    for code in ["stable", "edema_risk", "fluid_overload_risk", "preeclampsia_risk", "fluid_retention_risk"] {
        let status = Status::from_code(code).unwrap();
        assert_eq!(status.code(), code);
    }
    assert_eq!(
        Status::from_code("edema_risk"),
        Some(Status::AtRisk(RiskKind::Edema))
    );
    assert_eq!(Status::from_code("unknown"), None);
}
