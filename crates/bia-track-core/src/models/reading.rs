//! Validation of user-submitted readings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::condition::Condition;

/// Input rejected before anything reaches the classifier or the store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} is not a number: {value:?}")]
    NotANumber { field: &'static str, value: String },

    #[error("{field} must be a finite value")]
    NotFinite { field: &'static str },

    #[error("{field} {value} is outside the accepted range {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("condition tag must not be empty")]
    EmptyCondition,
}

/// Accepted input ranges (inclusive).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReadingLimits {
    pub weight_min_kg: f64,
    pub weight_max_kg: f64,
    pub impedance_min_ohm: u32,
    pub impedance_max_ohm: u32,
}

impl Default for ReadingLimits {
    fn default() -> Self {
        Self {
            weight_min_kg: 30.0,
            weight_max_kg: 250.0,
            impedance_min_ohm: 100,
            impedance_max_ohm: 1000,
        }
    }
}

/// A validated reading (not yet classified or stored).
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub weight_kg: f64,
    pub impedance_ohm: u32,
    pub condition: Condition,
}

impl Reading {
    /// Validate already-typed values.
    pub fn new(
        weight_kg: f64,
        impedance_ohm: u32,
        condition: Condition,
        limits: &ReadingLimits,
    ) -> Result<Self, ValidationError> {
        if !weight_kg.is_finite() {
            return Err(ValidationError::NotFinite { field: "weight" });
        }
        if weight_kg < limits.weight_min_kg || weight_kg > limits.weight_max_kg {
            return Err(ValidationError::OutOfRange {
                field: "weight",
                value: weight_kg,
                min: limits.weight_min_kg,
                max: limits.weight_max_kg,
            });
        }
        if impedance_ohm < limits.impedance_min_ohm || impedance_ohm > limits.impedance_max_ohm {
            return Err(ValidationError::OutOfRange {
                field: "impedance",
                value: f64::from(impedance_ohm),
                min: f64::from(limits.impedance_min_ohm),
                max: f64::from(limits.impedance_max_ohm),
            });
        }
        if condition.tag().is_empty() {
            return Err(ValidationError::EmptyCondition);
        }

        Ok(Self {
            weight_kg,
            impedance_ohm,
            condition,
        })
    }

    /// Parse raw form input.
    ///
    /// Weight accepts a decimal comma (`70,5`) as entered on TR/DE keyboards.
    pub fn parse(
        raw_weight: &str,
        raw_impedance: &str,
        raw_condition: &str,
        limits: &ReadingLimits,
    ) -> Result<Self, ValidationError> {
        let weight_kg = parse_weight(raw_weight)?;
        let impedance_ohm = parse_impedance(raw_impedance)?;

        let raw_condition = raw_condition.trim();
        if raw_condition.is_empty() {
            return Err(ValidationError::EmptyCondition);
        }

        Self::new(
            weight_kg,
            impedance_ohm,
            Condition::from_tag(raw_condition),
            limits,
        )
    }
}

fn parse_weight(raw: &str) -> Result<f64, ValidationError> {
    let trimmed = raw.trim();
    let normalized = if trimmed.contains(',') && !trimmed.contains('.') {
        trimmed.replacen(',', ".", 1)
    } else {
        trimmed.to_string()
    };

    let value: f64 = normalized
        .parse()
        .map_err(|_| ValidationError::NotANumber {
            field: "weight",
            value: raw.to_string(),
        })?;

    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field: "weight" });
    }
    Ok(value)
}

fn parse_impedance(raw: &str) -> Result<u32, ValidationError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| ValidationError::NotANumber {
            field: "impedance",
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let reading = Reading::parse("70.5", " 520 ", "cardiac", &ReadingLimits::default()).unwrap();
        assert_eq!(reading.weight_kg, 70.5);
        assert_eq!(reading.impedance_ohm, 520);
        assert_eq!(reading.condition, Condition::Cardiac);
    }

    #[test]
    fn test_parse_decimal_comma() {
        let reading = Reading::parse("70,5", "520", "renal", &ReadingLimits::default()).unwrap();
        assert_eq!(reading.weight_kg, 70.5);
    }

    #[test]
    fn test_non_numeric_weight() {
        let err = Reading::parse("abc", "520", "cardiac", &ReadingLimits::default()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::NotANumber {
                field: "weight",
                value: "abc".into()
            }
        );
    }

    #[test]
    fn test_non_integer_impedance() {
        let err = Reading::parse("70", "510.5", "cardiac", &ReadingLimits::default()).unwrap_err();
        assert!(matches!(err, ValidationError::NotANumber { field: "impedance", .. }));

        let err = Reading::parse("70", "-5", "cardiac", &ReadingLimits::default()).unwrap_err();
        assert!(matches!(err, ValidationError::NotANumber { field: "impedance", .. }));
    }

    #[test]
    fn test_non_finite_weight() {
        let err = Reading::parse("NaN", "520", "cardiac", &ReadingLimits::default()).unwrap_err();
        assert_eq!(err, ValidationError::NotFinite { field: "weight" });

        let err = Reading::parse("inf", "520", "cardiac", &ReadingLimits::default()).unwrap_err();
        assert_eq!(err, ValidationError::NotFinite { field: "weight" });
    }

    #[test]
    fn test_out_of_range() {
        let limits = ReadingLimits::default();

        let err = Reading::parse("29.9", "520", "cardiac", &limits).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { field: "weight", .. }));

        let err = Reading::parse("70", "1001", "cardiac", &limits).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { field: "impedance", .. }));

        // Bounds are inclusive
        assert!(Reading::parse("30", "100", "cardiac", &limits).is_ok());
        assert!(Reading::parse("250", "1000", "cardiac", &limits).is_ok());
    }

    #[test]
    fn test_empty_condition() {
        let err = Reading::parse("70", "520", "   ", &ReadingLimits::default()).unwrap_err();
        assert_eq!(err, ValidationError::EmptyCondition);
    }
}
