//! Resistance records and their validation rules.
//!
//! A record is one observation: the share of isolates of a pathogen that
//! resist an antibiotic, as a percentage. Records are identified by the
//! label `"{pathogen} / {antibiotic}"`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Separator between pathogen and antibiotic in an identity label.
pub const LABEL_DELIMITER: &str = " / ";

/// Minimum length of a pathogen or antibiotic name, in characters.
pub const MIN_NAME_CHARS: usize = 2;

/// Lowest accepted resistance percentage.
pub const MIN_RESISTANCE: f64 = 0.0;

/// Highest accepted resistance percentage.
pub const MAX_RESISTANCE: f64 = 100.0;

/// A field of a record submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// The organism name.
    Pathogen,
    /// The drug name.
    Antibiotic,
    /// The resistance percentage.
    Resistance,
}

impl Field {
    /// Capitalised name used in user-facing messages.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Pathogen => "Pathogen",
            Self::Antibiotic => "Antibiotic",
            Self::Resistance => "Resistance",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pathogen => write!(f, "pathogen"),
            Self::Antibiotic => write!(f, "antibiotic"),
            Self::Resistance => write!(f, "resistance"),
        }
    }
}

/// A field that failed validation, with a reason fit to show the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    /// The offending field.
    pub field: Field,
    /// Human-readable explanation.
    pub reason: String,
}

impl ValidationError {
    /// Create a validation error for a field.
    #[must_use]
    pub fn new(field: Field, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// A validated observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Trimmed pathogen name.
    pub pathogen: String,
    /// Trimmed antibiotic name.
    pub antibiotic: String,
    /// Resistance percentage in `[0, 100]`.
    pub resistance: f64,
}

impl Record {
    /// Validate and build a record.
    ///
    /// Names are trimmed before checking. Fields are checked in the order
    /// pathogen, antibiotic, resistance and the first failure is returned.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the first invalid field.
    pub fn new(
        pathogen: &str,
        antibiotic: &str,
        resistance: f64,
    ) -> Result<Self, ValidationError> {
        let pathogen = validate_name(Field::Pathogen, pathogen)?;
        let antibiotic = validate_name(Field::Antibiotic, antibiotic)?;
        let resistance = validate_resistance(resistance)?;
        Ok(Self {
            pathogen: pathogen.to_string(),
            antibiotic: antibiotic.to_string(),
            resistance,
        })
    }

    /// Parse raw form text for all three fields.
    ///
    /// Unlike [`Record::new`], every field is checked so that all problems
    /// can be reported at once.
    ///
    /// # Errors
    ///
    /// Returns every failing field, in form order.
    pub fn from_form(
        pathogen: &str,
        antibiotic: &str,
        resistance: &str,
    ) -> Result<Self, Vec<ValidationError>> {
        let pathogen = validate_name(Field::Pathogen, pathogen);
        let antibiotic = validate_name(Field::Antibiotic, antibiotic);
        let resistance = parse_resistance(resistance);

        match (pathogen, antibiotic, resistance) {
            (Ok(pathogen), Ok(antibiotic), Ok(resistance)) => Ok(Self {
                pathogen: pathogen.to_string(),
                antibiotic: antibiotic.to_string(),
                resistance,
            }),
            (pathogen, antibiotic, resistance) => Err([
                pathogen.err(),
                antibiotic.err(),
                resistance.err(),
            ]
            .into_iter()
            .flatten()
            .collect()),
        }
    }

    /// The identity label for this record.
    #[must_use]
    pub fn label(&self) -> String {
        identity_label(&self.pathogen, &self.antibiotic)
    }
}

/// Build the identity label for a pathogen/antibiotic pair.
#[must_use]
pub fn identity_label(pathogen: &str, antibiotic: &str) -> String {
    format!("{pathogen}{LABEL_DELIMITER}{antibiotic}")
}

/// Split a label back into pathogen and antibiotic.
///
/// The label is cut at every delimiter and the first two segments are
/// kept, so names that themselves contain the delimiter lose their tail.
/// A label without a delimiter is returned whole as the pathogen.
#[must_use]
pub fn split_label(label: &str) -> (&str, Option<&str>) {
    let mut segments = label.split(LABEL_DELIMITER);
    let pathogen = segments.next().unwrap_or(label);
    (pathogen, segments.next())
}

/// Check a pathogen or antibiotic name, returning it trimmed.
///
/// # Errors
///
/// Returns a [`ValidationError`] if the trimmed name is empty or too short.
pub fn validate_name(field: Field, value: &str) -> Result<&str, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::new(
            field,
            format!("{} name is required", field.title()),
        ));
    }
    if value.chars().count() < MIN_NAME_CHARS {
        return Err(ValidationError::new(
            field,
            format!(
                "{} name must be at least {MIN_NAME_CHARS} characters",
                field.title()
            ),
        ));
    }
    Ok(value)
}

/// Check a resistance percentage.
///
/// # Errors
///
/// Returns a [`ValidationError`] if the value is not finite or outside `[0, 100]`.
pub fn validate_resistance(value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() && (MIN_RESISTANCE..=MAX_RESISTANCE).contains(&value) {
        Ok(value)
    } else {
        Err(range_error())
    }
}

/// Parse and check a resistance percentage typed by the user.
///
/// # Errors
///
/// Returns a [`ValidationError`] if the text is blank, not a number, or out of range.
pub fn parse_resistance(raw: &str) -> Result<f64, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::new(
            Field::Resistance,
            "Resistance percentage is required",
        ));
    }
    let value: f64 = raw.parse().map_err(|_| range_error())?;
    validate_resistance(value)
}

fn range_error() -> ValidationError {
    ValidationError::new(
        Field::Resistance,
        format!("Resistance must be between {MIN_RESISTANCE} and {MAX_RESISTANCE}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_new_trims_names() {
        let record = Record::new("  E. coli ", "\tAmpicillin\n", 85.2).unwrap();
        assert_eq!(record.pathogen, "E. coli");
        assert_eq!(record.antibiotic, "Ampicillin");
        assert_eq!(record.label(), "E. coli / Ampicillin");
    }

    #[test]
    fn test_record_new_reports_first_invalid_field() {
        let err = Record::new("", "", -1.0).unwrap_err();
        assert_eq!(err.field, Field::Pathogen);

        let err = Record::new("MRSA", "x", 50.0).unwrap_err();
        assert_eq!(err.field, Field::Antibiotic);
        assert_eq!(err.reason, "Antibiotic name must be at least 2 characters");
    }

    #[test]
    fn test_validate_name_required() {
        let err = validate_name(Field::Pathogen, "   ").unwrap_err();
        assert_eq!(err.reason, "Pathogen name is required");
    }

    #[test]
    fn test_validate_name_counts_characters_not_bytes() {
        // Two characters, four bytes.
        assert_eq!(validate_name(Field::Pathogen, "éé").unwrap(), "éé");
        assert!(validate_name(Field::Pathogen, "é").is_err());
    }

    #[test]
    fn test_resistance_boundaries() {
        assert!(validate_resistance(0.0).is_ok());
        assert!(validate_resistance(100.0).is_ok());
        assert!(validate_resistance(-0.001).is_err());
        assert!(validate_resistance(100.001).is_err());
    }

    #[test]
    fn test_resistance_rejects_non_finite() {
        assert!(validate_resistance(f64::NAN).is_err());
        assert!(validate_resistance(f64::INFINITY).is_err());
        assert!(validate_resistance(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_parse_resistance() {
        assert_eq!(parse_resistance(" 45.1 ").unwrap(), 45.1);
        assert_eq!(
            parse_resistance("").unwrap_err().reason,
            "Resistance percentage is required"
        );
        assert_eq!(
            parse_resistance("abc").unwrap_err().reason,
            "Resistance must be between 0 and 100"
        );
        assert!(parse_resistance("NaN").is_err());
        assert!(parse_resistance("inf").is_err());
        assert!(parse_resistance("101").is_err());
    }

    #[test]
    fn test_from_form_collects_all_errors() {
        let errors = Record::from_form("a", "", "200").unwrap_err();
        let fields: Vec<Field> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![Field::Pathogen, Field::Antibiotic, Field::Resistance]
        );
    }

    #[test]
    fn test_from_form_valid() {
        let record = Record::from_form("MRSA", "Methicillin", "72.8").unwrap();
        assert_eq!(record.resistance, 72.8);
        assert_eq!(record.label(), "MRSA / Methicillin");
    }

    #[test]
    fn test_split_label() {
        assert_eq!(
            split_label("E. coli / Ampicillin"),
            ("E. coli", Some("Ampicillin"))
        );
        assert_eq!(split_label("A / B / C"), ("A", Some("B")));
        assert_eq!(split_label("A / "), ("A", Some("")));
        assert_eq!(split_label("no delimiter"), ("no delimiter", None));
    }

    #[test]
    fn test_field_display() {
        assert_eq!(Field::Pathogen.to_string(), "pathogen");
        assert_eq!(Field::Antibiotic.to_string(), "antibiotic");
        assert_eq!(Field::Resistance.to_string(), "resistance");
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new(Field::Resistance, "Resistance must be between 0 and 100");
        assert_eq!(
            err.to_string(),
            "resistance: Resistance must be between 0 and 100"
        );
    }
}
