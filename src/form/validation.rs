use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::{FieldSnapshot, FormField};

// ASCII classes on purpose: `\d` in the regex crate also matches non-latin digits.
static COHORT_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap());
static ENROLLMENT_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{2}[A-Za-z]{3}[0-9]{4}$").unwrap());
static RATING_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^[{}-{}]$", MIN_RATING, MAX_RATING)).unwrap());

pub const COHORT_MESSAGE: &str = "Cohort field must contain only digits.";
pub const ENROLLMENT_ID_MESSAGE: &str =
    "Enrollment ID must follow the format: two digits, three letters, four digits (e.g. 25MBY2001).";

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Parsed rating values of a snapshot that passed every check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ratings {
    pub teaching_style: u8,
    pub overall: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "message", rename_all = "camelCase")]
pub enum Validation {
    Valid,
    Invalid(String),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid)
    }
}

pub fn is_valid_cohort(value: &str) -> bool {
    COHORT_PATTERN.is_match(value)
}

pub fn is_valid_enrollment_id(value: &str) -> bool {
    ENROLLMENT_ID_PATTERN.is_match(value)
}

/// A single digit in `MIN_RATING..=MAX_RATING`, as typed into a number input.
pub fn parse_rating(value: &str) -> Option<u8> {
    let value = value.trim();
    if !RATING_PATTERN.is_match(value) {
        return None;
    }
    value.parse().ok()
}

pub fn rating_message(field: FormField) -> String {
    format!(
        "{} must be a whole number from {} to {}.",
        field.label(),
        MIN_RATING,
        MAX_RATING
    )
}

/// Checks a snapshot and reports the first failure only.
///
/// Order: cohort, enrollment ID, required fields (form order), rating bounds.
pub fn validate(snapshot: &FieldSnapshot) -> Validation {
    match check(snapshot) {
        Ok(_) => Validation::Valid,
        Err(message) => Validation::Invalid(message),
    }
}

/// Same checks as [`validate`], handing back the parsed ratings on success.
pub fn check(snapshot: &FieldSnapshot) -> Result<Ratings, String> {
    if !is_valid_cohort(snapshot.get(FormField::Cohort)) {
        return Err(COHORT_MESSAGE.to_string());
    }

    if !is_valid_enrollment_id(snapshot.get(FormField::EnrollmentId)) {
        return Err(ENROLLMENT_ID_MESSAGE.to_string());
    }

    if let Some(field) = FormField::ALL
        .iter()
        .find(|field| snapshot.get(**field).trim().is_empty())
    {
        return Err(format!("{} is required.", field.label()));
    }

    let rating = |field: FormField| parse_rating(snapshot.get(field)).ok_or_else(|| rating_message(field));
    Ok(Ratings {
        teaching_style: rating(FormField::TeachingStyleRating)?,
        overall: rating(FormField::OverallRating)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_snapshot() -> FieldSnapshot {
        let mut snapshot = FieldSnapshot::empty();
        for field in FormField::ALL {
            snapshot.set(field, "filled".to_string());
        }
        snapshot.set(FormField::Cohort, "3".to_string());
        snapshot.set(FormField::EnrollmentId, "25MBY2001".to_string());
        snapshot.set(FormField::TeachingStyleRating, "4".to_string());
        snapshot.set(FormField::OverallRating, "5".to_string());
        snapshot
    }

    #[test]
    fn test_cohort_accepts_digit_strings() {
        for value in ["0", "3", "12", "007", "9876543210"] {
            assert!(is_valid_cohort(value), "{value} should pass");
        }
    }

    #[test]
    fn test_cohort_rejects_everything_else() {
        for value in ["", "3a", "-3", "+3", "3.0", "1,000", " 3", "3 ", "3\n", "٣"] {
            assert!(!is_valid_cohort(value), "{value:?} should fail");
        }
    }

    #[test]
    fn test_enrollment_id_pattern() {
        for value in ["25MBY2001", "07abc1234", "99XyZ0000"] {
            assert!(is_valid_enrollment_id(value), "{value} should pass");
        }
        for value in ["25MBY201", "2MBY2001", "25MBYY001", "25MB2001", "25MBY20011", "AB123CDEF", "", "25MBY2001\n"] {
            assert!(!is_valid_enrollment_id(value), "{value:?} should fail");
        }
    }

    #[test]
    fn test_rating_bounds() {
        assert_eq!(parse_rating("1"), Some(1));
        assert_eq!(parse_rating(" 5 "), Some(5));
        assert_eq!(parse_rating("0"), None);
        assert_eq!(parse_rating("6"), None);
        assert_eq!(parse_rating("4.5"), None);
        assert_eq!(parse_rating("-1"), None);
        assert_eq!(parse_rating(""), None);
    }

    #[test]
    fn test_rating_must_be_a_plain_digit() {
        for value in ["+3", "03", "3a", "٣", "1e0"] {
            assert_eq!(parse_rating(value), None, "{value:?} should fail");
        }
    }

    #[test]
    fn test_check_returns_parsed_ratings() {
        assert_eq!(
            check(&complete_snapshot()),
            Ok(Ratings {
                teaching_style: 4,
                overall: 5
            })
        );
    }

    #[test]
    fn test_teaching_style_rating_reported_before_overall() {
        let mut snapshot = complete_snapshot();
        snapshot.set(FormField::TeachingStyleRating, "+3".to_string());
        snapshot.set(FormField::OverallRating, "0".to_string());

        assert_eq!(
            validate(&snapshot),
            Validation::Invalid("Mentor teaching style rating must be a whole number from 1 to 5.".to_string())
        );
    }

    #[test]
    fn test_complete_snapshot_is_valid() {
        assert_eq!(validate(&complete_snapshot()), Validation::Valid);
    }

    #[test]
    fn test_cohort_checked_before_enrollment_id() {
        let mut snapshot = complete_snapshot();
        snapshot.set(FormField::Cohort, "3a".to_string());
        snapshot.set(FormField::EnrollmentId, "bad".to_string());

        assert_eq!(validate(&snapshot), Validation::Invalid(COHORT_MESSAGE.to_string()));
    }

    #[test]
    fn test_enrollment_id_failure() {
        let mut snapshot = complete_snapshot();
        snapshot.set(FormField::EnrollmentId, "2MBY2001".to_string());

        assert_eq!(validate(&snapshot), Validation::Invalid(ENROLLMENT_ID_MESSAGE.to_string()));
    }

    #[test]
    fn test_first_missing_field_is_reported() {
        let mut snapshot = complete_snapshot();
        snapshot.set(FormField::Mentor2Feedback, "   ".to_string());
        snapshot.set(FormField::SuggestionsToImprove, String::new());

        assert_eq!(
            validate(&snapshot),
            Validation::Invalid("Mentor 2 feedback is required.".to_string())
        );
    }

    #[test]
    fn test_rating_out_of_range() {
        let mut snapshot = complete_snapshot();
        snapshot.set(FormField::OverallRating, "7".to_string());

        assert_eq!(
            validate(&snapshot),
            Validation::Invalid("Overall rating must be a whole number from 1 to 5.".to_string())
        );
    }
}
