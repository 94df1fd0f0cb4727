pub mod store;
pub mod validation;

pub use store::FieldStore;
pub use validation::{check, is_valid_cohort, is_valid_enrollment_id, validate, Ratings, Validation};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Unknown form field: {0}")]
    UnknownField(String),
}

/// The thirteen inputs of the feedback form, in the order they are rendered
/// and validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    FullName,
    EnrollmentId,
    Mentor1Name,
    Mentor2Name,
    Batch,
    Cohort,
    Mentor1Feedback,
    Mentor2Feedback,
    OverallFeedback,
    ChallengesFaced,
    SuggestionsToImprove,
    TeachingStyleRating,
    OverallRating,
}

impl FormField {
    pub const ALL: [FormField; 13] = [
        FormField::FullName,
        FormField::EnrollmentId,
        FormField::Mentor1Name,
        FormField::Mentor2Name,
        FormField::Batch,
        FormField::Cohort,
        FormField::Mentor1Feedback,
        FormField::Mentor2Feedback,
        FormField::OverallFeedback,
        FormField::ChallengesFaced,
        FormField::SuggestionsToImprove,
        FormField::TeachingStyleRating,
        FormField::OverallRating,
    ];

    /// Key used by the input boundary when reporting field changes.
    pub fn key(&self) -> &'static str {
        match self {
            FormField::FullName => "fullName",
            FormField::EnrollmentId => "enrollmentId",
            FormField::Mentor1Name => "mentor1Name",
            FormField::Mentor2Name => "mentor2Name",
            FormField::Batch => "batch",
            FormField::Cohort => "cohort",
            FormField::Mentor1Feedback => "mentor1Feedback",
            FormField::Mentor2Feedback => "mentor2Feedback",
            FormField::OverallFeedback => "overallFeedback",
            FormField::ChallengesFaced => "challengesFaced",
            FormField::SuggestionsToImprove => "suggestionsToImprove",
            FormField::TeachingStyleRating => "teachingStyleRating",
            FormField::OverallRating => "overallRating",
        }
    }

    /// Column name in the `mentibyFeedback` table.
    pub fn column(&self) -> &'static str {
        match self {
            FormField::FullName => "Full Name",
            FormField::EnrollmentId => "EnrollmentID",
            FormField::Mentor1Name => "Mentor 1",
            FormField::Mentor2Name => "Mentor 2",
            FormField::Batch => "Batch",
            FormField::Cohort => "Cohort",
            FormField::Mentor1Feedback => "Mentor 1 Feedback",
            FormField::Mentor2Feedback => "Mentor 2 Feedback",
            FormField::OverallFeedback => "Mentiby Overall Feedback",
            FormField::ChallengesFaced => "Challenges Faced",
            FormField::SuggestionsToImprove => "Suggestions to Improve",
            FormField::TeachingStyleRating => "Mentor Teaching Style Rating",
            FormField::OverallRating => "Overall Mentiby Rating",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormField::FullName => "Full name",
            FormField::EnrollmentId => "Enrollment ID",
            FormField::Mentor1Name => "Mentor 1 name",
            FormField::Mentor2Name => "Mentor 2 name",
            FormField::Batch => "Batch",
            FormField::Cohort => "Cohort",
            FormField::Mentor1Feedback => "Mentor 1 feedback",
            FormField::Mentor2Feedback => "Mentor 2 feedback",
            FormField::OverallFeedback => "Overall feedback",
            FormField::ChallengesFaced => "Challenges faced",
            FormField::SuggestionsToImprove => "Suggestions to improve",
            FormField::TeachingStyleRating => "Mentor teaching style rating",
            FormField::OverallRating => "Overall rating",
        }
    }

    pub fn is_rating(&self) -> bool {
        matches!(self, FormField::TeachingStyleRating | FormField::OverallRating)
    }

    /// Resolves a field key, accepting the legacy keys older form pages still send.
    pub fn from_key(key: &str) -> Option<Self> {
        let field = match key {
            "yourName" => FormField::FullName,
            "enrollmentID" => FormField::EnrollmentId,
            "mentibyOverallFeedback" => FormField::OverallFeedback,
            "mentorTeachingStyleRating" => FormField::TeachingStyleRating,
            "overallMentibyRating" => FormField::OverallRating,
            _ => return Self::ALL.iter().copied().find(|field| field.key() == key),
        };
        Some(field)
    }
}

/// Immutable copy of every field value at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldSnapshot(BTreeMap<FormField, String>);

impl FieldSnapshot {
    pub fn empty() -> Self {
        Self(FormField::ALL.iter().map(|field| (*field, String::new())).collect())
    }

    pub fn get(&self, field: FormField) -> &str {
        self.0.get(&field).map(String::as_str).unwrap_or("")
    }

    pub(crate) fn set(&mut self, field: FormField, value: String) {
        self.0.insert(field, value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(String::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.0.iter().map(|(field, value)| (*field, value.as_str()))
    }
}

impl Default for FieldSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_keys_resolve() {
        for field in FormField::ALL {
            assert_eq!(FormField::from_key(field.key()), Some(field));
        }
        assert_eq!(FormField::from_key("yourName"), Some(FormField::FullName));
        assert_eq!(FormField::from_key("overallMentibyRating"), Some(FormField::OverallRating));
        assert_eq!(FormField::from_key("favouriteColour"), None);
    }

    #[test]
    fn test_serde_key_matches_key() {
        for field in FormField::ALL {
            let json = serde_json::to_value(field).unwrap();
            assert_eq!(json, serde_json::json!(field.key()));
        }
    }

    #[test]
    fn test_empty_snapshot_has_every_field() {
        let snapshot = FieldSnapshot::empty();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.iter().count(), 13);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["enrollmentId"], "");
        assert_eq!(json["overallRating"], "");
    }
}
