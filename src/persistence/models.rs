use serde::{Deserialize, Deserializer, Serialize};

use crate::form::validation::Ratings;
use crate::form::{FieldSnapshot, FormField};

/// One submission as stored in the `mentibyFeedback` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    #[serde(rename = "Full Name")]
    pub full_name: String,
    #[serde(rename = "EnrollmentID")]
    pub enrollment_id: String,
    #[serde(rename = "Mentor 1")]
    pub mentor1_name: String,
    #[serde(rename = "Mentor 2")]
    pub mentor2_name: String,
    #[serde(rename = "Batch")]
    pub batch: String,
    #[serde(rename = "Cohort")]
    pub cohort: String,
    #[serde(rename = "Mentor 1 Feedback")]
    pub mentor1_feedback: String,
    #[serde(rename = "Mentor 2 Feedback")]
    pub mentor2_feedback: String,
    #[serde(rename = "Mentiby Overall Feedback")]
    pub overall_feedback: String,
    #[serde(rename = "Challenges Faced")]
    pub challenges_faced: String,
    #[serde(rename = "Suggestions to Improve")]
    pub suggestions_to_improve: String,
    #[serde(rename = "Mentor Teaching Style Rating", deserialize_with = "rating_from_number_or_text")]
    pub teaching_style_rating: u8,
    #[serde(rename = "Overall Mentiby Rating", deserialize_with = "rating_from_number_or_text")]
    pub overall_rating: u8,
}

impl FeedbackRecord {
    /// Copies the text fields of a checked snapshot into the stored shape.
    pub fn from_snapshot(snapshot: &FieldSnapshot, ratings: Ratings) -> Self {
        let text = |field: FormField| snapshot.get(field).to_string();

        Self {
            full_name: text(FormField::FullName),
            enrollment_id: text(FormField::EnrollmentId),
            mentor1_name: text(FormField::Mentor1Name),
            mentor2_name: text(FormField::Mentor2Name),
            batch: text(FormField::Batch),
            cohort: text(FormField::Cohort),
            mentor1_feedback: text(FormField::Mentor1Feedback),
            mentor2_feedback: text(FormField::Mentor2Feedback),
            overall_feedback: text(FormField::OverallFeedback),
            challenges_faced: text(FormField::ChallengesFaced),
            suggestions_to_improve: text(FormField::SuggestionsToImprove),
            teaching_style_rating: ratings.teaching_style,
            overall_rating: ratings.overall,
        }
    }

    /// Text columns in `FormField::ALL` order, ratings excluded.
    pub(crate) fn text_values(&self) -> [&str; 11] {
        [
            &self.full_name,
            &self.enrollment_id,
            &self.mentor1_name,
            &self.mentor2_name,
            &self.batch,
            &self.cohort,
            &self.mentor1_feedback,
            &self.mentor2_feedback,
            &self.overall_feedback,
            &self.challenges_faced,
            &self.suggestions_to_improve,
        ]
    }
}

// Rating columns were created as text in the first deployment and as integers later.
fn rating_from_number_or_text<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawRating {
        Number(u64),
        Text(String),
    }

    let raw = RawRating::deserialize(deserializer)?;
    let parsed = match &raw {
        RawRating::Number(n) => u8::try_from(*n).ok(),
        RawRating::Text(s) => s.trim().parse::<u8>().ok(),
    };
    parsed.ok_or_else(|| serde::de::Error::custom("rating is not a small whole number"))
}
