//! Wire payloads exchanged with the analysis service, plus derived views.

#![allow(missing_docs)]

use serde::{Deserialize, Serialize};

/// Confidence at or above which a match is shown as high.
pub const HIGH_CONFIDENCE: f64 = 0.8;
/// Confidence at or above which a match is shown as moderate.
pub const MODERATE_CONFIDENCE: f64 = 0.6;
/// Matches below this get a caution note.
pub const CAUTION_CONFIDENCE: f64 = 0.7;
/// Number of stars in the confidence rating.
pub const MAX_STARS: u8 = 5;

/// Body of `POST /api/analyze-symptoms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest<'a> {
    pub symptoms: &'a str,
}

/// Successful analysis payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisResult {
    pub recommendations: Vec<Recommendation>,
    pub extracted_symptoms: Vec<String>,
}

/// One matched condition with its remedies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Recommendation {
    #[serde(alias = "disease")]
    pub condition: String,
    pub dosha: String,
    pub confidence: f64,
    pub matched_symptoms: String,
    /// `;`-delimited remedy phrases.
    pub remedies: String,
}

/// `GET /api/symptoms-suggestions` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct SuggestionsPayload {
    /// `null` and absence both mean "no suggestions".
    pub suggestions: Option<Vec<String>>,
}

/// Failure body that may carry a user-facing message.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ErrorPayload {
    pub error: Option<String>,
}

/// Constitutional category of a recommendation, matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dosha {
    Vata,
    Pitta,
    Kapha,
    Other,
}

impl Dosha {
    /// Classify a free-form label. Compound labels ("Vata-Pitta") resolve to
    /// the first of Vata, Pitta, Kapha they mention.
    pub fn classify(label: &str) -> Self {
        let lower = label.to_lowercase();
        if lower.contains("vata") {
            Self::Vata
        } else if lower.contains("pitta") {
            Self::Pitta
        } else if lower.contains("kapha") {
            Self::Kapha
        } else {
            Self::Other
        }
    }
}

/// Coarse confidence band used for coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    High,
    Moderate,
    Low,
}

impl ConfidenceTier {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= HIGH_CONFIDENCE {
            Self::High
        } else if confidence >= MODERATE_CONFIDENCE {
            Self::Moderate
        } else {
            Self::Low
        }
    }
}

impl Recommendation {
    /// Remedy phrases split on `;`, trimmed, empties dropped.
    pub fn remedy_list(&self) -> Vec<&str> {
        self.remedies
            .split(';')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .collect()
    }

    pub fn dosha_kind(&self) -> Dosha {
        Dosha::classify(&self.dosha)
    }

    pub fn confidence_tier(&self) -> ConfidenceTier {
        ConfidenceTier::from_confidence(self.confidence)
    }

    /// Rounded percentage in `0..=100`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn confidence_percent(&self) -> u8 {
        (self.clamped_confidence() * 100.0).round() as u8
    }

    /// Filled stars out of [`MAX_STARS`].
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn confidence_stars(&self) -> u8 {
        (self.clamped_confidence() * f64::from(MAX_STARS)).round() as u8
    }

    pub fn is_low_confidence(&self) -> bool {
        self.confidence < CAUTION_CONFIDENCE
    }

    fn clamped_confidence(&self) -> f64 {
        if self.confidence.is_nan() {
            0.0
        } else {
            self.confidence.clamp(0.0, 1.0)
        }
    }
}
