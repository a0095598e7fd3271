//! Human and JSON renderings of session state for the `ayur` binary.

#![allow(missing_docs)]

use colored::{ColoredString, Colorize};
use serde_json::{Value, json};

use crate::client::models::MAX_STARS;
use crate::client::{AnalysisResult, ConfidenceTier, Dosha, Recommendation};
use crate::session::ConnectivityStatus;

pub const LOW_CONFIDENCE_NOTE: &str = "Note: This recommendation has lower confidence. \
     Consider consulting with an Ayurvedic practitioner for personalized advice.";

pub const DISCLAIMER: &str = "These recommendations are based on traditional Ayurvedic \
     principles and AI analysis. They are not a substitute for professional medical advice. \
     Please consult with qualified healthcare practitioners for serious health concerns.";

pub const NO_MATCHES: &str =
    "No matching remedies found. Try describing your symptoms in more detail.";

/// Status indicator, e.g. `● Connected`.
pub fn connectivity_badge(status: ConnectivityStatus) -> String {
    let dot = match status {
        ConnectivityStatus::Online => "●".green(),
        ConnectivityStatus::Offline => "●".red(),
        ConnectivityStatus::Checking => "●".yellow(),
    };
    format!("{dot} {}", status.label())
}

/// `n/limit` length guidance, highlighted once past the limit.
pub fn length_guidance(len: usize, limit: usize) -> String {
    let text = format!("{len}/{limit}");
    if len > limit {
        text.red().to_string()
    } else {
        text.dimmed().to_string()
    }
}

/// Filled and empty stars for a recommendation.
pub fn stars(rec: &Recommendation) -> String {
    let filled = usize::from(rec.confidence_stars());
    let empty = usize::from(MAX_STARS).saturating_sub(filled);
    format!("{}{}", "★".repeat(filled), "☆".repeat(empty))
}

fn tier_paint(tier: ConfidenceTier, text: &str) -> ColoredString {
    match tier {
        ConfidenceTier::High => text.green(),
        ConfidenceTier::Moderate => text.yellow(),
        ConfidenceTier::Low => text.red(),
    }
}

fn dosha_paint(kind: Dosha, text: &str) -> ColoredString {
    match kind {
        Dosha::Vata => text.blue(),
        Dosha::Pitta => text.red(),
        Dosha::Kapha => text.green(),
        Dosha::Other => text.normal(),
    }
}

/// Full results block: identified symptoms, ranked recommendations, and the
/// closing disclaimer.
pub fn render_result(result: &AnalysisResult) -> String {
    let mut out = String::new();

    if !result.extracted_symptoms.is_empty() {
        out.push_str(&format!(
            "{}\n  {}\n\n",
            "Identified Symptoms".bold(),
            result.extracted_symptoms.join(", ")
        ));
    }

    if result.recommendations.is_empty() {
        out.push_str(NO_MATCHES);
        out.push('\n');
        return out;
    }

    out.push_str(&format!("{}\n", "Recommendations".bold()));
    for (idx, rec) in result.recommendations.iter().enumerate() {
        out.push_str(&render_recommendation(idx + 1, rec));
    }
    out.push_str(&format!("\n{}\n{}\n", "Important Disclaimer".bold(), DISCLAIMER));
    out
}

fn render_recommendation(rank: usize, rec: &Recommendation) -> String {
    let tier = rec.confidence_tier();
    let mut out = format!(
        "\n{rank}. {}  [{}]\n",
        rec.condition.bold(),
        dosha_paint(rec.dosha_kind(), &rec.dosha)
    );
    out.push_str(&format!(
        "   {} {}\n",
        tier_paint(tier, &stars(rec)),
        tier_paint(tier, &format!("{}% match", rec.confidence_percent()))
    ));
    if !rec.matched_symptoms.is_empty() {
        out.push_str(&format!("   Similar pattern: {}\n", rec.matched_symptoms));
    }
    out.push_str("   Remedies:\n");
    for remedy in rec.remedy_list() {
        out.push_str(&format!("     • {remedy}\n"));
    }
    if rec.is_low_confidence() {
        out.push_str(&format!("   {}\n", LOW_CONFIDENCE_NOTE.yellow()));
    }
    out
}

/// Error line plus the hint for the retry action.
pub fn render_error(message: &str, retry_hint: &str) -> String {
    format!("{} {message}\n  {}", "Error:".red().bold(), retry_hint.dimmed())
}

/// Results with derived display fields, for `--json`.
pub fn result_json(result: &AnalysisResult) -> Value {
    let recommendations: Vec<Value> = result
        .recommendations
        .iter()
        .map(|rec| {
            json!({
                "condition": rec.condition,
                "dosha": rec.dosha,
                "dosha_kind": rec.dosha_kind(),
                "confidence": rec.confidence,
                "confidence_percent": rec.confidence_percent(),
                "confidence_stars": rec.confidence_stars(),
                "confidence_tier": rec.confidence_tier(),
                "low_confidence": rec.is_low_confidence(),
                "matched_symptoms": rec.matched_symptoms,
                "remedies": rec.remedy_list(),
            })
        })
        .collect();
    json!({
        "extracted_symptoms": result.extracted_symptoms,
        "recommendations": recommendations,
    })
}
