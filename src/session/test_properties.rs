//! Property-based tests for session reducer invariants.
//!
//! Arbitrary message sequences must keep the request state machine sound:
//! at most one analysis in flight, trimmed non-empty analyze payloads, and
//! monotonic command counters.

use proptest::prelude::*;

use super::model::{ConnectivityStatus, SessionCmd, SessionModel, SessionMsg, UiState};
use super::suggest::{self, MAX_SUGGESTIONS};
use super::update;
use crate::client::{AnalysisResult, ApiError, Recommendation};

// ──────────────────── strategies ────────────────────

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("   ".to_string()),
        Just(" fever and chills ".to_string()),
        Just("I have a hea".to_string()),
        "[a-z \t]{0,24}",
    ]
}

fn arb_result() -> impl Strategy<Value = AnalysisResult> {
    (0.0f64..=1.0, "[a-z]{1,8}").prop_map(|(confidence, condition)| AnalysisResult {
        recommendations: vec![Recommendation {
            condition,
            dosha: "Vata".to_string(),
            confidence,
            matched_symptoms: "ache".to_string(),
            remedies: "Rest; Warm oil".to_string(),
        }],
        extracted_symptoms: vec!["ache".to_string()],
    })
}

fn arb_input_msg() -> impl Strategy<Value = SessionMsg> {
    prop_oneof![
        Just(SessionMsg::Init),
        arb_text().prop_map(SessionMsg::InputChanged),
        "[a-z]{1,10}".prop_map(SessionMsg::AcceptSuggestion),
        "[a-z]{1,10}".prop_map(SessionMsg::QuickAdd),
        Just(SessionMsg::ClearInput),
        arb_text().prop_map(SessionMsg::Submit),
        Just(SessionMsg::Retry),
    ]
}

fn arb_settle_msg() -> impl Strategy<Value = SessionMsg> {
    prop_oneof![
        any::<bool>().prop_map(|ok| SessionMsg::HealthChecked(if ok {
            Ok(())
        } else {
            Err(ApiError::connectivity("refused"))
        })),
        prop::collection::vec("[a-z]{1,10}", 0..10).prop_map(SessionMsg::SuggestionsLoaded),
        arb_result().prop_map(|r| SessionMsg::AnalysisFinished(Ok(r))),
        Just(SessionMsg::AnalysisFinished(Err(ApiError::generic_analysis()))),
        Just(SessionMsg::ResultsCueElapsed),
    ]
}

fn arb_msg() -> impl Strategy<Value = SessionMsg> {
    prop_oneof![arb_input_msg(), arb_settle_msg()]
}

// ──────────────────── properties ────────────────────

proptest! {
    #[test]
    fn analyze_never_issued_while_loading(msgs in prop::collection::vec(arb_msg(), 1..60)) {
        let mut model = SessionModel::default();
        for msg in msgs {
            let was_loading = model.ui.is_loading();
            let cmds = update(&mut model, msg).flatten();
            let analyzes: Vec<&String> = cmds
                .iter()
                .filter_map(|c| match c {
                    SessionCmd::Analyze(text) => Some(text),
                    _ => None,
                })
                .collect();
            prop_assert!(analyzes.len() <= 1);
            if let Some(text) = analyzes.first() {
                prop_assert!(!was_loading);
                prop_assert!(!text.is_empty());
                prop_assert_eq!(text.trim(), text.as_str());
                prop_assert!(model.ui.is_loading());
            }
        }
    }

    #[test]
    fn counters_are_monotonic(msgs in prop::collection::vec(arb_msg(), 1..60)) {
        let mut model = SessionModel::default();
        let mut analyses = 0;
        let mut checks = 0;
        for msg in msgs {
            update(&mut model, msg);
            prop_assert!(model.analyses_issued >= analyses);
            prop_assert!(model.health_checks_issued >= checks);
            analyses = model.analyses_issued;
            checks = model.health_checks_issued;
        }
    }

    #[test]
    fn cue_pending_only_with_result(msgs in prop::collection::vec(arb_msg(), 1..60)) {
        let mut model = SessionModel::default();
        for msg in msgs {
            update(&mut model, msg);
            if model.results_cue_pending {
                prop_assert!(matches!(model.ui, UiState::Success(_)));
            }
        }
    }

    #[test]
    fn retry_always_lands_in_checking(msgs in prop::collection::vec(arb_msg(), 0..30)) {
        let mut model = SessionModel::default();
        for msg in msgs {
            update(&mut model, msg);
        }
        let loading = model.ui.is_loading();
        let cmd = update(&mut model, SessionMsg::Retry);
        prop_assert_eq!(cmd, SessionCmd::CheckHealth);
        prop_assert_eq!(model.connectivity, ConnectivityStatus::Checking);
        prop_assert_eq!(model.ui.is_loading(), loading);
        prop_assert!(model.ui.error().is_none());
        prop_assert!(model.ui.result().is_none());
    }

    #[test]
    fn filter_is_bounded_ordered_subset(
        input in "[a-zA-Z ]{0,20}",
        vocabulary in prop::collection::vec("[a-zA-Z ]{1,12}", 0..20),
    ) {
        let got = suggest::filter(&input, &vocabulary);
        prop_assert!(got.len() <= MAX_SUGGESTIONS);
        let token = suggest::last_token(&input).to_lowercase();
        let mut cursor = 0;
        for entry in &got {
            prop_assert!(entry.to_lowercase().contains(&token));
            let pos = vocabulary[cursor..].iter().position(|v| v == entry);
            prop_assert!(pos.is_some());
            cursor += pos.unwrap_or(0) + 1;
        }
        if input.is_empty() {
            prop_assert!(got.is_empty());
        }
    }
}
