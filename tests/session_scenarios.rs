//! End-to-end session scenarios: runtime + HTTP transport + stub service.

mod common;

use std::sync::Arc;
use std::time::Duration;

use ayur_remedy::client::HttpTransport;
use ayur_remedy::core::config::{ApiConfig, SessionConfig};
use ayur_remedy::session::{ConnectivityStatus, SessionRuntime, UiState};
use common::{COLD_ANALYSIS_BODY, HEALTHY_BODY, StubServer, VOCABULARY_BODY};

fn session_for(server: &StubServer, timeout_ms: u64) -> SessionRuntime<HttpTransport> {
    let transport = HttpTransport::new(&ApiConfig {
        base_url: server.base_url(),
        timeout_ms,
    })
    .expect("build transport");
    SessionRuntime::new(
        Arc::new(transport),
        &SessionConfig {
            results_cue_delay_ms: 10,
            input_soft_limit: 500,
        },
    )
}

#[test]
fn startup_reaches_online_with_vocabulary() {
    let server = StubServer::healthy();
    let mut session = session_for(&server, 5_000);
    session.initialize();
    assert_eq!(session.model().connectivity, ConnectivityStatus::Checking);
    session.settle();

    assert_eq!(session.model().connectivity, ConnectivityStatus::Online);
    assert!(session.model().vocabulary_loaded);
    assert_eq!(server.count("GET", "/api/health"), 1);
    assert_eq!(server.count("GET", "/api/symptoms-suggestions"), 1);
}

#[test]
fn partial_word_suggestions() {
    let server = StubServer::healthy();
    let mut session = session_for(&server, 5_000);
    session.initialize();
    session.settle();

    session.set_input("I have a hea");
    assert_eq!(session.suggestions(), vec!["headache", "head cold"]);
    session.accept_suggestion("headache");
    assert_eq!(session.model().input, "I have a headache ");
}

#[test]
fn fever_and_chills_yields_one_recommendation() {
    let server = StubServer::healthy();
    let mut session = session_for(&server, 5_000);
    session.initialize();

    let state = session.submit_and_wait("fever and chills").clone();
    let UiState::Success(result) = &state else {
        panic!("expected success, got {state:?}");
    };
    assert_eq!(result.recommendations.len(), 1);
    assert_eq!(result.recommendations[0].remedy_list().len(), 3);

    session.settle();
    assert_eq!(server.count("POST", "/api/analyze-symptoms"), 1);
    assert_eq!(session.model().extracted_symptoms, vec!["fever", "chills"]);
    assert!(!session.model().results_cue_pending);
}

#[test]
fn server_error_message_is_visible_verbatim() {
    let server = StubServer::builder()
        .route("GET", "/api/health", 200, HEALTHY_BODY)
        .route("GET", "/api/symptoms-suggestions", 200, VOCABULARY_BODY)
        .route(
            "POST",
            "/api/analyze-symptoms",
            400,
            r#"{"error":"symptom text too short"}"#,
        )
        .start();
    let mut session = session_for(&server, 5_000);
    session.initialize();

    let state = session.submit_and_wait("ache");
    assert_eq!(state.error(), Some("symptom text too short"));
    assert!(!state.is_loading());
}

#[test]
fn health_timeout_goes_offline_but_vocabulary_loads() {
    let server = StubServer::builder()
        .route("GET", "/api/health", 200, HEALTHY_BODY)
        .delayed("GET", "/api/health", Duration::from_millis(1_500))
        .route("GET", "/api/symptoms-suggestions", 200, VOCABULARY_BODY)
        .start();
    let mut session = session_for(&server, 300);
    session.initialize();
    session.settle();

    assert_eq!(session.model().connectivity, ConnectivityStatus::Offline);
    assert_eq!(session.model().vocabulary.len(), 6);
}

#[test]
fn whitespace_submit_makes_no_request() {
    let server = StubServer::healthy();
    let mut session = session_for(&server, 5_000);
    assert!(!session.submit(" \t\n "));
    session.settle();
    assert_eq!(server.count("POST", "/api/analyze-symptoms"), 0);
    assert_eq!(session.model().ui, UiState::Idle);
}

#[test]
fn submit_while_in_flight_sends_one_request() {
    let server = StubServer::builder()
        .route("POST", "/api/analyze-symptoms", 200, COLD_ANALYSIS_BODY)
        .delayed("POST", "/api/analyze-symptoms", Duration::from_millis(200))
        .start();
    let mut session = session_for(&server, 5_000);

    assert!(session.submit("fever"));
    assert!(!session.submit("fever"));
    assert!(!session.submit("chills"));
    session.settle();

    assert_eq!(server.count("POST", "/api/analyze-symptoms"), 1);
    assert!(session.model().ui.result().is_some());
}

#[test]
fn retry_after_error_rechecks_health_only() {
    let server = StubServer::builder()
        .route("GET", "/api/health", 200, HEALTHY_BODY)
        .route("GET", "/api/symptoms-suggestions", 200, VOCABULARY_BODY)
        .route("POST", "/api/analyze-symptoms", 500, "{}")
        .start();
    let mut session = session_for(&server, 5_000);
    session.initialize();
    session.submit_and_wait("fever");
    session.settle();
    assert_eq!(
        session.model().ui.error(),
        Some("Failed to analyze symptoms. Please try again.")
    );

    session.retry();
    assert_eq!(session.model().ui, UiState::Idle);
    session.settle();

    assert_eq!(session.model().connectivity, ConnectivityStatus::Online);
    assert_eq!(server.count("GET", "/api/health"), 2);
    assert_eq!(server.count("GET", "/api/symptoms-suggestions"), 1);
    assert_eq!(server.count("POST", "/api/analyze-symptoms"), 1);
}
