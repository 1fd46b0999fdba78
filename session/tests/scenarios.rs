//! End-to-end flows against a mocked backend: the full analyze lifecycle,
//! the history fetch-and-restore path, and the overlap cases between them.

use std::time::Duration;

use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use smelter_session::{
    AnalysisController, AuthToken, Gateway, HistoryBrowser, HistoryView, SessionEvent,
    SessionStore, events,
};

fn token(value: &str) -> AuthToken {
    AuthToken::new(value).unwrap()
}

/// Drive one analyze call to completion through the event channel.
async fn run_analyze(
    controller: &mut AnalysisController,
    gateway: &Gateway,
    auth: Option<AuthToken>,
) {
    let (tx, mut rx) = events::channel();
    assert!(controller.analyze(gateway, auth, &tx));
    assert!(controller.is_running());

    match rx.recv().await.expect("analyze task reports completion") {
        SessionEvent::AnalyzeDone { generation, result } => {
            controller.on_analyze_done(gateway.base_url(), generation, result);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn empty_source_yields_empty_result_not_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/refactor"))
        .and(body_string(""))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "detectedSmells": [],
            "refactoredCode": "",
            "saved": false,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = Gateway::new(server.uri());
    let mut controller = AnalysisController::new();
    controller.set_source("");

    run_analyze(&mut controller, &gateway, None).await;

    let result = controller.outcome().result().expect("completed outcome");
    assert!(result.smells.is_empty());
    assert_eq!(result.refactored_code.as_deref(), Some(""));
    assert!(!result.saved_to_history);
}

#[tokio::test]
async fn unreachable_backend_resolves_to_actionable_error() {
    let server = MockServer::start().await;
    let dead_uri = server.uri();
    drop(server);

    let gateway = Gateway::new(dead_uri);
    let mut controller = AnalysisController::new();

    run_analyze(&mut controller, &gateway, None).await;

    // Never left hanging in Running; the message points at the backend.
    assert!(!controller.is_running());
    let message = controller.outcome().error_message().expect("error outcome");
    assert!(message.contains("backend"));
}

#[tokio::test]
async fn analyze_carries_bearer_token_and_source_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/refactor"))
        .and(header("authorization", "Bearer jwt-abc"))
        .and(body_string("int x = 100;"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "detectedSmells": [
                {"type": "MagicNumber", "location": "line 1", "description": "100"}
            ],
            "refactoredCode": "final int X = 100;",
            "saved": true,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = Gateway::new(server.uri());
    let mut controller = AnalysisController::new();
    controller.set_source("int x = 100;");

    run_analyze(&mut controller, &gateway, Some(token("jwt-abc"))).await;

    let result = controller.outcome().result().expect("completed outcome");
    assert_eq!(result.smells.len(), 1);
    assert_eq!(result.smells[0].kind, "MagicNumber");
    assert!(result.saved_to_history);
}

#[tokio::test]
async fn reentrant_analyze_issues_a_single_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/refactor"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"detectedSmells": [], "saved": false}))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let gateway = Gateway::new(server.uri());
    let mut controller = AnalysisController::new();
    let (tx, mut rx) = events::channel();

    assert!(controller.analyze(&gateway, None, &tx));
    // The trigger is disabled while running; these must not spawn calls.
    assert!(!controller.analyze(&gateway, None, &tx));
    assert!(!controller.analyze(&gateway, None, &tx));

    match rx.recv().await.expect("single completion") {
        SessionEvent::AnalyzeDone { generation, result } => {
            controller.on_analyze_done(gateway.base_url(), generation, result);
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert!(!controller.is_running());
    // Mock's expect(1) verifies on drop that exactly one request arrived.
}

#[tokio::test]
async fn restore_during_flight_wins_over_late_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/refactor"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({
                    "detectedSmells": [
                        {"type": "GodClass", "location": "line 1", "description": "too big"}
                    ],
                    "saved": false,
                }))
                .set_delay(Duration::from_millis(50)),
        )
        .mount(&server)
        .await;

    let gateway = Gateway::new(server.uri());
    let mut controller = AnalysisController::new();
    let (tx, mut rx) = events::channel();
    assert!(controller.analyze(&gateway, None, &tx));

    // A history selection arrives while the call is outstanding.
    let record: smelter_session::HistoryRecord = serde_json::from_str(
        r#"{
            "id": 9,
            "createdAt": "2026-08-05T08:30:00",
            "originalCode": "void old() {}",
            "refactoredCode": "void renamed() {}",
            "smellsCount": 3,
            "smellTypes": "LongMethod"
        }"#,
    )
    .unwrap();
    controller.restore_from_history(&record);
    assert_eq!(controller.source(), "void old() {}");

    // The analyze response resolves afterwards and must be ignored.
    match rx.recv().await.expect("late completion") {
        SessionEvent::AnalyzeDone { generation, result } => {
            controller.on_analyze_done(gateway.base_url(), generation, result);
        }
        other => panic!("unexpected event {other:?}"),
    }

    let result = controller.outcome().result().expect("restored outcome");
    assert!(result.smells.is_empty());
    assert!(result.saved_to_history);
    assert_eq!(controller.source(), "void old() {}");
}

#[tokio::test]
async fn history_open_with_empty_list_renders_empty_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/history"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"success": true, "history": []})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let gateway = Gateway::new(server.uri());
    let mut browser = HistoryBrowser::new();
    let (tx, mut rx) = events::channel();

    browser.open(&gateway, Some(token("jwt-abc")), &tx);
    assert_eq!(*browser.view(), HistoryView::Loading);

    match rx.recv().await.expect("history completion") {
        SessionEvent::HistoryLoaded { result } => browser.on_loaded(result),
        other => panic!("unexpected event {other:?}"),
    }

    // Empty-state: loaded with no records, not loading, not closed.
    assert_eq!(*browser.view(), HistoryView::Loaded(Vec::new()));
}

#[tokio::test]
async fn history_failure_degrades_silently_and_reopen_refetches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/history"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway timeout</html>"))
        .expect(2)
        .mount(&server)
        .await;

    let gateway = Gateway::new(server.uri());
    let mut browser = HistoryBrowser::new();

    for _ in 0..2 {
        let (tx, mut rx) = events::channel();
        browser.open(&gateway, Some(token("jwt-abc")), &tx);
        match rx.recv().await.expect("history completion") {
            SessionEvent::HistoryLoaded { result } => browser.on_loaded(result),
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(*browser.view(), HistoryView::Loaded(Vec::new()));
        browser.close();
    }
    // expect(2): closing discarded the cache, so the second open re-fetched.
}

#[tokio::test]
async fn selected_record_restores_source_exactly() {
    let server = MockServer::start().await;
    let original = "public class Old {\n    void m() {}\n}";
    Mock::given(method("GET"))
        .and(path("/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "history": [{
                "id": 4,
                "createdAt": "2026-08-06T18:45:00",
                "originalCode": original,
                "refactoredCode": "public class New {}",
                "diff": "-Old +New",
                "smellsCount": 3,
                "smellTypes": "GodClass, LongMethod"
            }],
        })))
        .mount(&server)
        .await;

    let gateway = Gateway::new(server.uri());
    let mut browser = HistoryBrowser::new();
    let mut controller = AnalysisController::new();
    let (tx, mut rx) = events::channel();

    browser.open(&gateway, Some(token("jwt-abc")), &tx);
    match rx.recv().await.expect("history completion") {
        SessionEvent::HistoryLoaded { result } => browser.on_loaded(result),
        other => panic!("unexpected event {other:?}"),
    }

    let record = browser.select().expect("one record");
    assert!(!browser.is_open());
    controller.restore_from_history(&record);

    assert_eq!(controller.source(), original);
    let result = controller.outcome().result().expect("restored outcome");
    // History keeps only the count, not per-smell detail.
    assert!(result.smells.is_empty());
    assert!(result.saved_to_history);
    assert_eq!(result.refactored_code.as_deref(), Some("public class New {}"));
}

#[tokio::test]
async fn logout_during_flight_never_reauthenticates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token": "jwt-abc",
            "username": "ada",
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/refactor"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"detectedSmells": [], "saved": true}))
                .set_delay(Duration::from_millis(50)),
        )
        .mount(&server)
        .await;

    let gateway = Gateway::new(server.uri());
    let mut store = SessionStore::new();
    store.login(&gateway, "ada", "hunter2").await.unwrap();

    let mut controller = AnalysisController::new();
    let (tx, mut rx) = events::channel();
    assert!(controller.analyze(&gateway, store.token().cloned(), &tx));

    // Logout is immediate and synchronous.
    store.logout();
    assert!(!store.is_authenticated());

    // The analyze response arrives later; it may settle the outcome but it
    // must not put a credential back.
    match rx.recv().await.expect("late completion") {
        SessionEvent::AnalyzeDone { generation, result } => {
            controller.on_analyze_done(gateway.base_url(), generation, result);
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert!(controller.outcome().result().is_some());
    assert!(!store.is_authenticated());
    assert!(store.token().is_none());
}
