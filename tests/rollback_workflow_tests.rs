//! Rollback workflow tests
//!
//! Confirm, cancel and failure paths of a rollback, end to end against the
//! in-memory release server.

mod common;

use chartdeck::api::{Method, TRANSPORT_FAILURE_MESSAGE};
use chartdeck::cli::{ServerArgs, Session, rollback_release};
use chartdeck::config::Config;
use chartdeck::history::{RevisionHistoryController, RollbackOutcome, RollbackState};
use chartdeck::models::StorageBackend;
use chartdeck::services::ReleaseService;
use chartdeck::store::AppStore;
use common::{MockReleaseServer, revision, web_history};
use std::sync::Arc;

async fn loaded_controller(
    server: &Arc<MockReleaseServer>,
    store: AppStore,
) -> RevisionHistoryController {
    let service = ReleaseService::new(server.clone(), "tok");
    let release = revision("web", 3, "deployed", "2024-03-05T14:07:00Z");
    let mut controller =
        RevisionHistoryController::new(service, store, StorageBackend::Secret, release);
    assert!(controller.load_history().await);
    server.clear_calls();
    controller
}

#[tokio::test]
async fn test_confirmed_rollback_creates_new_current_revision() {
    let server = MockReleaseServer::with_revisions(web_history());
    let store = AppStore::new();
    let mut controller = loaded_controller(&server, store.clone()).await;

    assert!(controller.select_target(2));
    assert_eq!(controller.pending_rollback_target(), Some(2));

    let outcome = controller.confirm_and_wait().await.unwrap();
    assert_eq!(
        outcome,
        RollbackOutcome::Completed {
            target: 2,
            current_version: 4
        }
    );

    assert_eq!(server.count(Method::Post, "/releases/web/rollback"), 1);
    assert_eq!(server.count(Method::Get, "/releases/web/0"), 1);
    assert_eq!(server.count(Method::Get, "/releases/web/history"), 1);
    let rollback = server
        .calls()
        .into_iter()
        .find(|c| c.method == Method::Post)
        .unwrap();
    assert_eq!(rollback.param("revision").as_deref(), Some("2"));

    assert_eq!(controller.rollback_state(), RollbackState::Idle);
    assert!(!controller.is_loading());
    assert_eq!(controller.max_version(), 4);
    assert_eq!(controller.release().version, 4);
    assert_eq!(controller.release().info.description, "Rollback to 2");
    assert_eq!(controller.header_label(), "Current Revision - No. 4");
    assert_eq!(store.current_error(), None);
}

#[tokio::test]
async fn test_rollback_content_matches_target() {
    let server = MockReleaseServer::with_revisions(web_history());
    let mut controller = loaded_controller(&server, AppStore::new()).await;

    controller.select_target(1);
    controller.confirm_and_wait().await;

    let current = &controller.revisions()[0];
    assert_eq!(current.version, 4);
    assert_eq!(current.config, Some(serde_json::json!({"replicas": 1})));
    assert_eq!(current.chart.metadata.version, "1.1.0");
}

#[tokio::test]
async fn test_cancel_makes_no_calls() {
    let server = MockReleaseServer::with_revisions(web_history());
    let mut controller = loaded_controller(&server, AppStore::new()).await;

    assert!(controller.select_target(2));
    assert!(controller.cancel());

    assert!(controller.rollback_state().is_idle());
    assert_eq!(controller.pending_rollback_target(), None);
    assert!(controller.confirm_and_wait().await.is_none());
    assert!(server.calls().is_empty());
    assert_eq!(controller.max_version(), 3);
}

#[tokio::test]
async fn test_current_version_cannot_be_targeted() {
    let server = MockReleaseServer::with_revisions(web_history());
    let mut controller = loaded_controller(&server, AppStore::new()).await;

    assert!(!controller.select_target(3));
    assert!(!controller.select_target(9));
    assert!(controller.rollback_state().is_idle());
    assert!(controller.confirm().is_none());
    assert!(server.calls().is_empty());
}

#[tokio::test]
async fn test_rejected_rollback_sets_store_error_without_refresh() {
    let server = MockReleaseServer::with_revisions(web_history());
    server.fail_rollbacks_with(403, r#"{"errors":["insufficient permissions"]}"#);
    let store = AppStore::new();
    let mut controller = loaded_controller(&server, store.clone()).await;

    controller.select_target(2);
    let outcome = controller.confirm_and_wait().await.unwrap();

    assert_eq!(
        outcome,
        RollbackOutcome::Failed {
            target: 2,
            message: "insufficient permissions".to_string()
        }
    );
    assert_eq!(store.current_error().as_deref(), Some("insufficient permissions"));
    assert_eq!(server.calls().len(), 1);
    assert!(controller.rollback_state().is_idle());
    assert!(!controller.is_history_loading());
    assert_eq!(controller.max_version(), 3);
    assert_eq!(controller.revisions().len(), 3);
}

#[tokio::test]
async fn test_unreachable_server_uses_generic_message() {
    let server = MockReleaseServer::with_revisions(web_history());
    let store = AppStore::new();
    let mut controller = loaded_controller(&server, store.clone()).await;

    controller.select_target(1);
    server.go_offline();
    let outcome = controller.confirm_and_wait().await.unwrap();

    assert!(!outcome.is_completed());
    assert_eq!(store.current_error().as_deref(), Some(TRANSPORT_FAILURE_MESSAGE));
    assert!(controller.rollback_state().is_idle());
}

#[tokio::test]
async fn test_in_flight_rollback_blocks_new_targets() {
    let server = MockReleaseServer::with_revisions(web_history());
    let mut controller = loaded_controller(&server, AppStore::new()).await;

    controller.select_target(2);
    let request = controller.confirm().unwrap();
    assert_eq!(request.target(), 2);
    assert!(controller.is_loading());
    assert_eq!(controller.pending_rollback_target(), None);
    assert!(!controller.select_target(1));
    assert!(!controller.cancel());

    let response = request.execute().await;
    assert!(controller.complete_rollback(response).is_completed());
    assert!(!controller.is_loading());
    assert!(controller.select_target(1));
}

#[tokio::test]
async fn test_session_rollback_respects_confirmation() {
    let server = MockReleaseServer::with_revisions(web_history());
    let session =
        Session::with_transport(server.clone(), &ServerArgs::default(), Config::default()).unwrap();

    let declined = rollback_release(&session, "web", 1, |_| Ok(false))
        .await
        .unwrap();
    assert!(declined.is_none());
    assert_eq!(server.count(Method::Post, "/rollback"), 0);

    let mut asked = String::new();
    let outcome = rollback_release(&session, "web", 1, |question| {
        asked = question.to_string();
        Ok(true)
    })
    .await
    .unwrap();

    assert_eq!(asked, "Roll back default/web from revision 3 to revision 1?");
    assert_eq!(outcome, Some(4));
    assert_eq!(server.count(Method::Post, "/rollback"), 1);
}

#[tokio::test]
async fn test_session_rollback_reports_server_message() {
    let server = MockReleaseServer::with_revisions(web_history());
    server.fail_rollbacks_with(403, r#"{"errors":["insufficient permissions"]}"#);
    let session =
        Session::with_transport(server.clone(), &ServerArgs::default(), Config::default()).unwrap();

    let err = rollback_release(&session, "web", 2, |_| Ok(true))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "insufficient permissions");
    assert_eq!(session.store.current_error(), None);
}

#[tokio::test]
async fn test_session_rollback_rejects_current_revision() {
    let server = MockReleaseServer::with_revisions(web_history());
    let session =
        Session::with_transport(server.clone(), &ServerArgs::default(), Config::default()).unwrap();

    let err = rollback_release(&session, "web", 3, |_| Ok(true))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("already the current revision"));
    assert_eq!(server.count(Method::Post, "/rollback"), 0);
}
