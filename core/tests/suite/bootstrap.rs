use std::time::Duration;

use homeinspect_core::InspectionStore;
use homeinspect_core::ReadinessState;
use homeinspect_core::StartedStore;
use homeinspect_core::StoreCounts;
use homeinspect_core::StoreError;
use homeinspect_core::StoreEvent;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::method;
use wiremock::matchers::path;

use super::mock_backend::config_for;
use super::mock_backend::mount_hierarchy;
use super::mock_backend::mount_token;
use super::mock_backend::ready_store;
use super::mock_backend::single_section_hierarchy;
use super::mock_backend::store_for;

#[tokio::test]
async fn bootstrap_builds_single_section_hierarchy() {
    let server = MockServer::start().await;
    let store = ready_store(&server).await;

    assert_eq!(store.readiness(), ReadinessState::Ready);
    let sections = store.sections().unwrap();
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].subsection_ids, vec![1]);

    let roof = store.subsection(1).unwrap();
    assert_eq!(roof.comment_ids, vec![1, 2]);
    assert_eq!(store.section_for_subsection(1).unwrap(), 1);

    assert_eq!(
        store.counts().unwrap(),
        StoreCounts {
            sections: 1,
            subsections: 1,
            comments: 3,
            live_results: 0,
        }
    );
    assert!(store.comment(0).unwrap().is_sentinel());
    assert_eq!(store.comment_text(1).unwrap(), "Moss on shingles");
    assert!(store.comment(2).unwrap().active);
}

#[tokio::test]
async fn bootstrap_emits_hierarchy_loaded() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_hierarchy(&server, single_section_hierarchy()).await;
    let store = store_for(&server);
    let mut events = store.subscribe();

    store.bootstrap().await.unwrap();

    assert_eq!(
        events.recv().await.unwrap(),
        StoreEvent::HierarchyLoaded {
            sections: 1,
            subsections: 1,
            comments: 3,
        }
    );
}

#[tokio::test]
async fn rejected_token_fails_without_fetching_hierarchy() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users/token.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/sections.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(single_section_hierarchy()))
        .expect(0)
        .mount(&server)
        .await;

    let store = store_for(&server);
    let mut events = store.subscribe();

    let err = store.bootstrap().await.unwrap_err();
    assert!(matches!(err, StoreError::BootstrapFailed(_)));
    assert!(matches!(store.readiness(), ReadinessState::Failed(_)));

    let waited = store.wait_ready(Duration::from_secs(1)).await.unwrap_err();
    assert!(matches!(waited, StoreError::BootstrapFailed(_)));
    assert!(matches!(
        events.recv().await.unwrap(),
        StoreEvent::BootstrapFailed { .. }
    ));

    // Failure is sticky for queries too.
    assert!(matches!(
        store.subsection_text(0, 0),
        Err(StoreError::BootstrapFailed(_))
    ));
}

#[tokio::test]
async fn malformed_hierarchy_fails_bootstrap() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/sections.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let store = store_for(&server);
    let err = store.bootstrap().await.unwrap_err();
    match err {
        StoreError::BootstrapFailed(reason) => assert!(reason.starts_with("parse error: hierarchy")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn second_bootstrap_does_not_refetch() {
    let server = MockServer::start().await;
    // Both mocks expect exactly one call.
    let store = ready_store(&server).await;

    store.bootstrap().await.unwrap();
    assert!(store.is_ready());
}

#[tokio::test]
async fn start_spawns_bootstrap_and_wait_observes_it() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_hierarchy(&server, single_section_hierarchy()).await;

    let StartedStore {
        store,
        mut events,
        bootstrap,
    } = InspectionStore::start(&config_for(&server)).unwrap();
    store.wait_ready(Duration::from_secs(5)).await.unwrap();
    bootstrap.await.unwrap().unwrap();

    assert_eq!(store.subsection_text(0, 0).unwrap(), "Roof");
    assert!(matches!(
        events.try_recv(),
        Ok(StoreEvent::HierarchyLoaded { sections: 1, .. })
    ));
}

#[tokio::test]
async fn start_receiver_sees_failure_emitted_before_caller_looks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users/token.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
        .mount(&server)
        .await;

    let mut started = InspectionStore::start(&config_for(&server)).unwrap();
    assert!(started.bootstrap.await.unwrap().is_err());
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(matches!(
        started.events.try_recv(),
        Ok(StoreEvent::BootstrapFailed { .. })
    ));
    // A late subscriber has nothing to replay.
    assert!(started.store.subscribe().try_recv().is_err());
}

#[tokio::test]
async fn wait_times_out_when_backend_is_slow() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users/token.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "data": {"token": "t"}}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let StartedStore { store, .. } = InspectionStore::start(&config_for(&server)).unwrap();
    let err = store
        .wait_ready(Duration::from_millis(100))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::BootstrapTimeout(_)));
    assert!(matches!(store.comment_text(1), Err(StoreError::NotReady)));
}
