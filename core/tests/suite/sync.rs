use homeinspect_core::StoreError;
use homeinspect_core::StoreEvent;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::body_json;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::matchers::query_param;

use super::mock_backend::TOKEN;
use super::mock_backend::ready_store;
use super::mock_backend::store_for;

#[tokio::test]
async fn submit_posts_record_with_bootstrap_token() {
    let server = MockServer::start().await;
    let store = ready_store(&server).await;
    let id = store.add_result(2).unwrap();
    store.change_note(id, "Flashing needs sealant").unwrap();

    Mock::given(method("POST"))
        .and(path("/api/results/add"))
        .and(query_param("token", TOKEN))
        .and(body_json(json!({
            "id": 0,
            "insp_id": -1,
            "com_id": 2,
            "variant_id": null,
            "add_on": "Flashing needs sealant",
            "severity": 1
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": {"id": 55}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut events = store.subscribe();
    let ack = store.submit_result(id).await.unwrap();
    assert!(ack.success);
    assert_eq!(ack.data, json!({"id": 55}));
    assert_eq!(
        events.recv().await.unwrap(),
        StoreEvent::ResultSubmitted {
            result_id: id,
            accepted: true,
        }
    );
}

#[tokio::test]
async fn rejected_submission_is_reported_and_announced() {
    let server = MockServer::start().await;
    let store = ready_store(&server).await;
    let id = store.add_result(1).unwrap();

    Mock::given(method("POST"))
        .and(path("/api/results/add"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": false, "message": "inspection closed"})),
        )
        .mount(&server)
        .await;

    let mut events = store.subscribe();
    let err = store.submit_result(id).await.unwrap_err();
    match err {
        StoreError::Client(client) => assert!(client.to_string().contains("inspection closed")),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        events.recv().await.unwrap(),
        StoreEvent::ResultSubmitted {
            result_id: id,
            accepted: false,
        }
    );
}

#[tokio::test]
async fn fetch_remote_results_decodes_records() {
    let server = MockServer::start().await;
    let store = ready_store(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/results.json"))
        .and(query_param("token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{"id": "3", "insp_id": 12, "com_id": 1, "severity": 2}]
        })))
        .mount(&server)
        .await;

    let records = store.fetch_remote_results().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, 3);
    assert_eq!(records[0].insp_id, 12);
    assert_eq!(records[0].variant_id, None);
    assert_eq!(store.counts().unwrap().live_results, 0);
}

#[tokio::test]
async fn sync_requires_ready_store() {
    let server = MockServer::start().await;
    let store = store_for(&server);

    assert!(matches!(store.submit_result(0).await, Err(StoreError::NotReady)));
    assert!(matches!(
        store.fetch_remote_results().await,
        Err(StoreError::NotReady)
    ));
}
