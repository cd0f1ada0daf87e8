//! Shared wiremock fixtures for the store tests.

use std::time::Duration;

use homeinspect_core::BackendClient;
use homeinspect_core::InspectConfig;
use homeinspect_core::InspectionStore;
use serde_json::Value;
use serde_json::json;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::matchers::query_param;

pub const TOKEN: &str = "tok-123";

pub fn config_for(server: &MockServer) -> InspectConfig {
    InspectConfig {
        base_url: format!("{}/api", server.uri()),
        username: "Test".to_string(),
        password: "secret".to_string(),
        request_timeout_secs: 5,
        bootstrap_timeout_secs: 5,
        ..InspectConfig::default()
    }
}

pub fn store_for(server: &MockServer) -> InspectionStore {
    let config = config_for(server);
    let client = BackendClient::new(config.base_url.clone(), Duration::from_secs(5)).unwrap();
    InspectionStore::with_client(&config, client)
}

/// One section, one subsection, comments 1 and 2.
pub fn single_section_hierarchy() -> Value {
    json!({
        "success": true,
        "data": [{
            "id": 1,
            "name": "Exterior",
            "subsections": [{
                "id": 1,
                "name": "Roof",
                "sec_id": 1,
                "comments": [
                    {"id": 1, "subsec_id": 1, "rank": 1, "comment": "Moss on shingles", "active": 1},
                    {"id": 2, "subsec_id": 1, "rank": 2, "comment": "Flashing loose", "active": "1"}
                ]
            }]
        }]
    })
}

pub async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/users/token.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "data": {"token": TOKEN}})),
        )
        .expect(1)
        .mount(server)
        .await;
}

pub async fn mount_hierarchy(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path("/api/sections.json"))
        .and(query_param("token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

/// A store that has completed bootstrap against `single_section_hierarchy`.
pub async fn ready_store(server: &MockServer) -> InspectionStore {
    mount_token(server).await;
    mount_hierarchy(server, single_section_hierarchy()).await;
    let store = store_for(server);
    store.bootstrap().await.unwrap();
    store
}
