//! Mock catalog server fixtures

use serde_json::{Value, json};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use catalog_export::{ApiConfig, CatalogClient, ExportConfig, RetryConfig, Session};

/// Token the mock server accepts
pub const TOKEN: &str = "integration-token";

/// Vehicle configuration returned by the mock VIN decode
pub const VEHICLE_CONFIG: &str = "vc-2003-accord";

/// A VIN of the right length
pub const VIN: &str = "1HGCM82633A004352";

/// Category tree with two categories and three groups
pub fn category_tree_body() -> Value {
    json!({
        "data": [
            {
                "categoryID": 1,
                "categoryName": "Filters",
                "groups": [
                    { "groupID": 10, "groupName": "Oil Filters", "catalogObjects": [
                        { "catalogObjectID": 100, "catalogObjectName": "Oil Filter" }
                    ]},
                    { "groupID": 20, "groupName": "Air Filters", "catalogObjects": null }
                ]
            },
            {
                "categoryID": "2",
                "categoryName": "Brakes",
                "groups": [ { "groupID": "30", "groupName": "Brake Pads" } ]
            }
        ]
    })
}

/// Client for `server` that never retries
pub fn client_for(server: &MockServer) -> CatalogClient {
    let api = ApiConfig {
        base_url: server.uri(),
        timeout: Duration::from_secs(5),
        ..ApiConfig::default()
    };
    CatalogClient::new(api, RetryConfig::disabled()).expect("client")
}

/// Export settings without the inter-group delay
pub fn fast_export_config() -> ExportConfig {
    ExportConfig {
        group_delay: Duration::ZERO,
        ..ExportConfig::default()
    }
}

/// A session holding the mock token and vehicle configuration
pub fn ready_session() -> Session {
    let mut session = Session::default();
    session.set_token(TOKEN);
    session.vehicle_config = Some(VEHICLE_CONFIG.to_string());
    session
}

/// Mount login, VIN decode, and category tree endpoints
pub async fn mount_session_endpoints(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "accessToken": TOKEN })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/vin/decode-vin"))
        .and(header("Authorization", format!("Bearer {}", TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "vin": VIN, "vehicleConfiguration": VEHICLE_CONFIG }]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/parts/category-tree"))
        .and(header("X-Vehicle-Configuration", VEHICLE_CONFIG))
        .respond_with(ResponseTemplate::new(200).set_body_json(category_tree_body()))
        .mount(server)
        .await;
}

/// Answer the manufacturers query of one group
pub async fn mount_manufacturers(server: &MockServer, group_id: i64, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/api/parts/manufacturers"))
        .and(query_param("catalogGroupIDs", group_id.to_string().as_str()))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Answer the part-fitment query of one group
pub async fn mount_parts(server: &MockServer, group_id: i64, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/api/parts/get-part-fitments"))
        .and(query_param("catalogGroupIDs", group_id.to_string().as_str()))
        .respond_with(response)
        .mount(server)
        .await;
}

/// A JSON 200 response
pub fn ok_json(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}
