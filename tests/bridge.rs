use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::{
    matchers::{body_json, body_string, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

use seat_manifest::{
    config::Config,
    controllers,
    error::ActuatorError,
    services::{navigation::MANIFEST_PATH, PageBridgeClient, SeatActuator},
    AppState,
};

async fn mount_toggle(server: &MockServer, element_id: &str, found: bool, selected: bool) {
    Mock::given(method("POST"))
        .and(path("/seats/toggle"))
        .and(body_json(json!({"elementId": element_id})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"found": found, "selected": selected})))
        .mount(server)
        .await;
}

async fn post_json(config: Config, uri: &str, body: Value) -> (StatusCode, Value) {
    let app = controllers::app(AppState::new(config).unwrap());
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn toggle_reports_selection_and_missing_seats() {
    let server = MockServer::start().await;
    mount_toggle(&server, "IMG0C1", true, true).await;
    mount_toggle(&server, "IMG0C2", true, false).await;
    mount_toggle(&server, "IMG0C3", false, false).await;

    let client = PageBridgeClient::new(&server.uri(), reqwest::Client::new());
    assert!(client.toggle(0, 1).await.unwrap());
    assert!(!client.toggle(0, 2).await.unwrap());
    assert!(matches!(client.toggle(0, 3).await, Err(ActuatorError::NotFound(id)) if id == "IMG0C3"));
}

#[tokio::test]
async fn clear_removes_known_seats_one_by_one() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/seats/remove"))
        .and(body_json(json!({"elementId": "IMG2C4"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/seats/remove"))
        .and(body_json(json!({"elementId": "IMG2C5"})))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = PageBridgeClient::new(&server.uri(), reqwest::Client::new())
        .with_known_selection(vec!["IMG2C4".into(), "".into(), "IMG2C5".into()]);
    assert_eq!(client.clear().await.unwrap(), 1);
}

#[tokio::test]
async fn clear_without_known_seats_asks_the_page() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/selection/clear"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"cleared": 3})))
        .expect(1)
        .mount(&server)
        .await;

    let client = PageBridgeClient::new(&server.uri(), reqwest::Client::new());
    assert_eq!(client.clear().await.unwrap(), 3);
}

#[tokio::test]
async fn rejected_commit_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cart/commit"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = PageBridgeClient::new(&server.uri(), reqwest::Client::new());
    assert!(matches!(
        client.commit().await,
        Err(ActuatorError::Rejected { action: "commit", status: 500 })
    ));
}

#[tokio::test]
async fn cart_selects_from_row_end_and_commits_partial_selection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/seats/remove"))
        .and(body_json(json!({"elementId": "IMG0C0"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    mount_toggle(&server, "IMG0C5", true, true).await;
    mount_toggle(&server, "IMG0C4", true, false).await;
    Mock::given(method("POST"))
        .and(path("/seats/attribute"))
        .and(body_json(json!({"elementId": "IMG0C5", "name": "P", "value": "5"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/cart/commit"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.bridge.url = Some(server.uri());

    let (status, body) = post_json(
        config,
        "/api/manifest/cart",
        json!({
            "pageId": "add-seat-show-manifest",
            "selectedIds": ["IMG0C0"],
            "limits": {"ticketUpperLimits": [4, 2]},
            "snapshot": {
                "rowNames": ["A"],
                "rowSeatStatus": [["O", "O", "X", "O", "O", "O"]],
                "rowPriceLevelID": [["L", "L", "L", "L", "L", "L"]],
                "priceCodeIds": [5],
                "priceInfos": [{"keyId": "5&L", "ticketPriceStr": "$30.00", "ticketPriceNum": 30}]
            }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ticketLimit"], 2);
    assert_eq!(body["limitSource"], "ticketUpperLimits");
    assert_eq!(body["outcome"]["cleared"], 1);
    assert_eq!(body["outcome"]["attempted"], 2);
    assert_eq!(body["outcome"]["selected"], json!(["A-Seat 6"]));
    assert_eq!(body["outcome"]["failed"], json!(["A-Seat 5"]));
    assert_eq!(body["outcome"]["committed"], true);
}

#[tokio::test]
async fn navigate_posts_manifest_form_to_vendor() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MANIFEST_PATH))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("performance_id=555&current_selection_method=byManifest&selection=104"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.vendor.base_url = server.uri();

    let (status, body) = post_json(
        config,
        "/api/manifest/navigate",
        json!({"section": "104", "pageUrl": "https://www.etix.com/ticket/p/555/show"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], 200);
    assert_eq!(body["form"]["reused"], false);
}

#[tokio::test]
async fn navigate_reuses_existing_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ticket/online/perf"))
        .and(body_string("token=abc&selection=12"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.vendor.base_url = server.uri();

    let (status, body) = post_json(
        config,
        "/api/manifest/navigate",
        json!({
            "section": "12",
            "existingForm": {
                "action": "/ticket/online/perf",
                "fields": [{"name": "token", "value": "abc"}, {"name": "selection", "value": ""}]
            }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["form"]["reused"], true);
}

#[tokio::test]
async fn vendor_errors_map_to_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MANIFEST_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.vendor.base_url = server.uri();

    let (status, _) = post_json(
        config,
        "/api/manifest/navigate",
        json!({"section": "104", "pageUrl": "/ticket/p/555/show"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}
