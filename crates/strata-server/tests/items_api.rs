//! End-to-end tests of the item service, driven through `App::handle`.

use bytes::Bytes;
use http::{HeaderMap, Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use strata_core::{RequestId, StrataError};
use strata_server::App;
use strata_store::ItemStore;

struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

fn app() -> App {
    App::new(Arc::new(ItemStore::new()), false).unwrap()
}

async fn send(app: &App, method: Method, uri: &str, body: Option<Value>) -> Response {
    send_with(app, Request::builder().method(method).uri(uri), body).await
}

async fn send_with(app: &App, builder: http::request::Builder, body: Option<Value>) -> Response {
    let body = body.map_or_else(Bytes::new, |v| Bytes::from(v.to_string()));
    let response = app.handle(builder.body(body).unwrap()).await;

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    Response {
        status,
        headers,
        body: serde_json::from_slice(&bytes).unwrap(),
    }
}

#[tokio::test]
async fn test_item_lifecycle() {
    let app = app();

    let widget = send(&app, Method::POST, "/items", Some(json!({"name": "Widget"}))).await;
    assert_eq!(widget.status, StatusCode::CREATED);
    assert_eq!(widget.body, json!({"id": 1, "name": "Widget"}));

    let gadget = send(
        &app,
        Method::POST,
        "/items",
        Some(json!({"name": "Gadget", "description": "small"})),
    )
    .await;
    assert_eq!(gadget.body, json!({"id": 2, "name": "Gadget", "description": "small"}));

    let list = send(&app, Method::GET, "/items", None).await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(
        list.body,
        json!([
            {"id": 1, "name": "Widget"},
            {"id": 2, "name": "Gadget", "description": "small"},
        ])
    );

    let updated = send(&app, Method::PUT, "/items/1", Some(json!({"name": "Widget2"}))).await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body, json!({"id": 1, "name": "Widget2"}));

    let deleted = send(&app, Method::DELETE, "/items/1", None).await;
    assert_eq!(deleted.body, json!({"deleted": true}));

    let missing = send(&app, Method::GET, "/items/1", None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["error"]["code"], "NOT_FOUND");

    let again = send(&app, Method::DELETE, "/items/1", None).await;
    assert_eq!(again.status, StatusCode::OK);
    assert_eq!(again.body, json!({"deleted": false}));
}

#[tokio::test]
async fn test_get_existing_item() {
    let app = app();
    send(&app, Method::POST, "/items", Some(json!({"name": "Widget"}))).await;

    let got = send(&app, Method::GET, "/items/1", None).await;
    assert_eq!(got.status, StatusCode::OK);
    assert_eq!(got.body, json!({"id": 1, "name": "Widget"}));
}

#[tokio::test]
async fn test_secret_never_leaves_the_server() {
    let app = app();
    send(&app, Method::POST, "/items", Some(json!({"name": "Widget"}))).await;
    send(&app, Method::PUT, "/items/1", Some(json!({"name": "Widget2"}))).await;

    for uri in ["/items", "/items/1"] {
        let response = send(&app, Method::GET, uri, None).await;
        let text = response.body.to_string();
        assert!(!text.contains("internalSecret"), "{uri}: {text}");
        assert!(!text.contains("secret-1"), "{uri}: {text}");
    }
}

#[tokio::test]
async fn test_update_unknown_item_is_not_found() {
    let app = app();
    let response = send(&app, Method::PUT, "/items/42", Some(json!({"name": "X"}))).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"]["code"], "NOT_FOUND");

    let list = send(&app, Method::GET, "/items", None).await;
    assert_eq!(list.body, json!([]));
}

#[tokio::test]
async fn test_non_integer_id_is_bad_request() {
    let app = app();

    for method in [Method::GET, Method::DELETE] {
        let response = send(&app, method, "/items/abc", None).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(response.body["error"]["field"], "id");
    }
}

#[tokio::test]
async fn test_missing_name_is_bad_request_and_creates_nothing() {
    let app = app();

    let response = send(&app, Method::POST, "/items", Some(json!({"description": "x"}))).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"]["code"], "VALIDATION_ERROR");

    let created = send(&app, Method::POST, "/items", Some(json!({"name": "First"}))).await;
    assert_eq!(created.body["id"], 1);
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = app();
    let response = app
        .handle(
            Request::builder()
                .method(Method::POST)
                .uri("/items")
                .body(Bytes::from_static(b"{not json"))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_route_is_route_not_found() {
    let app = app();

    let response = send(&app, Method::GET, "/nowhere", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"]["code"], "ROUTE_NOT_FOUND");

    let wrong_method = send(&app, Method::PATCH, "/items/1", None).await;
    assert_eq!(wrong_method.body["error"]["code"], "ROUTE_NOT_FOUND");
}

#[tokio::test]
async fn test_every_response_carries_request_id() {
    let app = app();
    let cases = [
        (Method::GET, "/"),
        (Method::GET, "/items"),
        (Method::GET, "/items/9"),
        (Method::GET, "/items/abc"),
        (Method::GET, "/nowhere"),
    ];

    for (method, uri) in cases {
        let response = send(&app, method, uri, None).await;
        let header = response.headers["x-request-id"].to_str().unwrap();
        assert!(RequestId::parse(header).is_some(), "{uri}: {header}");
    }
}

#[tokio::test]
async fn test_error_envelope_echoes_request_id() {
    let app = app();
    let response = send(&app, Method::GET, "/items/abc", None).await;
    let header = response.headers["x-request-id"].to_str().unwrap();
    assert_eq!(response.body["request_id"], header);
}

#[tokio::test]
async fn test_incoming_request_id_adopted_only_when_trusted() {
    let incoming = RequestId::new().to_string();
    let request = || {
        Request::builder()
            .method(Method::GET)
            .uri("/items")
            .header("x-request-id", incoming.as_str())
    };

    let trusting = App::new(Arc::new(ItemStore::new()), true).unwrap();
    let adopted = send_with(&trusting, request(), None).await;
    assert_eq!(adopted.headers["x-request-id"], incoming.as_str());

    let untrusting = app();
    let replaced = send_with(&untrusting, request(), None).await;
    assert_ne!(replaced.headers["x-request-id"], incoming.as_str());
}

#[tokio::test(start_paused = true)]
async fn test_stalled_body_times_out_with_trusted_request_id() {
    let incoming = RequestId::new().to_string();
    let app = App::new(Arc::new(ItemStore::new()), true)
        .unwrap()
        .with_request_timeout(Duration::from_millis(200));
    let (head, ()) = Request::builder()
        .method(Method::POST)
        .uri("/items")
        .header("x-request-id", incoming.as_str())
        .body(())
        .unwrap()
        .into_parts();

    let response = app
        .handle_streaming(head, std::future::pending::<Result<Bytes, StrataError>>())
        .await;

    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    assert_eq!(response.headers()["x-request-id"], incoming.as_str());
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["code"], "REQUEST_TIMEOUT");
    assert_eq!(body["request_id"], incoming.as_str());
}

#[tokio::test]
async fn test_unreadable_body_is_bad_request_with_request_id() {
    let app = app();
    let (head, ()) = Request::builder()
        .method(Method::POST)
        .uri("/items")
        .body(())
        .unwrap()
        .into_parts();

    let response = app
        .handle_streaming(head, async {
            Err(StrataError::validation("failed to read request body: connection reset"))
        })
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let header = response.headers()["x-request-id"].to_str().unwrap();
    assert!(RequestId::parse(header).is_some(), "{header}");

    let list = send(&app, Method::GET, "/items", None).await;
    assert_eq!(list.body, json!([]));
}

#[tokio::test]
async fn test_index_lists_endpoints() {
    let app = app();
    let response = send(&app, Method::GET, "/", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["message"].is_string());
    let endpoints = response.body["endpoints"].as_array().unwrap();
    assert!(endpoints.contains(&json!("POST /items")));
    assert!(endpoints.contains(&json!("DELETE /items/:id")));
}

#[tokio::test]
async fn test_concurrent_creates_get_distinct_ids() {
    let app = Arc::new(app());

    let tasks: Vec<_> = (0..20)
        .map(|i| {
            let app = Arc::clone(&app);
            tokio::spawn(async move {
                send(&app, Method::POST, "/items", Some(json!({"name": format!("n{i}")})))
                    .await
                    .body["id"]
                    .as_u64()
                    .unwrap()
            })
        })
        .collect();

    let mut ids = Vec::new();
    for task in tasks {
        ids.push(task.await.unwrap());
    }
    ids.sort_unstable();
    assert_eq!(ids, (1..=20).collect::<Vec<u64>>());
}
