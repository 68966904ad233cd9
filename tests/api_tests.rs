mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use common::{memory_state, WALLET};
use spv_ledger_api::handlers;

fn app() -> Router {
    handlers::router().with_state(memory_state())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(&app(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".to_string()));
}

#[tokio::test]
async fn test_allocation_flow_over_http() {
    let app = app();
    let project = Uuid::new_v4();

    let (status, investor) = send(
        &app,
        "POST",
        "/investors",
        Some(json!({
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "type": "individual",
            "wallet_address": WALLET,
            "kyc_status": "approved"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let investor_id = investor["id"].as_str().unwrap().to_string();

    let (status, subscription) = send(
        &app,
        "POST",
        "/subscriptions",
        Some(json!({
            "investor_id": investor_id,
            "project_id": project,
            "currency": "usd",
            "fiat_amount": "2500.00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let subscription_id = subscription["id"].as_str().unwrap().to_string();

    // Not confirmed yet
    let assign_body = json!({
        "allocations": [{"token_type": "ERC-20", "token_amount": "100"}]
    });
    let (status, body) = send(
        &app,
        "POST",
        &format!("/subscriptions/{}/allocations", subscription_id),
        Some(assign_body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("not confirmed"));
    assert_eq!(body["issues"][0]["field"], "subscription_id");

    let (status, _) = send(
        &app,
        "POST",
        &format!("/subscriptions/{}/confirm", subscription_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, allocations) = send(
        &app,
        "POST",
        &format!("/subscriptions/{}/allocations", subscription_id),
        Some(assign_body),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(allocations[0]["state"]["stage"], "confirmed");
    let allocation_id = allocations[0]["id"].as_str().unwrap().to_string();

    let (status, minted) = send(
        &app,
        "POST",
        &format!("/projects/{}/mint", project),
        Some(json!({"requests": [{"token_type": "ERC-20", "amount": 100}]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(minted["report"]["succeeded"], 1);
    assert_eq!(minted["summaries"][0]["status"], "minted");

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/allocations/{}", allocation_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("cannot delete"));

    let (status, distributed) = send(
        &app,
        "POST",
        "/allocations/distribute",
        Some(json!({"allocation_ids": [allocation_id]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(distributed["tx_hash"].as_str().unwrap().starts_with("0x"));

    let (status, summaries) = send(
        &app,
        "GET",
        &format!("/projects/{}/summaries", project),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summaries[0]["token_type"], "ERC-20");
    assert_eq!(summaries[0]["allocation_count"], 1);
}

#[tokio::test]
async fn test_unknown_subscription_is_not_found() {
    let (status, body) = send(
        &app(),
        "GET",
        &format!("/subscriptions/{}", Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().starts_with("Not found"));
}

#[tokio::test]
async fn test_export_sets_download_headers() {
    let app = app();
    let request = Request::builder()
        .uri(format!(
            "/projects/{}/allocations/export?format=xlsx&full=true",
            Uuid::new_v4()
        ))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("token_allocations_export_"));
    assert!(disposition.ends_with(".xlsx\""));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.starts_with("\"id\",\"subscription_id\""));
    assert!(text.trim_end().ends_with("\"notes\""));
}

#[tokio::test]
async fn test_assignment_rejects_non_positive_amounts() {
    let app = app();
    let project = Uuid::new_v4();

    let (_, investor) = send(
        &app,
        "POST",
        "/investors",
        Some(json!({"name": "Ada", "email": "ada@example.com"})),
    )
    .await;
    let (_, subscription) = send(
        &app,
        "POST",
        "/subscriptions",
        Some(json!({
            "investor_id": investor["id"],
            "project_id": project,
            "currency": "USD",
            "fiat_amount": "100"
        })),
    )
    .await;
    let subscription_id = subscription["id"].as_str().unwrap().to_string();
    send(
        &app,
        "POST",
        &format!("/subscriptions/{}/confirm", subscription_id),
        None,
    )
    .await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/subscriptions/{}/allocations", subscription_id),
        Some(json!({"allocations": [{"token_type": "ERC-20", "token_amount": "0"}]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["issues"][0]["field"], "allocations[0].token_amount");

    let (status, body) = send(
        &app,
        "POST",
        &format!("/subscriptions/{}/allocations", subscription_id),
        Some(json!({"allocations": []})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["issues"][0]["field"], "allocations");

    let (_, subscription) = send(
        &app,
        "GET",
        &format!("/subscriptions/{}", subscription_id),
        None,
    )
    .await;
    assert_eq!(subscription["allocated"], false);
}
