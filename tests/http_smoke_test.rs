mod common;

use axum::{
    body::{self, Body},
    http::{Method, Request, StatusCode},
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::str::FromStr;
use tower::ServiceExt;

use common::{TestApp, VALID_CNPJ};

fn json_request(method: Method, uri: &str, payload: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-user-id", "7f2c1b46-9f6e-4c9f-8a10-0f5de1a4c020")
        .header("x-forwarded-for", "192.0.2.55")
        .body(Body::from(payload.to_string()))
        .expect("build request")
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("parse response body")
}

#[tokio::test]
async fn liveness_and_root_respond() {
    let app = TestApp::new().await;

    let response = app
        .router()
        .oneshot(
            Request::builder()
                .uri("/api/v1/health/live")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("request liveness");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .router()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .expect("request root");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn document_entry_over_http_derives_amounts() {
    let app = TestApp::new().await;

    let response = app
        .router()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/suppliers",
            &json!({
                "kind": "company",
                "name": "Construtora Alfa Ltda",
                "tax_id": VALID_CNPJ,
            }),
        ))
        .await
        .expect("create supplier");
    assert_eq!(response.status(), StatusCode::CREATED);
    let supplier = response_json(response).await;
    let supplier_id = supplier["id"].as_str().expect("supplier id").to_string();

    let response = app
        .router()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/documents",
            &json!({
                "kind": "NF",
                "supplier_id": supplier_id,
                "document_date": "2024-01-15",
                "gross_amount": "100.00",
                "service_tax_amount": "5.00",
                "withholding_tax_amount": "3.00",
            }),
        ))
        .await
        .expect("create document");
    assert_eq!(response.status(), StatusCode::CREATED);

    let document = response_json(response).await;
    let net = Decimal::from_str(document["net_amount"].as_str().expect("net amount"))
        .expect("parse net amount");
    assert_eq!(net, dec!(100.00));
    let iss = Decimal::from_str(
        document["service_tax_amount"].as_str().expect("iss amount"),
    )
    .expect("parse iss");
    assert_eq!(iss, Decimal::ZERO);
    assert_eq!(document["status"], "pending");
    assert_eq!(document["stage"], "opening");
}

#[tokio::test]
async fn validation_failures_surface_as_bad_request() {
    let app = TestApp::new().await;

    let response = app
        .router()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/suppliers",
            &json!({
                "kind": "company",
                "name": "Empresa Inválida",
                "tax_id": "11.222.333/0001-99",
            }),
        ))
        .await
        .expect("create supplier with bad tax id");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["message"]
        .as_str()
        .unwrap_or_default()
        .contains("tax_id"));
}

#[tokio::test]
async fn dashboard_report_answers() {
    let app = TestApp::new().await;

    let response = app
        .router()
        .oneshot(
            Request::builder()
                .uri("/api/v1/reports/dashboard")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("request dashboard");

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["pending"]["count"], 0);
    assert!(body["recent_documents"].as_array().is_some());
}

#[tokio::test]
async fn activity_log_lists_http_mutations() {
    let app = TestApp::new().await;

    let response = app
        .router()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/suppliers",
            &json!({
                "kind": "company",
                "name": "Construtora Alfa Ltda",
                "tax_id": VALID_CNPJ,
            }),
        ))
        .await
        .expect("create supplier");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .router()
        .oneshot(
            Request::builder()
                .uri("/api/v1/activity")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("list activity");
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let entries = body["data"].as_array().expect("activity entries");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["action"], "Supplier created");
    assert_eq!(entries[0]["client_ip"], "192.0.2.55");
}
