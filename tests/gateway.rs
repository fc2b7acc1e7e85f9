//! Exercises the tool gateway end to end: a stub upstream API, the real
//! router bound to a local port, and a plain HTTP client.

use axum::Json;
use axum::http::StatusCode;
use axum::routing::{get, post};
use serde_json::{Value, json};

use actchat::client::{ApiClient, ApiConfig};
use actchat::server;

async fn spawn(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn upstream_stub() -> axum::Router {
    axum::Router::new()
        .route(
            "/health",
            get(|| async { Json(json!({"service": "eu-ai-act-agent", "version": "0.9.0"})) }),
        )
        .route(
            "/api/tools/discover_organization",
            post(|Json(arguments): Json<Value>| async move {
                Json(json!({
                    "organization": {
                        "name": arguments["organizationName"],
                        "sector": "tech",
                    }
                }))
            }),
        )
        .route(
            "/api/tools/assess_compliance",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "assessment engine down") }),
        )
}

async fn spawn_gateway() -> String {
    let upstream = spawn(upstream_stub()).await;
    let client = ApiClient::new(ApiConfig::new(upstream));
    spawn(server::router(client)).await
}

#[tokio::test]
async fn lists_the_three_compliance_tools_with_schemas() {
    let gateway = spawn_gateway().await;

    let body: Value = reqwest::get(format!("{gateway}/tools"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let tools = body["tools"].as_array().unwrap();
    let names: Vec<&str> = tools
        .iter()
        .map(|tool| tool["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        [
            "discover_organization",
            "discover_ai_services",
            "assess_compliance"
        ]
    );
    for tool in tools {
        assert_eq!(tool["inputSchema"]["type"], "object");
        assert!(tool["description"].as_str().unwrap().len() > 10);
    }
}

#[tokio::test]
async fn proxies_a_valid_tool_call_to_the_upstream_api() {
    let gateway = spawn_gateway().await;

    let response = reqwest::Client::new()
        .post(format!("{gateway}/tools/discover_organization"))
        .json(&json!({"organizationName": "Acme"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["organization"]["name"], "Acme");
    assert_eq!(body["organization"]["sector"], "tech");
}

#[tokio::test]
async fn unknown_tools_get_a_404_envelope() {
    let gateway = spawn_gateway().await;

    let response = reqwest::Client::new()
        .post(format!("{gateway}/tools/delete_everything"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], true);
    assert!(body["message"].as_str().unwrap().contains("delete_everything"));
}

#[tokio::test]
async fn invalid_arguments_are_rejected_before_proxying() {
    let gateway = spawn_gateway().await;

    let response = reqwest::Client::new()
        .post(format!("{gateway}/tools/discover_organization"))
        .json(&json!({"domain": "acme.com"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 422);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], true);
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("invalid arguments for discover_organization")
    );
}

#[tokio::test]
async fn upstream_failures_become_a_bad_gateway_envelope() {
    let gateway = spawn_gateway().await;

    let response = reqwest::Client::new()
        .post(format!("{gateway}/tools/assess_compliance"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 502);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], true);
    assert!(body["message"].as_str().unwrap().contains("500"));
}

#[tokio::test]
async fn health_reports_gateway_and_upstream() {
    let gateway = spawn_gateway().await;

    let body: Value = reqwest::get(format!("{gateway}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["service"], "actchat");
    assert_eq!(body["upstream"]["reachable"], true);
    assert_eq!(body["upstream"]["service"], "eu-ai-act-agent");
    assert_eq!(body["upstream"]["version"], "0.9.0");
}

#[tokio::test]
async fn client_helpers_consume_the_upstream_contract() {
    let upstream = spawn(upstream_stub().route(
        "/api/tools",
        get(|| async {
            Json(json!({
                "tools": [
                    {"name": "discover_organization", "description": "profile an org"},
                    {"name": "assess_compliance"},
                ]
            }))
        }),
    ))
    .await;
    let client = ApiClient::new(ApiConfig::new(upstream));

    let health = client.health().await.unwrap();
    assert_eq!(health.service, "eu-ai-act-agent");

    let tools = client.list_tools().await.unwrap();
    assert_eq!(tools.tools.len(), 2);
    assert_eq!(tools.tools[0].name, "discover_organization");
    assert_eq!(tools.tools[1].description, "");

    let result = client
        .call_tool("discover_organization", json!({"organizationName": "Acme"}))
        .await
        .unwrap();
    assert_eq!(result["organization"]["sector"], "tech");
}
