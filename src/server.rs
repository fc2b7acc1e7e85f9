use std::error::Error;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::client::ApiClient;
use crate::protocol::ToolFailure;
use crate::tools::{ToolDefinition, all_tools};

/// HTTP surface that exposes the compliance tools to connector clients,
/// proxying every invocation to the upstream API.
pub struct GatewayConfig {
    pub listen: String,
}

struct GatewayState {
    client: ApiClient,
    tools: Vec<ToolDefinition>,
}

type GatewayResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

pub async fn run(config: GatewayConfig, client: ApiClient) -> GatewayResult<()> {
    let app = router(client);
    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    tracing::info!(listen = %config.listen, "tool gateway listening");
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn router(client: ApiClient) -> axum::Router {
    let state = Arc::new(GatewayState {
        client,
        tools: all_tools(),
    });

    axum::Router::new()
        .route("/health", get(health))
        .route("/tools", get(list_tools))
        .route("/tools/:name", post(invoke_tool))
        .with_state(state)
}

async fn health(State(state): State<Arc<GatewayState>>) -> Json<Value> {
    let upstream = match state.client.health().await {
        Ok(health) => json!({
            "reachable": true,
            "service": health.service,
            "version": health.version,
        }),
        Err(err) => json!({
            "reachable": false,
            "message": err.to_string(),
        }),
    };

    Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "upstream": upstream,
    }))
}

async fn list_tools(State(state): State<Arc<GatewayState>>) -> Json<Value> {
    let tools: Vec<Value> = state
        .tools
        .iter()
        .map(|tool| {
            json!({
                "name": tool.name,
                "description": tool.description,
                "inputSchema": tool.input_schema,
            })
        })
        .collect();

    Json(json!({ "tools": tools }))
}

async fn invoke_tool(
    State(state): State<Arc<GatewayState>>,
    Path(name): Path<String>,
    Json(arguments): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let Some(tool) = state.tools.iter().find(|tool| tool.name == name) else {
        return failure(
            StatusCode::NOT_FOUND,
            format!("unknown tool '{name}'"),
        );
    };

    if let Err(message) = (tool.validate)(&arguments) {
        return failure(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("invalid arguments for {name}: {message}"),
        );
    }

    let request_id = Uuid::new_v4();
    tracing::info!(%request_id, tool = name, "proxying tool call");

    match state.client.call_tool(&name, arguments).await {
        Ok(result) => (StatusCode::OK, Json(result)),
        Err(err) => {
            tracing::warn!(%request_id, tool = name, error = %err, "tool call failed");
            failure(StatusCode::BAD_GATEWAY, err.to_string())
        }
    }
}

fn failure(status: StatusCode, message: String) -> (StatusCode, Json<Value>) {
    let body = serde_json::to_value(ToolFailure::new(message)).unwrap_or_default();
    (status, Json(body))
}
