use std::collections::VecDeque;
use std::pin::Pin;
use std::time::Duration;

use futures::{Stream, StreamExt};
use reqwest::Client as HttpClient;

use crate::protocol::{ChatMessage, ChatRequest, HealthResponse, StreamEvent, ToolList};
use crate::sse::SseDecoder;

pub const DEFAULT_API_URL: &str = "http://localhost:3001";

const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Session-scoped settings for talking to the compliance API. Passed into
/// each client explicitly; there is no process-wide configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub chat_timeout: Duration,
    pub tool_timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: None,
            api_key: None,
            chat_timeout: Duration::from_secs(60),
            tool_timeout: Duration::from_secs(600),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("cannot connect to the compliance API at {url}; is the server running?")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request timed out; the agent may be processing a complex query")]
    Timeout(#[source] reqwest::Error),
    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("connection interrupted mid-stream")]
    Interrupted(#[source] reqwest::Error),
    #[error("malformed response from the API")]
    Decode(#[source] reqwest::Error),
}

#[derive(Clone)]
pub struct ApiClient {
    http: HttpClient,
    config: ApiConfig,
}

impl ApiClient {
    pub fn new(mut config: ApiConfig) -> Self {
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        Self {
            http: HttpClient::new(),
            config,
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Open a streaming chat turn. The returned stream owns the response;
    /// dropping it closes the connection.
    pub async fn chat(
        &self,
        message: String,
        history: Vec<ChatMessage>,
    ) -> Result<EventStream, ApiError> {
        let url = format!("{}/api/chat", self.config.base_url);
        let mut request = self
            .http
            .post(&url)
            .timeout(self.config.chat_timeout)
            .json(&ChatRequest { message, history });
        if let Some(model) = &self.config.model {
            request = request.header("x-model", model);
        }
        if let Some(key) = &self.config.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|err| self.request_error(err))?;
        let response = check_status(response).await?;
        Ok(EventStream::new(response))
    }

    pub async fn health(&self) -> Result<HealthResponse, ApiError> {
        let url = format!("{}/health", self.config.base_url);
        let response = self
            .http
            .get(&url)
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
            .map_err(|err| self.request_error(err))?;
        let response = check_status(response).await?;
        response.json().await.map_err(ApiError::Decode)
    }

    pub async fn list_tools(&self) -> Result<ToolList, ApiError> {
        let url = format!("{}/api/tools", self.config.base_url);
        let response = self
            .http
            .get(&url)
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
            .map_err(|err| self.request_error(err))?;
        let response = check_status(response).await?;
        response.json().await.map_err(ApiError::Decode)
    }

    /// Invoke one compliance tool directly, returning the raw JSON payload.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        let url = format!("{}/api/tools/{}", self.config.base_url, name);
        let response = self
            .http
            .post(&url)
            .timeout(self.config.tool_timeout)
            .json(&arguments)
            .send()
            .await
            .map_err(|err| self.request_error(err))?;
        let response = check_status(response).await?;
        response.json().await.map_err(ApiError::Decode)
    }

    fn request_error(&self, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout(err)
        } else {
            ApiError::Connect {
                url: self.config.base_url.clone(),
                source: err,
            }
        }
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        body,
    })
}

type BodyStream = Pin<Box<dyn Stream<Item = reqwest::Result<bytes::Bytes>> + Send>>;

/// Lazily yields the parsed events of one chat turn, in arrival order.
/// Malformed payloads are skipped; the stream ends when the server closes
/// the connection or a `done` event is observed. Not restartable.
pub struct EventStream {
    body: BodyStream,
    decoder: SseDecoder,
    queued: VecDeque<StreamEvent>,
    finished: bool,
}

impl EventStream {
    fn new(response: reqwest::Response) -> Self {
        Self {
            body: Box::pin(response.bytes_stream()),
            decoder: SseDecoder::new(),
            queued: VecDeque::new(),
            finished: false,
        }
    }

    pub async fn next(&mut self) -> Result<Option<StreamEvent>, ApiError> {
        loop {
            if let Some(event) = self.queued.pop_front() {
                if matches!(event, StreamEvent::Done) {
                    self.finished = true;
                    self.queued.clear();
                }
                return Ok(Some(event));
            }
            if self.finished {
                return Ok(None);
            }

            match self.body.next().await {
                Some(Ok(chunk)) => {
                    for payload in self.decoder.feed(&chunk) {
                        match serde_json::from_str::<StreamEvent>(&payload) {
                            Ok(event) => self.queued.push_back(event),
                            Err(err) => {
                                tracing::debug!(%err, %payload, "skipping malformed stream payload");
                            }
                        }
                    }
                }
                Some(Err(err)) => {
                    self.finished = true;
                    return Err(if err.is_timeout() {
                        ApiError::Timeout(err)
                    } else {
                        ApiError::Interrupted(err)
                    });
                }
                None => {
                    self.finished = true;
                    return Ok(None);
                }
            }
        }
    }
}
