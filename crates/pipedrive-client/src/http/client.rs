/*
[INPUT]:  Client configuration, transport, method paths and parameters
[OUTPUT]: Decoded response envelopes or typed errors
[POS]:    HTTP layer - core request executor (get/post/put/delete)
[UPDATE]: When adding connection options or changing the request lifecycle
*/

use std::fmt;
use std::sync::Arc;

use reqwest::Method;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{Instrument, debug, info_span, warn};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::types::Envelope;

use super::backoff::{Sleeper, TokioSleeper};
use super::endpoint::{build_endpoint, redact_token};
use super::error::{PipedriveError, Result};
use super::payload::Payload;
use super::pipeline::{Outcome, classify};
use super::transport::{HttpTransport, PreparedRequest, Transport};

/// A session against the Pipedrive API.
///
/// Owns its transport exclusively. Every call takes `&mut self`, so one
/// session never has two requests in flight; run separate sessions for
/// concurrent work.
pub struct PipedriveClient {
    transport: Box<dyn Transport>,
    sleeper: Arc<dyn Sleeper>,
    base_url: String,
    config: ClientConfig,
}

impl fmt::Debug for PipedriveClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipedriveClient")
            .field("base_url", &self.base_url)
            .field("max_rate_limit_retries", &self.config.max_rate_limit_retries)
            .finish_non_exhaustive()
    }
}

impl PipedriveClient {
    /// Create a client for the public API with default configuration
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::with_token(api_token))
    }

    /// Create a client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Self::with_transport(config, transport)
    }

    /// Create a client over a caller-supplied transport
    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            transport: Box::new(transport),
            sleeper: Arc::new(TokioSleeper),
            base_url: config.normalized_base_url().to_string(),
            config,
        })
    }

    /// Replace the rate-limit backoff sleeper
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build the target for a method path, token included
    pub fn endpoint(&self, path: &str, query: &Map<String, Value>) -> String {
        build_endpoint(&self.base_url, &self.config.api_token, path, query)
    }

    /// GET `path` with query parameters (`null` or `{}` for none)
    pub async fn get<Q>(&mut self, path: &str, query: &Q) -> Result<Envelope>
    where
        Q: Serialize + Sync + ?Sized,
    {
        let query = to_params(query)?;
        let request = PreparedRequest {
            method: Method::GET,
            url: self.endpoint(path, &query),
            payload: None,
        };
        self.execute(request).await
    }

    /// POST `path` with a form-encoded (or multipart) body
    pub async fn post<B>(&mut self, path: &str, body: &B) -> Result<Envelope>
    where
        B: Serialize + Sync + ?Sized,
    {
        self.send_with_body(Method::POST, path, body).await
    }

    /// PUT `path` with a form-encoded (or multipart) body
    pub async fn put<B>(&mut self, path: &str, body: &B) -> Result<Envelope>
    where
        B: Serialize + Sync + ?Sized,
    {
        self.send_with_body(Method::PUT, path, body).await
    }

    /// DELETE `path`
    pub async fn delete(&mut self, path: &str) -> Result<Envelope> {
        let request = PreparedRequest {
            method: Method::DELETE,
            url: self.endpoint(path, &Map::new()),
            payload: None,
        };
        self.execute(request).await
    }

    async fn send_with_body<B>(&mut self, method: Method, path: &str, body: &B) -> Result<Envelope>
    where
        B: Serialize + Sync + ?Sized,
    {
        let body = to_params(body)?;
        let request = PreparedRequest {
            method,
            url: self.endpoint(path, &Map::new()),
            payload: Some(Payload::encode(&body)),
        };
        self.execute(request).await
    }

    async fn execute(&mut self, request: PreparedRequest) -> Result<Envelope> {
        let span = info_span!(
            "pipedrive_request",
            method = %request.method,
            target = %redact_token(&request.url),
            request_id = %Uuid::new_v4(),
        );

        match self.config.deadline() {
            Some(deadline) => tokio::time::timeout(deadline, self.execute_with_retries(&request))
                .instrument(span)
                .await
                .map_err(|_| PipedriveError::Timeout {
                    duration: deadline.as_secs(),
                })?,
            None => self.execute_with_retries(&request).instrument(span).await,
        }
    }

    /// Send until a non-429 answer or the retry budget runs out
    async fn execute_with_retries(&mut self, request: &PreparedRequest) -> Result<Envelope> {
        let default_backoff = self.config.default_backoff();
        let mut retries_left = self.config.max_rate_limit_retries;
        let mut attempt: u32 = 1;

        loop {
            let multipart = request.payload.as_ref().is_some_and(Payload::is_multipart);
            debug!(attempt, multipart, "sending request");
            let response = self.transport.execute(request).await.inspect_err(|err| {
                debug!(attempt, error = %err, "transport failure");
            })?;
            debug!(attempt, status = response.status, "received response");

            match classify(&response, retries_left, default_backoff) {
                Outcome::Success(envelope) => return Ok(envelope),
                Outcome::Failure(err) => return Err(err),
                Outcome::Retry { backoff } => {
                    warn!(
                        attempt,
                        retries_left,
                        backoff_secs = backoff.as_secs(),
                        "rate limited, backing off"
                    );
                    self.sleeper.sleep(backoff).await;
                    retries_left -= 1;
                    attempt += 1;
                }
            }
        }
    }
}

/// Serialize parameters into a JSON object; `null` means no parameters
fn to_params<T: Serialize + ?Sized>(value: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(PipedriveError::InvalidPayload(format!(
            "parameters must serialize to an object, got {other}"
        ))),
    }
}
