use std::time::Duration;

use async_trait::async_trait;
use recordfetch_core::{AttemptOutcome, RequestExecutor, TimeoutBoundary};
use recordfetch_domain::constants::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT, DEFAULT_TOTAL_TIMEOUT,
};
use recordfetch_domain::{HttpMethod, RecordFetchError, ResolvedRequest, TimeoutConfig};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, StatusCode};

use crate::errors::InfraError;

/// Single-attempt HTTP executor backed by reqwest.
///
/// Makes exactly one call per invocation and reports every transport result
/// as an [`AttemptOutcome`]. Retry and circuit decisions belong to the
/// orchestrator.
#[derive(Clone)]
pub struct HttpRequestExecutor {
    client: ReqwestClient,
    total_timeout: Duration,
}

impl HttpRequestExecutor {
    /// Start building a new executor.
    pub fn builder() -> HttpRequestExecutorBuilder {
        HttpRequestExecutorBuilder::default()
    }

    /// Convenience constructor with default timeouts (10s connect, 30s read,
    /// 45s total).
    pub fn new() -> Result<Self, RecordFetchError> {
        Self::builder().build()
    }

    /// Executor using the configured timeouts.
    pub fn from_config(timeouts: &TimeoutConfig) -> Result<Self, RecordFetchError> {
        Self::builder()
            .connect_timeout(timeouts.connect())
            .read_timeout(timeouts.read())
            .total_timeout(timeouts.total())
            .build()
    }

    fn prepare(&self, request: &ResolvedRequest) -> RequestBuilder {
        let mut builder = self.client.request(method(request.method), request.url.clone());

        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }

        if let Some(body) = &request.body {
            builder = builder.header(CONTENT_TYPE, "application/json").body(body.clone());
        }

        builder
    }

    async fn send(&self, builder: RequestBuilder) -> AttemptOutcome {
        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => return transport_failure(err),
        };

        let status = response.status();
        let retry_after = response.headers().get(RETRY_AFTER).and_then(parse_retry_after);

        match response.bytes().await {
            Ok(body) => classify(status, retry_after, &body),
            Err(err) => transport_failure(err),
        }
    }
}

#[async_trait]
impl RequestExecutor for HttpRequestExecutor {
    async fn execute(&self, request: &ResolvedRequest) -> AttemptOutcome {
        let builder = self.prepare(request);

        match tokio::time::timeout(self.total_timeout, self.send(builder)).await {
            Ok(outcome) => outcome,
            Err(_) => AttemptOutcome::Timeout { boundary: TimeoutBoundary::Total },
        }
    }
}

/// Builder for [`HttpRequestExecutor`].
#[derive(Debug)]
pub struct HttpRequestExecutorBuilder {
    connect_timeout: Duration,
    read_timeout: Duration,
    total_timeout: Duration,
    user_agent: Option<String>,
}

impl Default for HttpRequestExecutorBuilder {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            total_timeout: DEFAULT_TOTAL_TIMEOUT,
            user_agent: None,
        }
    }
}

impl HttpRequestExecutorBuilder {
    /// Bound on establishing the connection
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Maximum idle time between reads of the response.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Upper bound for one attempt, from sending to the last body byte.
    pub fn total_timeout(mut self, timeout: Duration) -> Self {
        self.total_timeout = timeout;
        self
    }

    /// Override the `User-Agent` header
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the executor and its underlying client
    pub fn build(self) -> Result<HttpRequestExecutor, RecordFetchError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = ReqwestClient::builder()
            .connect_timeout(self.connect_timeout)
            .read_timeout(self.read_timeout)
            .default_headers(default_headers)
            .no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder.build().map_err(|err| {
            let infra: InfraError = err.into();
            RecordFetchError::from(infra)
        })?;

        Ok(HttpRequestExecutor { client, total_timeout: self.total_timeout })
    }
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
    }
}

/// Map a received response onto the attempt taxonomy.
fn classify(status: StatusCode, retry_after: Option<Duration>, body: &[u8]) -> AttemptOutcome {
    let code = status.as_u16();

    if status.is_success() {
        return match decode_json(body) {
            Ok(payload) => AttemptOutcome::Success { status: code, payload },
            Err(reason) => AttemptOutcome::Invalid { status: code, reason },
        };
    }

    let body = String::from_utf8_lossy(body).into_owned();
    match code {
        429 => AttemptOutcome::RateLimited { retry_after },
        500..=599 => AttemptOutcome::ServerError { status: code, body },
        // 4xx, and anything else not followed (e.g. 3xx)
        _ => AttemptOutcome::ClientError { status: code, body },
    }
}

fn decode_json(body: &[u8]) -> Result<serde_json::Value, String> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::Value::Null);
    }
    serde_json::from_slice(body).map_err(|_| "response body is not valid JSON".to_string())
}

/// `Retry-After` as integer seconds; HTTP-date and garbage are ignored.
fn parse_retry_after(value: &HeaderValue) -> Option<Duration> {
    value.to_str().ok()?.trim().parse::<u64>().ok().map(Duration::from_secs)
}

fn transport_failure(err: reqwest::Error) -> AttemptOutcome {
    if err.is_timeout() {
        let boundary =
            if err.is_connect() { TimeoutBoundary::Connect } else { TimeoutBoundary::Read };
        return AttemptOutcome::Timeout { boundary };
    }

    if err.is_builder() {
        return AttemptOutcome::Invalid {
            status: 0,
            reason: "request could not be built".to_string(),
        };
    }

    // Causes must not carry URLs: they embed subject identifiers
    let cause = if err.is_connect() {
        "connection failed".to_string()
    } else if err.is_body() || err.is_decode() {
        "response body could not be read".to_string()
    } else if err.is_request() {
        "request could not be sent".to_string()
    } else {
        err.without_url().to_string()
    };
    AttemptOutcome::NetworkError { cause }
}
