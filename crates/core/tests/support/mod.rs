//! Shared test helpers for `recordfetch-core` integration tests.
//!
//! A scripted executor stands in for the HTTP layer so orchestration tests can
//! drive exact response sequences under paused tokio time.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use recordfetch_core::{AttemptOutcome, AuditSink, RequestExecutor};
use recordfetch_domain::{
    AuditEvent, EndpointSpec, HttpMethod, IdPlacement, PayloadShape, ResolvedRequest,
};
use serde_json::json;
use tokio::time::Instant;

pub const BASE_URL: &str = "https://backend.example.com";

/// One scripted response
#[derive(Debug, Clone)]
pub enum Step {
    Respond(AttemptOutcome),
    /// Respond after waiting (simulated latency)
    Delayed(Duration, AttemptOutcome),
    Panic,
}

impl Step {
    pub fn ok(payload: serde_json::Value) -> Self {
        Step::Respond(AttemptOutcome::Success { status: 200, payload })
    }

    pub fn status(status: u16) -> Self {
        let body = String::new();
        Step::Respond(match status {
            429 => AttemptOutcome::RateLimited { retry_after: None },
            500..=599 => AttemptOutcome::ServerError { status, body },
            _ => AttemptOutcome::ClientError { status, body },
        })
    }

    pub fn retry_after(secs: u64) -> Self {
        Step::Respond(AttemptOutcome::RateLimited { retry_after: Some(Duration::from_secs(secs)) })
    }
}

#[derive(Debug, Default)]
struct Script {
    steps: VecDeque<Step>,
    last: Option<Step>,
}

/// Executor that replays scripted steps per URL path. The final step of a
/// script repeats once the script runs out; unscripted paths answer `200 []`.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    scripts: Mutex<HashMap<String, Script>>,
    calls: Mutex<HashMap<String, Vec<Instant>>>,
    requests: Mutex<Vec<ResolvedRequest>>,
}

impl ScriptedExecutor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script(&self, path: &str, steps: Vec<Step>) {
        self.scripts.lock().insert(path.to_string(), Script { steps: steps.into(), last: None });
    }

    pub fn calls(&self, path: &str) -> usize {
        self.calls.lock().get(path).map_or(0, Vec::len)
    }

    /// Gaps between consecutive calls to `path`
    pub fn gaps(&self, path: &str) -> Vec<Duration> {
        let calls = self.calls.lock();
        let times = calls.get(path).cloned().unwrap_or_default();
        times.windows(2).map(|pair| pair[1] - pair[0]).collect()
    }

    pub fn requests(&self) -> Vec<ResolvedRequest> {
        self.requests.lock().clone()
    }

    fn next_step(&self, path: &str) -> Step {
        let mut scripts = self.scripts.lock();
        let script = scripts.entry(path.to_string()).or_default();
        match script.steps.pop_front() {
            Some(step) => {
                script.last = Some(step.clone());
                step
            }
            None => script.last.clone().unwrap_or_else(|| Step::ok(json!([]))),
        }
    }
}

#[async_trait]
impl RequestExecutor for ScriptedExecutor {
    async fn execute(&self, request: &ResolvedRequest) -> AttemptOutcome {
        let path = request.url.path().to_string();
        self.calls.lock().entry(path.clone()).or_default().push(Instant::now());
        self.requests.lock().push(request.clone());

        match self.next_step(&path) {
            Step::Respond(outcome) => outcome,
            Step::Delayed(delay, outcome) => {
                tokio::time::sleep(delay).await;
                outcome
            }
            Step::Panic => panic!("scripted executor panic for {path}"),
        }
    }
}

/// Audit sink that keeps every event
#[derive(Debug, Default)]
pub struct RecordingAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl RecordingAuditSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl AuditSink for RecordingAuditSink {
    async fn record(&self, event: AuditEvent) {
        self.events.lock().push(event);
    }
}

/// Six array endpoints named `e1`..`e6`, each at `/<name>?PatNum=<id>`
pub fn six_endpoints() -> Vec<EndpointSpec> {
    (1..=6).map(|i| endpoint(&format!("e{i}"))).collect()
}

pub fn endpoint(name: &str) -> EndpointSpec {
    EndpointSpec::new(
        name,
        HttpMethod::Get,
        format!("/{name}"),
        "PatNum",
        IdPlacement::Query { param: "PatNum".into() },
    )
    .with_shape(PayloadShape::Array)
}
