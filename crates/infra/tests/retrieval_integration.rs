//! End-to-end retrieval against a mock backend
//!
//! Wires the real reqwest executor, configuration-driven retry and breaker
//! settings, and the default catalog through `build_orchestrator`, then
//! drives it against WireMock.

use std::sync::Arc;

use recordfetch_domain::{Config, ErrorCategory, ExitStatus, SubjectIds};
use recordfetch_infra::{build_orchestrator, StaticHeaderSource};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_config(base_url: &str) -> Config {
    let mut config = Config::with_base_url(base_url);
    config.retry.initial_delay_ms = 10;
    config.retry.jitter = 0.0;
    config.timeouts.connect_secs = 2;
    config.timeouts.read_secs = 2;
    config.timeouts.total_secs = 3;
    config
}

fn visit() -> SubjectIds {
    SubjectIds::new().with("PatNum", 12345).unwrap().with("AptNum", 67890).unwrap()
}

async fn mount_catalog(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/procedurelogs"))
        .and(query_param("AptNum", "67890"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"ProcNum": 1}])))
        .mount(server)
        .await;
    for name in ["allergies", "medicationpats", "diseases"] {
        Mock::given(method("GET"))
            .and(path(format!("/{name}")))
            .and(query_param("PatNum", "12345"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/patientnotes/12345"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"PatNum": 12345})))
        .mount(server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/queries/ShortQuery"))
        .and(body_string_contains("PatNum=12345"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"Pulse": 72}])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn golden_path_retrieves_every_catalog_endpoint() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;

    let headers = Arc::new(StaticHeaderSource::odfhir("dev", "cust"));
    let orchestrator = build_orchestrator(&fast_config(&server.uri()), headers).unwrap();

    let result = orchestrator.retrieve(&visit()).await;

    assert_eq!(result.total, 6);
    assert_eq!(result.successful, 6);
    assert_eq!(result.status, ExitStatus::Success);
    assert_eq!(result.successes["patientnotes"], json!({"PatNum": 12345}));
    assert_eq!(result.successes["vital_signs"], json!([{"Pulse": 72}]));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 6);
    for request in &requests {
        assert_eq!(
            request.headers.get("authorization").and_then(|v| v.to_str().ok()),
            Some("ODFHIR dev/cust")
        );
    }
}

#[tokio::test]
async fn partial_failure_is_isolated() {
    let server = MockServer::start().await;
    Mock::given(path("/allergies"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(path("/diseases"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    mount_catalog(&server).await;

    let orchestrator =
        build_orchestrator(&fast_config(&server.uri()), Arc::new(StaticHeaderSource::default()))
            .unwrap();

    let result = orchestrator.retrieve(&visit()).await;

    assert_eq!(result.successful, 4);
    assert_eq!(result.failed, 2);
    assert_eq!(result.status, ExitStatus::Partial);

    let names: Vec<_> = result.failures.iter().map(|f| f.endpoint.as_str()).collect();
    assert_eq!(names, ["allergies", "diseases"]);

    let allergies = result.failure_for("allergies").unwrap();
    assert_eq!(allergies.category, ErrorCategory::ServerError);
    assert_eq!(allergies.http_status, 503);

    let diseases = result.failure_for("diseases").unwrap();
    assert_eq!(diseases.category, ErrorCategory::ClientError);
    assert_eq!(diseases.summary, "Client error (404)");
}

#[tokio::test]
async fn rate_limit_is_retried_after_server_delay() {
    let server = MockServer::start().await;
    Mock::given(path("/medicationpats"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "1"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_catalog(&server).await;

    let orchestrator =
        build_orchestrator(&fast_config(&server.uri()), Arc::new(StaticHeaderSource::default()))
            .unwrap();

    let result = orchestrator.retrieve(&visit()).await;

    assert_eq!(result.status, ExitStatus::Success);
    let calls = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/medicationpats")
        .count();
    assert_eq!(calls, 2);
}

#[tokio::test]
async fn wrong_payload_shape_is_validation_error() {
    let server = MockServer::start().await;
    Mock::given(path("/patientnotes/12345"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    mount_catalog(&server).await;

    let orchestrator =
        build_orchestrator(&fast_config(&server.uri()), Arc::new(StaticHeaderSource::default()))
            .unwrap();

    let result = orchestrator.retrieve(&visit()).await;

    let notes = result.failure_for("patientnotes").unwrap();
    assert_eq!(notes.category, ErrorCategory::ValidationError);
    assert_eq!(notes.http_status, 200);
    assert_eq!(result.successful, 5);
}

#[tokio::test]
async fn unreachable_backend_fails_every_endpoint() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let orchestrator = build_orchestrator(
        &fast_config(&format!("http://{addr}")),
        Arc::new(StaticHeaderSource::default()),
    )
    .unwrap();

    let result = orchestrator.retrieve(&visit()).await;

    assert_eq!(result.failed, 6);
    assert_eq!(result.status, ExitStatus::Failure);
    assert!(result.failures.iter().all(|f| f.category == ErrorCategory::NetworkError));
    assert!(result.failures.iter().all(|f| f.http_status == 0));
}
