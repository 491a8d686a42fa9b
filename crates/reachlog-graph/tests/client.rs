//! Integration tests for `InsightsClient` using wiremock HTTP mocks.

use std::convert::Infallible;
use std::sync::Mutex;

use reachlog_core::{
    CalendarDate, Dataset, DatasetStore, DayWindow, InsightsSource, Metric, UpdateOptions,
    UpdateOrchestrator,
};
use reachlog_graph::{GraphError, InsightsClient};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> InsightsClient {
    InsightsClient::with_base_url("test-token", 30, "reachlog-test", base_url)
        .expect("client construction should not fail")
        .with_retry(2, 0)
}

fn window() -> DayWindow {
    DayWindow {
        start: 1_748_736_000,
        end: 1_748_822_399,
    }
}

#[tokio::test]
async fn get_total_values_returns_raw_payload() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "data": [
            {
                "name": "reach",
                "period": "day",
                "title": "Accounts reached",
                "total_value": { "value": 150 },
                "id": "1784/insights/reach/day"
            },
            {
                "name": "likes",
                "period": "day",
                "total_value": { "value": 12 },
                "id": "1784/insights/likes/day"
            }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/1784/insights"))
        .and(query_param("metric", Metric::total_value_query()))
        .and(query_param("period", "day"))
        .and(query_param("metric_type", "total_value"))
        .and(query_param("since", "1748736000"))
        .and(query_param("until", "1748822399"))
        .and(query_param("access_token", "test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let payload = client
        .get_total_values("1784", window())
        .await
        .expect("should return payload");

    assert_eq!(payload, body);

    let date = CalendarDate::from_ymd(2025, 6, 1).unwrap();
    let day = reachlog_core::normalize_day(&payload, date, None);
    assert_eq!(day.record.metric(Metric::Reach), 150);
    assert_eq!(day.record.metric(Metric::Likes), 12);
}

#[tokio::test]
async fn get_follower_count_takes_latest_point() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "data": [{
            "name": "follower_count",
            "period": "day",
            "values": [
                { "value": 3, "end_time": "2025-06-01T07:00:00+0000" },
                { "value": 5, "end_time": "2025-06-02T07:00:00+0000" }
            ],
            "id": "1784/insights/follower_count/day"
        }]
    });

    Mock::given(method("GET"))
        .and(path("/1784/insights"))
        .and(query_param("metric", "follower_count"))
        .and(query_param("period", "day"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let count = client
        .get_follower_count("1784", window())
        .await
        .expect("should parse follower count");

    assert_eq!(count, 5);
}

#[tokio::test]
async fn get_follower_count_without_values_is_missing_metric() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("metric", "follower_count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": [] })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.get_follower_count("1784", window()).await;

    assert!(
        matches!(result, Err(GraphError::MissingMetric { ref metric, .. }) if metric == "follower_count"),
        "expected MissingMetric, got: {result:?}"
    );
}

#[tokio::test]
async fn api_error_envelope_is_surfaced_without_retry() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "error": {
            "message": "Error validating access token: Session has expired",
            "type": "OAuthException",
            "code": 190,
            "error_subcode": 463,
            "fbtrace_id": "AbCdEf"
        }
    });

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.get_total_values("1784", window()).await;

    match result {
        Err(GraphError::Api {
            status,
            code,
            ref message,
            transient,
        }) => {
            assert_eq!(status, 400);
            assert_eq!(code, Some(190));
            assert!(message.contains("Session has expired"));
            assert!(!transient);
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn server_error_is_retried_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let payload = client
        .get_total_values("1784", window())
        .await
        .expect("should succeed after one retry");

    assert_eq!(payload, serde_json::json!({ "data": [] }));
}

#[tokio::test]
async fn persistent_server_error_gives_up() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(3)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.get_total_values("1784", window()).await;

    assert!(
        matches!(result, Err(GraphError::UnexpectedStatus { status: 500, .. })),
        "expected UnexpectedStatus(500), got: {result:?}"
    );
}

#[tokio::test]
async fn non_json_success_body_is_passed_on_as_null() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let payload = client
        .get_total_values("1784", window())
        .await
        .expect("unreadable success body should not fail the request");

    assert_eq!(payload, serde_json::Value::Null);
}

#[tokio::test]
async fn non_json_follower_body_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.get_follower_count("1784", window()).await;

    match result {
        Err(GraphError::Deserialize { ref context, .. }) => {
            assert!(!context.contains("test-token"), "token leaked: {context}");
        }
        other => panic!("expected Deserialize error, got: {other:?}"),
    }
}

#[derive(Default)]
struct MemoryStore {
    saved: Mutex<Option<Dataset>>,
}

impl DatasetStore for MemoryStore {
    type Error = Infallible;

    fn load(&self) -> Result<Option<Dataset>, Infallible> {
        Ok(self.saved.lock().unwrap().clone())
    }

    fn save(&self, dataset: &Dataset) -> Result<(), Infallible> {
        *self.saved.lock().unwrap() = Some(dataset.clone());
        Ok(())
    }
}

#[tokio::test]
async fn unreadable_day_is_merged_as_all_zero_record() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let mut options = UpdateOptions::new("1784");
    options.window_days = 1;
    options.fetch_follower_count = false;
    let orchestrator =
        UpdateOrchestrator::new(test_client(&server.uri()), MemoryStore::default(), options)
            .unwrap();

    let day = CalendarDate::from_ymd(2025, 6, 3).unwrap();
    let report = orchestrator.run_from(day).await.expect("run should succeed");

    assert_eq!(report.merged, vec![day]);
    assert!(report.skipped.is_empty());
    assert_eq!(report.payload_issues, 1);
    let saved = orchestrator.store().load().unwrap().expect("dataset saved");
    assert_eq!(saved.len(), 1);
    assert!(saved.get(day).unwrap().metrics().is_all_zero());
}

#[tokio::test]
async fn insights_source_impl_delegates_to_client() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("metric", "follower_count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{ "name": "follower_count", "values": [{ "value": 42 }] }]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(query_param("metric_type", "total_value"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{ "name": "shares", "total_value": { "value": 2 } }]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let payload = client.fetch_metrics("1784", window()).await.unwrap();
    let followers = client.fetch_follower_count("1784", window()).await.unwrap();

    assert_eq!(payload["data"][0]["name"], "shares");
    assert_eq!(followers, 42);
}
