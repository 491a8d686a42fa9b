//! HTTP client for the Graph API Instagram insights edge.
//!
//! Wraps `reqwest` with token handling, Graph error-envelope decoding and
//! retry on transient failures. The access token travels as a query
//! parameter, so request URLs are never used as error context.

use std::time::Duration;

use reachlog_core::{AppConfig, DayWindow, InsightsSource, Metric};
use reqwest::{Client, Url};
use serde_json::Value;

use crate::error::GraphError;
use crate::retry::retry_with_backoff;
use crate::types::{ErrorEnvelope, InsightsResponse};

const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_BACKOFF_BASE_MS: u64 = 1_000;

/// Client for the `/{account_id}/insights` endpoint.
///
/// Use [`InsightsClient::from_config`] for production or
/// [`InsightsClient::with_base_url`] to point at a mock server in tests.
pub struct InsightsClient {
    client: Client,
    access_token: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl InsightsClient {
    /// Creates a client with a custom base URL and user agent.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`GraphError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        access_token: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, GraphError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so the account id is appended as a new
        // path segment instead of replacing the version segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| GraphError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(GraphError::InvalidBaseUrl {
                base_url: base_url.to_owned(),
                reason: "URL cannot carry path segments".to_owned(),
            });
        }

        Ok(Self {
            client,
            access_token: access_token.to_owned(),
            base_url: parsed,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
        })
    }

    /// Builds a client from the application config.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Config`] if no access token is configured,
    /// otherwise see [`InsightsClient::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, GraphError> {
        Ok(Self::with_base_url(
            config.require_access_token()?,
            config.request_timeout_secs,
            &config.user_agent,
            &config.graph_base_url,
        )?
        .with_retry(config.max_retries, config.retry_backoff_base_ms))
    }

    /// Overrides the retry policy for transient failures.
    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Fetches the `total_value` metrics for one day window.
    ///
    /// The body is returned as raw JSON; interpreting individual entries is
    /// left to the normalizer. A success body that is not JSON comes back as
    /// `Value::Null`.
    ///
    /// # Errors
    ///
    /// - [`GraphError::Api`] if the Graph API returns an error envelope.
    /// - [`GraphError::Http`] on network failure.
    /// - [`GraphError::UnexpectedStatus`] on a non-2xx status without an envelope.
    pub async fn get_total_values(
        &self,
        account_id: &str,
        window: DayWindow,
    ) -> Result<Value, GraphError> {
        let metrics = Metric::total_value_query();
        let url = self.insights_url(
            account_id,
            &[
                ("metric", metrics.as_str()),
                ("period", "day"),
                ("metric_type", "total_value"),
            ],
            window,
        )?;
        let context = format!("insights(account={account_id}, since={})", window.start);
        self.request_json(&url, &context).await
    }

    /// Fetches the follower count reported for one day window.
    ///
    /// When the series carries several points the most recent one is used.
    ///
    /// # Errors
    ///
    /// As [`InsightsClient::get_total_values`], plus
    /// [`GraphError::MissingMetric`] if the response holds no
    /// `follower_count` value and [`GraphError::Deserialize`] if the series
    /// does not have the expected shape.
    pub async fn get_follower_count(
        &self,
        account_id: &str,
        window: DayWindow,
    ) -> Result<u64, GraphError> {
        let metric = Metric::FollowerCount.name();
        let url = self.insights_url(account_id, &[("metric", metric), ("period", "day")], window)?;
        let context = format!("follower_count(account={account_id}, since={})", window.start);
        let body = self.request_json(&url, &context).await?;

        let response: InsightsResponse =
            serde_json::from_value(body).map_err(|e| GraphError::Deserialize {
                context: context.clone(),
                source: e,
            })?;

        response
            .data
            .into_iter()
            .filter(|series| series.name == metric)
            .flat_map(|series| series.values)
            .last()
            .map(|point| point.value)
            .ok_or(GraphError::MissingMetric {
                metric: metric.to_owned(),
                context,
            })
    }

    /// Builds `{base}/{account_id}/insights` with the window and token appended.
    fn insights_url(
        &self,
        account_id: &str,
        params: &[(&str, &str)],
        window: DayWindow,
    ) -> Result<Url, GraphError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| GraphError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: "URL cannot carry path segments".to_owned(),
            })?
            .pop_if_empty()
            .push(account_id)
            .push("insights");
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("since", &window.start.to_string());
            pairs.append_pair("until", &window.end.to_string());
            pairs.append_pair("access_token", &self.access_token);
        }
        Ok(url)
    }

    /// GETs `url` with retry and returns the parsed JSON body.
    async fn request_json(&self, url: &Url, context: &str) -> Result<Value, GraphError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.request_once(url, context)
        })
        .await
    }

    async fn request_once(&self, url: &Url, context: &str) -> Result<Value, GraphError> {
        // reqwest errors carry the URL, and the URL carries the token.
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let status = response.status();
        let body = response.text().await.map_err(reqwest::Error::without_url)?;

        if !status.is_success() {
            return Err(match serde_json::from_str::<ErrorEnvelope>(&body) {
                Ok(envelope) => api_error(status.as_u16(), envelope),
                Err(_) => GraphError::UnexpectedStatus {
                    status: status.as_u16(),
                    context: context.to_owned(),
                },
            });
        }

        // A success status with an unreadable body is passed on as `null`;
        // the normalizer turns that into an all-zero day.
        let value = match serde_json::from_str::<Value>(&body) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(context, error = %e, "success response is not JSON");
                return Ok(Value::Null);
            }
        };
        Self::check_api_error(status.as_u16(), &value)?;
        Ok(value)
    }

    /// Some Graph failures arrive with a 200 status; surface those too.
    fn check_api_error(status: u16, body: &Value) -> Result<(), GraphError> {
        if body.get("error").is_some() {
            if let Ok(envelope) = serde_json::from_value::<ErrorEnvelope>(body.clone()) {
                return Err(api_error(status, envelope));
            }
        }
        Ok(())
    }
}

fn api_error(status: u16, envelope: ErrorEnvelope) -> GraphError {
    let body = envelope.error;
    let message = match body.kind {
        Some(kind) => format!("{kind}: {}", body.message),
        None => body.message,
    };
    GraphError::Api {
        status,
        code: body.code,
        message,
        transient: body.is_transient,
    }
}

impl InsightsSource for InsightsClient {
    type Error = GraphError;

    async fn fetch_metrics(
        &self,
        account_id: &str,
        window: DayWindow,
    ) -> Result<Value, GraphError> {
        self.get_total_values(account_id, window).await
    }

    async fn fetch_follower_count(
        &self,
        account_id: &str,
        window: DayWindow,
    ) -> Result<u64, GraphError> {
        self.get_follower_count(account_id, window).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> InsightsClient {
        InsightsClient::with_base_url("test-token", 30, "reachlog-test", base_url)
            .expect("client construction should not fail")
    }

    fn window() -> DayWindow {
        DayWindow {
            start: 1_748_736_000,
            end: 1_748_822_399,
        }
    }

    fn query(url: &Url, key: &str) -> Option<String> {
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    #[test]
    fn insights_url_appends_account_and_edge() {
        let client = test_client("https://graph.facebook.com/v22.0");
        let url = client.insights_url("1784", &[("period", "day")], window()).unwrap();
        assert_eq!(url.path(), "/v22.0/1784/insights");
        assert_eq!(query(&url, "period").as_deref(), Some("day"));
        assert_eq!(query(&url, "since").as_deref(), Some("1748736000"));
        assert_eq!(query(&url, "until").as_deref(), Some("1748822399"));
        assert_eq!(query(&url, "access_token").as_deref(), Some("test-token"));
    }

    #[test]
    fn insights_url_tolerates_trailing_slash() {
        let client = test_client("https://graph.facebook.com/v22.0/");
        let url = client.insights_url("1784", &[], window()).unwrap();
        assert_eq!(url.path(), "/v22.0/1784/insights");
    }

    #[test]
    fn insights_url_encodes_metric_list() {
        let client = test_client("https://graph.facebook.com/v22.0");
        let metrics = Metric::total_value_query();
        let url = client
            .insights_url("1784", &[("metric", metrics.as_str())], window())
            .unwrap();
        assert!(url.as_str().contains("metric=reach%2Ctotal_interactions"));
        assert_eq!(query(&url, "metric"), Some(metrics));
    }

    fn config(access_token: Option<&str>) -> AppConfig {
        AppConfig {
            access_token: access_token.map(str::to_owned),
            account_id: None,
            dataset_path: "insights.csv".into(),
            window_days: 30,
            fetch_follower_count: true,
            timezone: None,
            graph_base_url: "https://graph.facebook.com/v22.0/".to_owned(),
            request_timeout_secs: 30,
            user_agent: "reachlog-test".to_owned(),
            max_retries: 1,
            retry_backoff_base_ms: 0,
            log_level: "info".to_owned(),
        }
    }

    #[test]
    fn from_config_requires_access_token() {
        let result = InsightsClient::from_config(&config(None));
        assert!(
            matches!(
                result,
                Err(GraphError::Config(reachlog_core::ConfigError::MissingEnvVar(ref v)))
                    if v == "REACHLOG_ACCESS_TOKEN"
            ),
            "expected missing token error"
        );
    }

    #[test]
    fn from_config_applies_retry_policy() {
        let client = InsightsClient::from_config(&config(Some("abc"))).unwrap();
        assert_eq!(client.max_retries, 1);
        assert_eq!(client.backoff_base_ms, 0);
        let url = client.insights_url("1784", &[], window()).unwrap();
        assert_eq!(query(&url, "access_token").as_deref(), Some("abc"));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = InsightsClient::with_base_url("t", 30, "ua", "not a url");
        assert!(matches!(result, Err(GraphError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn check_api_error_detects_envelope_on_success_status() {
        let body = serde_json::json!({
            "error": { "message": "Unsupported get request", "type": "GraphMethodException", "code": 100 }
        });
        let err = InsightsClient::check_api_error(200, &body).unwrap_err();
        assert!(matches!(
            err,
            GraphError::Api { code: Some(100), transient: false, .. }
        ));
        assert!(err.to_string().contains("GraphMethodException"));
    }

    #[test]
    fn check_api_error_passes_data_payload() {
        let body = serde_json::json!({ "data": [] });
        assert!(InsightsClient::check_api_error(200, &body).is_ok());
    }
}
