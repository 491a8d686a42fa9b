//! Back-off retry for Graph requests.
//!
//! Only failures the next attempt could plausibly fix are retried: network
//! timeouts, throttling, server errors and envelopes Graph itself marks as
//! transient. An expired token fails the day at once.

use std::future::Future;
use std::time::Duration;

use crate::error::GraphError;

const MAX_DELAY_MS: u64 = 60_000;

pub(crate) fn is_retriable(err: &GraphError) -> bool {
    match err {
        GraphError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        GraphError::Api {
            status, transient, ..
        } => *transient || is_transient_status(*status),
        GraphError::UnexpectedStatus { status, .. } => is_transient_status(*status),
        GraphError::Deserialize { .. }
        | GraphError::MissingMetric { .. }
        | GraphError::Config(_)
        | GraphError::InvalidBaseUrl { .. } => false,
    }
}

fn is_transient_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

/// Nominal delay before retry number `retry` (1-based): `base * 2^(retry-1)`,
/// capped at one minute.
fn nominal_delay_ms(backoff_base_ms: u64, retry: u32) -> u64 {
    let doubling = retry.saturating_sub(1).min(10);
    backoff_base_ms
        .saturating_mul(1u64 << doubling)
        .min(MAX_DELAY_MS)
}

/// Spreads `nominal_ms` by up to 25% either way so that parallel runs do not
/// retry in lockstep.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn jittered(nominal_ms: u64) -> u64 {
    let factor = 0.75 + rand::random::<f64>() * 0.5;
    (nominal_ms as f64 * factor) as u64
}

/// Runs `request`, retrying transient failures up to `max_retries` times.
///
/// With the default base of one second the waits are roughly 1s, 2s, 4s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut request: F,
) -> Result<T, GraphError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GraphError>>,
{
    let mut retry = 0u32;
    loop {
        let err = match request().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if retry >= max_retries || !is_retriable(&err) {
            return Err(err);
        }
        retry += 1;

        let delay_ms = jittered(nominal_delay_ms(backoff_base_ms, retry));
        tracing::warn!(
            retry,
            max_retries,
            delay_ms,
            error = %err,
            "transient Graph API failure, backing off"
        );
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}
