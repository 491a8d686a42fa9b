//! Normalization of raw insights responses into [`DailyRecord`]s.
//!
//! The normalizer is total: whatever the payload looks like, it produces one
//! record with every metric present. Anything it had to ignore is reported as
//! a [`PayloadIssue`] next to the record so callers can log it, but it never
//! changes the outcome.

use std::fmt;

use serde_json::Value;

use crate::date::CalendarDate;
use crate::metrics::{Metric, MetricSet};
use crate::record::DailyRecord;

/// Something in a payload that was skipped during normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadIssue {
    /// The payload is not an object carrying a `data` array.
    MalformedEnvelope { reason: String },
    /// A metric name outside the fixed schema.
    UnknownMetric { name: String },
    /// An entry without a usable name or non-negative integer total.
    MalformedEntry {
        index: usize,
        name: Option<String>,
        reason: String,
    },
}

impl fmt::Display for PayloadIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedEnvelope { reason } => write!(f, "malformed payload: {reason}"),
            Self::UnknownMetric { name } => write!(f, "unrecognized metric '{name}'"),
            Self::MalformedEntry {
                index,
                name: Some(name),
                reason,
            } => write!(f, "entry {index} ('{name}'): {reason}"),
            Self::MalformedEntry {
                index,
                name: None,
                reason,
            } => write!(f, "entry {index}: {reason}"),
        }
    }
}

impl PayloadIssue {
    /// `true` for issues that indicate a response shape we do not understand,
    /// as opposed to a well-formed metric we simply do not track.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        !matches!(self, Self::UnknownMetric { .. })
    }
}

/// The record for one day plus everything skipped while building it.
#[derive(Debug, Clone)]
pub struct NormalizedDay {
    pub record: DailyRecord,
    pub issues: Vec<PayloadIssue>,
}

/// Builds the [`DailyRecord`] for `date` from a raw insights payload.
///
/// Expected shape: `{"data": [{"name": "reach", "total_value": {"value": 12}}, ...]}`.
/// Every metric starts at zero; recognized entries overwrite it, with a later
/// entry of the same name winning. A supplied `follower_count` is applied
/// last and takes precedence over anything in the payload.
#[must_use]
pub fn normalize_day(
    payload: &Value,
    date: CalendarDate,
    follower_count: Option<u64>,
) -> NormalizedDay {
    let mut metrics = MetricSet::zeroed();
    let mut issues = Vec::new();

    for (index, entry) in entries(payload, &mut issues).iter().enumerate() {
        match parse_entry(index, entry) {
            Ok((metric, value)) => metrics.set(metric, value),
            Err(issue) => issues.push(issue),
        }
    }

    if let Some(count) = follower_count {
        metrics.set(Metric::FollowerCount, count);
    }

    NormalizedDay {
        record: DailyRecord::new(date, metrics),
        issues,
    }
}

fn entries<'a>(payload: &'a Value, issues: &mut Vec<PayloadIssue>) -> &'a [Value] {
    let reason = match payload {
        Value::Object(map) => match map.get("data") {
            Some(Value::Array(items)) => return items,
            Some(other) => format!("`data` is {}, expected an array", kind(other)),
            None => "missing `data` field".to_string(),
        },
        other => format!("payload is {}, expected an object", kind(other)),
    };
    issues.push(PayloadIssue::MalformedEnvelope { reason });
    &[]
}

fn parse_entry(index: usize, entry: &Value) -> Result<(Metric, u64), PayloadIssue> {
    let Some(name) = entry.get("name").and_then(Value::as_str) else {
        return Err(PayloadIssue::MalformedEntry {
            index,
            name: None,
            reason: "missing metric name".to_string(),
        });
    };
    let Some(metric) = Metric::from_name(name) else {
        return Err(PayloadIssue::UnknownMetric {
            name: name.to_string(),
        });
    };
    let malformed = |reason: &str| PayloadIssue::MalformedEntry {
        index,
        name: Some(name.to_string()),
        reason: reason.to_string(),
    };

    let raw = entry
        .get("total_value")
        .and_then(|t| t.get("value"))
        .ok_or_else(|| malformed("missing total_value.value"))?;
    let value = as_count(raw).ok_or_else(|| malformed("value is not a non-negative integer"))?;
    Ok((metric, value))
}

/// Accepts JSON integers and integral floats (`12.0`) that fit in a `u64`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::float_cmp
)]
fn as_count(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u64::MAX as f64)
            .map(|f| f as u64)
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
