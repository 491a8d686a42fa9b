//! Graph API response types.
//!
//! Only the shapes the client inspects itself are modelled here. The
//! `total_value` insights payload is handed to the normalizer as raw JSON so
//! that one bad entry cannot fail the whole day.

use serde::Deserialize;

/// `{"data": [...]}` envelope of the insights edge.
#[derive(Debug, Deserialize)]
pub struct InsightsResponse {
    #[serde(default)]
    pub data: Vec<InsightSeries>,
}

/// One metric in the time-series (`values`) shape.
#[derive(Debug, Deserialize)]
pub struct InsightSeries {
    pub name: String,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub values: Vec<InsightValue>,
}

#[derive(Debug, Deserialize)]
pub struct InsightValue {
    pub value: u64,
    #[serde(default)]
    pub end_time: Option<String>,
}

/// `{"error": {...}}` envelope returned on failure.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub is_transient: bool,
}
