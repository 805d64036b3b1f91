use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::SearchFeatures;

// Wire representations. Binary payloads are base64 strings.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingDto {
    pub drawing_id: i64,
    /// Base64 of the original file bytes.
    pub original_drawing: String,
    #[serde(default)]
    pub runtimes: Vec<RuntimeDto>,
    #[serde(default, rename = "searchdata")]
    pub search_data: Option<SearchDataDto>,
    #[serde(default)]
    pub feedbacks: Vec<FeedbackDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeDto {
    pub runtime_id: i64,
    pub drawing_id: i64,
    pub machine: String,
    pub machine_runtime: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchDataDto {
    #[serde(rename = "searchdata_id")]
    pub search_data_id: i64,
    pub drawing_id: i64,
    #[serde(flatten)]
    pub features: SearchFeatures,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryDto {
    /// Assigned by the store; ignored on input.
    #[serde(default, skip_deserializing)]
    pub history_id: Option<i64>,
    /// Base64 of the query file bytes.
    pub query_drawing: String,
    #[serde(default)]
    pub query_path: Option<String>,
    /// Assigned by the server; ignored on input.
    #[serde(default, skip_deserializing)]
    pub timestamp: Option<DateTime<Utc>>,
    /// Read-only; feedback is attached through the feedback endpoints.
    #[serde(default, skip_deserializing)]
    pub feedbacks: Vec<FeedbackDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackDto {
    #[serde(default)]
    pub feedback_id: Option<i64>,
    pub history_id: i64,
    pub drawing_id: i64,
    #[serde(default)]
    pub feedback_desc: Option<String>,
    /// 0 = negative (no match), 1 = neutral (uncertain), 2 = positive (match)
    pub feedback_value: i64,
}
