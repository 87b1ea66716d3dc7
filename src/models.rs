use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use crate::time_range::TimeRange;

/// A single panel query as handed over by the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    pub ref_id: String,
    pub model: serde_json::Value,
}

impl Query {
    pub fn new(ref_id: impl Into<String>, model: serde_json::Value) -> Self {
        Self {
            ref_id: ref_id.into(),
            model,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryContext {
    pub time_range: TimeRange,
}

impl QueryContext {
    pub fn new(time_range: TimeRange) -> Self {
        Self { time_range }
    }
}

/// `[value, timestamp]` pair, serialized as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimePoint(pub Option<f64>, pub i64);

impl TimePoint {
    pub fn new(value: Option<f64>, timestamp: i64) -> Self {
        TimePoint(value, timestamp)
    }

    pub fn value(&self) -> Option<f64> {
        self.0
    }

    pub fn timestamp(&self) -> i64 {
        self.1
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub name: String,
    pub points: Vec<TimePoint>,
}

impl TimeSeries {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub ref_id: String,
    pub series: Vec<TimeSeries>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

impl QueryResult {
    pub fn new(ref_id: impl Into<String>) -> Self {
        Self {
            ref_id: ref_id.into(),
            ..Default::default()
        }
    }

    pub fn series_by_name(&self, name: &str) -> Option<&TimeSeries> {
        self.series.iter().find(|s| s.name == name)
    }
}

/// Results of one batch, keyed by query reference id.
pub type BatchResult = HashMap<String, QueryResult>;
