use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{HawkularError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    Gauge,
    Counter,
    Availability,
}

impl MetricType {
    fn parse(raw: &str) -> Result<Self> {
        match raw {
            "gauge" => Ok(MetricType::Gauge),
            "counter" => Ok(MetricType::Counter),
            "availability" => Ok(MetricType::Availability),
            other => Err(HawkularError::Validation(format!(
                "unsupported metric type '{}'",
                other
            ))),
        }
    }

    /// Collection segment of the REST path, e.g. `gauges`.
    pub fn collection(&self) -> &'static str {
        match self {
            MetricType::Gauge => "gauges",
            MetricType::Counter => "counters",
            MetricType::Availability => "availability",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

/// How a query picks its metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Ids(String),
    Tags(Vec<Tag>),
}

/// Validated form of a panel query model.
#[derive(Debug, Clone, PartialEq)]
pub struct HawkularQuery {
    pub ref_id: String,
    pub selection: Selection,
    pub metric_type: MetricType,
    pub rate: bool,
    pub time_agg_fn: Option<String>,
    pub series_agg_fn: Option<String>,
    pub raw_query: Option<String>,
}

impl HawkularQuery {
    pub fn from_model(ref_id: &str, model: &Value) -> Result<Self> {
        let selection = match optional_str(model, "queryBy")?.unwrap_or("ids") {
            "ids" => {
                let target = optional_str(model, "target")?
                    .filter(|t| !t.is_empty())
                    .ok_or_else(|| invalid(ref_id, "'target' is required when querying by ids"))?;
                Selection::Ids(target.to_string())
            }
            "tags" => Selection::Tags(parse_tags(ref_id, model)?),
            other => {
                return Err(invalid(
                    ref_id,
                    &format!("'queryBy' must be 'ids' or 'tags', got '{}'", other),
                ))
            }
        };

        let metric_type = MetricType::parse(optional_str(model, "type")?.unwrap_or("gauge"))?;

        let rate = match model.get("rate") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(_) => return Err(invalid(ref_id, "'rate' must be a boolean")),
        };

        Ok(Self {
            ref_id: ref_id.to_string(),
            selection,
            metric_type,
            rate,
            time_agg_fn: optional_str(model, "timeAggFn")?.map(str::to_string),
            series_agg_fn: optional_str(model, "seriesAggFn")?.map(str::to_string),
            raw_query: optional_str(model, "rawQuery")?.map(str::to_string),
        })
    }

    /// Path below the data source URL this query posts to.
    pub fn endpoint(&self) -> String {
        if self.rate && self.metric_type == MetricType::Counter {
            "counters/rate/query".to_string()
        } else {
            format!("{}/raw/query", self.metric_type.collection())
        }
    }

    pub fn to_request(&self, start: i64, end: i64) -> RawQueryRequest {
        let (ids, tags) = match &self.selection {
            Selection::Ids(target) => (Some(vec![target.clone()]), None),
            Selection::Tags(tags) => (None, Some(tag_filter(tags))),
        };

        RawQueryRequest {
            start,
            end,
            order: SortOrder::Asc,
            ids,
            tags,
        }
    }
}

fn parse_tags(ref_id: &str, model: &Value) -> Result<Vec<Tag>> {
    let raw = model
        .get("tags")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid(ref_id, "'tags' must be an array when querying by tags"))?;

    if raw.is_empty() {
        return Err(invalid(ref_id, "at least one tag is required when querying by tags"));
    }

    raw.iter()
        .map(|t| {
            serde_json::from_value::<Tag>(t.clone())
                .map_err(|e| invalid(ref_id, &format!("malformed tag {}: {}", t, e)))
        })
        .collect()
}

fn optional_str<'a>(model: &'a Value, key: &str) -> Result<Option<&'a str>> {
    match model.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(HawkularError::Validation(format!(
            "'{}' must be a string, got {}",
            key, other
        ))),
    }
}

fn invalid(ref_id: &str, msg: &str) -> HawkularError {
    HawkularError::Validation(format!("query {}: {}", ref_id, msg))
}

/// Joins tags into the `name:value,name:value` filter the store expects.
pub fn tag_filter(tags: &[Tag]) -> String {
    tags.iter()
        .map(|t| format!("{}:{}", t.name, t.value))
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SortOrder {
    #[serde(rename = "ASC")]
    Asc,
}

/// Body of a `raw/query` POST. Exactly one of `ids` and `tags` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawQueryRequest {
    pub start: i64,
    pub end: i64,
    pub order: SortOrder,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}
