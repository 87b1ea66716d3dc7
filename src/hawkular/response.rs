use serde::Deserialize;

use crate::models::{TimePoint, TimeSeries};
use crate::Result;

/// One series as returned by a `raw/query` or `rate/query` call.
#[derive(Debug, Clone, Deserialize)]
pub struct Series {
    pub id: String,
    #[serde(default)]
    pub data: Vec<DataPoint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPoint {
    pub timestamp: i64,
    #[serde(default)]
    pub value: PointValue,
}

/// Gauges and counters carry numbers, availability carries `up`/`down`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(untagged)]
pub enum PointValue {
    Number(f64),
    Text(String),
    #[default]
    Missing,
}

impl PointValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PointValue::Number(n) => Some(*n),
            PointValue::Text(s) => match s.as_str() {
                "up" => Some(1.0),
                "down" => Some(0.0),
                _ => None,
            },
            PointValue::Missing => None,
        }
    }
}

/// Decodes a response body into result series.
///
/// An empty body (the store answers `204 No Content` when nothing matched)
/// decodes to no series.
pub fn parse_series(body: &[u8]) -> Result<Vec<TimeSeries>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let data: Vec<Series> = serde_json::from_slice(body)?;

    Ok(data.into_iter().map(into_time_series).collect())
}

fn into_time_series(series: Series) -> TimeSeries {
    let mut out = TimeSeries::new(series.id);
    out.points = series
        .data
        .iter()
        .map(|p| TimePoint::new(p.value.as_f64(), p.timestamp))
        .collect();
    out
}
