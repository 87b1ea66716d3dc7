use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{HawkularError, Result};

/// Panel time range in the host's string form.
///
/// Both ends accept `now`, `now-<n><unit>` (units `s`, `m`, `h`, `d`, `w`, `y`)
/// or a plain epoch timestamp in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: String,
    pub to: String,
    #[serde(skip)]
    now: Option<DateTime<Utc>>,
}

impl TimeRange {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            now: None,
        }
    }

    /// Pins the reference instant used to resolve relative expressions.
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn from_ms_epoch(&self) -> Result<i64> {
        parse_time(&self.from, self.reference())
    }

    pub fn to_ms_epoch(&self) -> Result<i64> {
        parse_time(&self.to, self.reference())
    }

    fn reference(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }
}

fn parse_time(expr: &str, now: DateTime<Utc>) -> Result<i64> {
    let expr = expr.trim();

    if expr == "now" {
        return Ok(now.timestamp_millis());
    }

    if let Some(offset) = expr.strip_prefix("now-") {
        return parse_offset(offset)
            .and_then(|delta| now.checked_sub_signed(delta))
            .map(|t| t.timestamp_millis())
            .ok_or_else(|| HawkularError::Validation(format!("invalid time range '{}'", expr)));
    }

    expr.parse::<i64>()
        .map_err(|_| HawkularError::Validation(format!("invalid time range '{}'", expr)))
}

fn parse_offset(offset: &str) -> Option<Duration> {
    let split = offset.find(|c: char| !c.is_ascii_digit())?;
    let (amount, unit) = offset.split_at(split);
    let amount: i64 = amount.parse().ok()?;

    match unit {
        "s" => Duration::try_seconds(amount),
        "m" => Duration::try_minutes(amount),
        "h" => Duration::try_hours(amount),
        "d" => Duration::try_days(amount),
        "w" => Duration::try_weeks(amount),
        "y" => Duration::try_days(amount.checked_mul(365)?),
        _ => None,
    }
}
