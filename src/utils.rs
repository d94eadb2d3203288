/// Utility functions for timestamp handling and value formatting
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::models::Metric;

/// Format a timestamp for human-readable logging
///
/// Converts an OffsetDateTime to DD.MM.YYYY - HH:MM:SS format
/// Falls back to default string representation if formatting fails.
pub fn format_datetime(dt: &OffsetDateTime) -> String {
    let format = format_description!("[day].[month].[year] - [hour]:[minute]:[second]");
    dt.format(&format).unwrap_or_else(|_| dt.to_string())
}

/// Format only the time of day (HH:MM:SS), used for chart labels
pub fn format_time_of_day(dt: &OffsetDateTime) -> String {
    let format = format_description!("[hour]:[minute]:[second]");
    dt.format(&format).unwrap_or_else(|_| dt.to_string())
}

/// Parse a timestamp as sent by the API
///
/// Accepts RFC 3339, RFC 2822 and the HTTP-date form
/// (`Tue, 14 Oct 2025 10:00:00 GMT`) that the backend serializer emits.
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(dt);
    }
    if let Ok(dt) = OffsetDateTime::parse(raw, &Rfc2822) {
        return Some(dt);
    }
    let http_date = format_description!(
        "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
    );
    PrimitiveDateTime::parse(raw, &http_date)
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}

/// Chart label for a reading timestamp; empty when missing or unparseable
pub fn time_label(raw: Option<&str>) -> String {
    raw.and_then(parse_timestamp)
        .map(|dt| format_time_of_day(&dt))
        .unwrap_or_default()
}

/// "Last seen" text for a device card
pub fn format_last_seen(raw: Option<&str>) -> String {
    match raw {
        None => "never".to_string(),
        Some(value) => parse_timestamp(value)
            .map(|dt| format_time_of_day(&dt))
            .unwrap_or_else(|| value.to_string()),
    }
}

/// Display a metric value with the metric's precision, `--` for gaps
pub fn format_metric_value(metric: Metric, value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.*}", metric.decimals(), v),
        None => "--".to_string(),
    }
}
