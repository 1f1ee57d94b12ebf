//! Record normalizer.
//!
//! Turns raw SDK payloads (CloudWatch `FilterLogEvents` / `GetLogEvents`
//! events and `GetMetricStatistics`-style samples) into the pipeline's
//! uniform records. Individual events that fail a structural check are
//! counted in `skipped`; only a payload that is not a sequence is an error.

pub mod timestamp;

use crate::domain::{AnalysisError, LogRecord, MetricName, MetricPoint, scope_for_log_group};
use serde::Serialize;
use serde_json::{Map, Value};

pub use timestamp::{format_millis, parse_timestamp_str, parse_timestamp_value};

const GROUP_KEYS: [&str; 2] = ["logGroupName", "log_group"];
const STREAM_KEYS: [&str; 2] = ["logStreamName", "log_stream"];
const FUNCTION_KEYS: [&str; 3] = ["functionName", "function_name", "FunctionName"];
const METRIC_KEYS: [&str; 3] = ["metricName", "metric_name", "MetricName"];
const TIMESTAMP_KEYS: [&str; 2] = ["timestamp", "Timestamp"];
const UNIT_KEYS: [&str; 2] = ["unit", "Unit"];

/// Output of a normalization pass: the surviving records plus how many raw
/// items were dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Normalized<T> {
    pub records: Vec<T>,
    pub skipped: usize,
}

impl<T> Normalized<T> {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Normalize raw log events.
///
/// `raw_events` is either a JSON array of events or a response object with
/// an `events` array.
pub fn normalize(raw_events: &Value) -> Result<Normalized<LogRecord>, AnalysisError> {
    normalize_for_group(raw_events, None)
}

/// Normalize raw log events, filling in `default_group` for events that do
/// not name their log group (as `GetLogEvents` responses do not).
pub fn normalize_for_group(
    raw_events: &Value,
    default_group: Option<&str>,
) -> Result<Normalized<LogRecord>, AnalysisError> {
    let events = sequence(raw_events, "events")?;

    let mut records = Vec::with_capacity(events.len());
    let mut skipped = 0;
    for event in events {
        match log_record_from_event(event, default_group) {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }

    Ok(Normalized { records, skipped })
}

/// Normalize raw metric samples.
///
/// Samples with an unknown metric name, no function name, an unparsable
/// timestamp, or a non-finite value are skipped.
pub fn normalize_metrics(raw_samples: &Value) -> Result<Normalized<MetricPoint>, AnalysisError> {
    let samples = sequence(raw_samples, "metrics")?;

    let mut records = Vec::with_capacity(samples.len());
    let mut skipped = 0;
    for sample in samples {
        match metric_point_from_sample(sample) {
            Some(point) => records.push(point),
            None => skipped += 1,
        }
    }

    Ok(Normalized { records, skipped })
}

fn sequence<'a>(payload: &'a Value, wrapper_key: &str) -> Result<&'a Vec<Value>, AnalysisError> {
    match payload {
        Value::Array(items) => Ok(items),
        Value::Object(object) => match object.get(wrapper_key) {
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(AnalysisError::MalformedInput(format!(
                "'{wrapper_key}' must be an array, found {}",
                type_name(other)
            ))),
            None => Err(AnalysisError::MalformedInput(format!(
                "expected an array or an object with an '{wrapper_key}' array"
            ))),
        },
        other => Err(AnalysisError::MalformedInput(format!(
            "expected an array, found {}",
            type_name(other)
        ))),
    }
}

fn log_record_from_event(event: &Value, default_group: Option<&str>) -> Option<LogRecord> {
    let object = event.as_object()?;

    let timestamp = first_of(object, &TIMESTAMP_KEYS).and_then(parse_timestamp_value)?;
    let message = match object.get("message")? {
        Value::String(text) => text.clone(),
        Value::Null => return None,
        structured => structured.to_string(),
    };

    let log_group = first_string(object, &GROUP_KEYS)
        .or(default_group)
        .unwrap_or_default()
        .to_string();
    let log_stream = first_string(object, &STREAM_KEYS)
        .unwrap_or_default()
        .to_string();

    Some(LogRecord {
        timestamp,
        log_group,
        log_stream,
        message,
    })
}

fn metric_point_from_sample(sample: &Value) -> Option<MetricPoint> {
    let object = sample.as_object()?;

    let function_name = scope_for_log_group(first_string(object, &FUNCTION_KEYS)?)?;
    let metric_name: MetricName = first_string(object, &METRIC_KEYS)?.parse().ok()?;
    let timestamp = first_of(object, &TIMESTAMP_KEYS).and_then(parse_timestamp_value)?;
    let value = match object.get("value").or_else(|| object.get("Value"))? {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !value.is_finite() {
        return None;
    }
    let unit = first_string(object, &UNIT_KEYS)
        .unwrap_or_default()
        .to_string();

    Some(MetricPoint {
        function_name: function_name.to_string(),
        timestamp,
        metric_name,
        value,
        unit,
    })
}

fn first_of<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| object.get(*key))
}

fn first_string<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| object.get(*key).and_then(Value::as_str))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_cloudwatch_events() {
        let raw = json!([
            {
                "timestamp": 1_700_000_000_000_i64,
                "message": "START RequestId: abc Version: $LATEST",
                "logGroupName": "/aws/lambda/orders",
                "logStreamName": "2024/01/01/[$LATEST]abcdef",
                "eventId": "1"
            },
            {
                "timestamp": "2024-01-01T00:00:00Z",
                "message": "hello",
                "log_group": "/ecs/web"
            }
        ]);

        let normalized = normalize(&raw).unwrap();

        assert_eq!(normalized.skipped, 0);
        assert_eq!(normalized.records.len(), 2);
        assert_eq!(normalized.records[0].log_group, "/aws/lambda/orders");
        assert_eq!(normalized.records[0].log_stream, "2024/01/01/[$LATEST]abcdef");
        assert_eq!(normalized.records[1].timestamp, 1_704_067_200_000);
        assert_eq!(normalized.records[1].log_stream, "");
    }

    #[test]
    fn test_missing_or_malformed_timestamps_are_counted() {
        let raw = json!([
            {"message": "no timestamp"},
            {"timestamp": "not a time", "message": "bad timestamp"},
            {"timestamp": null, "message": "null timestamp"},
            {"timestamp": 1000, "message": "kept"},
            "not an object",
            {"timestamp": 2000}
        ]);

        let normalized = normalize(&raw).unwrap();

        assert_eq!(normalized.records.len(), 1);
        assert_eq!(normalized.skipped, 5);
        assert_eq!(normalized.records[0].message, "kept");
    }

    #[test]
    fn test_events_wrapper_object_is_accepted() {
        let raw = json!({"events": [{"timestamp": 1, "message": "x"}], "nextToken": "t"});
        let normalized = normalize(&raw).unwrap();
        assert_eq!(normalized.records.len(), 1);
    }

    #[test]
    fn test_non_sequence_is_malformed() {
        assert!(matches!(
            normalize(&json!("events")),
            Err(AnalysisError::MalformedInput(_))
        ));
        assert!(matches!(
            normalize(&json!({"events": 3})),
            Err(AnalysisError::MalformedInput(_))
        ));
        assert!(matches!(
            normalize(&json!({"items": []})),
            Err(AnalysisError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_empty_input_is_valid() {
        let normalized = normalize(&json!([])).unwrap();
        assert!(normalized.is_empty());
        assert_eq!(normalized.skipped, 0);
    }

    #[test]
    fn test_default_group_fills_missing_group_only() {
        let raw = json!([
            {"timestamp": 1, "message": "a"},
            {"timestamp": 2, "message": "b", "logGroupName": "/aws/lambda/other"}
        ]);

        let normalized = normalize_for_group(&raw, Some("/aws/lambda/orders")).unwrap();

        assert_eq!(normalized.records[0].log_group, "/aws/lambda/orders");
        assert_eq!(normalized.records[1].log_group, "/aws/lambda/other");
    }

    #[test]
    fn test_structured_message_is_kept_as_json_text() {
        let raw = json!([{"timestamp": 1, "message": {"level": "error", "msg": "boom"}}]);
        let normalized = normalize(&raw).unwrap();
        assert_eq!(
            normalized.records[0].message,
            r#"{"level":"error","msg":"boom"}"#
        );
    }

    #[test]
    fn test_normalize_metrics() {
        let raw = json!([
            {"functionName": "orders", "metricName": "Duration", "timestamp": 1000, "value": 12.5, "unit": "Milliseconds"},
            {"FunctionName": "orders", "MetricName": "Invocations", "Timestamp": "2024-01-01T00:00:00Z", "Value": "3", "Unit": "Count"},
            {"functionName": "orders", "metricName": "ConcurrentExecutions", "timestamp": 1000, "value": 1},
            {"functionName": "", "metricName": "Errors", "timestamp": 1000, "value": 1},
            {"functionName": "orders", "metricName": "Errors", "timestamp": 1000, "value": "NaN"},
            {"functionName": "orders", "metricName": "Errors", "value": 1}
        ]);

        let normalized = normalize_metrics(&raw).unwrap();

        assert_eq!(normalized.records.len(), 2);
        assert_eq!(normalized.skipped, 4);
        assert_eq!(normalized.records[0].metric_name, MetricName::Duration);
        assert_eq!(normalized.records[1].metric_name, MetricName::Invocations);
        assert_eq!(normalized.records[1].value, 3.0);
        assert_eq!(normalized.records[1].unit, "Count");
    }

    #[test]
    fn test_metric_function_names_share_log_scopes() {
        let raw = json!([
            {"functionName": "/aws/lambda/orders", "metricName": "Errors", "timestamp": 1000, "value": 1},
            {"functionName": " payments ", "metricName": "Errors", "timestamp": 1000, "value": 1},
            {"functionName": "/aws/lambda/", "metricName": "Errors", "timestamp": 1000, "value": 1}
        ]);

        let normalized = normalize_metrics(&raw).unwrap();

        assert_eq!(normalized.skipped, 1);
        let names: Vec<&str> = normalized
            .records
            .iter()
            .map(|point| point.function_name.as_str())
            .collect();
        assert_eq!(names, vec!["orders", "payments"]);
    }

    #[test]
    fn test_metrics_wrapper_object_is_accepted() {
        let raw = json!({"metrics": []});
        assert!(normalize_metrics(&raw).unwrap().is_empty());
        assert!(normalize_metrics(&json!(42)).is_err());
    }
}
