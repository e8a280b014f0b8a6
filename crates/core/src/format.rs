//! Display formatting for table cells and cards
//!
//! Nothing here fails: unparsable input is shown as received and missing
//! input as `N/A`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

pub const NOT_AVAILABLE: &str = "N/A";

const DATETIME: &str = "%d-%m-%Y %H:%M:%S";
const DATETIME_SHORT: &str = "%d-%m-%Y %H:%M";
const DATE: &str = "%d-%m-%Y";

/// Parse the timestamp shapes the services emit.
///
/// Timestamps with an offset keep their own wall-clock time.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.naive_local());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|pattern| NaiveDateTime::parse_from_str(raw, pattern).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn format_with(value: Option<&str>, pattern: &str) -> String {
    match value.map(str::trim) {
        None | Some("") => NOT_AVAILABLE.to_string(),
        Some(raw) => parse_timestamp(raw)
            .map_or_else(|| raw.to_string(), |at| at.format(pattern).to_string()),
    }
}

/// `dd-MM-yyyy HH:mm:ss`
pub fn format_datetime(value: Option<&str>) -> String {
    format_with(value, DATETIME)
}

/// `dd-MM-yyyy HH:mm`
pub fn format_datetime_short(value: Option<&str>) -> String {
    format_with(value, DATETIME_SHORT)
}

/// `dd-MM-yyyy`
pub fn format_date(value: Option<&str>) -> String {
    format_with(value, DATE)
}

pub fn or_na(value: Option<&str>) -> String {
    value
        .filter(|text| !text.is_empty())
        .unwrap_or(NOT_AVAILABLE)
        .to_string()
}

/// Scalar JSON as cell text
pub fn value_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => NOT_AVAILABLE.to_string(),
        Some(Value::String(text)) if text.is_empty() => NOT_AVAILABLE.to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

/// First line of a log message.
///
/// Objects with a `msg` field show that field; other objects are shown as
/// JSON. The preview stops at the first escaped newline (`\n` written out
/// as two characters), which is how multi-line messages reach the topic.
pub fn log_message_preview(message: Option<&Value>) -> String {
    let text = match message {
        None | Some(Value::Null) => return NOT_AVAILABLE.to_string(),
        Some(Value::String(text)) if text.is_empty() => return NOT_AVAILABLE.to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Object(map)) => match map.get("msg") {
            Some(Value::String(msg)) if !msg.is_empty() => msg.clone(),
            _ => Value::Object(map.clone()).to_string(),
        },
        Some(other) => other.to_string(),
    };

    match text.find("\\n") {
        Some(cut) => text[..cut].to_string(),
        None => text,
    }
}

/// Grams rendered as kilograms with two decimals; zero counts as missing
pub fn tray_weight_kg(grams: Option<f64>) -> String {
    match grams {
        Some(grams) if grams != 0.0 && grams.is_finite() => format!("{:.2}", grams / 1000.0),
        _ => NOT_AVAILABLE.to_string(),
    }
}

pub fn percent(value: f64) -> String {
    format!("{value:.2}%")
}

/// JavaScript-style truthiness rendered as Yes/No
pub fn yes_no(value: Option<&Value>) -> &'static str {
    let truthy = match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(text)) => !text.is_empty(),
        Some(_) => true,
    };
    if truthy { "Yes" } else { "No" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_datetime_formats() {
        assert_eq!(
            format_datetime(Some("2025-03-09T07:05:01.123456")),
            "09-03-2025 07:05:01"
        );
        assert_eq!(
            format_datetime(Some("2025-03-09 17:45:00")),
            "09-03-2025 17:45:00"
        );
        assert_eq!(
            format_datetime_short(Some("2025-03-09T07:05:01+05:30")),
            "09-03-2025 07:05"
        );
        assert_eq!(format_date(Some("2025-12-31")), "31-12-2025");
    }

    #[test]
    fn test_datetime_fallbacks() {
        assert_eq!(format_datetime(None), "N/A");
        assert_eq!(format_datetime(Some("  ")), "N/A");
        assert_eq!(format_datetime(Some("yesterday")), "yesterday");
    }

    #[test]
    fn test_log_message_preview() {
        assert_eq!(log_message_preview(None), "N/A");
        assert_eq!(
            log_message_preview(Some(&json!("tray stored\\nslot 4"))),
            "tray stored"
        );
        assert_eq!(
            log_message_preview(Some(&json!({"msg": "picked\\nmore", "status": "ok"}))),
            "picked"
        );
        assert_eq!(
            log_message_preview(Some(&json!({"status": "ok"}))),
            r#"{"status":"ok"}"#
        );
        assert_eq!(log_message_preview(Some(&json!("real\nnewline"))), "real\nnewline");
    }

    #[test]
    fn test_tray_weight() {
        assert_eq!(tray_weight_kg(Some(12_346.0)), "12.35");
        assert_eq!(tray_weight_kg(Some(500.0)), "0.50");
        assert_eq!(tray_weight_kg(Some(0.0)), "N/A");
        assert_eq!(tray_weight_kg(None), "N/A");
    }

    #[test]
    fn test_cells() {
        assert_eq!(or_na(Some("")), "N/A");
        assert_eq!(or_na(Some("TR-1")), "TR-1");
        assert_eq!(value_text(Some(&json!(230.5))), "230.5");
        assert_eq!(value_text(Some(&Value::Null)), "N/A");
        assert_eq!(percent(33.333), "33.33%");
        assert_eq!(yes_no(Some(&json!(1))), "Yes");
        assert_eq!(yes_no(Some(&json!(false))), "No");
        assert_eq!(yes_no(None), "No");
    }
}
