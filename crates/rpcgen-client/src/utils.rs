//! Serialization helpers called by generated code.

use chrono::{DateTime, FixedOffset, SecondsFormat};

/// Appends `value` as a JSON string literal.
pub fn serialize_string(output: &mut String, value: &str) {
    output.push('"');
    for c in value.chars() {
        match c {
            '"' => output.push_str("\\\""),
            '\\' => output.push_str("\\\\"),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            '\t' => output.push_str("\\t"),
            '\u{08}' => output.push_str("\\b"),
            '\u{0c}' => output.push_str("\\f"),
            c if (c as u32) < 0x20 => output.push_str(&format!("\\u{:04x}", c as u32)),
            c => output.push(c),
        }
    }
    output.push('"');
}

/// RFC 3339 with millisecond precision, `Z` for UTC.
pub fn format_date_time(value: &DateTime<FixedOffset>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Appends `value` as a quoted RFC 3339 timestamp.
pub fn serialize_date_time(output: &mut String, value: &DateTime<FixedOffset>) {
    output.push('"');
    output.push_str(&format_date_time(value));
    output.push('"');
}

pub fn parse_date_time(input: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(input).ok()
}

/// Logs that the field at `instance_path` was left out of a query string.
pub fn warn_query_skip(instance_path: &str) {
    tracing::warn!(
        path = instance_path,
        "value cannot be serialized to a query string and was skipped"
    );
}
