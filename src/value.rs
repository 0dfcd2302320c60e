//! MySQL value to JSON conversion for display.
//!
//! Text-protocol results arrive as `Value::Bytes`; the column type decides
//! whether those bytes are a number or stay a string.

use base64::Engine;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use mysql_async::consts::ColumnType;
use mysql_async::{Column, Row, Value};
use serde_json::{Map, Number, Value as JsonValue};

/// Convert a single value without column information.
///
/// Dates with a zero time part render as `YYYY-MM-DD`.
pub fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::NULL => JsonValue::Null,
        Value::Int(i) => JsonValue::from(*i),
        Value::UInt(u) => JsonValue::from(*u),
        // Go through the shortest decimal representation so 1.1f32 stays 1.1.
        Value::Float(f) => float_to_json(f.to_string().parse().unwrap_or(f64::from(*f))),
        Value::Double(d) => float_to_json(*d),
        Value::Bytes(bytes) => bytes_to_json(bytes),
        Value::Date(year, month, day, hour, minute, second, micros) => {
            let date_only = *hour == 0 && *minute == 0 && *second == 0 && *micros == 0;
            JsonValue::String(format_date(
                *year, *month, *day, *hour, *minute, *second, *micros, date_only,
            ))
        }
        Value::Time(negative, days, hours, minutes, seconds, micros) => JsonValue::String(
            format_time(*negative, *days, *hours, *minutes, *seconds, *micros),
        ),
    }
}

/// Convert a value using its column type.
pub fn column_value_to_json(column: &Column, value: &Value) -> JsonValue {
    use ColumnType::*;

    match (column.column_type(), value) {
        (MYSQL_TYPE_DATE | MYSQL_TYPE_NEWDATE, Value::Date(year, month, day, ..)) => {
            JsonValue::String(format_date(*year, *month, *day, 0, 0, 0, 0, true))
        }
        (
            MYSQL_TYPE_DATETIME | MYSQL_TYPE_DATETIME2 | MYSQL_TYPE_TIMESTAMP
            | MYSQL_TYPE_TIMESTAMP2,
            Value::Date(year, month, day, hour, minute, second, micros),
        ) => JsonValue::String(format_date(
            *year, *month, *day, *hour, *minute, *second, *micros, false,
        )),
        (
            MYSQL_TYPE_TINY | MYSQL_TYPE_SHORT | MYSQL_TYPE_INT24 | MYSQL_TYPE_LONG
            | MYSQL_TYPE_LONGLONG | MYSQL_TYPE_YEAR,
            Value::Bytes(bytes),
        ) => parse_number(bytes, |s| {
            s.parse::<i64>()
                .map(Number::from)
                .or_else(|_| s.parse::<u64>().map(Number::from))
                .ok()
        }),
        (MYSQL_TYPE_FLOAT | MYSQL_TYPE_DOUBLE, Value::Bytes(bytes)) => {
            parse_number(bytes, |s| s.parse::<f64>().ok().and_then(Number::from_f64))
        }
        _ => value_to_json(value),
    }
}

/// Convert a row to a JSON object keyed by column name.
pub fn row_to_json(row: &Row) -> JsonValue {
    let mut object = Map::new();
    for (i, column) in row.columns_ref().iter().enumerate() {
        let value = row
            .as_ref(i)
            .map(|value| column_value_to_json(column, value))
            .unwrap_or(JsonValue::Null);
        object.insert(column.name_str().into_owned(), value);
    }
    JsonValue::Object(object)
}

fn float_to_json(f: f64) -> JsonValue {
    Number::from_f64(f)
        .map(JsonValue::Number)
        .unwrap_or(JsonValue::Null)
}

fn bytes_to_json(bytes: &[u8]) -> JsonValue {
    match std::str::from_utf8(bytes) {
        Ok(s) => JsonValue::String(s.to_string()),
        Err(_) => JsonValue::String(base64::engine::general_purpose::STANDARD.encode(bytes)),
    }
}

fn parse_number(bytes: &[u8], parse: impl Fn(&str) -> Option<Number>) -> JsonValue {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|s| parse(s.trim()))
        .map(JsonValue::Number)
        .unwrap_or_else(|| bytes_to_json(bytes))
}

#[allow(clippy::too_many_arguments)]
fn format_date(
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
    micros: u32,
    date_only: bool,
) -> String {
    let date = NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day));
    let time = NaiveTime::from_hms_micro_opt(
        u32::from(hour),
        u32::from(minute),
        u32::from(second),
        micros,
    );

    match (date, time) {
        (Some(date), _) if date_only => date.format("%Y-%m-%d").to_string(),
        (Some(date), Some(time)) => NaiveDateTime::new(date, time)
            .format("%Y-%m-%d %H:%M:%S%.f")
            .to_string(),
        // Zero dates such as 0000-00-00 are valid in MySQL but not in chrono.
        _ if date_only => format!("{year:04}-{month:02}-{day:02}"),
        _ => format!(
            "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}{}",
            fraction(micros)
        ),
    }
}

fn format_time(negative: bool, days: u32, hours: u8, minutes: u8, seconds: u8, micros: u32) -> String {
    let sign = if negative { "-" } else { "" };
    let hours = u64::from(days) * 24 + u64::from(hours);
    format!(
        "{sign}{hours:02}:{minutes:02}:{seconds:02}{}",
        fraction(micros)
    )
}

fn fraction(micros: u32) -> String {
    if micros == 0 {
        String::new()
    } else {
        format!(".{micros:06}")
    }
}
