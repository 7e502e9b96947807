//! 服务端时间字段的宽松解析
//!
//! 作业平台以 `LocalDateTime` 输出时间，常见形态为 ISO 字符串
//! （`2024-03-01T08:30:00.123`），部分历史统计数据保留了数组形态
//! （`[2024,3,1,8,30,0,123000000]`）或字段对象形态
//! （`{"year":2024,"monthValue":3,...}`）。三种形态都解析为
//! [`NaiveDateTime`]，其余形态视为格式错误。

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

const TEXT_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// 用于 `#[serde(default, deserialize_with = "...")]` 的可选时间字段
pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
        Some(value) => parse_value(&value)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("无法识别的时间格式: {value}"))),
    }
}

pub fn parse_value(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::String(text) => parse_str(text),
        Value::Array(parts) => {
            let nums: Vec<i64> = parts.iter().map(Value::as_i64).collect::<Option<_>>()?;
            let at = |i: usize| nums.get(i).copied().unwrap_or(0);
            if nums.len() < 3 {
                return None;
            }
            from_parts(at(0), at(1), at(2), at(3), at(4), at(5), at(6))
        }
        Value::Object(fields) => {
            let field = |name: &str, default: i64| {
                fields.get(name).and_then(Value::as_i64).unwrap_or(default)
            };
            let year = fields.get("year").and_then(Value::as_i64)?;
            from_parts(
                year,
                field("monthValue", 1),
                field("dayOfMonth", 1),
                field("hour", 0),
                field("minute", 0),
                field("second", 0),
                field("nano", 0),
            )
        }
        _ => None,
    }
}

pub fn parse_str(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(text) {
        return Some(with_offset.naive_local());
    }
    TEXT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}

fn from_parts(
    year: i64,
    month: i64,
    day: i64,
    hour: i64,
    minute: i64,
    second: i64,
    nano: i64,
) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(
        i32::try_from(year).ok()?,
        u32::try_from(month).ok()?,
        u32::try_from(day).ok()?,
    )?
    .and_hms_nano_opt(
        u32::try_from(hour).ok()?,
        u32::try_from(minute).ok()?,
        u32::try_from(second).ok()?,
        u32::try_from(nano).ok()?,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use serde_json::json;

    fn expected() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(8, 30, 5)
            .unwrap()
    }

    #[test]
    fn test_iso_variants() {
        assert_eq!(parse_str("2024-03-01T08:30:05"), Some(expected()));
        assert_eq!(parse_str("2024-03-01 08:30:05"), Some(expected()));
        assert_eq!(
            parse_str("2024-03-01T08:30:05.250").map(|t| t.nanosecond()),
            Some(250_000_000)
        );
        assert_eq!(parse_str("2024-03-01T08:30:05+08:00"), Some(expected()));
        assert_eq!(parse_str("yesterday"), None);
    }

    #[test]
    fn test_array_form() {
        assert_eq!(parse_value(&json!([2024, 3, 1, 8, 30, 5])), Some(expected()));
        assert_eq!(parse_value(&json!([2024, 3])), None);
    }

    #[test]
    fn test_object_form() {
        let value = json!({
            "year": 2024, "monthValue": 3, "dayOfMonth": 1,
            "hour": 8, "minute": 30, "second": 5, "nano": 0
        });
        assert_eq!(parse_value(&value), Some(expected()));
    }
}
