//! 入库归一化工具
//!
//! 持久化层返回的原始记录字段都可能缺失或格式不对。这里的函数只做
//! "尽量解析、解析不了就给默认值"，从不返回错误。

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

/// 去掉首尾空白，空串视为缺失
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// 数字或数字字符串 -> 非负有限浮点数
pub fn lenient_amount(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

/// 数字或数字字符串 -> 非负整数，小数向下取整
pub fn lenient_count(value: Option<&Value>) -> u32 {
    let amount = lenient_amount(value);
    if amount >= u32::MAX as f64 {
        u32::MAX
    } else {
        amount.floor() as u32
    }
}

/// 解析时间戳：RFC 3339、无时区的日期时间、纯日期、或毫秒时间戳
pub fn parse_timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    match value? {
        Value::String(s) => parse_timestamp_str(s),
        Value::Number(n) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        Value::Object(map) => {
            // 文档导出格式 { "$date": ... }
            parse_timestamp(map.get("$date"))
        }
        _ => None,
    }
}

pub fn parse_timestamp_str(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
