//! 日期时间解析工具
//!
//! Dedibox 的 `creation_date` 字段格式并不固定，这里统一解析为 `DateTime<Utc>`：
//! - RFC3339 字符串
//! - `YYYY-MM-DD HH:MM:SS`（视为 UTC）
//! - Unix 时间戳（秒/毫秒自动识别）

use chrono::{DateTime, NaiveDateTime, Utc};

/// 解析 API 返回的时间字符串，无法识别时返回 `None`
pub fn parse_api_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }

    raw.parse::<i64>().ok().and_then(parse_unix_timestamp)
}

/// 解析 Unix 时间戳（自动判断秒/毫秒）
fn parse_unix_timestamp(ts: i64) -> Option<DateTime<Utc>> {
    // 大于 10^11 视为毫秒
    if ts > 100_000_000_000 {
        DateTime::from_timestamp_millis(ts)
    } else {
        DateTime::from_timestamp(ts, 0)
    }
}
