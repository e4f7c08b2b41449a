//! 发布时间格式化（相对时间 / 绝对时间）

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFormat {
    #[default]
    Relative,
    Absolute,
}

/// 解析 API 返回的 RFC 3339 时间并按配置格式化；无法解析时返回 "unknown"
pub fn format_date(raw: Option<&str>, format: TimeFormat, now: DateTime<Utc>) -> String {
    let parsed = raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok());
    match parsed {
        Some(date) => {
            let date = date.with_timezone(&Utc);
            match format {
                TimeFormat::Relative => relative(date, now),
                TimeFormat::Absolute => date.format("%Y-%m-%d %H:%M UTC").to_string(),
            }
        }
        None => "unknown".to_string(),
    }
}

/// "3 days ago" 风格的相对时间
pub fn relative(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - date).num_seconds();
    let future = secs < 0;
    let secs = secs.unsigned_abs() as f64;

    let minutes = secs / 60.0;
    let hours = minutes / 60.0;
    let days = hours / 24.0;
    let months = days / 30.4;
    let years = days / 365.0;

    let text = if secs < 45.0 {
        "a few seconds".to_string()
    } else if secs < 90.0 {
        "a minute".to_string()
    } else if minutes < 45.0 {
        format!("{} minutes", minutes.round())
    } else if minutes < 90.0 {
        "an hour".to_string()
    } else if hours < 22.0 {
        format!("{} hours", hours.round())
    } else if hours < 36.0 {
        "a day".to_string()
    } else if days < 26.0 {
        format!("{} days", days.round())
    } else if days < 46.0 {
        "a month".to_string()
    } else if days < 320.0 {
        format!("{} months", months.round().max(2.0))
    } else if days < 548.0 {
        "a year".to_string()
    } else {
        format!("{} years", years.round().max(2.0))
    };

    if future {
        format!("in {text}")
    } else {
        format!("{text} ago")
    }
}
