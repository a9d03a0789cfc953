use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// 日志级别值对象
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Critical,
    Unknown,
}

/// 可识别的级别标记（大小写不敏感）及其对应级别
const SEVERITY_TOKENS: &[(&str, Severity)] = &[
    ("trace", Severity::Trace),
    ("trc", Severity::Trace),
    ("debug", Severity::Debug),
    ("dbg", Severity::Debug),
    ("info", Severity::Info),
    ("inf", Severity::Info),
    ("notice", Severity::Info),
    ("warning", Severity::Warn),
    ("warn", Severity::Warn),
    ("wrn", Severity::Warn),
    ("error", Severity::Error),
    ("err", Severity::Error),
    ("critical", Severity::Critical),
    ("crit", Severity::Critical),
    ("fatal", Severity::Critical),
    ("ftl", Severity::Critical),
];

// 每行都会查一次，静态初始化一次即可
static SEVERITY_LOOKUP: Lazy<HashMap<&'static str, Severity>> =
    Lazy::new(|| SEVERITY_TOKENS.iter().copied().collect());

impl Severity {
    pub fn from_token(token: &str) -> Self {
        let lowered = token.trim().to_ascii_lowercase();
        SEVERITY_LOOKUP
            .get(lowered.as_str())
            .copied()
            .unwrap_or(Severity::Unknown)
    }

    /// 所有可识别的标记，供级别扫描器构建自动机
    pub fn tokens() -> &'static [(&'static str, Severity)] {
        SEVERITY_TOKENS
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
            Severity::Unknown => "UNKNOWN",
        }
    }

    /// ERROR 与 CRITICAL 计入错误统计
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error | Severity::Critical)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 日志消息值对象
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage(String);

impl LogMessage {
    pub fn new(message: String) -> Self {
        let trimmed = message.trim();
        if trimmed.len() == message.len() {
            Self(message)
        } else {
            Self(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for LogMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for LogMessage {
    fn from(s: String) -> Self {
        LogMessage::new(s)
    }
}

impl From<&str> for LogMessage {
    fn from(s: &str) -> Self {
        LogMessage::new(s.to_string())
    }
}

/// 窗口宽度上限：366 天
pub const MAX_WINDOW_SECONDS: u64 = 366 * 86_400;

/// 时间窗口粒度
///
/// 配置中可写作 `minute` / `hour` / `day`，或 `15m`、`90s`、`6h` 等固定秒数。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum WindowGranularity {
    Minute,
    Hour,
    Day,
    Seconds(u64),
}

impl WindowGranularity {
    pub fn width_seconds(&self) -> i64 {
        match self {
            WindowGranularity::Minute => 60,
            WindowGranularity::Hour => 3_600,
            WindowGranularity::Day => 86_400,
            WindowGranularity::Seconds(secs) => (*secs).min(MAX_WINDOW_SECONDS) as i64,
        }
    }

    /// 自定义宽度是否在允许范围内（1 秒到 366 天）
    pub fn is_within_bounds(&self) -> bool {
        match self {
            WindowGranularity::Seconds(secs) => (1..=MAX_WINDOW_SECONDS).contains(secs),
            _ => true,
        }
    }

    /// 将时间戳截断到所在窗口的起点（以 Unix 纪元对齐）
    pub fn window_start(&self, timestamp: &DateTime<Utc>) -> DateTime<Utc> {
        let width = self.width_seconds().max(1);
        let start = timestamp.timestamp().div_euclid(width) * width;
        DateTime::<Utc>::from_timestamp(start, 0).unwrap_or(*timestamp)
    }

    pub fn window_of(&self, timestamp: &DateTime<Utc>) -> TimeWindow {
        let start = self.window_start(timestamp);
        TimeWindow {
            start,
            end: start
                .checked_add_signed(chrono::Duration::seconds(self.width_seconds().max(1)))
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }
}

impl Default for WindowGranularity {
    fn default() -> Self {
        WindowGranularity::Hour
    }
}

impl fmt::Display for WindowGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowGranularity::Minute => write!(f, "minute"),
            WindowGranularity::Hour => write!(f, "hour"),
            WindowGranularity::Day => write!(f, "day"),
            WindowGranularity::Seconds(secs) => write!(f, "{}s", secs),
        }
    }
}

impl FromStr for WindowGranularity {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim().to_ascii_lowercase();
        match value.as_str() {
            "minute" | "minutely" => return Ok(WindowGranularity::Minute),
            "hour" | "hourly" => return Ok(WindowGranularity::Hour),
            "day" | "daily" => return Ok(WindowGranularity::Day),
            _ => {}
        }

        let (digits, multiplier) = match value.chars().last() {
            Some('s') => (&value[..value.len() - 1], 1),
            Some('m') => (&value[..value.len() - 1], 60),
            Some('h') => (&value[..value.len() - 1], 3_600),
            Some('d') => (&value[..value.len() - 1], 86_400),
            _ => (value.as_str(), 1),
        };

        let amount: u64 = digits
            .parse()
            .map_err(|_| format!("Invalid window granularity: '{}'", value))?;
        if amount == 0 {
            return Err("Window granularity must be greater than zero".to_string());
        }

        let secs = amount
            .checked_mul(multiplier)
            .filter(|secs| *secs <= MAX_WINDOW_SECONDS)
            .ok_or_else(|| {
                format!(
                    "Window granularity '{}' exceeds the maximum of {} seconds",
                    value, MAX_WINDOW_SECONDS
                )
            })?;

        Ok(match secs {
            60 => WindowGranularity::Minute,
            3_600 => WindowGranularity::Hour,
            86_400 => WindowGranularity::Day,
            secs => WindowGranularity::Seconds(secs),
        })
    }
}

impl TryFrom<String> for WindowGranularity {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WindowGranularity> for String {
    fn from(value: WindowGranularity) -> Self {
        value.to_string()
    }
}

/// 半开时间区间 `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.start.format("%Y-%m-%d %H:%M:%S"),
            self.end.format("%Y-%m-%d %H:%M:%S")
        )
    }
}
