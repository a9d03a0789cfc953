use chrono::{DateTime, Timelike, Utc};

use super::value_objects::{LogMessage, Severity, TimeWindow, WindowGranularity};

/// 日志条目实体
///
/// 由单行日志解析得到，创建后不可变；只在聚合期间短暂持有。
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub message: LogMessage,
    pub raw_line: String,
    pub line_number: u64,
}

impl LogEntry {
    pub fn new(
        timestamp: DateTime<Utc>,
        severity: Severity,
        message: impl Into<LogMessage>,
        raw_line: impl Into<String>,
        line_number: u64,
    ) -> Self {
        Self {
            timestamp,
            severity,
            message: message.into(),
            raw_line: raw_line.into(),
            line_number,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity.is_error()
    }

    pub fn window(&self, granularity: WindowGranularity) -> TimeWindow {
        granularity.window_of(&self.timestamp)
    }

    pub fn hour_of_day(&self) -> u32 {
        self.timestamp.hour()
    }
}
