//! 行解析器
//!
//! 单行文本 → `ParseOutcome`。解析本身是纯函数，从不 panic、从不返回 `Err`：
//! 格式不符的行以 `ParseOutcome::Failed` 交给调用方统一“跳过并计数”。

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use std::fmt;

use crate::domain::{LogEntry, Severity};
use crate::infrastructure::config::{AnalyzerConfig, ConfigError, RFC3339_FORMAT};
use crate::services::pattern_matcher::SeverityMatcher;

/// 单行解析失败原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    /// 行不符合配置的行格式
    NoMatch,
    /// 时间戳文本无法按任何配置格式解析
    BadTimestamp { text: String },
}

impl ParseFailure {
    /// 用于报告中按原因统计的稳定键
    pub fn reason(&self) -> &'static str {
        match self {
            ParseFailure::NoMatch => "no_match",
            ParseFailure::BadTimestamp { .. } => "bad_timestamp",
        }
    }
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseFailure::NoMatch => write!(f, "line does not match the log format"),
            ParseFailure::BadTimestamp { text } => write!(f, "unparseable timestamp '{}'", text),
        }
    }
}

/// 单行解析结果
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Parsed(LogEntry),
    Failed(ParseFailure),
    /// 空行不是日志记录，既不计为成功也不计为失败
    Blank,
}

/// 时间戳格式
#[derive(Debug, Clone, PartialEq, Eq)]
enum TimestampFormat {
    Rfc3339,
    /// 含时区偏移的格式（`%z` 等）
    Zoned(String),
    /// 不含时区的格式，按 UTC 解释
    Naive(String),
}

impl TimestampFormat {
    fn compile(format: &str) -> Result<Self, ConfigError> {
        if format.eq_ignore_ascii_case(RFC3339_FORMAT) {
            return Ok(TimestampFormat::Rfc3339);
        }

        if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::InvalidValue(format!(
                "invalid timestamp format: '{}'",
                format
            )));
        }

        if format.contains("%z") || format.contains("%:z") || format.contains("%#z") {
            Ok(TimestampFormat::Zoned(format.to_string()))
        } else {
            Ok(TimestampFormat::Naive(format.to_string()))
        }
    }

    fn parse(&self, text: &str) -> Option<DateTime<Utc>> {
        match self {
            TimestampFormat::Rfc3339 => DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            TimestampFormat::Zoned(fmt) => DateTime::parse_from_str(text, fmt)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            TimestampFormat::Naive(fmt) => NaiveDateTime::parse_from_str(text, fmt)
                .ok()
                .map(|naive| naive.and_utc()),
        }
    }
}

/**
 * 日志行解析器
 *
 * 行格式正则必须包含命名分组 `timestamp` 与 `message`，`level` 可选。
 */
pub struct LineParser {
    pattern: Regex,
    formats: Vec<TimestampFormat>,
    severity_matcher: SeverityMatcher,
}

impl LineParser {
    pub fn new(config: &AnalyzerConfig) -> Result<Self, ConfigError> {
        let pattern = Regex::new(&config.line_pattern).map_err(|e| ConfigError::InvalidPattern {
            name: "line_pattern".to_string(),
            message: e.to_string(),
        })?;

        for required in ["timestamp", "message"] {
            if !pattern.capture_names().flatten().any(|name| name == required) {
                return Err(ConfigError::InvalidPattern {
                    name: "line_pattern".to_string(),
                    message: format!("missing named group '{}'", required),
                });
            }
        }

        let formats = config
            .timestamp_formats
            .iter()
            .map(|fmt| TimestampFormat::compile(fmt))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            pattern,
            formats,
            severity_matcher: SeverityMatcher::new()?,
        })
    }

    /**
     * 解析一行日志
     *
     * # 参数
     * * `line` - 去掉行尾换行符的原始文本
     * * `line_number` - 1 起始的行号
     */
    pub fn parse(&self, line: &str, line_number: u64) -> ParseOutcome {
        if line.trim().is_empty() {
            return ParseOutcome::Blank;
        }

        let Some(caps) = self.pattern.captures(line) else {
            return ParseOutcome::Failed(ParseFailure::NoMatch);
        };

        let Some(ts_match) = caps.name("timestamp") else {
            return ParseOutcome::Failed(ParseFailure::NoMatch);
        };

        let Some(timestamp) = self.parse_timestamp(ts_match.as_str()) else {
            return ParseOutcome::Failed(ParseFailure::BadTimestamp {
                text: ts_match.as_str().to_string(),
            });
        };

        let mut message = caps.name("message").map(|m| m.as_str()).unwrap_or("");
        let mut severity = caps
            .name("level")
            .map(|m| Severity::from_token(m.as_str()))
            .unwrap_or(Severity::Unknown);

        // 级别不在时间戳之后时，回退为在消息中查找 [LEVEL] 标记
        if severity == Severity::Unknown {
            if let Some(found) = self.severity_matcher.find(message) {
                severity = found.severity;
                message = message[found.end..].trim_start().trim_start_matches(':');
            }
        }

        ParseOutcome::Parsed(LogEntry::new(
            timestamp,
            severity,
            message,
            line,
            line_number,
        ))
    }

    /// 依次尝试所有配置格式；带逗号的小数秒（`10:00:00,123`）按小数点重试
    pub fn parse_timestamp(&self, text: &str) -> Option<DateTime<Utc>> {
        let text = text.trim();
        if let Some(ts) = self.formats.iter().find_map(|fmt| fmt.parse(text)) {
            return Some(ts);
        }

        if text.contains(',') {
            let dotted = text.replacen(',', ".", 1);
            return self.formats.iter().find_map(|fmt| fmt.parse(&dotted));
        }

        None
    }
}
