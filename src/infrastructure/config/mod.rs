//! 配置管理基础设施层
//!
//! 分层加载：
//! - 内置默认值
//! - 可选配置文件（TOML / JSON）
//! - `LOG_ANALYZER_` 前缀的环境变量
//!
//! 加载后统一经过 `validator` 规则与语义检查，任何非法值都在处理开始前失败。

use chrono::{DateTime, Utc};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use validator::Validate;

use crate::domain::log_analysis::value_objects::MAX_WINDOW_SECONDS;
use crate::domain::WindowGranularity;

/// 环境变量前缀，例如 `LOG_ANALYZER_BURST_MULTIPLIER=3`
pub const ENV_PREFIX: &str = "LOG_ANALYZER";

/// 默认行格式：`[时间戳] [级别] 消息` 或 `时间戳 级别: 消息`，级别可省略
pub const DEFAULT_LINE_PATTERN: &str = r"^\[?(?P<timestamp>\d{4}-\d{2}-\d{2}[T ][^\s\]]+|\d{2}/[A-Za-z]{3}/\d{4}:\d{2}:\d{2}:\d{2}(?: [+-]\d{4})?)\]?\s+(?:\[?(?P<level>(?i:trace|debug|info|notice|warning|warn|error|err|critical|crit|fatal))(?:\]:?\s*|:\s*|\s+|$))?(?P<message>.*)$";

/// 特殊格式名：按 RFC 3339 解析（带时区偏移或 `Z`）
pub const RFC3339_FORMAT: &str = "rfc3339";

/// 配置错误类型
#[derive(Error, Debug, Diagnostic)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    #[diagnostic(
        code(config::validation),
        help("Check the option ranges in your configuration file or environment")
    )]
    Validation(String),

    #[error("Configuration file not found: {0}")]
    #[diagnostic(code(config::file_not_found))]
    FileNotFound(PathBuf),

    #[error("Configuration format error: {0}")]
    #[diagnostic(code(config::format_error))]
    FormatError(String),

    #[error("Invalid configuration value: {0}")]
    #[diagnostic(code(config::invalid_value))]
    InvalidValue(String),

    #[error("Invalid pattern '{name}': {message}")]
    #[diagnostic(code(config::invalid_pattern), help("Check your regex pattern syntax"))]
    InvalidPattern { name: String, message: String },
}

/// 签名归一化规则：按顺序对错误消息执行正则替换
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NormalizationRule {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(length(min = 1))]
    pub pattern: String,

    pub replacement: String,
}

impl NormalizationRule {
    pub fn new(name: &str, pattern: &str, replacement: &str) -> Self {
        Self {
            name: name.to_string(),
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
        }
    }
}

/// 错误簇配置（相邻错误间隔不超过 `gap_seconds` 的连续错误）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ClusterConfig {
    pub enabled: bool,

    #[validate(range(min = 1, max = 86400))]
    pub gap_seconds: u64,

    #[validate(range(min = 2, max = 100000))]
    pub min_errors: usize,
}

/// 建议生成阈值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RecommendationConfig {
    /// 出现次数超过该值的高频签名才会生成建议
    pub frequent_signature_min: u64,

    /// 单个小时占全部错误的比例超过该值时提示排查定时任务
    #[validate(range(min = 0.0, max = 1.0))]
    pub peak_hour_share: f64,

    /// 每类建议最多列出的条目数
    #[validate(range(min = 1, max = 50))]
    pub max_listed: usize,
}

/// 分析器配置根结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AnalyzerConfig {
    pub window_granularity: WindowGranularity,

    #[validate(range(exclusive_min = 0.0, max = 1000.0))]
    pub burst_multiplier: f64,

    #[validate(length(min = 1, max = 50))]
    pub timestamp_formats: Vec<String>,

    #[validate(length(min = 1, max = 4096))]
    pub line_pattern: String,

    #[validate(range(min = 1, max = 1000))]
    pub top_signatures: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<DateTime<Utc>>,

    #[validate(nested)]
    pub signature_normalization_rules: Vec<NormalizationRule>,

    #[validate(nested)]
    pub clusters: ClusterConfig,

    #[validate(nested)]
    pub recommendations: RecommendationConfig,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            window_granularity: WindowGranularity::Hour,
            burst_multiplier: 2.0,
            timestamp_formats: default_timestamp_formats(),
            line_pattern: DEFAULT_LINE_PATTERN.to_string(),
            top_signatures: 10,
            since: None,
            until: None,
            signature_normalization_rules: default_normalization_rules(),
            clusters: ClusterConfig::default(),
            recommendations: RecommendationConfig::default(),
        }
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            gap_seconds: 300,
            min_errors: 5,
        }
    }
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            frequent_signature_min: 5,
            peak_hour_share: 0.3,
            max_listed: 3,
        }
    }
}

/// 默认时间戳格式，按顺序尝试
pub fn default_timestamp_formats() -> Vec<String> {
    [
        RFC3339_FORMAT,
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%d/%b/%Y:%H:%M:%S %z",
        "%d/%b/%Y:%H:%M:%S",
    ]
    .iter()
    .map(|fmt| fmt.to_string())
    .collect()
}

/// 默认签名归一化规则
///
/// 顺序有意义：IP、邮箱、路径先于纯数字替换，避免被拆碎。
pub fn default_normalization_rules() -> Vec<NormalizationRule> {
    vec![
        NormalizationRule::new(
            "uuid",
            r"\b[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}\b",
            "<UUID>",
        ),
        NormalizationRule::new(
            "email",
            r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
            "<EMAIL>",
        ),
        NormalizationRule::new("ipv4", r"\b(?:\d{1,3}\.){3}\d{1,3}(?::\d+)?\b", "<IP>"),
        NormalizationRule::new("path", r"/[\w./-]+", "<PATH>"),
        NormalizationRule::new("hex", r"\b0[xX][0-9a-fA-F]+\b", "<HEX>"),
        NormalizationRule::new("number", r"\b\d+(?:\.\d+)?\b", "<NUM>"),
    ]
}

impl AnalyzerConfig {
    /**
     * 校验配置（字段范围 + 跨字段语义）
     *
     * 正则表达式在构建解析器时编译，编译失败同样返回 `ConfigError`。
     */
    pub fn check(&self) -> Result<(), ConfigError> {
        self.validate()
            .map_err(|e| ConfigError::Validation(e.to_string()))?;

        if !self.window_granularity.is_within_bounds() {
            return Err(ConfigError::InvalidValue(format!(
                "window_granularity must be between 1 and {} seconds, got {}",
                MAX_WINDOW_SECONDS, self.window_granularity
            )));
        }

        if !self.burst_multiplier.is_finite() {
            return Err(ConfigError::InvalidValue(format!(
                "burst_multiplier must be a finite positive number, got {}",
                self.burst_multiplier
            )));
        }

        if self
            .timestamp_formats
            .iter()
            .any(|fmt| fmt.trim().is_empty())
        {
            return Err(ConfigError::InvalidValue(
                "timestamp_formats must not contain empty entries".to_string(),
            ));
        }

        if let (Some(since), Some(until)) = (self.since, self.until) {
            if since >= until {
                return Err(ConfigError::InvalidValue(format!(
                    "since ({}) must be earlier than until ({})",
                    since, until
                )));
            }
        }

        let mut names = std::collections::HashSet::new();
        for rule in &self.signature_normalization_rules {
            if !names.insert(rule.name.as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "duplicate normalization rule name: {}",
                    rule.name
                )));
            }
        }

        Ok(())
    }

    /// 以 TOML 形式导出当前生效配置
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::FormatError(e.to_string()))
    }
}

/**
 * 加载配置：默认值 → 配置文件 → 环境变量，然后校验
 *
 * # 参数
 * * `path` - 可选配置文件路径（扩展名决定 TOML / JSON）
 */
pub fn load_config(path: Option<&Path>) -> Result<AnalyzerConfig, ConfigError> {
    load_config_with_env(path, None)
}

/**
 * 与 `load_config` 相同，但环境变量层可显式注入
 *
 * # 参数
 * * `env` - `None` 读取进程环境变量；`Some(map)` 只使用给定的键值
 */
pub fn load_config_with_env(
    path: Option<&Path>,
    env: Option<config::Map<String, String>>,
) -> Result<AnalyzerConfig, ConfigError> {
    let defaults = config::Config::try_from(&AnalyzerConfig::default())
        .map_err(|e| ConfigError::FormatError(e.to_string()))?;

    let mut builder = config::Config::builder().add_source(defaults);

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        debug!(path = %path.display(), "Loading analyzer configuration file");
        builder = builder.add_source(config::File::from(path).required(true));
    }

    builder = builder.add_source(
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(env),
    );

    let config: AnalyzerConfig = builder
        .build()
        .and_then(|c| c.try_deserialize())
        .map_err(|e| ConfigError::FormatError(e.to_string()))?;

    config.check()?;
    Ok(config)
}
