//! 命令行参数
//!
//! 命令行参数是配置的最后一层：默认值 → 配置文件 → 环境变量 → 命令行。

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::domain::WindowGranularity;
use crate::infrastructure::config::{AnalyzerConfig, ConfigError};

/// 从标准输入读取时使用的占位路径
pub const STDIN_PATH: &str = "-";

/// 输出格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Log pattern analyzer
#[derive(Parser, Debug)]
#[command(name = "log-pattern-analyzer")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Parse application logs, aggregate errors per time window and flag error bursts")]
#[command(long_about = r#"Parse application logs, aggregate errors per time window and flag error bursts

EXAMPLES:
    # Analyze a file with default settings
    log-pattern-analyzer app.log

    # Read from stdin, 15 minute windows, JSON output
    cat app.log | log-pattern-analyzer - --window 15m --format json

    # Only look at one day
    log-pattern-analyzer app.log --since 2024-01-01 --until 2024-01-02

    # Only look at the past 24 hours
    log-pattern-analyzer app.log --last 24h

ENVIRONMENT VARIABLES:
    LOG_ANALYZER_*          Override configuration keys (e.g. LOG_ANALYZER_BURST_MULTIPLIER=3)
    RUST_LOG                Diagnostic log filter (written to stderr)"#)]
pub struct Args {
    /// Log file to analyze, or "-" for stdin
    #[arg(default_value = STDIN_PATH)]
    pub input: PathBuf,

    /// Configuration file (TOML or JSON)
    #[arg(long, short = 'c', env = "LOG_ANALYZER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Window granularity: minute, hour, day, or a width such as 15m / 90s
    #[arg(long, short = 'w')]
    pub window: Option<WindowGranularity>,

    /// A window is a burst when its errors reach mean x multiplier
    #[arg(long, short = 'm')]
    pub burst_multiplier: Option<f64>,

    /// Ignore entries before this time (inclusive)
    #[arg(long, value_parser = parse_time_bound)]
    pub since: Option<DateTime<Utc>>,

    /// Only analyze the trailing period up to now, e.g. 24h, 90m, 7d (bare numbers are hours)
    #[arg(long, value_parser = parse_lookback, conflicts_with = "since")]
    pub last: Option<Duration>,

    /// Ignore entries at or after this time
    #[arg(long, value_parser = parse_time_bound)]
    pub until: Option<DateTime<Utc>>,

    /// Number of error signatures to report
    #[arg(long, short = 't')]
    pub top: Option<usize>,

    /// Disable error cluster detection
    #[arg(long)]
    pub no_clusters: bool,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Diagnostic log level when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,
}

impl Args {
    pub fn reads_stdin(&self) -> bool {
        self.input.as_os_str() == STDIN_PATH
    }

    /**
     * 把命令行覆盖项写入配置并重新校验
     *
     * `--last` 以当前时间为基准换算成 `since`，分析核心本身不读取时钟。
     */
    pub fn apply_overrides(&self, config: &mut AnalyzerConfig) -> Result<(), ConfigError> {
        self.apply_overrides_at(config, Utc::now())
    }

    /// 以给定的“当前时间”应用覆盖项
    pub fn apply_overrides_at(
        &self,
        config: &mut AnalyzerConfig,
        now: DateTime<Utc>,
    ) -> Result<(), ConfigError> {
        if let Some(last) = self.last {
            let since = now.checked_sub_signed(last).ok_or_else(|| {
                ConfigError::InvalidValue(format!("--last {} reaches before the earliest time", last))
            })?;
            config.since = Some(since);
        }
        if let Some(window) = self.window {
            config.window_granularity = window;
        }
        if let Some(multiplier) = self.burst_multiplier {
            config.burst_multiplier = multiplier;
        }
        if let Some(since) = self.since {
            config.since = Some(since);
        }
        if let Some(until) = self.until {
            config.until = Some(until);
        }
        if let Some(top) = self.top {
            config.top_signatures = top;
        }
        if self.no_clusters {
            config.clusters.enabled = false;
        }
        config.check()
    }
}

/// 解析 `--since` / `--until`：RFC 3339、`YYYY-MM-DD HH:MM:SS`（UTC）或日期
pub fn parse_time_bound(value: &str) -> Result<DateTime<Utc>, String> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("invalid timestamp '{}': expected RFC 3339 or YYYY-MM-DD[ HH:MM:SS]", value))
}

/// 回溯时长上限：10 年
const MAX_LOOKBACK_SECONDS: u64 = 3_650 * 86_400;

/// 解析 `--last`：`30s`、`90m`、`24h`、`7d`，不带单位时按小时计
pub fn parse_lookback(value: &str) -> Result<Duration, String> {
    let value = value.trim().to_ascii_lowercase();
    let (digits, unit) = match value.chars().last() {
        Some('s') => (&value[..value.len() - 1], 1),
        Some('m') => (&value[..value.len() - 1], 60),
        Some('h') => (&value[..value.len() - 1], 3_600),
        Some('d') => (&value[..value.len() - 1], 86_400),
        _ => (value.as_str(), 3_600),
    };

    let amount: u64 = digits
        .parse()
        .map_err(|_| format!("invalid duration '{}': expected e.g. 24h, 90m, 7d", value))?;
    if amount == 0 {
        return Err("duration must be greater than zero".to_string());
    }

    amount
        .checked_mul(unit)
        .filter(|secs| *secs <= MAX_LOOKBACK_SECONDS)
        .map(|secs| Duration::seconds(secs as i64))
        .ok_or_else(|| format!("duration '{}' exceeds the maximum of 3650 days", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use clap::CommandFactory;
    use rstest::rstest;

    #[test]
    fn test_command_definition() {
        Args::command().debug_assert();
    }

    #[rstest]
    #[case("2024-01-01T10:00:00Z", 10)]
    #[case("2024-01-01T12:00:00+02:00", 10)]
    #[case("2024-01-01 10:00:00", 10)]
    #[case("2024-01-01", 0)]
    fn test_parse_time_bound(#[case] input: &str, #[case] hour: u32) {
        assert_eq!(
            parse_time_bound(input).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_time_bound_rejects_garbage() {
        assert!(parse_time_bound("yesterday").is_err());
    }

    #[rstest]
    #[case("24h", 24 * 3_600)]
    #[case("24", 24 * 3_600)]
    #[case("90m", 90 * 60)]
    #[case("7D", 7 * 86_400)]
    #[case("45s", 45)]
    fn test_parse_lookback(#[case] input: &str, #[case] seconds: i64) {
        assert_eq!(parse_lookback(input).unwrap(), Duration::seconds(seconds));
    }

    #[rstest]
    #[case("0h")]
    #[case("soon")]
    #[case("99999999999999999d")]
    #[case("4000d")]
    fn test_parse_lookback_rejects(#[case] input: &str) {
        assert!(parse_lookback(input).is_err());
    }

    #[test]
    fn test_last_sets_since_relative_to_now() {
        let args = Args::parse_from(["log-pattern-analyzer", "app.log", "--last", "6h"]);
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap();

        let mut config = AnalyzerConfig::default();
        args.apply_overrides_at(&mut config, now).unwrap();
        assert_eq!(config.since, Some(Utc.with_ymd_and_hms(2024, 1, 2, 6, 0, 0).unwrap()));
        assert_eq!(config.until, None);
    }

    #[test]
    fn test_last_conflicts_with_since() {
        let result = Args::try_parse_from([
            "log-pattern-analyzer",
            "--last",
            "6h",
            "--since",
            "2024-01-01",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_applied() {
        let args = Args::parse_from([
            "log-pattern-analyzer",
            "app.log",
            "--window",
            "15m",
            "--burst-multiplier",
            "3",
            "--top",
            "5",
            "--no-clusters",
            "--format",
            "json",
        ]);
        assert!(!args.reads_stdin());
        assert_eq!(args.format, OutputFormat::Json);

        let mut config = AnalyzerConfig::default();
        args.apply_overrides(&mut config).unwrap();
        assert_eq!(config.window_granularity, WindowGranularity::Seconds(900));
        assert_eq!(config.burst_multiplier, 3.0);
        assert_eq!(config.top_signatures, 5);
        assert!(!config.clusters.enabled);
    }

    #[test]
    fn test_invalid_override_is_config_error() {
        let args = Args::parse_from([
            "log-pattern-analyzer",
            "--since",
            "2024-01-02",
            "--until",
            "2024-01-01",
        ]);
        assert!(args.reads_stdin());

        let mut config = AnalyzerConfig::default();
        assert!(args.apply_overrides(&mut config).is_err());
    }
}
