//! 日志模式分析器
//!
//! 解析纯文本应用日志，按时间窗口聚合错误，归一化错误签名，
//! 并用简单的统计离群规则标记错误突发窗口。
//!
//! ```no_run
//! use log_pattern_analyzer::services::LogAnalyzer;
//!
//! let analyzer = LogAnalyzer::with_defaults()?;
//! let report = analyzer.analyze_lines([
//!     "2024-01-01T10:00:00Z ERROR user 1234 not found",
//!     "2024-01-01T11:00:00Z INFO recovered",
//! ]);
//! assert_eq!(report.error_count, 1);
//! # Ok::<(), log_pattern_analyzer::infrastructure::config::ConfigError>(())
//! ```

pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod output;
pub mod services;
pub mod utils;

#[cfg(test)]
mod proptest_strategies;

pub use error::{AppError, Result};
pub use infrastructure::config::{load_config, load_config_with_env, AnalyzerConfig, ConfigError};
pub use models::AnalysisReport;
pub use services::{AnalysisSession, LogAnalyzer};
