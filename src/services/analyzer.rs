//! 日志分析器
//!
//! 线性流水线：解析 → 聚合 → 报告。没有状态机、没有重试；
//! 调用方提前停止喂入时，`finish()` 返回的部分结果同样自洽。

use std::io::BufRead;
use std::path::Path;
use tracing::{debug, info, instrument, trace};

use crate::error::{AppError, Result};
use crate::infrastructure::config::{AnalyzerConfig, ConfigError};
use crate::infrastructure::source::{open_log_file, LogLines};
use crate::models::AnalysisReport;
use crate::services::aggregator::{AggregationState, Aggregator};
use crate::services::line_parser::{LineParser, ParseOutcome};
use crate::services::reporter::build_report;
use crate::services::signature::SignatureNormalizer;

/**
 * 日志分析器
 *
 * 构建时完成全部配置校验与正则编译，非法配置在处理任何输入之前失败。
 * 分析器本身无可变状态，可重复用于多次独立运行。
 */
pub struct LogAnalyzer {
    config: AnalyzerConfig,
    parser: LineParser,
    normalizer: SignatureNormalizer,
}

impl LogAnalyzer {
    pub fn new(config: AnalyzerConfig) -> std::result::Result<Self, ConfigError> {
        config.check()?;
        let parser = LineParser::new(&config)?;
        let normalizer = SignatureNormalizer::from_rules(&config.signature_normalization_rules)?;

        debug!(
            window = %config.window_granularity,
            burst_multiplier = config.burst_multiplier,
            rules = ?normalizer.rule_names(),
            "Log analyzer configured"
        );

        Ok(Self {
            config,
            parser,
            normalizer,
        })
    }

    pub fn with_defaults() -> std::result::Result<Self, ConfigError> {
        Self::new(AnalyzerConfig::default())
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// 开启一次增量分析
    pub fn session(&self) -> AnalysisSession<'_> {
        AnalysisSession {
            parser: &self.parser,
            config: &self.config,
            aggregator: Aggregator::new(&self.normalizer, &self.config),
            line_number: 0,
        }
    }

    /// 分析内存中的行序列（不会失败）
    pub fn analyze_lines<I, S>(&self, lines: I) -> AnalysisReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut session = self.session();
        for line in lines {
            session.feed_line(line.as_ref());
        }
        session.finish()
    }

    /**
     * 分析任意 `BufRead` 输入
     *
     * # 参数
     * * `reader` - 输入流
     * * `source` - 用于错误信息的输入名称（文件路径或 `<stdin>`）
     *
     * 读取失败时整次运行失败，不返回部分报告。
     */
    pub fn analyze_reader<R: BufRead>(&self, reader: R, source: &Path) -> Result<AnalysisReport> {
        let mut session = self.session();
        let mut lines = LogLines::new(reader);
        for line in lines.by_ref() {
            let line = line.map_err(|e| AppError::input_unavailable(source, e))?;
            session.feed_line(&line);
        }

        if lines.lossy_lines() > 0 {
            debug!(
                source = %source.display(),
                lossy_lines = lines.lossy_lines(),
                "Some lines required lossy decoding"
            );
        }

        Ok(session.finish())
    }

    /// 分析日志文件
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn analyze_file(&self, path: &Path) -> Result<AnalysisReport> {
        let mut session = self.session();
        for line in open_log_file(path)? {
            let line = line.map_err(|e| AppError::input_unavailable(path, e))?;
            session.feed_line(&line);
        }
        Ok(session.finish())
    }
}

/// 一次分析运行的增量会话
pub struct AnalysisSession<'a> {
    parser: &'a LineParser,
    config: &'a AnalyzerConfig,
    aggregator: Aggregator<'a>,
    line_number: u64,
}

impl<'a> AnalysisSession<'a> {
    /// 喂入一行；解析失败的行在这里被跳过并计数
    pub fn feed_line(&mut self, line: &str) {
        self.line_number += 1;
        match self.parser.parse(line, self.line_number) {
            ParseOutcome::Parsed(entry) => self.aggregator.record_entry(&entry),
            ParseOutcome::Failed(failure) => {
                trace!(line = self.line_number, reason = failure.reason(), "Skipping line: {}", failure);
                self.aggregator.record_failure(&failure);
            }
            ParseOutcome::Blank => {}
        }
    }

    /// 已喂入的行数（含空行）
    pub fn lines_seen(&self) -> u64 {
        self.line_number
    }

    pub fn state(&self) -> &AggregationState {
        self.aggregator.state()
    }

    /// 基于当前已累积状态生成报告，不结束会话
    pub fn snapshot(&self) -> AnalysisReport {
        build_report(self.aggregator.state(), self.config)
    }

    /// 结束会话并生成最终报告
    pub fn finish(self) -> AnalysisReport {
        let report = build_report(self.aggregator.state(), self.config);
        info!(
            total_entries = report.total_entries,
            unparsed = report.unparsed_count,
            errors = report.error_count,
            windows = report.hourly_distribution.len(),
            bursts = report.bursts.detected_bursts.len(),
            "Log analysis complete"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_invalid_config_fails_fast() {
        let config = AnalyzerConfig {
            burst_multiplier: 0.0,
            ..AnalyzerConfig::default()
        };
        assert!(LogAnalyzer::new(config).is_err());

        let mut config = AnalyzerConfig::default();
        config.signature_normalization_rules[0].pattern = "([".to_string();
        assert!(matches!(
            LogAnalyzer::new(config),
            Err(ConfigError::InvalidPattern { .. })
        ));

        let config = AnalyzerConfig {
            window_granularity: crate::domain::WindowGranularity::Seconds(u64::MAX),
            ..AnalyzerConfig::default()
        };
        assert!(matches!(
            LogAnalyzer::new(config),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_session_partial_results_are_consistent() {
        let analyzer = LogAnalyzer::with_defaults().unwrap();
        let mut session = analyzer.session();

        session.feed_line("2024-01-01T10:00:00Z ERROR first failure");
        session.feed_line("not a log line");
        let partial = session.snapshot();
        assert_eq!(partial.total_entries, 2);
        assert_eq!(partial.error_count, 1);

        session.feed_line("");
        session.feed_line("2024-01-01T11:00:00Z INFO recovered");
        assert_eq!(session.lines_seen(), 4);

        let report = session.finish();
        assert_eq!(report.total_entries, 3);
        assert_eq!(report.parsed_count, 2);
        assert_eq!(report.unparsed_count, 1);
        assert_eq!(report.window_error_sum(), report.error_count);
    }

    #[test]
    fn test_level_prefixed_words_are_not_errors() {
        let analyzer = LogAnalyzer::with_defaults().unwrap();
        let report = analyzer.analyze_lines([
            "2024-01-01T10:00:00Z error-handler registered",
            "2024-01-01T10:00:01Z information updated",
        ]);

        assert_eq!(report.parsed_count, 2);
        assert_eq!(report.error_count, 0);
        assert!(report.top_signatures.is_empty());
        assert_eq!(report.severity_distribution.get("UNKNOWN"), Some(&2));
    }

    #[test]
    fn test_analyze_reader() {
        let analyzer = LogAnalyzer::with_defaults().unwrap();
        let input = Cursor::new(
            "2024-01-01T10:00:00Z ERROR user 1 not found\n2024-01-01T10:05:00Z ERROR user 2 not found\n",
        );

        let report = analyzer.analyze_reader(input, Path::new("<memory>")).unwrap();
        assert_eq!(report.error_count, 2);
        assert_eq!(report.top_signatures[0].pattern, "user <NUM> not found");
        assert_eq!(report.top_signatures[0].count, 2);
    }

    #[test]
    fn test_analyze_missing_file() {
        let analyzer = LogAnalyzer::with_defaults().unwrap();
        let result = analyzer.analyze_file(Path::new("/no/such/file.log"));
        assert!(matches!(result, Err(AppError::InputUnavailable { .. })));
    }
}
