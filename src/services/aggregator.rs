//! 聚合器
//!
//! 对解析后的条目做单遍折叠。状态大小与不同窗口数、不同签名数成正比，
//! 与输入规模无关（启用错误簇检测时额外保留每条错误的时间戳与消息）。
//! 调用方随时停止喂入，已累积的状态依然自洽。

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};

use crate::domain::{LogEntry, Severity, TimeWindow, WindowGranularity};
use crate::infrastructure::config::AnalyzerConfig;
use crate::services::line_parser::ParseFailure;
use crate::services::signature::SignatureNormalizer;

/// 单个时间窗口的聚合桶
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorBucket {
    pub window: TimeWindow,
    pub total_entries: u64,
    pub error_count: u64,
    pub signatures: BTreeMap<String, u64>,
}

impl ErrorBucket {
    fn new(window: TimeWindow) -> Self {
        Self {
            window,
            total_entries: 0,
            error_count: 0,
            signatures: BTreeMap::new(),
        }
    }
}

/// 签名计数
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureStats {
    pub count: u64,
    /// 首次出现的顺序号，用于同频签名的确定性排序
    pub first_seen: u64,
    pub example: String,
}

/// 错误簇检测所需的单条错误记录
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorMark {
    pub timestamp: DateTime<Utc>,
    pub line_number: u64,
    pub message: String,
}

/// 聚合状态
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationState {
    pub parsed_count: u64,
    pub unparsed_count: u64,
    pub out_of_range_count: u64,
    pub error_count: u64,
    pub unparsed_reasons: BTreeMap<String, u64>,
    /// 窗口起点 → 桶
    pub buckets: BTreeMap<DateTime<Utc>, ErrorBucket>,
    pub signatures: HashMap<String, SignatureStats>,
    pub severity_counts: BTreeMap<Severity, u64>,
    pub hour_of_day_errors: BTreeMap<u32, u64>,
    pub error_marks: Vec<ErrorMark>,
}

impl AggregationState {
    pub fn total_entries(&self) -> u64 {
        self.parsed_count + self.unparsed_count
    }

    pub fn analyzed_count(&self) -> u64 {
        self.parsed_count - self.out_of_range_count
    }
}

/**
 * 聚合器
 *
 * 只有错误级别（ERROR / CRITICAL）且消息非空的条目参与签名统计。
 */
pub struct Aggregator<'a> {
    normalizer: &'a SignatureNormalizer,
    granularity: WindowGranularity,
    since: Option<DateTime<Utc>>,
    until: Option<DateTime<Utc>>,
    track_error_marks: bool,
    state: AggregationState,
}

impl<'a> Aggregator<'a> {
    pub fn new(normalizer: &'a SignatureNormalizer, config: &AnalyzerConfig) -> Self {
        Self {
            normalizer,
            granularity: config.window_granularity,
            since: config.since,
            until: config.until,
            track_error_marks: config.clusters.enabled,
            state: AggregationState::default(),
        }
    }

    fn in_range(&self, timestamp: &DateTime<Utc>) -> bool {
        self.since.map_or(true, |since| *timestamp >= since)
            && self.until.map_or(true, |until| *timestamp < until)
    }

    /// 折叠一条已解析的条目
    pub fn record_entry(&mut self, entry: &LogEntry) {
        self.state.parsed_count += 1;

        if !self.in_range(&entry.timestamp) {
            self.state.out_of_range_count += 1;
            return;
        }

        *self.state.severity_counts.entry(entry.severity).or_insert(0) += 1;

        let window = entry.window(self.granularity);
        let bucket = self
            .state
            .buckets
            .entry(window.start)
            .or_insert_with(|| ErrorBucket::new(window));
        bucket.total_entries += 1;

        if !entry.is_error() {
            return;
        }

        bucket.error_count += 1;
        self.state.error_count += 1;
        *self
            .state
            .hour_of_day_errors
            .entry(entry.hour_of_day())
            .or_insert(0) += 1;

        if !entry.message.is_empty() {
            let signature = self.normalizer.normalize(entry.message.as_str());
            *bucket.signatures.entry(signature.clone()).or_insert(0) += 1;

            let next_seq = self.state.signatures.len() as u64;
            self.state
                .signatures
                .entry(signature)
                .or_insert_with(|| SignatureStats {
                    count: 0,
                    first_seen: next_seq,
                    example: entry.message.as_str().to_string(),
                })
                .count += 1;
        }

        if self.track_error_marks {
            self.state.error_marks.push(ErrorMark {
                timestamp: entry.timestamp,
                line_number: entry.line_number,
                message: entry.message.as_str().to_string(),
            });
        }
    }

    /// 记录一行解析失败：跳过并计数
    pub fn record_failure(&mut self, failure: &ParseFailure) {
        self.state.unparsed_count += 1;
        *self
            .state
            .unparsed_reasons
            .entry(failure.reason().to_string())
            .or_insert(0) += 1;
    }

    pub fn state(&self) -> &AggregationState {
        &self.state
    }

    pub fn into_state(self) -> AggregationState {
        self.state
    }
}
