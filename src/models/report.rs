//! 分析报告模型
//!
//! 一次分析运行的派生输出：创建后只读，可序列化为 JSON。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::TimeWindow;

/// 突发检测被跳过时的原因（有数据的窗口少于 2 个）
pub const INSUFFICIENT_DATA: &str = "insufficient data";

/// 单个时间窗口的分布统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSummary {
    pub window: TimeWindow,
    pub total_entries: u64,
    pub error_count: u64,
}

/// 被判定为突发的窗口
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurstWindow {
    pub window: TimeWindow,
    pub count: u64,
    /// 错误数达到阈值（≥），与突发判定使用同一条件
    pub threshold_exceeded: bool,
}

/// 基于窗口均值的突发检测结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurstAnalysis {
    pub bursts_detected: bool,
    /// 检测被跳过的原因；检测正常执行时为 `None`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub windows_considered: usize,
    pub mean_window_errors: f64,
    pub multiplier: f64,
    pub threshold: f64,
    pub detected_bursts: Vec<BurstWindow>,
}

impl BurstAnalysis {
    pub fn skipped(reason: &str, windows_considered: usize, multiplier: f64) -> Self {
        Self {
            bursts_detected: false,
            reason: Some(reason.to_string()),
            windows_considered,
            mean_window_errors: 0.0,
            multiplier,
            threshold: 0.0,
            detected_bursts: Vec::new(),
        }
    }

    pub fn was_skipped(&self) -> bool {
        self.reason.is_some()
    }
}

/// 错误簇：相邻错误间隔很短的一段连续错误
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorCluster {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_minutes: f64,
    pub error_count: usize,
    pub sample_errors: Vec<String>,
}

/// 高频错误签名
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureSummary {
    pub pattern: String,
    pub count: u64,
    /// 占全部错误的百分比（0-100）
    pub percentage: f64,
    /// 第一次出现时的原始消息
    pub example: String,
}

/// 分析报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// 非空输入行数 = parsed_count + unparsed_count
    pub total_entries: u64,
    pub parsed_count: u64,
    pub unparsed_count: u64,
    /// 已解析但落在 since/until 之外的条目
    pub out_of_range_count: u64,
    /// 参与聚合的条目数
    pub analyzed_count: u64,
    pub error_count: u64,
    /// 错误占参与聚合条目的比例（0.0-1.0）
    pub error_rate: f64,
    pub window_granularity: String,
    pub severity_distribution: BTreeMap<String, u64>,
    /// 每个有数据窗口的条目数与错误数，按窗口起点排序
    pub hourly_distribution: Vec<WindowSummary>,
    /// 按一天中的小时（UTC）统计的错误数
    pub hour_of_day_distribution: BTreeMap<u32, u64>,
    pub bursts: BurstAnalysis,
    pub error_clusters: Vec<ErrorCluster>,
    pub top_signatures: Vec<SignatureSummary>,
    pub unparsed_reasons: BTreeMap<String, u64>,
    pub recommendations: Vec<String>,
}

impl AnalysisReport {
    /// 各窗口错误数之和，恒等于 `error_count`
    pub fn window_error_sum(&self) -> u64 {
        self.hourly_distribution.iter().map(|w| w.error_count).sum()
    }

    /// 错误百分比（0-100），便于展示
    pub fn error_percentage(&self) -> f64 {
        self.error_rate * 100.0
    }
}
