//! 突发检测
//!
//! 两种互补的检测方式：
//! - **窗口突发**：窗口错误数 ≥ 窗口平均错误数 × 倍数（简单的统计离群规则）
//! - **错误簇**：按时间排序后，相邻错误间隔不超过阈值的连续错误段

use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

use crate::models::{BurstAnalysis, BurstWindow, ErrorCluster, INSUFFICIENT_DATA};
use crate::services::aggregator::{ErrorBucket, ErrorMark};

/// 每个错误簇保留的示例消息数
const CLUSTER_SAMPLE_SIZE: usize = 3;

/**
 * 窗口突发检测
 *
 * 参与计算的窗口是所有包含至少一条条目的窗口（无论是否有错误）。
 * 少于 2 个窗口时没有基线，直接跳过。
 */
pub fn detect_bursts(buckets: &BTreeMap<DateTime<Utc>, ErrorBucket>, multiplier: f64) -> BurstAnalysis {
    let windows_considered = buckets.len();
    if windows_considered < 2 {
        return BurstAnalysis::skipped(INSUFFICIENT_DATA, windows_considered, multiplier);
    }

    let total_errors: u64 = buckets.values().map(|b| b.error_count).sum();
    let mean = total_errors as f64 / windows_considered as f64;
    let threshold = mean * multiplier;

    let reaches_threshold =
        |bucket: &ErrorBucket| bucket.error_count > 0 && bucket.error_count as f64 >= threshold;

    let detected_bursts: Vec<BurstWindow> = buckets
        .values()
        .filter(|bucket| reaches_threshold(bucket))
        .map(|bucket| BurstWindow {
            window: bucket.window,
            count: bucket.error_count,
            threshold_exceeded: reaches_threshold(bucket),
        })
        .collect();

    BurstAnalysis {
        bursts_detected: !detected_bursts.is_empty(),
        reason: None,
        windows_considered,
        mean_window_errors: mean,
        multiplier,
        threshold,
        detected_bursts,
    }
}

/**
 * 错误簇检测
 *
 * # 参数
 * * `marks` - 错误记录（任意顺序）
 * * `max_gap` - 相邻错误的最大间隔
 * * `min_errors` - 成簇所需的最少错误数
 */
pub fn detect_clusters(marks: &[ErrorMark], max_gap: Duration, min_errors: usize) -> Vec<ErrorCluster> {
    let mut sorted: Vec<&ErrorMark> = marks.iter().collect();
    sorted.sort_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then(a.line_number.cmp(&b.line_number))
    });

    let mut clusters = Vec::new();
    let mut current: Vec<&ErrorMark> = Vec::new();

    for mark in sorted {
        if let Some(previous) = current.last() {
            if mark.timestamp - previous.timestamp > max_gap {
                flush_cluster(&current, min_errors, &mut clusters);
                current.clear();
            }
        }
        current.push(mark);
    }
    flush_cluster(&current, min_errors, &mut clusters);

    clusters
}

fn flush_cluster(current: &[&ErrorMark], min_errors: usize, clusters: &mut Vec<ErrorCluster>) {
    if current.len() < min_errors {
        return;
    }
    let (Some(first), Some(last)) = (current.first(), current.last()) else {
        return;
    };

    clusters.push(ErrorCluster {
        start_time: first.timestamp,
        end_time: last.timestamp,
        duration_minutes: (last.timestamp - first.timestamp).num_milliseconds() as f64 / 60_000.0,
        error_count: current.len(),
        sample_errors: current
            .iter()
            .take(CLUSTER_SAMPLE_SIZE)
            .map(|mark| mark.message.clone())
            .collect(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WindowGranularity;
    use chrono::TimeZone;

    fn buckets(counts: &[(u32, u64)]) -> BTreeMap<DateTime<Utc>, ErrorBucket> {
        counts
            .iter()
            .map(|(hour, errors)| {
                let ts = Utc.with_ymd_and_hms(2024, 1, 1, *hour, 0, 0).unwrap();
                let window = WindowGranularity::Hour.window_of(&ts);
                (
                    window.start,
                    ErrorBucket {
                        window,
                        total_entries: errors + 10,
                        error_count: *errors,
                        signatures: BTreeMap::new(),
                    },
                )
            })
            .collect()
    }

    fn mark(minute: u32, second: u32, line: u64) -> ErrorMark {
        ErrorMark {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 10, minute, second).unwrap(),
            line_number: line,
            message: format!("error {}", line),
        }
    }

    #[test]
    fn test_single_window_is_insufficient() {
        let analysis = detect_bursts(&buckets(&[(10, 50)]), 2.0);
        assert!(!analysis.bursts_detected);
        assert!(analysis.was_skipped());
        assert_eq!(analysis.reason.as_deref(), Some(INSUFFICIENT_DATA));
        assert_eq!(analysis.windows_considered, 1);
    }

    #[test]
    fn test_threshold_reached_exactly_is_burst() {
        let analysis = detect_bursts(&buckets(&[(10, 10), (11, 0)]), 2.0);
        assert_eq!(analysis.mean_window_errors, 5.0);
        assert_eq!(analysis.threshold, 10.0);
        assert!(analysis.bursts_detected);
        assert_eq!(analysis.detected_bursts.len(), 1);
        assert_eq!(analysis.detected_bursts[0].count, 10);
        assert!(analysis.detected_bursts[0].threshold_exceeded);
    }

    #[test]
    fn test_even_distribution_has_no_burst() {
        let analysis = detect_bursts(&buckets(&[(10, 4), (11, 5), (12, 6)]), 2.0);
        assert!(!analysis.bursts_detected);
        assert!(!analysis.was_skipped());
        assert!(analysis.detected_bursts.is_empty());
    }

    #[test]
    fn test_zero_error_windows_never_burst() {
        let analysis = detect_bursts(&buckets(&[(10, 0), (11, 0)]), 2.0);
        assert!(!analysis.bursts_detected);
        assert_eq!(analysis.threshold, 0.0);
    }

    #[test]
    fn test_clusters_split_on_gap() {
        let mut marks: Vec<ErrorMark> = (0..5).map(|i| mark(0, i * 30, i as u64 + 1)).collect();
        // 间隔 20 分钟后的第二段，只有 2 条，不成簇
        marks.push(mark(25, 0, 6));
        marks.push(mark(26, 0, 7));

        let clusters = detect_clusters(&marks, Duration::minutes(5), 5);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].error_count, 5);
        assert_eq!(clusters[0].duration_minutes, 2.0);
        assert_eq!(clusters[0].sample_errors, vec!["error 1", "error 2", "error 3"]);
    }

    #[test]
    fn test_clusters_sorted_regardless_of_input_order() {
        let mut marks: Vec<ErrorMark> = (0..6).map(|i| mark(i, 0, i as u64 + 1)).collect();
        marks.reverse();

        let clusters = detect_clusters(&marks, Duration::minutes(5), 5);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].error_count, 6);
        assert_eq!(clusters[0].start_time, mark(0, 0, 1).timestamp);
        assert_eq!(clusters[0].end_time, mark(5, 0, 6).timestamp);
    }

    #[test]
    fn test_no_marks_no_clusters() {
        assert!(detect_clusters(&[], Duration::minutes(5), 5).is_empty());
    }
}
