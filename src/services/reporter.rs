//! 报告生成
//!
//! 聚合状态 → `AnalysisReport` 的纯函数，不读取当前时间，不产生副作用。

use chrono::Duration;

use crate::infrastructure::config::{AnalyzerConfig, RecommendationConfig};
use crate::models::{AnalysisReport, BurstAnalysis, ErrorCluster, SignatureSummary, WindowSummary};
use crate::services::aggregator::AggregationState;
use crate::services::burst_detector::{detect_bursts, detect_clusters};

/// 建议中签名文本的最大字符数
const PATTERN_PREVIEW_CHARS: usize = 100;

/// 根据聚合状态生成报告
pub fn build_report(state: &AggregationState, config: &AnalyzerConfig) -> AnalysisReport {
    let analyzed_count = state.analyzed_count();
    let error_rate = if analyzed_count > 0 {
        state.error_count as f64 / analyzed_count as f64
    } else {
        0.0
    };

    let bursts = detect_bursts(&state.buckets, config.burst_multiplier);

    let error_clusters = if config.clusters.enabled {
        detect_clusters(
            &state.error_marks,
            Duration::seconds(config.clusters.gap_seconds as i64),
            config.clusters.min_errors,
        )
    } else {
        Vec::new()
    };

    let top_signatures = top_signatures(state, config.top_signatures);

    let recommendations = recommend(
        state,
        &top_signatures,
        &bursts,
        &error_clusters,
        &config.recommendations,
    );

    AnalysisReport {
        total_entries: state.total_entries(),
        parsed_count: state.parsed_count,
        unparsed_count: state.unparsed_count,
        out_of_range_count: state.out_of_range_count,
        analyzed_count,
        error_count: state.error_count,
        error_rate,
        window_granularity: config.window_granularity.to_string(),
        severity_distribution: state
            .severity_counts
            .iter()
            .map(|(severity, count)| (severity.as_str().to_string(), *count))
            .collect(),
        hourly_distribution: state
            .buckets
            .values()
            .map(|bucket| WindowSummary {
                window: bucket.window,
                total_entries: bucket.total_entries,
                error_count: bucket.error_count,
            })
            .collect(),
        hour_of_day_distribution: state.hour_of_day_errors.clone(),
        bursts,
        error_clusters,
        top_signatures,
        unparsed_reasons: state.unparsed_reasons.clone(),
        recommendations,
    }
}

/// 按次数降序、首次出现顺序升序取前 `limit` 个签名
fn top_signatures(state: &AggregationState, limit: usize) -> Vec<SignatureSummary> {
    let mut ranked: Vec<_> = state.signatures.iter().collect();
    ranked.sort_by(|(_, a), (_, b)| b.count.cmp(&a.count).then(a.first_seen.cmp(&b.first_seen)));

    ranked
        .into_iter()
        .take(limit)
        .map(|(pattern, stats)| SignatureSummary {
            pattern: pattern.clone(),
            count: stats.count,
            percentage: percentage(stats.count, state.error_count),
            example: stats.example.clone(),
        })
        .collect()
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() <= PATTERN_PREVIEW_CHARS {
        text.to_string()
    } else {
        let head: String = text.chars().take(PATTERN_PREVIEW_CHARS).collect();
        format!("{}...", head)
    }
}

/// 基于启发式阈值生成排查建议
fn recommend(
    state: &AggregationState,
    signatures: &[SignatureSummary],
    bursts: &BurstAnalysis,
    clusters: &[ErrorCluster],
    thresholds: &RecommendationConfig,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    for signature in signatures
        .iter()
        .take(thresholds.max_listed)
        .filter(|s| s.count > thresholds.frequent_signature_min)
    {
        recommendations.push(format!(
            "Investigate frequent error pattern ({:.1}% of errors): {}",
            signature.percentage,
            preview(&signature.pattern)
        ));
    }

    if !clusters.is_empty() {
        recommendations.push(format!(
            "Examine {} error clusters that may indicate systemic issues",
            clusters.len()
        ));
        for (i, cluster) in clusters.iter().take(thresholds.max_listed).enumerate() {
            recommendations.push(format!(
                "  Cluster {}: {} errors in {:.1} minutes at {}",
                i + 1,
                cluster.error_count,
                cluster.duration_minutes,
                cluster.start_time.format("%Y-%m-%d %H:%M:%S")
            ));
        }
    }

    for burst in &bursts.detected_bursts {
        recommendations.push(format!(
            "Error burst in window {}: {} errors (threshold {:.1})",
            burst.window, burst.count, bursts.threshold
        ));
    }

    // 并列时取较早的小时
    let peak = state
        .hour_of_day_errors
        .iter()
        .fold(None, |best: Option<(u32, u64)>, (&hour, &count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((hour, count)),
        });
    if let Some((hour, count)) = peak {
        if count as f64 > state.error_count as f64 * thresholds.peak_hour_share {
            recommendations.push(format!(
                "Check for scheduled jobs at hour {}:00 that may be causing {} errors ({:.1}% of total)",
                hour,
                count,
                percentage(count, state.error_count)
            ));
        }
    }

    recommendations
}
