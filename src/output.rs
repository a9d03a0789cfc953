//! 报告渲染：纯文本摘要与 JSON

use std::fmt::Write;

use crate::error::Result;
use crate::models::AnalysisReport;

const PREVIEW_CHARS: usize = 100;

fn truncate(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}

/// JSON 输出（格式化缩进）
pub fn render_json(report: &AnalysisReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/**
 * 纯文本摘要
 *
 * 写入 `String` 不会失败，`writeln!` 的返回值可以忽略。
 */
pub fn render_text(report: &AnalysisReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Log Analysis Results:");
    let _ = writeln!(out, "Total lines analysed: {}", report.total_entries);
    let _ = writeln!(
        out,
        "Parsed: {}  Unparsed: {}  Out of range: {}",
        report.parsed_count, report.unparsed_count, report.out_of_range_count
    );
    let _ = writeln!(
        out,
        "Error logs found: {} ({:.2}%)",
        report.error_count,
        report.error_percentage()
    );

    if !report.severity_distribution.is_empty() {
        let levels: Vec<String> = report
            .severity_distribution
            .iter()
            .map(|(level, count)| format!("{}={}", level, count))
            .collect();
        let _ = writeln!(out, "Severity: {}", levels.join(" "));
    }

    if !report.hourly_distribution.is_empty() {
        let _ = writeln!(out, "\nErrors per {} window:", report.window_granularity);
        for window in &report.hourly_distribution {
            let _ = writeln!(
                out,
                "  {}  {:>6} errors / {:>6} entries",
                window.window.start.format("%Y-%m-%d %H:%M:%S"),
                window.error_count,
                window.total_entries
            );
        }
    }

    let bursts = &report.bursts;
    let _ = writeln!(out, "\nBurst Detection:");
    match &bursts.reason {
        Some(reason) => {
            let _ = writeln!(out, "  skipped ({})", reason);
        }
        None => {
            let _ = writeln!(
                out,
                "  mean {:.2} errors/window over {} windows, threshold {:.2} (x{})",
                bursts.mean_window_errors,
                bursts.windows_considered,
                bursts.threshold,
                bursts.multiplier
            );
            if bursts.detected_bursts.is_empty() {
                let _ = writeln!(out, "  no bursts detected");
            }
            for burst in &bursts.detected_bursts {
                let _ = writeln!(out, "  BURST {}: {} errors", burst.window, burst.count);
            }
        }
    }

    if !report.top_signatures.is_empty() {
        let _ = writeln!(out, "\nTop Error Patterns:");
        for (i, signature) in report.top_signatures.iter().enumerate() {
            let _ = writeln!(
                out,
                "{}. [{} occurrences] {}",
                i + 1,
                signature.count,
                truncate(&signature.pattern)
            );
            let _ = writeln!(out, "   Example: {}", truncate(&signature.example));
        }
    }

    if !report.recommendations.is_empty() {
        let _ = writeln!(out, "\nRecommendations:");
        for (i, recommendation) in report.recommendations.iter().enumerate() {
            let _ = writeln!(out, "{}. {}", i + 1, recommendation);
        }
    }

    out
}
