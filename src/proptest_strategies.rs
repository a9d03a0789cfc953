//! Property-based testing strategies and helpers
//!
//! Shared proptest strategies for log-line generation.

use proptest::prelude::*;
use proptest::test_runner::Config;

/// Standard proptest configuration for property-based tests
pub fn proptest_config() -> Config {
    Config {
        cases: 256,
        max_shrink_iters: 10000,
        ..Config::default()
    }
}

pub mod strategies {
    use super::*;

    /// 日志级别标记（含别名与大小写变体）
    pub fn level_token() -> impl Strategy<Value = String> {
        prop::sample::select(vec![
            "INFO", "info", "DEBUG", "WARN", "WARNING", "ERROR", "error", "ERR", "CRITICAL",
            "FATAL",
        ])
        .prop_map(|s| s.to_string())
    }

    /// 消息正文：单词、数字、IP 与路径混合
    pub fn message() -> impl Strategy<Value = String> {
        prop::collection::vec(
            prop_oneof![
                "[a-z]{2,10}",
                (0u32..100_000).prop_map(|n| n.to_string()),
                (0u8..=255, 0u8..=255).prop_map(|(a, b)| format!("10.0.{}.{}", a, b)),
                "(/[a-z]{1,8}){1,3}",
            ],
            1..8,
        )
        .prop_map(|words| words.join(" "))
    }

    /// 同一天内的时间戳文本（RFC 3339 与空格分隔两种写法）
    pub fn timestamp_text() -> impl Strategy<Value = String> {
        (0u32..24, 0u32..60, 0u32..60, any::<bool>()).prop_map(|(h, m, s, rfc)| {
            if rfc {
                format!("2024-03-15T{:02}:{:02}:{:02}Z", h, m, s)
            } else {
                format!("2024-03-15 {:02}:{:02}:{:02}", h, m, s)
            }
        })
    }

    /// 一行格式良好的日志
    pub fn valid_line() -> impl Strategy<Value = String> {
        (timestamp_text(), level_token(), message())
            .prop_map(|(ts, level, msg)| format!("{} {} {}", ts, level, msg))
    }

    /// 一行任意文本（可能为空、可能是垃圾）
    pub fn noise_line() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(String::new()),
            "[ -~]{0,60}",
            Just("2024-01-01TXX:XX:XX INVALID garbage".to_string()),
        ]
    }

    /// 混合输入：大部分是有效行，夹杂噪声行
    pub fn log_lines(max: usize) -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(
            prop_oneof![4 => valid_line(), 1 => noise_line()],
            0..max,
        )
    }
}
