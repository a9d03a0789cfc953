//! 结构化日志初始化
//!
//! 诊断日志统一写到 stderr，stdout 只输出分析报告。

use tracing_subscriber::EnvFilter;

/// 初始化 tracing 订阅者
///
/// `RUST_LOG` 优先；未设置时使用 `default_level`。
/// 重复初始化（例如测试中）返回 `false` 而不是 panic。
pub fn init_logging(default_level: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_harmless() {
        let _ = init_logging("warn");
        assert!(!init_logging("debug"));
    }
}
