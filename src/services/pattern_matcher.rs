use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};

use crate::domain::Severity;
use crate::infrastructure::config::ConfigError;

/**
 * 级别标记匹配器 - 使用 Aho-Corasick 在整行中查找 `[ERROR]` 之类的级别标记
 *
 * 当行格式正则没有捕获到级别时作为回退：级别标记不一定紧跟在时间戳之后，
 * 例如 `2024-01-01 10:00:00 [worker-3] [ERROR] job failed`。
 * 匹配大小写不敏感，只识别方括号包裹的完整标记。
 */
pub struct SeverityMatcher {
    ac: AhoCorasick,
    severities: Vec<Severity>,
}

/// 一次级别标记匹配
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityMatch {
    pub severity: Severity,
    /// 标记结束处的字节偏移，其后即为消息正文
    pub end: usize,
}

impl SeverityMatcher {
    /**
     * 创建新的级别标记匹配器
     *
     * 标记集合来自 `Severity::tokens()`，每个标记以 `[TOKEN]` 形式参与匹配。
     */
    pub fn new() -> Result<Self, ConfigError> {
        let (patterns, severities): (Vec<String>, Vec<Severity>) = Severity::tokens()
            .iter()
            .map(|(token, severity)| (format!("[{}]", token), *severity))
            .unzip();

        let ac = AhoCorasickBuilder::new()
            .match_kind(MatchKind::LeftmostFirst)
            .ascii_case_insensitive(true)
            .build(&patterns)
            .map_err(|e| ConfigError::InvalidPattern {
                name: "severity_tokens".to_string(),
                message: e.to_string(),
            })?;

        Ok(Self { ac, severities })
    }

    /**
     * 查找行中第一个级别标记
     *
     * # 返回
     * * `Some(SeverityMatch)` - 最靠左的标记
     * * `None` - 行中没有可识别的标记
     */
    pub fn find(&self, text: &str) -> Option<SeverityMatch> {
        self.ac.find(text).map(|mat| SeverityMatch {
            severity: self.severities[mat.pattern().as_usize()],
            end: mat.end(),
        })
    }
}
