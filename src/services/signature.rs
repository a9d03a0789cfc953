//! 错误签名归一化
//!
//! 把错误消息中的可变片段（数字、UUID、IP、路径……）替换为占位符，
//! 使 `user 1234 not found` 与 `user 5678 not found` 归为同一签名。
//! 规则是按顺序执行的正则替换，完全来自配置。

use regex::Regex;
use std::borrow::Cow;

use crate::infrastructure::config::{ConfigError, NormalizationRule};

struct CompiledRule {
    name: String,
    regex: Regex,
    replacement: String,
}

/// 签名归一化器
pub struct SignatureNormalizer {
    rules: Vec<CompiledRule>,
}

impl SignatureNormalizer {
    /// 编译规则；任意一条正则非法即返回配置错误
    pub fn from_rules(rules: &[NormalizationRule]) -> Result<Self, ConfigError> {
        let rules = rules
            .iter()
            .map(|rule| {
                Regex::new(&rule.pattern)
                    .map(|regex| CompiledRule {
                        name: rule.name.clone(),
                        regex,
                        replacement: rule.replacement.clone(),
                    })
                    .map_err(|e| ConfigError::InvalidPattern {
                        name: rule.name.clone(),
                        message: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { rules })
    }

    /// 规则名称（按执行顺序）
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.name.as_str()).collect()
    }

    /// 归一化一条错误消息
    pub fn normalize(&self, message: &str) -> String {
        let mut current: Cow<'_, str> = Cow::Borrowed(message.trim());
        for rule in &self.rules {
            let replaced = match rule.regex.replace_all(&current, rule.replacement.as_str()) {
                Cow::Owned(replaced) => Some(replaced),
                Cow::Borrowed(_) => None,
            };
            if let Some(replaced) = replaced {
                current = Cow::Owned(replaced);
            }
        }
        current.into_owned()
    }
}
