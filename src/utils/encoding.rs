//! 日志行解码
//!
//! 输入文件不保证是合法 UTF-8。单行解码失败不应中断整次分析，
//! 因此按三层容错策略逐行解码：
//!
//! 1. **UTF-8 快速路径**：合法 UTF-8 直接借用
//! 2. **Lossy 转换**：少量无效字节替换为 `U+FFFD`
//! 3. **多编码回退**：无效字节占比过高时尝试 GBK → Windows-1252

use encoding_rs::{GBK, WINDOWS_1252};
use std::borrow::Cow;

/// 无效字节占比超过该值时认为不是 UTF-8，转而尝试回退编码
const FALLBACK_INVALID_RATIO: f64 = 0.3;

/// 解码结果使用的编码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEncoding {
    Utf8,
    Utf8Lossy,
    Gbk,
    Windows1252,
}

impl LineEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEncoding::Utf8 => "UTF-8",
            LineEncoding::Utf8Lossy => "UTF-8-Lossy",
            LineEncoding::Gbk => "GBK",
            LineEncoding::Windows1252 => "Windows-1252",
        }
    }

    /// 是否丢失或替换了原始字节
    pub fn is_lossy(&self) -> bool {
        !matches!(self, LineEncoding::Utf8)
    }
}

/// 去掉行尾的 `\n` / `\r\n`
pub fn trim_line_ending(bytes: &[u8]) -> &[u8] {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    bytes.strip_suffix(b"\r").unwrap_or(bytes)
}

/// 解码单行日志字节
///
/// # 示例
///
/// ```
/// use log_pattern_analyzer::utils::encoding::{decode_log_line, LineEncoding};
///
/// let (text, encoding) = decode_log_line(b"2024-01-01T00:00:00Z INFO ok");
/// assert_eq!(text, "2024-01-01T00:00:00Z INFO ok");
/// assert_eq!(encoding, LineEncoding::Utf8);
/// ```
pub fn decode_log_line(bytes: &[u8]) -> (Cow<'_, str>, LineEncoding) {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return (Cow::Borrowed(text), LineEncoding::Utf8);
    }

    let lossy = String::from_utf8_lossy(bytes);
    let replacement_count = lossy.chars().filter(|&c| c == '\u{FFFD}').count();
    let invalid_ratio = replacement_count as f64 / lossy.chars().count().max(1) as f64;

    if invalid_ratio <= FALLBACK_INVALID_RATIO {
        return (Cow::Owned(lossy.into_owned()), LineEncoding::Utf8Lossy);
    }

    let (gbk, _, had_errors) = GBK.decode(bytes);
    if !had_errors {
        return (Cow::Owned(gbk.into_owned()), LineEncoding::Gbk);
    }

    let (win, _, _) = WINDOWS_1252.decode(bytes);
    (Cow::Owned(win.into_owned()), LineEncoding::Windows1252)
}
