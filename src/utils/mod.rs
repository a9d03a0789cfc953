//! 通用工具函数模块
//!
//! 提供日志行的容错解码。

pub mod encoding;

pub use encoding::*;
