//! 基础设施层 - 技术实现
//!
//! 提供配置加载、日志初始化与输入源读取

pub mod config;
pub mod logging;
pub mod source;
