//! 领域层 - 核心业务模型
//!
//! 包含：
//! - 实体(Entity)：解析后的日志条目
//! - 值对象(Value Object)：日志级别、消息、时间窗口

pub mod log_analysis;

pub use log_analysis::{LogEntry, LogMessage, Severity, TimeWindow, WindowGranularity};
