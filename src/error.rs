use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

use crate::infrastructure::config::ConfigError;

/**
 * 应用错误类型 - 使用 miette 提供用户友好的错误诊断
 *
 * 只覆盖整次运行级别的失败；单行解析失败不是错误，
 * 由 `ParseOutcome::Failed` 表示并计入 `unparsed_count`。
 */
#[derive(Error, Debug, Diagnostic)]
pub enum AppError {
    #[error("Input unavailable: {path}: {source}")]
    #[diagnostic(
        code(app::input_unavailable),
        help("Ensure the log file exists and is readable")
    )]
    InputUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    #[diagnostic(code(app::io_error))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(app::serialization_error))]
    Serialization(String),
}

impl AppError {
    /**
     * 创建输入不可用错误
     */
    pub fn input_unavailable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::InputUnavailable {
            path: path.into(),
            source,
        }
    }

    /// 配置错误在开始处理前就失败
    pub fn is_config_error(&self) -> bool {
        matches!(self, AppError::Config(_))
    }

    /**
     * 进程退出码：配置错误 2，其余运行失败 1
     */
    pub fn exit_code(&self) -> u8 {
        if self.is_config_error() {
            2
        } else {
            1
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        AppError::Serialization(error.to_string())
    }
}

/**
 * 统一结果类型
 */
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_unavailable_display() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "No such file");
        let error = AppError::input_unavailable("/var/log/missing.log", io_error);

        let display = format!("{}", error);
        assert!(display.contains("Input unavailable"));
        assert!(display.contains("/var/log/missing.log"));
        assert!(display.contains("No such file"));
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_config_error_conversion() {
        let error: AppError = ConfigError::InvalidValue("burst_multiplier must be > 0".into()).into();

        assert!(error.is_config_error());
        assert_eq!(error.exit_code(), 2);
        assert!(format!("{}", error).contains("burst_multiplier"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::Other, "broken pipe");
        let app_error: AppError = io_error.into();

        assert!(matches!(app_error, AppError::Io(_)));
    }
}
