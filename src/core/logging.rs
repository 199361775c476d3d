//! 日志初始化
//!
//! 配置tracing日志框架。`RUST_LOG` 环境变量优先于配置文件中的日志级别。

use super::error::{EngineError, EngineResult};
use crate::config::{LogLevel, LoggingConfig};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

impl LogLevel {
    /// 对应的 `EnvFilter` 指令
    pub fn as_directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.level.as_directive()))
}

/// 初始化日志系统
///
/// 已经安装过全局 subscriber 时静默返回（测试里会被多次调用）。
///
/// # 错误
///
/// 日志文件无法打开时返回 `EngineError::Logging`。
pub fn init_logging(config: &LoggingConfig) -> EngineResult<()> {
    if config.log_to_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file_path)
            .map_err(|e| {
                EngineError::Logging(format!("cannot open {}: {}", config.log_file_path, e))
            })?;
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter(config))
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init();
    } else if config.log_to_console {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter(config))
            .try_init();
    }

    tracing::info!(target: "engine", level = config.level.as_directive(), "Logging initialized");
    Ok(())
}
