//! 统一错误处理模块
//!
//! 提供引擎范围内的统一错误类型定义
//!
//! ## 错误类型分层
//!
//! - **构造期错误** (`TweenError`, `AssetError`): 在动画或粒子系统创建时立即报告
//! - **配置错误** (`config::ConfigError`): 配置文件读取、解析和验证
//!
//! 运行期模拟（`update`/`spawn`）不会返回错误，异常输入按边界规则降级处理。
//! `EngineError` 可以汇总以上所有错误。

use crate::config::ConfigError;
use thiserror::Error;

/// 引擎核心错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Tween error: {0}")]
    Tween(#[from] TweenError),

    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Logging initialization failed: {0}")]
    Logging(String),
}

/// 补间动画错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TweenError {
    #[error("Target does not have property \"{property}\"")]
    UnknownProperty { property: String },

    #[error("Target is already mutably borrowed")]
    TargetBusy,
}

/// 资源管理错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("Asset not found: {path}")]
    NotFound { path: String },
}

/// 引擎结果类型别名
pub type EngineResult<T> = Result<T, EngineError>;
pub type TweenResult<T> = Result<T, TweenError>;
pub type AssetResult<T> = Result<T, AssetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let tween_err = TweenError::UnknownProperty {
            property: "alpha".to_string(),
        };
        let engine_err: EngineError = tween_err.into();

        match engine_err {
            EngineError::Tween(_) => {}
            _ => panic!("Expected Tween error"),
        }
    }

    #[test]
    fn test_error_display() {
        let err = TweenError::UnknownProperty {
            property: "x".to_string(),
        };
        assert_eq!(err.to_string(), "Target does not have property \"x\"");

        let err = AssetError::NotFound {
            path: "/particles/flame_04.png".to_string(),
        };
        assert!(err.to_string().contains("flame_04.png"));
    }

    #[test]
    fn test_config_error_conversion() {
        let err: EngineError = ConfigError::ValidationError("bad".to_string()).into();
        assert!(matches!(err, EngineError::Config(_)));
    }
}
