//! 核心模块
//!
//! 包含引擎的核心功能：
//! - `engine` - 无窗口宿主循环
//! - `error` - 错误类型定义
//! - `scheduler` - 帧调度器与帧时钟
//! - `logging` - 日志初始化
//! - `utils` - 插值与采样工具

pub mod engine;
pub mod error;
pub mod logging;
pub mod scheduler;
pub mod utils;
#[macro_use]
pub mod macros;

// 重新导出错误类型
pub use error::{
    AssetError, AssetResult, EngineError, EngineResult, TweenError, TweenResult,
};

// 重新导出主要类型
pub use engine::Engine;
pub use logging::init_logging;
pub use scheduler::{
    ticks_to_seconds, Completion, FrameClock, FrameScheduler, FrameTask, SharedTask, TaskId,
    TaskStatus,
};
pub use utils::{lerp, life_fraction, random_range};
