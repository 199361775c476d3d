use super::{ConfigError, ConfigResult};
use crate::impl_default;
use serde::{Deserialize, Serialize};

/// 帧调度配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// 目标帧率（tick 换算秒时使用）
    pub target_fps: u32,

    /// 单帧最大时间增量（秒），由帧时钟截断
    pub max_delta: f32,
}

impl_default!(SchedulerConfig {
    target_fps: 60,
    max_delta: 0.1,
});

impl SchedulerConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.target_fps == 0 || self.target_fps > 1000 {
            return Err(ConfigError::ValidationError(
                "Invalid target FPS".to_string(),
            ));
        }
        if !(self.max_delta > 0.0) {
            return Err(ConfigError::ValidationError(
                "max_delta must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
