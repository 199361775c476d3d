/// 统一配置系统
///
/// 提供TOML/JSON配置文件、环境变量覆盖和配置验证
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

pub mod particles;
pub mod scheduler;

pub use particles::{FireEmitterConfig, ParticleSystemConfig, MAX_POOL_CAPACITY};
pub use scheduler::SchedulerConfig;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 文件读取错误
    #[error("Config file error: {0}")]
    FileError(#[from] std::io::Error),
    /// 解析错误
    #[error("Config parse error: {0}")]
    ParseError(String),
    /// 验证错误
    #[error("Config validation error: {0}")]
    ValidationError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// 特效主配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EffectsConfig {
    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,

    /// 帧调度配置
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// 粒子池配置
    #[serde(default)]
    pub particles: ParticleSystemConfig,

    /// 火焰精灵发射器配置
    #[serde(default)]
    pub fire: FireEmitterConfig,
}

impl EffectsConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 从TOML文件加载配置
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_toml_str(&content)
    }

    /// 从TOML字符串解析配置
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 从JSON文件加载配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_json_str(&content)
    }

    /// 从JSON字符串解析配置
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 保存为TOML文件
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, content).map_err(ConfigError::FileError)
    }

    /// 保存为JSON文件
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, content).map_err(ConfigError::FileError)
    }

    /// 从环境变量覆盖配置
    pub fn apply_env_overrides(&mut self) {
        // 日志配置
        if let Ok(val) = env::var("FX_LOG_LEVEL") {
            if let Ok(level) = val.parse() {
                self.logging.level = level;
            }
        }

        // 调度配置
        if let Ok(val) = env::var("FX_SCHEDULER_TARGET_FPS") {
            if let Ok(fps) = val.parse() {
                self.scheduler.target_fps = fps;
            }
        }
        if let Ok(val) = env::var("FX_SCHEDULER_MAX_DELTA") {
            if let Ok(max_delta) = val.parse() {
                self.scheduler.max_delta = max_delta;
            }
        }

        // 粒子配置
        if let Ok(val) = env::var("FX_PARTICLES_MAX") {
            if let Ok(max) = val.parse() {
                self.particles.max_particles = max;
            }
        }
        if let Ok(val) = env::var("FX_PARTICLES_EMITTER_RATE") {
            if let Ok(rate) = val.parse() {
                self.particles.emitter_rate = rate;
            }
        }
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        self.scheduler.validate()?;
        self.particles.validate()?;
        self.fire.validate()?;
        Ok(())
    }

    /// 自动查找并加载配置文件
    ///
    /// 按以下顺序查找：
    /// 1. ./flame_fx.toml
    /// 2. ./flame_fx.json
    /// 3. ~/.config/flame_fx/config.toml
    /// 4. 使用默认配置
    pub fn load_or_default() -> Self {
        if let Ok(config) = Self::from_toml_file("flame_fx.toml") {
            tracing::info!(target: "config", "Loaded config from flame_fx.toml");
            return config;
        }

        if let Ok(config) = Self::from_json_file("flame_fx.json") {
            tracing::info!(target: "config", "Loaded config from flame_fx.json");
            return config;
        }

        if let Some(home) = env::var_os("HOME") {
            let config_path = PathBuf::from(home)
                .join(".config")
                .join("flame_fx")
                .join("config.toml");

            if let Ok(config) = Self::from_toml_file(&config_path) {
                tracing::info!(target: "config", "Loaded config from {:?}", config_path);
                return config;
            }
        }

        tracing::info!(target: "config", "Using default configuration");
        Self::default()
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: LogLevel,

    /// 是否输出到文件
    pub log_to_file: bool,

    /// 日志文件路径
    pub log_file_path: String,

    /// 是否输出到控制台
    pub log_to_console: bool,
}

use crate::impl_default;

impl_default!(LoggingConfig {
    level: LogLevel::Info,
    log_to_file: false,
    log_file_path: "flame_fx.log".to_string(),
    log_to_console: true,
});

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// 跟踪
    Trace,
    /// 调试
    Debug,
    /// 信息
    Info,
    /// 警告
    Warn,
    /// 错误
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(ConfigError::ParseError(format!("unknown log level: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EffectsConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.particles.max_particles, 500);
        assert!((config.particles.emitter_rate - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_toml_serialization() {
        let config = EffectsConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: EffectsConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(
            config.particles.max_particles,
            parsed.particles.max_particles
        );
        assert_eq!(config.fire.spawn_rate, parsed.fire.spawn_rate);
    }

    #[test]
    fn test_json_serialization() {
        let config = EffectsConfig::default();
        let json_str = serde_json::to_string(&config).unwrap();
        let parsed: EffectsConfig = serde_json::from_str(&json_str).unwrap();
        assert_eq!(config.scheduler.target_fps, parsed.scheduler.target_fps);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = EffectsConfig::from_toml_str(
            r#"
            [particles]
            max_particles = 10
            emitter_rate = 0.08

            [particles.defaults]
            lifetime = 1.2
            start_color = 0xff4500
            "#,
        )
        .unwrap();

        assert_eq!(config.particles.max_particles, 10);
        assert_eq!(config.particles.defaults.lifetime, Some(1.2));
        assert_eq!(config.particles.defaults.start_color, Some(0xff4500));
        assert_eq!(config.particles.defaults.end_color, None);
        assert_eq!(config.scheduler.target_fps, 60);
    }

    #[test]
    fn test_validation_rejects_negative_rate() {
        let mut config = EffectsConfig::default();
        config.particles.emitter_rate = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fx.toml");
        let mut config = EffectsConfig::default();
        config.particles.max_particles = 42;
        config.save_toml(&path).unwrap();

        let loaded = EffectsConfig::from_toml_file(&path).unwrap();
        assert_eq!(loaded.particles.max_particles, 42);
    }
}
