//! 核心宏定义
//!
//! 提供统一的宏来减少配置结构体的样板代码

/// 为结构体实现Default trait的宏
///
/// 使用示例:
/// ```ignore
/// struct SchedulerConfig {
///     target_fps: u32,
///     max_delta: f32,
/// }
///
/// impl_default!(SchedulerConfig {
///     target_fps: 60,
///     max_delta: 0.1,
/// });
/// ```
#[macro_export]
macro_rules! impl_default {
    ($struct_name:ident {
        $($field:ident: $value:expr),* $(,)?
    }) => {
        impl Default for $struct_name {
            fn default() -> Self {
                Self {
                    $($field: $value),*
                }
            }
        }
    };
}

/// 同时实现Default和new()的宏
///
/// 使用示例:
/// ```ignore
/// impl_default_and_new!(ParticleStats {
///     total_emitted: 0,
///     recycled: 0,
/// });
/// ```
#[macro_export]
macro_rules! impl_default_and_new {
    ($struct_name:ident {
        $($field:ident: $value:expr),* $(,)?
    }) => {
        impl Default for $struct_name {
            fn default() -> Self {
                Self {
                    $($field: $value),*
                }
            }
        }

        impl $struct_name {
            pub fn new() -> Self {
                Self::default()
            }
        }
    };
}
