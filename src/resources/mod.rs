//! 资源模块
//!
//! 只包含粒子系统构造时需要的纹理解析接口，纹理加载由宿主负责。

pub mod texture;

pub use texture::{TextureHandle, TextureProvider, TextureRegistry};
