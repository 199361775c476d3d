//! 纹理句柄与纹理提供者
//!
//! 粒子系统只在构造时按路径解析纹理，模拟过程中只使用句柄。

use crate::core::error::{AssetError, AssetResult};
use crate::impl_default_and_new;
use std::collections::HashMap;

/// 纹理句柄（纹理数组中的索引）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextureHandle(u32);

impl TextureHandle {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

/// 纹理提供者
pub trait TextureProvider {
    /// 按路径解析纹理
    fn resolve(&self, path: &str) -> AssetResult<TextureHandle>;

    /// 按顺序解析多张纹理（精灵动画帧）
    fn resolve_all(&self, paths: &[String]) -> AssetResult<Vec<TextureHandle>> {
        paths.iter().map(|p| self.resolve(p)).collect()
    }
}

/// 已加载纹理的注册表
///
/// 宿主在加载资源后把路径登记到这里，按登记顺序分配索引。
#[derive(Debug, Clone)]
pub struct TextureRegistry {
    handles: HashMap<String, TextureHandle>,
}

impl_default_and_new!(TextureRegistry {
    handles: HashMap::new(),
});

impl TextureRegistry {
    /// 登记纹理路径，重复登记返回同一个句柄
    pub fn register(&mut self, path: impl Into<String>) -> TextureHandle {
        let next = TextureHandle::new(self.handles.len() as u32);
        *self.handles.entry(path.into()).or_insert(next)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl TextureProvider for TextureRegistry {
    fn resolve(&self, path: &str) -> AssetResult<TextureHandle> {
        self.handles
            .get(path)
            .copied()
            .ok_or_else(|| AssetError::NotFound {
                path: path.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_is_idempotent() {
        let mut registry = TextureRegistry::new();
        let a = registry.register("/particles/flame_04.png");
        let b = registry.register("/particles/smoke.png");
        let again = registry.register("/particles/flame_04.png");

        assert_eq!(a, again);
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_resolve_missing_texture() {
        let registry = TextureRegistry::new();
        let err = registry.resolve("/missing.png").unwrap_err();
        assert_eq!(
            err,
            AssetError::NotFound {
                path: "/missing.png".to_string()
            }
        );
    }

    #[test]
    fn test_resolve_all_stops_at_first_missing() {
        let mut registry = TextureRegistry::new();
        registry.register("fire_0.png");
        let frames = vec!["fire_0.png".to_string(), "fire_1.png".to_string()];
        assert!(registry.resolve_all(&frames).is_err());

        registry.register("fire_1.png");
        assert_eq!(registry.resolve_all(&frames).unwrap().len(), 2);
    }
}
