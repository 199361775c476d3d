//! 粒子渲染批次
//!
//! 粒子池在构造时把每个槽位对应的实例一次性加入批次，之后只修改实例属性，
//! 每帧翻转一次脏标记，渲染器据此整批上传一次。

use super::color::WHITE;
use crate::resources::TextureHandle;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// 粒子实例数据（与着色器中的实例属性布局一致）
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleInstance {
    /// 位置 (x, y)
    pub position: [f32; 2],
    /// 缩放 (x, y)
    pub scale: [f32; 2],
    /// 锚点 (0-1)
    pub anchor: [f32; 2],
    /// 旋转（弧度）
    pub rotation: f32,
    /// 透明度
    pub alpha: f32,
    /// 颜色 (0xRRGGBB)
    pub tint: u32,
    /// 纹理索引
    pub texture: u32,
}

impl ParticleInstance {
    /// 从模板创建隐藏的实例
    pub fn hidden(template: &ParticleTemplate) -> Self {
        Self {
            position: [0.0, 0.0],
            scale: [template.scale, template.scale],
            anchor: template.anchor.to_array(),
            rotation: 0.0,
            alpha: 0.0,
            tint: WHITE,
            texture: template.texture.index(),
        }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::from_array(self.position)
    }

    /// 统一缩放
    pub fn set_uniform_scale(&mut self, scale: f32) {
        self.scale = [scale, scale];
    }
}

/// 混合模式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    /// 普通 alpha 混合
    Normal,
    /// 加色混合（火焰、光效）
    #[default]
    Add,
}

/// 粒子外观模板
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleTemplate {
    /// 纹理
    pub texture: TextureHandle,
    /// 锚点
    pub anchor: Vec2,
    /// 初始缩放
    pub scale: f32,
    /// 混合模式
    pub blend_mode: BlendMode,
}

impl ParticleTemplate {
    pub fn new(texture: TextureHandle) -> Self {
        Self {
            texture,
            anchor: Vec2::splat(0.5),
            scale: 0.3,
            blend_mode: BlendMode::Add,
        }
    }

    pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.blend_mode = blend_mode;
        self
    }
}

/// 粒子实例句柄
///
/// 由粒子池独占持有，不可克隆。
#[derive(Debug, PartialEq, Eq)]
pub struct ParticleHandle(usize);

impl ParticleHandle {
    /// 由批次实现创建
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

/// 可渲染的粒子批次
pub trait ParticleBatch {
    /// 加入一个实例，返回其句柄
    fn add_particle(&mut self, instance: ParticleInstance) -> ParticleHandle;

    /// 获取实例以修改属性
    fn instance_mut(&mut self, handle: &ParticleHandle) -> Option<&mut ParticleInstance>;

    /// 读取实例
    fn instance(&self, handle: &ParticleHandle) -> Option<&ParticleInstance>;

    /// 标记本帧需要重新上传
    fn mark_dirty(&mut self);

    /// 设置混合模式
    fn set_blend_mode(&mut self, _blend_mode: BlendMode) {}
}

/// CPU 端实例批次
///
/// 连续存放所有实例，渲染器通过 `take_dirty` 取得需要上传的字节。
#[derive(Debug, Clone, Default)]
pub struct InstanceBatch {
    /// 粒子实例
    instances: Vec<ParticleInstance>,
    /// 脏标记
    dirty: bool,
    /// 混合模式
    blend_mode: BlendMode,
    /// 已上传次数
    uploads: u64,
}

impl InstanceBatch {
    /// 创建新的批次
    pub fn new() -> Self {
        Self::default()
    }

    /// 预留容量
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            instances: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// 所有实例
    pub fn instances(&self) -> &[ParticleInstance] {
        &self.instances
    }

    /// 获取实例数量
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// 检查批次是否为空
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    /// 已执行的上传次数
    pub fn uploads(&self) -> u64 {
        self.uploads
    }

    /// 实例数据的字节视图
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }

    /// 如果批次是脏的，清除标记并返回需要上传的数据
    pub fn take_dirty(&mut self) -> Option<&[u8]> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        self.uploads += 1;
        Some(bytemuck::cast_slice(&self.instances))
    }
}

impl ParticleBatch for InstanceBatch {
    fn add_particle(&mut self, instance: ParticleInstance) -> ParticleHandle {
        let handle = ParticleHandle::new(self.instances.len());
        self.instances.push(instance);
        self.dirty = true;
        handle
    }

    fn instance_mut(&mut self, handle: &ParticleHandle) -> Option<&mut ParticleInstance> {
        self.instances.get_mut(handle.index())
    }

    fn instance(&self, handle: &ParticleHandle) -> Option<&ParticleInstance> {
        self.instances.get(handle.index())
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn set_blend_mode(&mut self, blend_mode: BlendMode) {
        self.blend_mode = blend_mode;
    }
}
