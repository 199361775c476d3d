//! 属性补间动画
//!
//! 在给定时长内，把目标对象的若干数值属性从当前值过渡到目标值。
//! 属性通过 [`Tweenable::accessor`] 在构造时解析为 getter/setter 对，
//! 未知属性在构造时立即报错。
//!
//! 补间持有目标的弱引用：目标被释放后补间静默停止。
//! 注册到 [`FrameScheduler`] 后由调度器逐帧驱动，也可以手动调用 [`Tween::step`]。
//!
//! ```ignore
//! let sprite = Rc::new(RefCell::new(Vec2::ZERO));
//! let tween = Tween::new(&scheduler, &sprite, [("x", 100.0)], 1.0)?
//!     .with_easing(Easing::EaseOutBack)
//!     .with_on_complete(|| tracing::info!("done"));
//! tween.start();
//! ```

use super::easing::Easing;
use crate::core::error::{TweenError, TweenResult};
use crate::core::scheduler::{Completion, FrameScheduler, FrameTask, SharedTask, TaskId, TaskStatus};
use crate::render::particles::{FireEmitter, ParticleBatch, ParticleSystem};
use glam::Vec2;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// 属性访问器（getter/setter 对）
pub struct PropertyAccessor<T> {
    get: fn(&T) -> f32,
    set: fn(&mut T, f32),
}

impl<T> PropertyAccessor<T> {
    pub fn new(get: fn(&T) -> f32, set: fn(&mut T, f32)) -> Self {
        Self { get, set }
    }

    pub fn get(&self, target: &T) -> f32 {
        (self.get)(target)
    }

    pub fn set(&self, target: &mut T, value: f32) {
        (self.set)(target, value)
    }
}

impl<T> Clone for PropertyAccessor<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PropertyAccessor<T> {}

/// 可以被补间的对象
pub trait Tweenable: Sized {
    /// 按名字解析属性访问器，不存在的属性返回 `None`
    fn accessor(property: &str) -> Option<PropertyAccessor<Self>>;
}

/// 单个属性的补间轨道
struct TweenTrack<T> {
    property: String,
    from: f32,
    to: f32,
    accessor: PropertyAccessor<T>,
}

/// 补间结束时需要在释放借用后处理的事项
struct Finish {
    task: Option<TaskId>,
    on_complete: Option<Completion>,
}

/// 补间内部状态，由调度器和 [`Tween`] 句柄共享
struct TweenState<T> {
    target: Weak<RefCell<T>>,
    tracks: Vec<TweenTrack<T>>,
    duration: f32,
    elapsed: f32,
    progress: f32,
    easing: Easing,
    on_complete: Option<Completion>,
    /// 注册到调度器时的任务 ID
    task: Option<TaskId>,
    finished: bool,
}

impl<T: Tweenable> TweenState<T> {
    /// 推进 `dt` 秒并写入目标属性，结束时返回收尾事项
    fn advance(&mut self, dt: f32) -> Option<Finish> {
        if self.finished {
            return None;
        }

        let Some(target) = self.target.upgrade() else {
            tracing::debug!(target: "tween", "Tween target dropped, stopping");
            self.on_complete = None;
            self.finished = true;
            return Some(Finish {
                task: self.task.take(),
                on_complete: None,
            });
        };

        let Ok(mut target) = target.try_borrow_mut() else {
            tracing::warn!(target: "tween", "Tween target is borrowed elsewhere, skipping this frame");
            return None;
        };

        self.elapsed += dt;
        let t_raw = if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).min(1.0)
        };
        self.progress = t_raw;

        let t = self.easing.apply(t_raw);
        for track in &self.tracks {
            track
                .accessor
                .set(&mut target, track.from + (track.to - track.from) * t);
        }

        if t_raw >= 1.0 {
            self.finished = true;
            tracing::debug!(target: "tween", elapsed = self.elapsed, "Tween completed");
            Some(Finish {
                task: self.task.take(),
                on_complete: self.on_complete.take(),
            })
        } else {
            None
        }
    }
}

impl<T: Tweenable> FrameTask for TweenState<T> {
    fn tick(&mut self, dt: f32) -> TaskStatus {
        match self.advance(dt) {
            // 调度器负责移除任务，这里只交出回调
            Some(finish) => TaskStatus::Finished(finish.on_complete),
            None => TaskStatus::Continue,
        }
    }
}

/// 属性补间句柄
///
/// 克隆得到的是同一个补间的句柄。句柄被丢弃不会停止已启动的补间。
pub struct Tween<T: Tweenable + 'static> {
    state: Rc<RefCell<TweenState<T>>>,
    scheduler: FrameScheduler,
}

impl<T: Tweenable + 'static> Tween<T> {
    /// 创建补间
    ///
    /// 在构造时读取每个属性的起始值。
    ///
    /// # 错误
    /// - `TweenError::UnknownProperty`: 目标没有该属性
    /// - `TweenError::TargetBusy`: 目标正被可变借用，无法读取起始值
    pub fn new<'a>(
        scheduler: &FrameScheduler,
        target: &Rc<RefCell<T>>,
        to: impl IntoIterator<Item = (&'a str, f32)>,
        duration: f32,
    ) -> TweenResult<Self> {
        let current = target.try_borrow().map_err(|_| TweenError::TargetBusy)?;

        let mut tracks = Vec::new();
        for (property, value) in to {
            let accessor = T::accessor(property).ok_or_else(|| TweenError::UnknownProperty {
                property: property.to_string(),
            })?;
            tracks.push(TweenTrack {
                property: property.to_string(),
                from: accessor.get(&current),
                to: value,
                accessor,
            });
        }
        drop(current);

        tracing::debug!(target: "tween", properties = tracks.len(), duration, "Tween created");

        Ok(Self {
            state: Rc::new(RefCell::new(TweenState {
                target: Rc::downgrade(target),
                tracks,
                duration,
                elapsed: 0.0,
                progress: 0.0,
                easing: Easing::Linear,
                on_complete: None,
                task: None,
                finished: false,
            })),
            scheduler: scheduler.clone(),
        })
    }

    /// 设置缓动曲线
    pub fn with_easing(self, easing: Easing) -> Self {
        self.state.borrow_mut().easing = easing;
        self
    }

    /// 设置完成回调
    pub fn with_on_complete(self, on_complete: impl FnOnce() + 'static) -> Self {
        self.state.borrow_mut().on_complete = Some(Box::new(on_complete));
        self
    }

    /// 注册到调度器
    ///
    /// 正在运行或已经完成时不做任何事。
    pub fn start(&self) {
        {
            let state = self.state.borrow();
            if state.task.is_some() || state.finished {
                return;
            }
        }

        let task: SharedTask = self.state.clone();
        let id = self.scheduler.add_task(task);
        self.state.borrow_mut().task = Some(id);
        tracing::debug!(target: "tween", task = id.raw(), "Tween started");
    }

    /// 从调度器注销
    ///
    /// 不会把目标恢复到起始值，也不会调用完成回调。
    pub fn stop(&self) {
        let task = self.state.borrow_mut().task.take();
        if let Some(id) = task {
            self.scheduler.remove_task(id);
            tracing::debug!(target: "tween", task = id.raw(), "Tween stopped");
        }
    }

    /// 手动推进 `dt` 秒
    ///
    /// 到达终点时自动停止并调用一次完成回调。
    pub fn step(&self, dt: f32) {
        let finish = self.state.borrow_mut().advance(dt);
        if let Some(finish) = finish {
            if let Some(id) = finish.task {
                self.scheduler.remove_task(id);
            }
            if let Some(on_complete) = finish.on_complete {
                on_complete();
            }
        }
    }

    /// 归一化进度（缓动前）
    pub fn progress(&self) -> f32 {
        self.state.borrow().progress
    }

    /// 是否已注册到调度器
    pub fn is_running(&self) -> bool {
        self.state.borrow().task.is_some()
    }

    /// 是否已结束（到达终点或目标已被释放）
    pub fn is_finished(&self) -> bool {
        self.state.borrow().finished
    }

    pub fn duration(&self) -> f32 {
        self.state.borrow().duration
    }

    /// 补间的属性名
    pub fn properties(&self) -> Vec<String> {
        self.state
            .borrow()
            .tracks
            .iter()
            .map(|t| t.property.clone())
            .collect()
    }
}

impl<T: Tweenable + 'static> Clone for Tween<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<T: Tweenable + 'static> fmt::Debug for Tween<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Tween")
            .field("properties", &state.tracks.len())
            .field("duration", &state.duration)
            .field("elapsed", &state.elapsed)
            .field("easing", &state.easing)
            .field("running", &state.task.is_some())
            .field("finished", &state.finished)
            .finish()
    }
}

impl Tweenable for Vec2 {
    fn accessor(property: &str) -> Option<PropertyAccessor<Self>> {
        match property {
            "x" => Some(PropertyAccessor::new(|v: &Vec2| v.x, |v: &mut Vec2, x: f32| v.x = x)),
            "y" => Some(PropertyAccessor::new(|v: &Vec2| v.y, |v: &mut Vec2, y: f32| v.y = y)),
            _ => None,
        }
    }
}

impl Tweenable for FireEmitter {
    fn accessor(property: &str) -> Option<PropertyAccessor<Self>> {
        match property {
            "x" => Some(PropertyAccessor::new(
                |e: &FireEmitter| e.position().x,
                |e: &mut FireEmitter, x: f32| {
                    let y = e.position().y;
                    e.set_position(x, y);
                },
            )),
            "y" => Some(PropertyAccessor::new(
                |e: &FireEmitter| e.position().y,
                |e: &mut FireEmitter, y: f32| {
                    let x = e.position().x;
                    e.set_position(x, y);
                },
            )),
            _ => None,
        }
    }
}

impl<B: ParticleBatch> Tweenable for ParticleSystem<B> {
    fn accessor(property: &str) -> Option<PropertyAccessor<Self>> {
        match property {
            "emitter_x" => Some(PropertyAccessor::new(
                |s: &Self| s.emitter_position().x,
                |s: &mut Self, x: f32| {
                    let y = s.emitter_position().y;
                    s.set_emitter_position(x, y);
                },
            )),
            "emitter_y" => Some(PropertyAccessor::new(
                |s: &Self| s.emitter_position().y,
                |s: &mut Self, y: f32| {
                    let x = s.emitter_position().x;
                    s.set_emitter_position(x, y);
                },
            )),
            "emitter_rate" => Some(PropertyAccessor::new(
                |s: &Self| s.emitter_rate(),
                |s: &mut Self, rate: f32| s.set_emitter_rate(rate),
            )),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Debug, Default)]
    struct Sprite {
        x: f32,
        y: f32,
        alpha: f32,
    }

    impl Tweenable for Sprite {
        fn accessor(property: &str) -> Option<PropertyAccessor<Self>> {
            match property {
                "x" => Some(PropertyAccessor::new(|s: &Sprite| s.x, |s: &mut Sprite, v: f32| s.x = v)),
                "y" => Some(PropertyAccessor::new(|s: &Sprite| s.y, |s: &mut Sprite, v: f32| s.y = v)),
                "alpha" => Some(PropertyAccessor::new(|s: &Sprite| s.alpha, |s: &mut Sprite, v: f32| s.alpha = v)),
                _ => None,
            }
        }
    }

    fn sprite() -> Rc<RefCell<Sprite>> {
        Rc::new(RefCell::new(Sprite::default()))
    }

    #[test]
    fn test_linear_tween_reaches_target() {
        let scheduler = FrameScheduler::new();
        let target = sprite();
        let done = Rc::new(Cell::new(0));
        let counter = Rc::clone(&done);

        let tween = Tween::new(&scheduler, &target, [("x", 100.0)], 1.0)
            .unwrap()
            .with_on_complete(move || counter.set(counter.get() + 1));
        tween.start();

        tween.step(0.5);
        assert!((target.borrow().x - 50.0).abs() < 1e-4);
        assert!(tween.is_running());

        tween.step(0.5);
        assert!((target.borrow().x - 100.0).abs() < 1e-4);
        assert!(!tween.is_running());
        assert!(tween.is_finished());
        assert_eq!(scheduler.task_count(), 0);
        assert_eq!(done.get(), 1);

        tween.step(0.5);
        assert_eq!(done.get(), 1);
    }

    #[test]
    fn test_start_and_stop_are_idempotent() {
        let scheduler = FrameScheduler::new();
        let target = sprite();
        let tween = Tween::new(&scheduler, &target, [("x", 10.0)], 1.0).unwrap();

        tween.stop();
        tween.start();
        tween.start();
        assert_eq!(scheduler.task_count(), 1);

        tween.stop();
        tween.stop();
        assert_eq!(scheduler.task_count(), 0);
        assert!(!tween.is_running());
    }

    #[test]
    fn test_stop_keeps_current_values() {
        let scheduler = FrameScheduler::new();
        let target = sprite();
        let tween = Tween::new(&scheduler, &target, [("alpha", 1.0)], 1.0).unwrap();
        tween.start();
        scheduler.step(0.25);
        tween.stop();
        scheduler.step(0.25);
        assert!((target.borrow().alpha - 0.25).abs() < 1e-4);
    }

    #[test]
    fn test_unknown_property_fails_fast() {
        let scheduler = FrameScheduler::new();
        let target = sprite();
        let err = Tween::new(&scheduler, &target, [("x", 1.0), ("rotation", 1.0)], 1.0).unwrap_err();
        assert_eq!(
            err,
            TweenError::UnknownProperty {
                property: "rotation".to_string()
            }
        );
    }

    #[test]
    fn test_busy_target_rejected() {
        let scheduler = FrameScheduler::new();
        let target = sprite();
        let _guard = target.borrow_mut();
        let err = Tween::new(&scheduler, &target, [("x", 1.0)], 1.0).unwrap_err();
        assert_eq!(err, TweenError::TargetBusy);
    }

    #[test]
    fn test_scheduler_drives_multiple_properties() {
        let scheduler = FrameScheduler::new();
        let target = Rc::new(RefCell::new(Sprite {
            x: 10.0,
            y: -20.0,
            alpha: 0.0,
        }));
        let tween = Tween::new(&scheduler, &target, [("x", 20.0), ("y", 20.0)], 0.5).unwrap();
        tween.start();

        for _ in 0..6 {
            scheduler.step(0.1);
        }

        let s = target.borrow();
        assert!((s.x - 20.0).abs() < 1e-4);
        assert!((s.y - 20.0).abs() < 1e-4);
        assert_eq!(scheduler.task_count(), 0);
        assert!(tween.is_finished());
    }

    #[test]
    fn test_dropped_target_stops_silently() {
        let scheduler = FrameScheduler::new();
        let target = sprite();
        let called = Rc::new(Cell::new(false));
        let flag = Rc::clone(&called);
        let tween = Tween::new(&scheduler, &target, [("x", 1.0)], 1.0)
            .unwrap()
            .with_on_complete(move || flag.set(true));
        tween.start();

        drop(target);
        scheduler.step(0.1);

        assert_eq!(scheduler.task_count(), 0);
        assert!(!tween.is_running());
        assert!(!called.get());
    }

    #[test]
    fn test_dropped_target_tween_cannot_restart() {
        let scheduler = FrameScheduler::new();
        let target = sprite();
        let tween = Tween::new(&scheduler, &target, [("x", 1.0)], 1.0).unwrap();
        tween.start();

        drop(target);
        tween.step(0.1);
        assert!(tween.is_finished());

        tween.start();
        assert_eq!(scheduler.task_count(), 0);
        assert!(!tween.is_running());
    }

    #[test]
    fn test_zero_duration_completes_immediately() {
        let scheduler = FrameScheduler::new();
        let target = sprite();
        let tween = Tween::new(&scheduler, &target, [("x", 5.0)], 0.0).unwrap();
        tween.step(0.0);
        assert_eq!(target.borrow().x, 5.0);
        assert!(tween.is_finished());
        assert_eq!(tween.progress(), 1.0);
    }

    #[test]
    fn test_finished_tween_does_not_restart() {
        let scheduler = FrameScheduler::new();
        let target = sprite();
        let tween = Tween::new(&scheduler, &target, [("x", 5.0)], 0.1).unwrap();
        tween.step(0.2);
        tween.start();
        assert_eq!(scheduler.task_count(), 0);
    }

    #[test]
    fn test_overshoot_is_not_clamped() {
        let scheduler = FrameScheduler::new();
        let target = sprite();
        let tween = Tween::new(&scheduler, &target, [("x", 100.0)], 1.0)
            .unwrap()
            .with_easing(Easing::EaseOutBack);

        let mut peak = 0.0f32;
        for _ in 0..20 {
            tween.step(0.05);
            peak = peak.max(target.borrow().x);
        }
        assert!(peak > 100.0);
        assert!((target.borrow().x - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_on_complete_can_start_next_tween() {
        let scheduler = FrameScheduler::new();
        let target = sprite();

        let second = Tween::new(&scheduler, &target, [("y", 10.0)], 1.0).unwrap();
        let next = second.clone();
        let first = Tween::new(&scheduler, &target, [("x", 10.0)], 1.0)
            .unwrap()
            .with_on_complete(move || next.start());
        first.start();

        scheduler.step(0.5);
        scheduler.step(0.5);
        assert!(first.is_finished());
        assert!(second.is_running());
        assert_eq!(scheduler.task_count(), 1);

        scheduler.step(0.5);
        assert!((target.borrow().y - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_tween_particle_emitter_position() {
        use crate::render::particles::{InstanceBatch, ParticleTemplate};
        use crate::resources::TextureHandle;

        let scheduler = FrameScheduler::new();
        let system = Rc::new(RefCell::new(ParticleSystem::new(
            InstanceBatch::new(),
            ParticleTemplate::new(TextureHandle::new(0)),
            4,
        )));
        let tween = Tween::new(&scheduler, &system, [("emitter_x", 200.0)], 1.0).unwrap();
        tween.step(0.5);
        assert!((system.borrow().emitter_position().x - 100.0).abs() < 1e-4);
        assert!(Tween::new(&scheduler, &system, [("alpha", 1.0)], 1.0).is_err());
    }
}
