//! 帧调度系统
//!
//! 提供显式的逐帧调度器，替代进程级共享 ticker。
//!
//! ## 功能特性
//!
//! - 每帧按注册顺序驱动所有任务（补间动画、粒子系统等）
//! - 任务完成后自动移除，完成回调在释放任务借用后执行
//! - 帧时钟：从墙钟时间或 tick 计数得到以秒为单位的 `dt`
//!
//! ## 生命周期
//!
//! 应用启动时 `FrameScheduler::new()`，每帧 `step(dt)`，退出时 `teardown()`。
//! 调度器是单线程的（`Rc`/`RefCell`），所有任务都在同一个更新线程上执行。

use crate::config::SchedulerConfig;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Instant;

/// 一次性完成回调
pub type Completion = Box<dyn FnOnce()>;

/// 共享的帧任务
pub type SharedTask = Rc<RefCell<dyn FrameTask>>;

/// 任务 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    /// 原始 ID 值
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// 单帧执行后的任务状态
pub enum TaskStatus {
    /// 继续在下一帧执行
    Continue,
    /// 继续在下一帧执行，附带的回调由调度器在释放任务借用后执行
    Deferred(Vec<Completion>),
    /// 任务结束，调度器将其移除并执行附带的回调
    Finished(Option<Completion>),
}

impl fmt::Debug for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Continue => f.write_str("Continue"),
            Self::Deferred(callbacks) => f.debug_tuple("Deferred").field(&callbacks.len()).finish(),
            Self::Finished(cb) => f
                .debug_tuple("Finished")
                .field(&cb.as_ref().map(|_| "callback"))
                .finish(),
        }
    }
}

/// 逐帧任务
pub trait FrameTask {
    /// 推进 `dt` 秒
    fn tick(&mut self, dt: f32) -> TaskStatus;
}

struct ScheduledTask {
    id: TaskId,
    task: SharedTask,
}

#[derive(Default)]
struct SchedulerState {
    tasks: Vec<ScheduledTask>,
    /// 复用的快照缓冲区，避免每帧分配
    scratch: Vec<(TaskId, SharedTask)>,
    next_task_id: u64,
    frame: u64,
}

/// 帧调度器
///
/// 克隆得到的是同一个调度器的句柄。
///
/// # 示例
///
/// ```ignore
/// let scheduler = FrameScheduler::new();
/// let id = scheduler.add_task(particles.clone());
///
/// // 主循环
/// scheduler.step(clock.tick());
///
/// // 退出
/// scheduler.teardown();
/// ```
#[derive(Clone, Default)]
pub struct FrameScheduler {
    state: Rc<RefCell<SchedulerState>>,
}

impl FrameScheduler {
    /// 创建调度器
    pub fn new() -> Self {
        tracing::debug!(target: "scheduler", "Frame scheduler initialized");
        Self::default()
    }

    /// 注册任务
    ///
    /// 在 `step` 执行期间注册的任务从下一帧开始执行。
    pub fn add_task(&self, task: SharedTask) -> TaskId {
        let mut state = self.state.borrow_mut();
        state.next_task_id += 1;
        let id = TaskId(state.next_task_id);
        state.tasks.push(ScheduledTask { id, task });
        tracing::trace!(target: "scheduler", task = id.0, "Task registered");
        id
    }

    /// 注销任务
    ///
    /// 如果任务存在并被移除返回`true`。
    pub fn remove_task(&self, id: TaskId) -> bool {
        let mut state = self.state.borrow_mut();
        let before = state.tasks.len();
        state.tasks.retain(|t| t.id != id);
        let removed = state.tasks.len() != before;
        if removed {
            tracing::trace!(target: "scheduler", task = id.0, "Task removed");
        }
        removed
    }

    /// 任务是否仍在调度中
    pub fn contains(&self, id: TaskId) -> bool {
        self.state.borrow().tasks.iter().any(|t| t.id == id)
    }

    /// 当前任务数量
    pub fn task_count(&self) -> usize {
        self.state.borrow().tasks.len()
    }

    /// 已执行的帧数
    pub fn frame(&self) -> u64 {
        self.state.borrow().frame
    }

    /// 执行一帧
    ///
    /// 按注册顺序调用每个任务的 `tick`。本帧内被注销的任务不会再被调用；
    /// 完成回调在任务借用释放之后执行，因此回调里可以启动或停止其他任务。
    pub fn step(&self, dt: f32) {
        let mut snapshot = {
            let mut state = self.state.borrow_mut();
            state.frame += 1;
            let mut scratch = std::mem::take(&mut state.scratch);
            scratch.extend(state.tasks.iter().map(|t| (t.id, Rc::clone(&t.task))));
            scratch
        };

        for (id, task) in snapshot.iter() {
            if !self.contains(*id) {
                continue;
            }

            let status = match task.try_borrow_mut() {
                Ok(mut task) => task.tick(dt),
                Err(_) => {
                    tracing::warn!(target: "scheduler", task = id.0, "Task is borrowed elsewhere, skipping this frame");
                    continue;
                }
            };

            match status {
                TaskStatus::Continue => {}
                TaskStatus::Deferred(callbacks) => {
                    for callback in callbacks {
                        callback();
                    }
                }
                TaskStatus::Finished(callback) => {
                    self.remove_task(*id);
                    if let Some(callback) = callback {
                        callback();
                    }
                }
            }
        }

        snapshot.clear();
        self.state.borrow_mut().scratch = snapshot;
    }

    /// 关闭调度器，清空所有任务
    pub fn teardown(&self) {
        let mut state = self.state.borrow_mut();
        let count = state.tasks.len();
        state.tasks.clear();
        state.scratch.clear();
        tracing::debug!(target: "scheduler", dropped = count, "Frame scheduler torn down");
    }
}

impl fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("FrameScheduler")
            .field("tasks", &state.tasks.len())
            .field("frame", &state.frame)
            .finish()
    }
}

/// 帧时钟
///
/// 上游帧驱动：把墙钟时间转换成以秒为单位的 `dt`，并对卡顿造成的尖峰做截断。
/// 粒子系统与补间本身不截断 `dt`，截断只在这里发生。
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<Instant>,
    max_delta: f32,
}

impl FrameClock {
    /// 创建帧时钟
    ///
    /// # 参数
    /// - `max_delta`: 单帧允许的最大 `dt`（秒）
    pub fn new(max_delta: f32) -> Self {
        Self {
            last: None,
            max_delta: max_delta.max(0.0),
        }
    }

    /// 从调度配置创建
    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self::new(config.max_delta)
    }

    /// 读取当前时间并返回距上一帧的秒数
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// 以给定时间点推进，第一帧返回 0
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let dt = match self.last {
            Some(last) => now.saturating_duration_since(last).as_secs_f32(),
            None => 0.0,
        };
        self.last = Some(now);
        dt.min(self.max_delta)
    }

    /// 重置，下一次 `tick` 返回 0
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn max_delta(&self) -> f32 {
        self.max_delta
    }
}

/// 把以帧为单位的 tick 增量换算为秒
///
/// `fps` 非正时返回 0。
pub fn ticks_to_seconds(delta_ticks: f32, fps: f32) -> f32 {
    if fps <= 0.0 {
        return 0.0;
    }
    delta_ticks / fps
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::time::Duration;

    struct Counter {
        ticks: u32,
        finish_after: Option<u32>,
        done: Rc<Cell<u32>>,
    }

    impl FrameTask for Counter {
        fn tick(&mut self, _dt: f32) -> TaskStatus {
            self.ticks += 1;
            match self.finish_after {
                Some(n) if self.ticks >= n => {
                    let done = Rc::clone(&self.done);
                    TaskStatus::Finished(Some(Box::new(move || done.set(done.get() + 1))))
                }
                _ => TaskStatus::Continue,
            }
        }
    }

    fn counter(finish_after: Option<u32>) -> (Rc<RefCell<Counter>>, Rc<Cell<u32>>) {
        let done = Rc::new(Cell::new(0));
        let task = Rc::new(RefCell::new(Counter {
            ticks: 0,
            finish_after,
            done: Rc::clone(&done),
        }));
        (task, done)
    }

    #[test]
    fn test_step_ticks_every_task() {
        let scheduler = FrameScheduler::new();
        let (a, _) = counter(None);
        let (b, _) = counter(None);
        scheduler.add_task(a.clone());
        scheduler.add_task(b.clone());

        scheduler.step(0.016);
        scheduler.step(0.016);

        assert_eq!(a.borrow().ticks, 2);
        assert_eq!(b.borrow().ticks, 2);
        assert_eq!(scheduler.frame(), 2);
    }

    #[test]
    fn test_finished_task_removed_and_callback_runs_once() {
        let scheduler = FrameScheduler::new();
        let (task, done) = counter(Some(2));
        let id = scheduler.add_task(task.clone());

        scheduler.step(0.1);
        assert!(scheduler.contains(id));
        scheduler.step(0.1);
        assert!(!scheduler.contains(id));
        scheduler.step(0.1);

        assert_eq!(task.borrow().ticks, 2);
        assert_eq!(done.get(), 1);
    }

    struct Reentrant {
        ticks: u32,
        seen: Rc<Cell<u32>>,
        me: Option<std::rc::Weak<RefCell<Reentrant>>>,
    }

    impl FrameTask for Reentrant {
        fn tick(&mut self, _dt: f32) -> TaskStatus {
            self.ticks += 1;
            let me = self.me.clone();
            let seen = Rc::clone(&self.seen);
            let callback: Completion = Box::new(move || {
                // 回调执行时任务已经可以再次借用
                if let Some(task) = me.and_then(|w| w.upgrade()) {
                    seen.set(task.borrow().ticks);
                }
            });
            TaskStatus::Deferred(vec![callback])
        }
    }

    #[test]
    fn test_deferred_callbacks_run_after_borrow_released() {
        let scheduler = FrameScheduler::new();
        let seen = Rc::new(Cell::new(0));
        let task = Rc::new(RefCell::new(Reentrant {
            ticks: 0,
            seen: Rc::clone(&seen),
            me: None,
        }));
        task.borrow_mut().me = Some(Rc::downgrade(&task));
        let id = scheduler.add_task(task.clone());

        scheduler.step(0.1);
        scheduler.step(0.1);

        assert_eq!(seen.get(), 2);
        assert!(scheduler.contains(id));
    }

    #[test]
    fn test_remove_task() {
        let scheduler = FrameScheduler::new();
        let (task, _) = counter(None);
        let id = scheduler.add_task(task.clone());

        assert!(scheduler.remove_task(id));
        assert!(!scheduler.remove_task(id));
        scheduler.step(0.1);
        assert_eq!(task.borrow().ticks, 0);
    }

    #[test]
    fn test_teardown_clears_tasks() {
        let scheduler = FrameScheduler::new();
        let (task, _) = counter(None);
        scheduler.add_task(task);
        scheduler.teardown();
        assert_eq!(scheduler.task_count(), 0);
    }

    #[test]
    fn test_frame_clock_clamps_spikes() {
        let mut clock = FrameClock::new(0.1);
        let start = Instant::now();
        assert_eq!(clock.tick_at(start), 0.0);

        let dt = clock.tick_at(start + Duration::from_millis(16));
        assert!((dt - 0.016).abs() < 1e-4);

        let dt = clock.tick_at(start + Duration::from_secs(3));
        assert_eq!(dt, 0.1);
    }

    #[test]
    fn test_ticks_to_seconds() {
        assert!((ticks_to_seconds(1.0, 60.0) - 1.0 / 60.0).abs() < 1e-6);
        assert_eq!(ticks_to_seconds(1.0, 0.0), 0.0);
    }
}
