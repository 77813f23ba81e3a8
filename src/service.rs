//! 异步查找驱动
//!
//! 在 tokio 运行时上反复调用 `pump_search`，每个时间片之间让出调度，
//! 通过通道报告进度。锁只在单个时间片内持有，不跨 await。

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::SyncSender;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::config::FindConfig;
use crate::dom::Layout;
use crate::find::{FindInPage, FindOutcome};

static FIND_ID: AtomicU64 = AtomicU64::new(0);

fn next_find_id() -> u64 {
    FIND_ID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindMessage {
    Progress { find_id: u64, slices: usize },
    Complete { find_id: u64, matches: usize },
    Cancelled { find_id: u64 },
}

/// 任务与驱动协程共享的状态
#[derive(Debug, Default)]
struct TaskState {
    cancelled: AtomicBool,
    /// 查找开始后引擎的代数，0 表示尚未开始
    generation: AtomicU64,
}

impl TaskState {
    fn is_current<D: Layout>(&self, engine: &FindInPage<D>) -> bool {
        let generation = self.generation.load(Ordering::Acquire);
        generation != 0 && generation == engine.generation()
    }
}

/// 一次异步查找的句柄
pub struct FindTask {
    id: u64,
    state: Arc<TaskState>,
}

impl FindTask {
    fn new() -> Self {
        Self {
            id: next_find_id(),
            state: Arc::new(TaskState::default()),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::Relaxed)
    }

    /// 查找开始时引擎的代数；驱动还没跑第一个时间片时为 `None`
    pub fn generation(&self) -> Option<u64> {
        match self.state.generation.load(Ordering::Acquire) {
            0 => None,
            generation => Some(generation),
        }
    }

    /// 引擎上的查找是否仍属于这个任务（没有被新查找或 `stop` 取代）
    pub fn is_current<D: Layout>(&self, engine: &FindInPage<D>) -> bool {
        self.state.is_current(engine)
    }
}

pub struct FindService {
    runtime: tokio::runtime::Handle,
    budget: Duration,
    interval: Duration,
}

impl FindService {
    pub fn new(runtime: tokio::runtime::Handle, config: &FindConfig) -> Self {
        Self {
            runtime,
            budget: config.default_timeout(),
            interval: config.slice_interval(),
        }
    }

    /// 在共享引擎上启动查找
    ///
    /// 取消标志被置位时撤销高亮并发送 `Cancelled`；
    /// 引擎被别处开始的新查找取代时直接发送 `Cancelled`，不动新查找的状态。
    pub fn start<D>(
        &self,
        session: Arc<Mutex<FindInPage<D>>>,
        phrase: String,
        tx: SyncSender<FindMessage>,
    ) -> FindTask
    where
        D: Layout + Send + 'static,
        D::Node: Send,
    {
        let task = FindTask::new();
        let find_id = task.id();
        let state = task.state.clone();
        let budget = self.budget;
        let interval = self.interval;

        self.runtime.spawn(async move {
            let mut outcome = {
                let mut engine = lock(&session);
                let outcome = engine.find_string(&phrase, budget);
                state
                    .generation
                    .store(engine.generation(), Ordering::Release);
                outcome
            };
            let mut slices = 1usize;

            loop {
                if let FindOutcome::Complete(matches) = outcome {
                    tracing::debug!(find_id, slices, matches, "find task complete");
                    let _ = tx.send(FindMessage::Complete { find_id, matches });
                    return;
                }
                let _ = tx.send(FindMessage::Progress { find_id, slices });

                if interval.is_zero() {
                    tokio::task::yield_now().await;
                } else {
                    tokio::time::sleep(interval).await;
                }

                let mut engine = lock(&session);
                if !state.is_current(&engine) {
                    tracing::debug!(find_id, "find superseded");
                    let _ = tx.send(FindMessage::Cancelled { find_id });
                    return;
                }
                if state.cancelled.load(Ordering::Relaxed) {
                    engine.stop();
                    tracing::debug!(find_id, "find cancelled");
                    let _ = tx.send(FindMessage::Cancelled { find_id });
                    return;
                }
                outcome = engine.pump_search(budget);
                slices += 1;
            }
        });

        task
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
#[path = "../tests/unit/service.rs"]
mod tests;
