//! 通知投递 - 分配 id、提交到托盘、熄屏时短暂点亮屏幕

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::alert::PlatformAlert;
use crate::config::BridgeConfig;

/// 单调纳秒时钟
pub trait NanoClock: Send + Sync {
    fn now_nanos(&self) -> u64;
}

/// 基于 `Instant` 的单调时钟（从进程内首次调用起算）
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl NanoClock for MonotonicClock {
    fn now_nanos(&self) -> u64 {
        static ORIGIN: OnceLock<Instant> = OnceLock::new();
        let origin = ORIGIN.get_or_init(Instant::now);
        origin.elapsed().as_nanos() as u64
    }
}

/// 通知 id 生成策略
pub trait IdGenerator: Send + Sync {
    fn next_id(&self, alert: &PlatformAlert) -> i32;
}

impl<F> IdGenerator for F
where
    F: Fn(&PlatformAlert) -> i32 + Send + Sync,
{
    fn next_id(&self, alert: &PlatformAlert) -> i32 {
        self(alert)
    }
}

/// 将纳秒时间截断到 32 位作为 id
///
/// 时间足够接近的两次调用会得到相同 id，后者覆盖前者。
pub struct TimeIdGenerator<C: NanoClock = MonotonicClock> {
    clock: C,
}

impl TimeIdGenerator<MonotonicClock> {
    pub fn new() -> Self {
        Self { clock: MonotonicClock }
    }
}

impl Default for TimeIdGenerator<MonotonicClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: NanoClock> TimeIdGenerator<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: NanoClock> IdGenerator for TimeIdGenerator<C> {
    fn next_id(&self, _alert: &PlatformAlert) -> i32 {
        self.clock.now_nanos() as i32
    }
}

/// 系统通知托盘
pub trait NotificationTray: Send + Sync {
    /// 同一 id 再次提交时原地替换
    fn notify(&self, id: i32, alert: &PlatformAlert) -> Result<()>;
}

/// 托盘中的一条通知
#[derive(Debug, Clone, Serialize)]
pub struct TrayEntry {
    pub id: i32,
    pub alert: PlatformAlert,
    pub posted_at: DateTime<Utc>,
}

/// 内存托盘
#[derive(Debug, Default)]
pub struct InMemoryTray {
    entries: Mutex<HashMap<i32, TrayEntry>>,
}

impl InMemoryTray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: i32) -> Option<TrayEntry> {
        self.lock().get(&id).cloned()
    }

    /// 按 id 排序的全部通知
    pub fn entries(&self) -> Vec<TrayEntry> {
        let mut entries: Vec<TrayEntry> = self.lock().values().cloned().collect();
        entries.sort_by_key(|e| e.id);
        entries
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<i32, TrayEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl NotificationTray for InMemoryTray {
    fn notify(&self, id: i32, alert: &PlatformAlert) -> Result<()> {
        let entry = TrayEntry {
            id,
            alert: alert.clone(),
            posted_at: Utc::now(),
        };
        if self.lock().insert(id, entry).is_some() {
            debug!(notification_id = id, "Replaced existing tray notification");
        }
        Ok(())
    }
}

/// 电源管理
pub trait PowerManager: Send + Sync {
    /// 屏幕是否亮着
    fn is_interactive(&self) -> bool;

    /// 点亮屏幕并在 `duration` 后自动释放
    fn acquire_wake_lock(&self, tag: &str, duration: Duration) -> Result<()>;
}

/// 模拟电源：记录唤醒请求
#[derive(Debug)]
pub struct SimulatedPower {
    interactive: AtomicBool,
    fail_acquire: AtomicBool,
    acquisitions: Mutex<Vec<(String, Duration)>>,
    acquire_count: AtomicU64,
}

impl SimulatedPower {
    pub fn new(interactive: bool) -> Self {
        Self {
            interactive: AtomicBool::new(interactive),
            fail_acquire: AtomicBool::new(false),
            acquisitions: Mutex::new(Vec::new()),
            acquire_count: AtomicU64::new(0),
        }
    }

    /// 让后续唤醒请求失败
    pub fn failing(self) -> Self {
        self.fail_acquire.store(true, Ordering::SeqCst);
        self
    }

    pub fn set_interactive(&self, interactive: bool) {
        self.interactive.store(interactive, Ordering::SeqCst);
    }

    pub fn acquisitions(&self) -> Vec<(String, Duration)> {
        self.acquisitions.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn acquire_count(&self) -> u64 {
        self.acquire_count.load(Ordering::SeqCst)
    }
}

impl PowerManager for SimulatedPower {
    fn is_interactive(&self) -> bool {
        self.interactive.load(Ordering::SeqCst)
    }

    fn acquire_wake_lock(&self, tag: &str, duration: Duration) -> Result<()> {
        self.acquire_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_acquire.load(Ordering::SeqCst) {
            anyhow::bail!("wake lock permission denied");
        }
        self.acquisitions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((tag.to_string(), duration));
        Ok(())
    }
}

/// 通知投递器
pub struct Poster {
    tray: Arc<dyn NotificationTray>,
    power: Arc<dyn PowerManager>,
    id_generator: Box<dyn IdGenerator>,
    wake_duration: Duration,
    wake_tag: String,
}

impl Poster {
    pub fn new(tray: Arc<dyn NotificationTray>, power: Arc<dyn PowerManager>) -> Self {
        let config = BridgeConfig::default();
        Self {
            tray,
            power,
            id_generator: Box::new(TimeIdGenerator::new()),
            wake_duration: Duration::from_millis(config.wake_lock_duration_ms),
            wake_tag: config.wake_lock_tag,
        }
    }

    /// 替换 id 生成策略
    pub fn with_id_generator(mut self, id_generator: impl IdGenerator + 'static) -> Self {
        self.id_generator = Box::new(id_generator);
        self
    }

    pub fn with_boxed_id_generator(mut self, id_generator: Box<dyn IdGenerator>) -> Self {
        self.id_generator = id_generator;
        self
    }

    pub fn with_config(mut self, config: &BridgeConfig) -> Self {
        self.wake_duration = Duration::from_millis(config.wake_lock_duration_ms);
        self.wake_tag = config.wake_lock_tag.clone();
        self
    }

    /// 提交通知并返回 id；托盘或唤醒失败只记录日志
    pub fn post(&self, alert: &PlatformAlert, supplied_id: Option<i32>) -> i32 {
        let id = supplied_id.unwrap_or_else(|| self.id_generator.next_id(alert));

        match self.tray.notify(id, alert) {
            Ok(()) => info!(notification_id = id, title = ?alert.title, "Posted notification"),
            Err(e) => warn!(notification_id = id, error = %e, "Failed to post notification"),
        }

        self.wake_screen_if_off();
        id
    }

    fn wake_screen_if_off(&self) {
        if self.power.is_interactive() {
            return;
        }
        match self.power.acquire_wake_lock(&self.wake_tag, self.wake_duration) {
            Ok(()) => debug!(
                duration_ms = self.wake_duration.as_millis() as u64,
                "Screen off, acquired temporary wake lock"
            ),
            Err(e) => warn!(error = %e, "Failed to acquire wake lock"),
        }
    }
}
