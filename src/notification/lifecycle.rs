//! 应用生命周期 - 状态查询与一次性可见性订阅
//!
//! `LifecycleOracle` 是宿主运行时的抽象；`AppLifecycle` 是内存实现，
//! 用于测试和 `nbridge` 模拟宿主。

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tracing::debug;

/// 应用生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppLifecycleState {
    /// 运行时尚未初始化
    Uninitialized,
    /// 已初始化，不可见，未销毁
    BackgroundReady,
    /// 可见
    Foreground,
    /// 已销毁
    Destroyed,
}

impl AppLifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppLifecycleState::Uninitialized => "uninitialized",
            AppLifecycleState::BackgroundReady => "background_ready",
            AppLifecycleState::Foreground => "foreground",
            AppLifecycleState::Destroyed => "destroyed",
        }
    }
}

impl std::fmt::Display for AppLifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 监听器注册标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// 可见性变化监听器
pub trait VisibilityListener: Send + Sync {
    fn on_app_visible(&self);

    fn on_app_not_visible(&self) {}
}

/// 生命周期查询与可见性订阅
pub trait LifecycleOracle: Send + Sync {
    fn is_visible(&self) -> bool;

    fn is_initialized(&self) -> bool;

    fn is_destroyed(&self) -> bool;

    /// 是否存在可同步投递事件的前台界面
    fn has_active_surface(&self) -> bool;

    fn add_visibility_listener(&self, listener: Arc<dyn VisibilityListener>) -> ListenerId;

    /// 返回该监听器此前是否仍在注册中
    fn remove_visibility_listener(&self, id: ListenerId) -> bool;
}

/// 可见性订阅句柄 - 只暴露取消订阅能力
///
/// 只持有 oracle 的弱引用：监听器通常会持有自己的句柄，而 oracle 又持有监听器。
pub struct VisibilitySubscription {
    oracle: Weak<dyn LifecycleOracle>,
    id: ListenerId,
    active: AtomicBool,
}

impl VisibilitySubscription {
    /// 注册监听器并返回句柄
    pub fn subscribe(oracle: Arc<dyn LifecycleOracle>, listener: Arc<dyn VisibilityListener>) -> Self {
        let id = oracle.add_visibility_listener(listener);
        Self {
            oracle: Arc::downgrade(&oracle),
            id,
            active: AtomicBool::new(true),
        }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// 取消订阅（幂等）。oracle 已释放时监听器随之释放，无需移除
    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(oracle) = self.oracle.upgrade() {
            oracle.remove_visibility_listener(self.id);
            debug!(listener_id = self.id.0, "Visibility subscription removed");
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct LifecycleSnapshot {
    state: AppLifecycleState,
    has_surface: bool,
}

/// 内存生命周期实现
///
/// 状态切换时先在锁内快照监听器，再在锁外回调，监听器可以在回调中移除自己。
pub struct AppLifecycle {
    snapshot: Mutex<LifecycleSnapshot>,
    listeners: Mutex<Vec<(ListenerId, Arc<dyn VisibilityListener>)>>,
    next_id: AtomicU64,
}

impl AppLifecycle {
    pub fn new(state: AppLifecycleState) -> Self {
        Self {
            snapshot: Mutex::new(LifecycleSnapshot {
                state,
                has_surface: state == AppLifecycleState::Foreground,
            }),
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// 指定是否存在前台界面
    pub fn with_surface(self, has_surface: bool) -> Self {
        self.set_surface(has_surface);
        self
    }

    pub fn state(&self) -> AppLifecycleState {
        self.lock_snapshot().state
    }

    pub fn set_surface(&self, has_surface: bool) {
        self.lock_snapshot().has_surface = has_surface;
    }

    /// 切换状态，并在可见性变化时通知监听器
    pub fn set_state(&self, state: AppLifecycleState) {
        let previous = {
            let mut snapshot = self.lock_snapshot();
            let previous = snapshot.state;
            snapshot.state = state;
            if state == AppLifecycleState::Foreground {
                snapshot.has_surface = true;
            }
            previous
        };

        let was_visible = previous == AppLifecycleState::Foreground;
        let is_visible = state == AppLifecycleState::Foreground;
        debug!(from = %previous, to = %state, "App lifecycle transition");

        if was_visible == is_visible {
            return;
        }

        let listeners: Vec<Arc<dyn VisibilityListener>> = self
            .lock_listeners()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();

        for listener in listeners {
            if is_visible {
                listener.on_app_visible();
            } else {
                listener.on_app_not_visible();
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.lock_listeners().len()
    }

    fn lock_snapshot(&self) -> std::sync::MutexGuard<'_, LifecycleSnapshot> {
        self.snapshot.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_listeners(&self) -> std::sync::MutexGuard<'_, Vec<(ListenerId, Arc<dyn VisibilityListener>)>> {
        self.listeners.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl LifecycleOracle for AppLifecycle {
    fn is_visible(&self) -> bool {
        self.state() == AppLifecycleState::Foreground
    }

    fn is_initialized(&self) -> bool {
        self.state() != AppLifecycleState::Uninitialized
    }

    fn is_destroyed(&self) -> bool {
        self.state() == AppLifecycleState::Destroyed
    }

    fn has_active_surface(&self) -> bool {
        self.lock_snapshot().has_surface
    }

    fn add_visibility_listener(&self, listener: Arc<dyn VisibilityListener>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock_listeners().push((id, listener));
        id
    }

    fn remove_visibility_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.lock_listeners();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }
}
