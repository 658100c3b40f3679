//! 通知分发引擎 - 决定立即投递、等待可见后投递，还是先启动应用
//!
//! # 打开路径
//! 1. 运行时未初始化：存入冷启动槽位，启动应用，结束
//! 2. 已初始化但没有前台界面：存入冷启动槽位，继续
//! 3. 可见：立即发出 `opened`
//! 4. 已销毁：启动应用（重新初始化后从冷启动槽位读取）
//! 5. 后台：先注册一次性可见性订阅，再启动应用

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::bus::EventBusRef;
use super::cold_start::ColdStartHolder;
use super::event::BridgeEvent;
use super::launcher::Launcher;
use super::lifecycle::{LifecycleOracle, VisibilityListener, VisibilitySubscription};
use super::props::NotificationProperties;

/// 接收路径的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiveOutcome {
    /// 发出了 `received-foreground`
    Foreground,
    /// 发出了 `received-background`
    Background,
}

/// 打开路径采取的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenAction {
    /// 运行时未初始化，已启动应用
    ColdStart,
    /// 已立即发出 `opened`
    DispatchedNow,
    /// 运行时已销毁，已启动应用
    Relaunched,
    /// 已注册可见性订阅并启动应用
    Deferred,
}

/// 打开路径的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OpenOutcome {
    pub action: OpenAction,
    /// 是否存入了冷启动槽位
    pub stored_initial: bool,
}

/// 通知分发引擎
pub struct DispatchEngine {
    lifecycle: Arc<dyn LifecycleOracle>,
    launcher: Arc<dyn Launcher>,
    bus: EventBusRef,
    cold_start: Arc<ColdStartHolder>,
}

impl DispatchEngine {
    pub fn new(
        lifecycle: Arc<dyn LifecycleOracle>,
        launcher: Arc<dyn Launcher>,
        bus: EventBusRef,
        cold_start: Arc<ColdStartHolder>,
    ) -> Self {
        Self {
            lifecycle,
            launcher,
            bus,
            cold_start,
        }
    }

    pub fn cold_start(&self) -> &Arc<ColdStartHolder> {
        &self.cold_start
    }

    /// 接收路径：只根据可见性选择事件，不发托盘通知
    pub fn on_receive(&self, props: &NotificationProperties) -> ReceiveOutcome {
        if self.lifecycle.is_visible() {
            debug!(title = ?props.title(), "Notification received in foreground");
            self.bus.publish(BridgeEvent::received_foreground(props));
            ReceiveOutcome::Foreground
        } else {
            debug!(title = ?props.title(), "Notification received in background");
            self.bus.publish(BridgeEvent::received_background(props));
            ReceiveOutcome::Background
        }
    }

    /// 打开路径
    pub fn on_open(&self, props: &NotificationProperties) -> OpenOutcome {
        if !self.lifecycle.is_initialized() {
            self.set_as_initial_notification(props);
            self.launch_or_resume();
            info!(title = ?props.title(), "Runtime not initialized, launching app");
            return OpenOutcome {
                action: OpenAction::ColdStart,
                stored_initial: true,
            };
        }

        let stored_initial = if self.lifecycle.has_active_surface() {
            false
        } else {
            self.set_as_initial_notification(props);
            true
        };

        let action = if self.lifecycle.is_visible() {
            self.dispatch_immediately(props);
            OpenAction::DispatchedNow
        } else if self.lifecycle.is_destroyed() {
            info!(title = ?props.title(), "Runtime destroyed, relaunching app");
            self.launch_or_resume();
            OpenAction::Relaunched
        } else {
            self.dispatch_upon_visibility(props);
            OpenAction::Deferred
        };

        OpenOutcome {
            action,
            stored_initial,
        }
    }

    fn set_as_initial_notification(&self, props: &NotificationProperties) {
        debug!(title = ?props.title(), "Storing initial notification");
        self.cold_start.set(props.copy());
    }

    fn dispatch_immediately(&self, props: &NotificationProperties) {
        info!(title = ?props.title(), "Dispatching opened notification");
        self.bus.publish(BridgeEvent::opened(props));
    }

    fn dispatch_upon_visibility(&self, props: &NotificationProperties) {
        let listener = Arc::new(DeferredOpen::new(props.copy(), Arc::clone(&self.bus)));
        let subscription =
            VisibilitySubscription::subscribe(Arc::clone(&self.lifecycle), listener.clone());
        info!(
            title = ?props.title(),
            listener_id = subscription.id().0,
            "Deferring opened notification until app is visible"
        );
        listener.arm(subscription);

        // 订阅之后才启动，避免错过启动时同步发生的可见性变化
        self.launch_or_resume();
    }

    fn launch_or_resume(&self) {
        self.launcher.launch();
    }
}

/// 一次性延迟投递监听器
///
/// 回调的第一个动作是取消订阅，保证每个订阅最多投递一次。
struct DeferredOpen {
    props: NotificationProperties,
    bus: EventBusRef,
    fired: AtomicBool,
    subscription: Mutex<Option<VisibilitySubscription>>,
}

impl DeferredOpen {
    fn new(props: NotificationProperties, bus: EventBusRef) -> Self {
        Self {
            props,
            bus,
            fired: AtomicBool::new(false),
            subscription: Mutex::new(None),
        }
    }

    /// 交付订阅句柄；如果回调已先行触发，立即取消订阅
    fn arm(&self, subscription: VisibilitySubscription) {
        let mut slot = self.subscription.lock().unwrap_or_else(|e| e.into_inner());
        if self.fired.load(Ordering::SeqCst) {
            subscription.unsubscribe();
        } else {
            *slot = Some(subscription);
        }
    }
}

impl VisibilityListener for DeferredOpen {
    fn on_app_visible(&self) {
        if self.fired.swap(true, Ordering::SeqCst) {
            return;
        }
        let subscription = self
            .subscription
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(subscription) = subscription {
            subscription.unsubscribe();
        }

        info!(title = ?self.props.title(), "App became visible, dispatching deferred notification");
        self.bus.publish(BridgeEvent::opened(&self.props));
    }
}
