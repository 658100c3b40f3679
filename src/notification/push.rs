//! 推送通知入口 - 每个运行时一个 `NotificationBridge`，每条通知一个 `PushNotification`
//!
//! # 使用示例
//! ```ignore
//! let bridge = NotificationBridge::builder()
//!     .lifecycle(lifecycle)
//!     .launcher(launcher)
//!     .event_bus(bus)
//!     .resources(resources)
//!     .channels(channels)
//!     .tray(tray)
//!     .power(power)
//!     .build()?;
//!
//! let notification = bridge.notification(payload)?;
//! notification.on_received();
//! let id = notification.on_post_request(None);
//! ```

use anyhow::{anyhow, Result};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use super::builder::{DefaultPresentationBuilder, PresentationBuilder};
use super::bus::EventBusRef;
use super::cold_start::ColdStartHolder;
use super::dispatcher::{DispatchEngine, OpenOutcome, ReceiveOutcome};
use super::error::InvalidNotification;
use super::launcher::Launcher;
use super::lifecycle::LifecycleOracle;
use super::poster::{IdGenerator, NotificationTray, PowerManager, Poster};
use super::props::NotificationProperties;
use super::resources::{ChannelRegistry, ResourceResolver};
use crate::config::BridgeConfig;

/// 运行时级别的桥接实例
pub struct NotificationBridge {
    engine: DispatchEngine,
    presentation: Arc<dyn PresentationBuilder>,
    poster: Poster,
    cold_start: Arc<ColdStartHolder>,
}

impl NotificationBridge {
    pub fn builder() -> NotificationBridgeBuilder {
        NotificationBridgeBuilder::new()
    }

    /// 为一条入站 payload 创建通知对象
    pub fn notification(&self, payload: Value) -> std::result::Result<PushNotification<'_>, InvalidNotification> {
        let props = NotificationProperties::from_value(payload)?;
        Ok(PushNotification { bridge: self, props })
    }

    /// 为已解析的属性创建通知对象
    pub fn notification_from_props(&self, props: NotificationProperties) -> PushNotification<'_> {
        PushNotification { bridge: self, props }
    }

    pub fn handle_received(&self, payload: Value) -> std::result::Result<ReceiveOutcome, InvalidNotification> {
        Ok(self.notification(payload)?.on_received())
    }

    pub fn handle_opened(&self, payload: Value) -> std::result::Result<OpenOutcome, InvalidNotification> {
        Ok(self.notification(payload)?.on_opened())
    }

    /// 应用由携带 payload 的启动请求拉起时调用；来自后台投递 provider 的 payload 存为初始通知
    pub fn handle_launch_extras(&self, payload: Value) -> std::result::Result<bool, InvalidNotification> {
        let props = NotificationProperties::from_value(payload)?;
        if props.is_cold_start_origin() {
            debug!(title = ?props.title(), "Launch extras carry a background payload, storing as initial");
            self.cold_start.set(props);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// 应用初始化后读取初始通知（读取后清空槽位）
    pub fn take_initial_notification(&self) -> Option<NotificationProperties> {
        let initial = self.cold_start.take_if_present();
        self.cold_start.clear();
        initial
    }

    pub fn cold_start(&self) -> &Arc<ColdStartHolder> {
        &self.cold_start
    }
}

/// 单条推送通知
pub struct PushNotification<'a> {
    bridge: &'a NotificationBridge,
    props: NotificationProperties,
}

impl PushNotification<'_> {
    pub fn on_received(&self) -> ReceiveOutcome {
        self.bridge.engine.on_receive(&self.props)
    }

    pub fn on_opened(&self) -> OpenOutcome {
        self.bridge.engine.on_open(&self.props)
    }

    /// 构建并提交托盘通知，返回 id
    pub fn on_post_request(&self, notification_id: Option<i32>) -> i32 {
        let alert = self.bridge.presentation.build(&self.props);
        self.bridge.poster.post(&alert, notification_id)
    }

    /// 属性副本
    pub fn as_props(&self) -> NotificationProperties {
        self.props.copy()
    }
}

/// `NotificationBridge` 构建器
#[derive(Default)]
pub struct NotificationBridgeBuilder {
    config: BridgeConfig,
    lifecycle: Option<Arc<dyn LifecycleOracle>>,
    launcher: Option<Arc<dyn Launcher>>,
    event_bus: Option<EventBusRef>,
    resources: Option<Arc<dyn ResourceResolver>>,
    channels: Option<Arc<dyn ChannelRegistry>>,
    tray: Option<Arc<dyn NotificationTray>>,
    power: Option<Arc<dyn PowerManager>>,
    presentation: Option<Arc<dyn PresentationBuilder>>,
    id_generator: Option<Box<dyn IdGenerator>>,
    cold_start: Option<Arc<ColdStartHolder>>,
}

impl NotificationBridgeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn lifecycle(mut self, lifecycle: Arc<dyn LifecycleOracle>) -> Self {
        self.lifecycle = Some(lifecycle);
        self
    }

    pub fn launcher(mut self, launcher: Arc<dyn Launcher>) -> Self {
        self.launcher = Some(launcher);
        self
    }

    pub fn event_bus(mut self, bus: EventBusRef) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn resources(mut self, resources: Arc<dyn ResourceResolver>) -> Self {
        self.resources = Some(resources);
        self
    }

    pub fn channels(mut self, channels: Arc<dyn ChannelRegistry>) -> Self {
        self.channels = Some(channels);
        self
    }

    pub fn tray(mut self, tray: Arc<dyn NotificationTray>) -> Self {
        self.tray = Some(tray);
        self
    }

    pub fn power(mut self, power: Arc<dyn PowerManager>) -> Self {
        self.power = Some(power);
        self
    }

    /// 替换默认展示构建器（此时 resources/channels 可省略）
    pub fn presentation(mut self, presentation: Arc<dyn PresentationBuilder>) -> Self {
        self.presentation = Some(presentation);
        self
    }

    pub fn id_generator(mut self, id_generator: impl IdGenerator + 'static) -> Self {
        self.id_generator = Some(Box::new(id_generator));
        self
    }

    /// 共享已有的冷启动槽位（默认新建）
    pub fn cold_start(mut self, holder: Arc<ColdStartHolder>) -> Self {
        self.cold_start = Some(holder);
        self
    }

    pub fn build(self) -> Result<NotificationBridge> {
        let lifecycle = self.lifecycle.ok_or_else(|| anyhow!("lifecycle oracle is required"))?;
        let launcher = self.launcher.ok_or_else(|| anyhow!("launcher is required"))?;
        let event_bus = self.event_bus.ok_or_else(|| anyhow!("event bus is required"))?;
        let tray = self.tray.ok_or_else(|| anyhow!("notification tray is required"))?;
        let power = self.power.ok_or_else(|| anyhow!("power manager is required"))?;

        let presentation: Arc<dyn PresentationBuilder> = match self.presentation {
            Some(p) => p,
            None => {
                let resources = self
                    .resources
                    .ok_or_else(|| anyhow!("resource resolver is required"))?;
                let channels = self
                    .channels
                    .ok_or_else(|| anyhow!("channel registry is required"))?;
                Arc::new(DefaultPresentationBuilder::new(resources, channels).with_config(&self.config))
            }
        };

        let mut poster = Poster::new(tray, power).with_config(&self.config);
        if let Some(id_generator) = self.id_generator {
            poster = poster.with_boxed_id_generator(id_generator);
        }

        let cold_start = self.cold_start.unwrap_or_default();
        let engine = DispatchEngine::new(lifecycle, launcher, event_bus, Arc::clone(&cold_start));

        info!(
            fallback_channel = %self.config.fallback_channel.id,
            wake_lock_ms = self.config.wake_lock_duration_ms,
            "Notification bridge ready"
        );

        Ok(NotificationBridge {
            engine,
            presentation,
            poster,
            cold_start,
        })
    }
}
