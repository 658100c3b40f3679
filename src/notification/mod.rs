//! 推送通知投递核心
//!
//! # 设计目标
//! 1. 分发决策：`DispatchEngine` 根据应用生命周期决定立即投递、延迟投递或先启动应用
//! 2. 展示构建：`PresentationBuilder` 按条件叠加来电、振动、持续提醒等规则
//! 3. 协作方解耦：生命周期、启动器、资源、渠道、托盘、电源都是 trait，可替换
//!
//! # 使用示例
//! ```ignore
//! use notification_bridge::notification::NotificationBridge;
//!
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
//! bridge.handle_opened(payload)?;
//! ```

pub mod alert;
pub mod builder;
pub mod bus;
pub mod cold_start;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod launcher;
pub mod lifecycle;
pub mod poster;
pub mod props;
pub mod push;
pub mod resources;

pub use alert::{ActivationTarget, AlertCategory, AlertSound, AlertVisibility, PlatformAlert, PresentationOptions, ResourceId};
pub use builder::{DefaultPresentationBuilder, PresentationBuilder};
pub use bus::{DeliveredEvent, EventBus, EventBusRef, InMemoryEventBus};
pub use cold_start::ColdStartHolder;
pub use dispatcher::{DispatchEngine, OpenAction, OpenOutcome, ReceiveOutcome};
pub use error::InvalidNotification;
pub use event::BridgeEvent;
pub use launcher::{Launcher, RecordingLauncher};
pub use lifecycle::{AppLifecycle, AppLifecycleState, LifecycleOracle, ListenerId, VisibilityListener, VisibilitySubscription};
pub use poster::{IdGenerator, InMemoryTray, NotificationTray, PowerManager, Poster, SimulatedPower, TimeIdGenerator};
pub use props::NotificationProperties;
pub use push::{NotificationBridge, NotificationBridgeBuilder, PushNotification};
pub use resources::{ChannelRegistry, ChannelSpec, InMemoryChannelRegistry, ResourceKind, ResourceResolver, StaticResources};
