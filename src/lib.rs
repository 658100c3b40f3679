//! Notification Bridge - 推送通知投递核心
//!
//! 决定每条入站通知是立即交给应用、等应用可见后再交付，还是先启动应用；
//! 并按条件规则构建可显示的平台通知。

pub mod config;
pub mod notification;
pub mod simulator;

pub use config::BridgeConfig;
pub use notification::{
    BridgeEvent, ColdStartHolder, DispatchEngine, InvalidNotification, NotificationBridge,
    NotificationProperties, OpenAction, OpenOutcome, PlatformAlert, PresentationBuilder,
    PushNotification, ReceiveOutcome,
};
pub use simulator::{HostOptions, SimulatedHost};
