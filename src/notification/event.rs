//! 应用事件 - 桥接层发给应用代码的三类事件

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::props::NotificationProperties;

/// 应用在前台时收到通知
pub const RECEIVED_FOREGROUND: &str = "received-foreground";
/// 应用不可见时收到通知
pub const RECEIVED_BACKGROUND: &str = "received-background";
/// 用户打开了通知
pub const OPENED: &str = "opened";

/// 出站事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum BridgeEvent {
    ReceivedForeground(Value),
    ReceivedBackground(Value),
    /// payload 形如 `{"notification": {...}}`
    Opened(Value),
}

impl BridgeEvent {
    pub fn received_foreground(props: &NotificationProperties) -> Self {
        BridgeEvent::ReceivedForeground(props.as_external_payload())
    }

    pub fn received_background(props: &NotificationProperties) -> Self {
        BridgeEvent::ReceivedBackground(props.as_external_payload())
    }

    pub fn opened(props: &NotificationProperties) -> Self {
        BridgeEvent::Opened(props.opened_payload())
    }

    pub fn topic(&self) -> &'static str {
        match self {
            BridgeEvent::ReceivedForeground(_) => RECEIVED_FOREGROUND,
            BridgeEvent::ReceivedBackground(_) => RECEIVED_BACKGROUND,
            BridgeEvent::Opened(_) => OPENED,
        }
    }

    pub fn payload(&self) -> &Value {
        match self {
            BridgeEvent::ReceivedForeground(p)
            | BridgeEvent::ReceivedBackground(p)
            | BridgeEvent::Opened(p) => p,
        }
    }

    pub fn into_payload(self) -> Value {
        match self {
            BridgeEvent::ReceivedForeground(p)
            | BridgeEvent::ReceivedBackground(p)
            | BridgeEvent::Opened(p) => p,
        }
    }
}
