//! 平台通知表示 - 由 PresentationBuilder 生成，交给 Poster 显示

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::props::NotificationProperties;

/// 点击通知时触发的动作
pub const OPEN_ACTION: &str = "notification-opened";

/// 通知被点击时宿主触发的目标（携带通知的透传 payload）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivationTarget {
    pub action: String,
    pub payload: Value,
}

impl ActivationTarget {
    pub fn open(props: &NotificationProperties) -> Self {
        Self {
            action: OPEN_ACTION.to_string(),
            payload: props.as_external_payload(),
        }
    }
}

/// 默认提示开关 - 每个字段独立设置，不做位翻转
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationOptions {
    /// 使用系统默认提示音
    pub sound_enabled: bool,
    /// 使用系统默认振动
    pub vibrate_enabled: bool,
    pub lights_enabled: bool,
    /// 点击后自动消失
    pub auto_cancel: bool,
    /// 常驻通知
    pub ongoing: bool,
    /// 重复提示直到被处理
    pub insistent: bool,
}

impl Default for PresentationOptions {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            vibrate_enabled: true,
            lights_enabled: true,
            auto_cancel: true,
            ongoing: false,
            insistent: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertCategory {
    Call,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertVisibility {
    /// 锁屏上显示完整内容
    Public,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundSource {
    DefaultRingtone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioUsage {
    NotificationRingtone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioContentType {
    Sonification,
}

/// 显式提示音
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSound {
    pub source: SoundSource,
    pub usage: AudioUsage,
    pub content_type: AudioContentType,
}

impl AlertSound {
    /// 系统默认铃声（来电类）
    pub fn ringtone() -> Self {
        Self {
            source: SoundSource::DefaultRingtone,
            usage: AudioUsage::NotificationRingtone,
            content_type: AudioContentType::Sonification,
        }
    }
}

/// 资源标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId(pub u32);

/// 可显示的平台通知
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformAlert {
    pub title: Option<String>,
    pub body: Option<String>,
    pub content_target: ActivationTarget,
    pub full_screen_target: Option<ActivationTarget>,
    pub options: PresentationOptions,
    pub sound: Option<AlertSound>,
    pub vibration_pattern: Option<Vec<u64>>,
    pub category: Option<AlertCategory>,
    pub visibility: Option<AlertVisibility>,
    pub priority: i32,
    pub small_icon: Option<ResourceId>,
    /// ARGB
    pub color: Option<u32>,
    pub channel_id: Option<String>,
}

impl PlatformAlert {
    /// 基础通知：标题、正文、点击目标、默认提示全开、点击后自动消失
    pub fn base(props: &NotificationProperties) -> Self {
        Self {
            title: props.title().map(|s| s.to_string()),
            body: props.body().map(|s| s.to_string()),
            content_target: ActivationTarget::open(props),
            full_screen_target: None,
            options: PresentationOptions::default(),
            sound: None,
            vibration_pattern: None,
            category: None,
            visibility: None,
            priority: 0,
            small_icon: None,
            color: None,
            channel_id: None,
        }
    }
}
