//! 桥接配置 - 从 JSON 文件加载，所有字段都有默认值
//!
//! 默认路径：`~/.config/notification-bridge/config.json`

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 渠道重要性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelImportance {
    Min,
    Low,
    #[default]
    Default,
    High,
}

/// 回退渠道配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackChannelConfig {
    pub id: String,
    pub name: String,
    pub importance: ChannelImportance,
}

impl Default for FallbackChannelConfig {
    fn default() -> Self {
        Self {
            id: "channel_01".to_string(),
            name: "Channel Name".to_string(),
            importance: ChannelImportance::Default,
        }
    }
}

/// 模拟宿主的资源表（`nbridge` 使用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostResourcesConfig {
    /// 应用自身图标 id
    pub application_icon: u32,
    /// drawable 名称 -> 资源 id
    pub drawables: HashMap<String, u32>,
    /// color 名称 -> ARGB 值
    pub colors: HashMap<String, u32>,
}

impl Default for HostResourcesConfig {
    fn default() -> Self {
        Self {
            application_icon: 0x7f0d_0000,
            drawables: HashMap::new(),
            colors: HashMap::new(),
        }
    }
}

/// 桥接配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// 未指定 channelId 时使用的渠道
    pub fallback_channel: FallbackChannelConfig,
    /// 通知小图标资源名
    pub icon_resource: String,
    /// 强调色资源名
    pub color_resource: String,
    /// 熄屏时点亮屏幕的时长（毫秒）
    pub wake_lock_duration_ms: u64,
    pub wake_lock_tag: String,
    pub host_resources: HostResourcesConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            fallback_channel: FallbackChannelConfig::default(),
            icon_resource: "notification_icon".to_string(),
            color_resource: "colorAccent".to_string(),
            wake_lock_duration_ms: 3000,
            wake_lock_tag: "notification-bridge:notificationLock".to_string(),
            host_resources: HostResourcesConfig::default(),
        }
    }
}

impl BridgeConfig {
    /// 默认配置文件路径
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("notification-bridge")
            .join("config.json")
    }

    /// 从指定路径加载
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: BridgeConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        debug!(path = %path.display(), "Loaded bridge config");
        Ok(config)
    }

    /// 加载配置：指定路径必须存在；默认路径不存在时使用默认值
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from(p),
            None => {
                let default_path = Self::default_path();
                if default_path.exists() {
                    Self::load_from(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}
