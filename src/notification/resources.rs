//! 宿主资源与通知渠道 - 图标/颜色查找和渠道登记

use anyhow::Result;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use tracing::debug;

use super::alert::ResourceId;
use crate::config::{ChannelImportance, HostResourcesConfig};

/// 资源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Drawable,
    Color,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Drawable => "drawable",
            ResourceKind::Color => "color",
        }
    }
}

/// 应用资源查找（尽力而为，找不到返回 None）
pub trait ResourceResolver: Send + Sync {
    fn lookup(&self, name: &str, kind: ResourceKind) -> Option<ResourceId>;

    /// 宿主应用自身图标
    fn application_icon(&self) -> ResourceId;

    /// 颜色资源的 ARGB 值
    fn color_value(&self, id: ResourceId) -> Option<u32>;
}

/// 固定资源表
pub struct StaticResources {
    application_icon: ResourceId,
    entries: HashMap<(ResourceKind, String), ResourceId>,
    colors: HashMap<ResourceId, u32>,
}

impl StaticResources {
    pub fn new(application_icon: ResourceId) -> Self {
        Self {
            application_icon,
            entries: HashMap::new(),
            colors: HashMap::new(),
        }
    }

    pub fn with_drawable(mut self, name: impl Into<String>, id: ResourceId) -> Self {
        self.entries.insert((ResourceKind::Drawable, name.into()), id);
        self
    }

    pub fn with_color(mut self, name: impl Into<String>, id: ResourceId, argb: u32) -> Self {
        self.entries.insert((ResourceKind::Color, name.into()), id);
        self.colors.insert(id, argb);
        self
    }

    /// 从配置构建；颜色资源 id 按名称排序后依次分配
    pub fn from_config(config: &HostResourcesConfig) -> Self {
        let mut resources = Self::new(ResourceId(config.application_icon));
        for (name, id) in &config.drawables {
            resources = resources.with_drawable(name.clone(), ResourceId(*id));
        }

        let mut colors: Vec<(&String, &u32)> = config.colors.iter().collect();
        colors.sort();
        for (i, (name, argb)) in colors.into_iter().enumerate() {
            resources = resources.with_color(name.clone(), ResourceId(0x7f06_0000 + i as u32), *argb);
        }
        resources
    }
}

impl ResourceResolver for StaticResources {
    fn lookup(&self, name: &str, kind: ResourceKind) -> Option<ResourceId> {
        self.entries.get(&(kind, name.to_string())).copied()
    }

    fn application_icon(&self) -> ResourceId {
        self.application_icon
    }

    fn color_value(&self, id: ResourceId) -> Option<u32> {
        self.colors.get(&id).copied()
    }
}

/// 渠道描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSpec {
    pub id: String,
    pub name: String,
    pub importance: ChannelImportance,
}

/// 通知渠道登记（幂等：已存在则不变）
pub trait ChannelRegistry: Send + Sync {
    fn ensure_channel(&self, channel: &ChannelSpec) -> Result<()>;
}

/// 内存渠道登记
#[derive(Debug, Default)]
pub struct InMemoryChannelRegistry {
    channels: Mutex<Vec<ChannelSpec>>,
}

impl InMemoryChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channels(&self) -> Vec<ChannelSpec> {
        self.lock().clone()
    }

    pub fn channel_ids(&self) -> HashSet<String> {
        self.lock().iter().map(|c| c.id.clone()).collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ChannelSpec>> {
        self.channels.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ChannelRegistry for InMemoryChannelRegistry {
    fn ensure_channel(&self, channel: &ChannelSpec) -> Result<()> {
        let mut channels = self.lock();
        if !channels.iter().any(|c| c.id == channel.id) {
            debug!(channel_id = %channel.id, "Creating notification channel");
            channels.push(channel.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_resources_lookup() {
        let resources = StaticResources::new(ResourceId(1))
            .with_drawable("notification_icon", ResourceId(2))
            .with_color("colorAccent", ResourceId(3), 0xFF00_8800);

        assert_eq!(resources.lookup("notification_icon", ResourceKind::Drawable), Some(ResourceId(2)));
        assert_eq!(resources.lookup("notification_icon", ResourceKind::Color), None);
        assert_eq!(resources.lookup("colorAccent", ResourceKind::Color), Some(ResourceId(3)));
        assert_eq!(resources.color_value(ResourceId(3)), Some(0xFF00_8800));
        assert_eq!(resources.application_icon(), ResourceId(1));
    }

    #[test]
    fn test_from_config() {
        let mut config = HostResourcesConfig::default();
        config.drawables.insert("notification_icon".to_string(), 7);
        config.colors.insert("colorAccent".to_string(), 0xFF11_2233);

        let resources = StaticResources::from_config(&config);
        assert_eq!(resources.lookup("notification_icon", ResourceKind::Drawable), Some(ResourceId(7)));
        let color_id = resources.lookup("colorAccent", ResourceKind::Color).unwrap();
        assert_eq!(resources.color_value(color_id), Some(0xFF11_2233));
    }

    #[test]
    fn test_ensure_channel_is_idempotent() {
        let registry = InMemoryChannelRegistry::new();
        let spec = ChannelSpec {
            id: "channel_01".to_string(),
            name: "Channel Name".to_string(),
            importance: ChannelImportance::Default,
        };

        registry.ensure_channel(&spec).unwrap();
        registry.ensure_channel(&spec).unwrap();
        assert_eq!(registry.channels().len(), 1);
        assert!(registry.channel_ids().contains("channel_01"));
    }
}
