//! 通知展示构建器 - 将通知属性转换为平台通知
//!
//! 叠加规则按顺序应用：来电 -> 持续提醒 -> 振动 -> 优先级 -> 图标/颜色 -> 渠道。

use std::sync::Arc;
use tracing::{debug, warn};

use super::alert::{AlertCategory, AlertSound, AlertVisibility, PlatformAlert};
use super::props::NotificationProperties;
use super::resources::{ChannelRegistry, ChannelSpec, ResourceKind, ResourceResolver};
use crate::config::{BridgeConfig, FallbackChannelConfig};

/// 可替换的展示构建策略
pub trait PresentationBuilder: Send + Sync {
    fn build(&self, props: &NotificationProperties) -> PlatformAlert;
}

/// 默认展示构建器
pub struct DefaultPresentationBuilder {
    resources: Arc<dyn ResourceResolver>,
    channels: Arc<dyn ChannelRegistry>,
    icon_resource: String,
    color_resource: String,
    fallback_channel: FallbackChannelConfig,
}

impl DefaultPresentationBuilder {
    pub fn new(resources: Arc<dyn ResourceResolver>, channels: Arc<dyn ChannelRegistry>) -> Self {
        let config = BridgeConfig::default();
        Self {
            resources,
            channels,
            icon_resource: config.icon_resource,
            color_resource: config.color_resource,
            fallback_channel: config.fallback_channel,
        }
    }

    /// 使用配置中的资源名和回退渠道
    pub fn with_config(mut self, config: &BridgeConfig) -> Self {
        self.icon_resource = config.icon_resource.clone();
        self.color_resource = config.color_resource.clone();
        self.fallback_channel = config.fallback_channel.clone();
        self
    }

    fn apply_icon(&self, alert: &mut PlatformAlert) {
        let icon = self
            .resources
            .lookup(&self.icon_resource, ResourceKind::Drawable)
            .unwrap_or_else(|| {
                debug!(name = %self.icon_resource, "Icon resource not found, using application icon");
                self.resources.application_icon()
            });
        alert.small_icon = Some(icon);

        alert.color = self
            .resources
            .lookup(&self.color_resource, ResourceKind::Color)
            .and_then(|id| self.resources.color_value(id));
    }

    fn apply_channel(&self, alert: &mut PlatformAlert, props: &NotificationProperties) {
        if let Some(channel_id) = props.channel_id() {
            alert.channel_id = Some(channel_id.to_string());
            return;
        }

        let spec = ChannelSpec {
            id: self.fallback_channel.id.clone(),
            name: self.fallback_channel.name.clone(),
            importance: self.fallback_channel.importance,
        };
        if let Err(e) = self.channels.ensure_channel(&spec) {
            warn!(channel_id = %spec.id, error = %e, "Failed to ensure fallback channel");
        }
        alert.channel_id = Some(spec.id);
    }
}

impl PresentationBuilder for DefaultPresentationBuilder {
    fn build(&self, props: &NotificationProperties) -> PlatformAlert {
        let mut alert = PlatformAlert::base(props);

        if props.is_call() {
            apply_call_overlay(&mut alert);
        }
        if props.flag_insistent() {
            apply_insistent_overlay(&mut alert);
        }
        if let Some(pattern) = props.vibration_pattern() {
            apply_vibration_overlay(&mut alert, pattern);
        }
        // 缺失时为 0，即平台默认优先级
        alert.priority = props.priority();

        self.apply_icon(&mut alert);
        self.apply_channel(&mut alert, props);

        debug!(
            title = ?alert.title,
            channel_id = ?alert.channel_id,
            call = props.is_call(),
            "Built platform alert"
        );
        alert
    }
}

/// 来电样式：全屏、常驻、不自动消失、公开可见、铃声
pub fn apply_call_overlay(alert: &mut PlatformAlert) {
    alert.full_screen_target = Some(alert.content_target.clone());
    alert.options.auto_cancel = false;
    alert.options.ongoing = true;
    alert.category = Some(AlertCategory::Call);
    alert.visibility = Some(AlertVisibility::Public);
    alert.sound = Some(AlertSound::ringtone());
    alert.options.sound_enabled = false;
}

pub fn apply_insistent_overlay(alert: &mut PlatformAlert) {
    alert.options.insistent = true;
}

pub fn apply_vibration_overlay(alert: &mut PlatformAlert, pattern: &[u64]) {
    alert.vibration_pattern = Some(pattern.to_vec());
    alert.options.vibrate_enabled = false;
}
