//! 模拟宿主 - 用内存协作方组装一个完整的桥接实例（`nbridge` 和集成测试使用）

use anyhow::Result;
use std::sync::Arc;

use crate::config::BridgeConfig;
use crate::notification::{
    AppLifecycle, AppLifecycleState, InMemoryChannelRegistry, InMemoryEventBus, InMemoryTray,
    Launcher, NotificationBridge, RecordingLauncher, SimulatedPower, StaticResources,
};

/// 启动时把应用切到前台的启动器
struct ForegroundingLauncher {
    lifecycle: Arc<AppLifecycle>,
    inner: Arc<RecordingLauncher>,
}

impl Launcher for ForegroundingLauncher {
    fn launch(&self) {
        self.inner.launch();
        if self.lifecycle.state() != AppLifecycleState::Uninitialized {
            self.lifecycle.set_state(AppLifecycleState::Foreground);
        }
    }
}

/// 模拟宿主选项
#[derive(Debug, Clone, Copy)]
pub struct HostOptions {
    pub state: AppLifecycleState,
    /// 是否有前台界面（Foreground 时总是有）
    pub has_surface: bool,
    /// 屏幕是否亮着
    pub screen_on: bool,
    /// launch() 是否立即把应用切到前台
    pub resume_on_launch: bool,
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            state: AppLifecycleState::Foreground,
            has_surface: true,
            screen_on: true,
            resume_on_launch: false,
        }
    }
}

/// 内存宿主
pub struct SimulatedHost {
    pub lifecycle: Arc<AppLifecycle>,
    pub launcher: Arc<RecordingLauncher>,
    pub bus: Arc<InMemoryEventBus>,
    pub channels: Arc<InMemoryChannelRegistry>,
    pub tray: Arc<InMemoryTray>,
    pub power: Arc<SimulatedPower>,
    pub bridge: NotificationBridge,
}

impl SimulatedHost {
    pub fn new(config: BridgeConfig, options: HostOptions) -> Result<Self> {
        let lifecycle = Arc::new(AppLifecycle::new(options.state).with_surface(options.has_surface));
        let launcher = Arc::new(RecordingLauncher::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let channels = Arc::new(InMemoryChannelRegistry::new());
        let tray = Arc::new(InMemoryTray::new());
        let power = Arc::new(SimulatedPower::new(options.screen_on));
        let resources = Arc::new(StaticResources::from_config(&config.host_resources));

        let bridge_launcher: Arc<dyn Launcher> = if options.resume_on_launch {
            Arc::new(ForegroundingLauncher {
                lifecycle: Arc::clone(&lifecycle),
                inner: Arc::clone(&launcher),
            })
        } else {
            launcher.clone()
        };

        let bridge = NotificationBridge::builder()
            .config(config)
            .lifecycle(lifecycle.clone())
            .launcher(bridge_launcher)
            .event_bus(bus.clone())
            .resources(resources)
            .channels(channels.clone())
            .tray(tray.clone())
            .power(power.clone())
            .build()?;

        Ok(Self {
            lifecycle,
            launcher,
            bus,
            channels,
            tray,
            power,
            bridge,
        })
    }
}
