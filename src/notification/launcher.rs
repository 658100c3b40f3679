//! 应用启动器 - 恢复或创建前台界面

use std::sync::atomic::{AtomicUsize, Ordering};

/// 启动或恢复应用（发出即返回，不等待结果）
pub trait Launcher: Send + Sync {
    fn launch(&self);
}

/// 记录启动次数的启动器
#[derive(Debug, Default)]
pub struct RecordingLauncher {
    launches: AtomicUsize,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn launch_count(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

impl Launcher for RecordingLauncher {
    fn launch(&self) {
        self.launches.fetch_add(1, Ordering::SeqCst);
    }
}
