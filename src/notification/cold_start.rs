//! 冷启动槽位 - 保存最近一条未处理通知，供应用初始化后读取

use std::sync::Mutex;
use tracing::debug;

use super::props::NotificationProperties;

/// 单槽位存储，后写覆盖先写
///
/// 每个运行时实例持有一个，显式传给需要它的组件。
#[derive(Debug, Default)]
pub struct ColdStartHolder {
    slot: Mutex<Option<NotificationProperties>>,
}

impl ColdStartHolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入（覆盖未读取的旧值）
    pub fn set(&self, props: NotificationProperties) {
        let mut slot = self.lock();
        if slot.is_some() {
            debug!("Overwriting unread initial notification");
        }
        *slot = Some(props);
    }

    /// 查看当前值但不取走
    pub fn get(&self) -> Option<NotificationProperties> {
        self.lock().clone()
    }

    /// 取走当前值；槽位随后为空
    pub fn take_if_present(&self) -> Option<NotificationProperties> {
        self.lock().take()
    }

    pub fn clear(&self) {
        *self.lock() = None;
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_none()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<NotificationProperties>> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(title: &str) -> NotificationProperties {
        NotificationProperties::from_value(json!({ "title": title })).unwrap()
    }

    #[test]
    fn test_last_write_wins() {
        let holder = ColdStartHolder::new();
        holder.set(props("first"));
        holder.set(props("second"));

        let taken = holder.take_if_present().unwrap();
        assert_eq!(taken.title(), Some("second"));
    }

    #[test]
    fn test_second_take_is_none() {
        let holder = ColdStartHolder::new();
        holder.set(props("only"));

        assert!(holder.take_if_present().is_some());
        assert!(holder.take_if_present().is_none());
    }

    #[test]
    fn test_get_does_not_consume() {
        let holder = ColdStartHolder::new();
        holder.set(props("peek"));

        assert_eq!(holder.get().unwrap().title(), Some("peek"));
        assert!(!holder.is_empty());

        holder.clear();
        assert!(holder.is_empty());
        assert!(holder.get().is_none());
    }
}
