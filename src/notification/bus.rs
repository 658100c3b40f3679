//! 应用事件出口 - 桥接层把通知事件交给应用代码
//!
//! 宿主实现 `EventBus`；`InMemoryEventBus` 按顺序记录每次投递，供测试和模拟宿主查看。

use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};

use super::event::BridgeEvent;

/// 应用事件出口
pub trait EventBus: Send + Sync {
    /// 按 topic 投递 JSON payload
    fn emit(&self, topic: &str, payload: Value);

    /// 投递一个桥接事件
    fn publish(&self, event: BridgeEvent) {
        let topic = event.topic();
        self.emit(topic, event.into_payload());
    }
}

pub type EventBusRef = Arc<dyn EventBus>;

/// 已投递给应用的事件
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveredEvent {
    pub topic: String,
    pub payload: Value,
}

/// 内存事件出口，保留投递顺序
#[derive(Default)]
pub struct InMemoryEventBus {
    delivered: Mutex<Vec<DeliveredEvent>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DeliveredEvent> {
        self.delivered().clone()
    }

    /// 某个 topic 的事件，按投递顺序
    pub fn events_for(&self, topic: &str) -> Vec<DeliveredEvent> {
        self.delivered()
            .iter()
            .filter(|event| event.topic == topic)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.delivered().len()
    }

    pub fn is_empty(&self) -> bool {
        self.delivered().is_empty()
    }

    fn delivered(&self) -> MutexGuard<'_, Vec<DeliveredEvent>> {
        self.delivered.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl EventBus for InMemoryEventBus {
    fn emit(&self, topic: &str, payload: Value) {
        self.delivered().push(DeliveredEvent {
            topic: topic.to_string(),
            payload,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_events_keep_delivery_order() {
        let bus = InMemoryEventBus::new();
        bus.emit("opened", json!({"notification": {"title": "a"}}));
        bus.emit("received-foreground", json!({"title": "b"}));
        bus.emit("opened", json!({"notification": {"title": "c"}}));

        assert_eq!(bus.len(), 3);
        let topics: Vec<String> = bus.events().into_iter().map(|e| e.topic).collect();
        assert_eq!(topics, vec!["opened", "received-foreground", "opened"]);

        let opened = bus.events_for("opened");
        assert_eq!(opened[1].payload["notification"]["title"], "c");
        assert!(bus.events_for("received-background").is_empty());
    }

    #[test]
    fn test_publish_uses_event_topic() {
        let bus = InMemoryEventBus::new();
        bus.publish(BridgeEvent::ReceivedBackground(json!({"title": "t"})));

        assert_eq!(
            bus.events(),
            vec![DeliveredEvent {
                topic: "received-background".to_string(),
                payload: json!({"title": "t"}),
            }]
        );
    }
}
