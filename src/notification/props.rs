//! 通知属性模型 - 将原始 payload 解析为规范化的通知记录
//!
//! Payload 格式（所有 key 均可选，title 除外）：
//! ```json
//! {
//!   "gcm.notification.title": "来电",
//!   "title": "Incoming call",
//!   "body": "Alice",
//!   "channelId": "calls",
//!   "priority": 2,
//!   "flagInsistent": true,
//!   "vibrate": [0, 500, 250, 500],
//!   "call": true,
//!   "google.message_id": "0:1234"
//! }
//! ```

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use tracing::warn;

use super::error::{InvalidNotification, Result};

/// Payload key 常量
pub mod keys {
    pub const PROVIDER_TITLE: &str = "gcm.notification.title";
    pub const TITLE: &str = "title";
    pub const PROVIDER_BODY: &str = "gcm.notification.body";
    pub const BODY: &str = "body";
    pub const CHANNEL_ID: &str = "channelId";
    pub const PRIORITY: &str = "priority";
    pub const FLAG_INSISTENT: &str = "flagInsistent";
    pub const VIBRATE: &str = "vibrate";
    pub const CALL: &str = "call";
    /// 后台投递 provider 的消息标记
    pub const BACKGROUND_MESSAGE_ID: &str = "google.message_id";
    /// opened 事件的包装 key
    pub const NOTIFICATION: &str = "notification";
}

/// 一条入站通知
///
/// 构造后逻辑不可变：字段私有，只能通过 `copy()` + `with_entry()` 派生新记录。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationProperties {
    title: Option<String>,
    body: Option<String>,
    channel_id: Option<String>,
    priority: i32,
    flag_insistent: bool,
    vibration_pattern: Option<Vec<u64>>,
    is_call: bool,
    raw_payload: Map<String, Value>,
}

impl NotificationProperties {
    /// 从原始 payload 解析
    ///
    /// title/body 先查 provider key 再查通用 key，第一个非空字符串胜出。
    /// 数值和布尔字段缺失时为 0/false，不区分"显式 false"和"缺失"。
    pub fn parse(payload: Map<String, Value>) -> Result<Self> {
        let title = first_non_empty(&payload, keys::PROVIDER_TITLE, keys::TITLE);
        if title.is_none() {
            return Err(InvalidNotification::MissingTitle {
                provider_key: keys::PROVIDER_TITLE,
                generic_key: keys::TITLE,
            });
        }

        let body = first_non_empty(&payload, keys::PROVIDER_BODY, keys::BODY);
        let channel_id = payload
            .get(keys::CHANNEL_ID)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        let priority = payload
            .get(keys::PRIORITY)
            .and_then(|v| v.as_f64())
            .map(|p| p as i32)
            .unwrap_or(0);
        let flag_insistent = get_bool(&payload, keys::FLAG_INSISTENT);
        let is_call = get_bool(&payload, keys::CALL);
        let vibration_pattern = parse_vibration(&payload);

        Ok(Self {
            title,
            body,
            channel_id,
            priority,
            flag_insistent,
            vibration_pattern,
            is_call,
            raw_payload: payload,
        })
    }

    /// 从 JSON 值解析（必须是对象）
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Self::parse(map),
            _ => Err(InvalidNotification::NotAnObject),
        }
    }

    /// 从 JSON 字符串解析
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// 结构上独立的副本
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// 派生一条替换了某个 key 的新记录（重新解析）
    pub fn with_entry(self, key: impl Into<String>, value: Value) -> Result<Self> {
        let mut payload = self.raw_payload;
        payload.insert(key.into(), value);
        Self::parse(payload)
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn channel_id(&self) -> Option<&str> {
        self.channel_id.as_deref()
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn flag_insistent(&self) -> bool {
        self.flag_insistent
    }

    pub fn vibration_pattern(&self) -> Option<&[u64]> {
        self.vibration_pattern.as_deref()
    }

    pub fn is_call(&self) -> bool {
        self.is_call
    }

    pub fn raw_payload(&self) -> &Map<String, Value> {
        &self.raw_payload
    }

    /// 交给应用事件监听者的透传形式（所有原始 key）
    pub fn as_external_payload(&self) -> Value {
        Value::Object(self.raw_payload.clone())
    }

    /// opened 事件的 payload：`{"notification": <external payload>}`
    pub fn opened_payload(&self) -> Value {
        let mut wrapper = Map::new();
        wrapper.insert(keys::NOTIFICATION.to_string(), self.as_external_payload());
        Value::Object(wrapper)
    }

    /// 是否来自后台投递 provider（只用于决定是否存入冷启动槽位）
    pub fn is_cold_start_origin(&self) -> bool {
        self.raw_payload.contains_key(keys::BACKGROUND_MESSAGE_ID)
    }
}

impl PartialEq for NotificationProperties {
    fn eq(&self, other: &Self) -> bool {
        self.raw_payload == other.raw_payload
    }
}

impl Eq for NotificationProperties {}

impl fmt::Display for NotificationProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.raw_payload {
            write!(f, "{}={}, ", key, value)?;
        }
        Ok(())
    }
}

fn non_empty_str<'a>(payload: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    payload
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
}

fn first_non_empty(payload: &Map<String, Value>, provider_key: &str, generic_key: &str) -> Option<String> {
    non_empty_str(payload, provider_key)
        .or_else(|| non_empty_str(payload, generic_key))
        .map(|s| s.to_string())
}

fn get_bool(payload: &Map<String, Value>, key: &str) -> bool {
    payload.get(key).and_then(|v| v.as_bool()).unwrap_or(false)
}

fn parse_vibration(payload: &Map<String, Value>) -> Option<Vec<u64>> {
    let value = payload.get(keys::VIBRATE)?;
    let pattern = value
        .as_array()
        .and_then(|items| items.iter().map(vibration_millis).collect::<Option<Vec<u64>>>());
    if pattern.is_none() {
        warn!(value = %value, "Ignoring malformed vibrate pattern");
    }
    pattern
}

/// 非负整数毫秒，接受 `500.0` 这种整数值浮点
fn vibration_millis(item: &Value) -> Option<u64> {
    item.as_u64().or_else(|| {
        item.as_f64()
            .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
            .map(|f| f as u64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: Value) -> NotificationProperties {
        NotificationProperties::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_full_payload() {
        let p = props(json!({
            "title": "Incoming call",
            "body": "Alice",
            "channelId": "calls",
            "priority": 2,
            "flagInsistent": true,
            "vibrate": [0, 500, 250, 500],
            "call": true
        }));

        assert_eq!(p.title(), Some("Incoming call"));
        assert_eq!(p.body(), Some("Alice"));
        assert_eq!(p.channel_id(), Some("calls"));
        assert_eq!(p.priority(), 2);
        assert!(p.flag_insistent());
        assert_eq!(p.vibration_pattern(), Some(&[0u64, 500, 250, 500][..]));
        assert!(p.is_call());
    }

    #[test]
    fn test_defaults_when_keys_missing() {
        let p = props(json!({"title": "hi"}));

        assert_eq!(p.body(), None);
        assert_eq!(p.channel_id(), None);
        assert_eq!(p.priority(), 0);
        assert!(!p.flag_insistent());
        assert_eq!(p.vibration_pattern(), None);
        assert!(!p.is_call());
    }

    #[test]
    fn test_provider_title_wins_over_generic() {
        let p = props(json!({
            "gcm.notification.title": "provider",
            "title": "generic",
            "gcm.notification.body": "provider body",
            "body": "generic body"
        }));
        assert_eq!(p.title(), Some("provider"));
        assert_eq!(p.body(), Some("provider body"));
    }

    #[test]
    fn test_provider_key_precedence_all_combinations() {
        let candidates = [None, Some(""), Some("value")];
        for provider in candidates {
            for generic in candidates {
                let mut map = Map::new();
                map.insert("title".into(), json!("t"));
                if let Some(v) = provider {
                    map.insert(keys::PROVIDER_BODY.into(), json!(v));
                }
                if let Some(v) = generic {
                    map.insert(keys::BODY.into(), json!(v));
                }
                let p = NotificationProperties::parse(map).unwrap();

                let expected = match (provider, generic) {
                    (Some(pv), _) if !pv.is_empty() => Some(pv),
                    (_, Some(gv)) if !gv.is_empty() => Some(gv),
                    _ => None,
                };
                assert_eq!(p.body(), expected, "provider={:?} generic={:?}", provider, generic);
            }
        }
    }

    #[test]
    fn test_empty_provider_title_falls_back() {
        let p = props(json!({"gcm.notification.title": "", "title": "generic"}));
        assert_eq!(p.title(), Some("generic"));
    }

    #[test]
    fn test_missing_title_is_invalid() {
        let err = NotificationProperties::from_value(json!({"body": "no title"})).unwrap_err();
        assert!(matches!(err, InvalidNotification::MissingTitle { .. }));

        let err = NotificationProperties::from_value(json!({"title": "", "gcm.notification.title": ""}))
            .unwrap_err();
        assert!(matches!(err, InvalidNotification::MissingTitle { .. }));
    }

    #[test]
    fn test_non_object_is_invalid() {
        let err = NotificationProperties::from_value(json!([1, 2])).unwrap_err();
        assert!(matches!(err, InvalidNotification::NotAnObject));

        let err = NotificationProperties::from_json("{not json").unwrap_err();
        assert!(matches!(err, InvalidNotification::Json(_)));
    }

    #[test]
    fn test_malformed_vibrate_degrades_to_none() {
        for vibrate in [json!([100, "x"]), json!(100), json!([-5, 10]), json!([1.5])] {
            let p = props(json!({"title": "t", "call": true, "vibrate": vibrate.clone()}));
            assert_eq!(p.vibration_pattern(), None, "{}", vibrate);
            assert!(p.is_call());
            assert_eq!(p.raw_payload()["vibrate"], vibrate);
        }
    }

    #[test]
    fn test_vibrate_accepts_integral_floats() {
        let p = props(json!({"title": "t", "vibrate": [500.0, 200]}));
        assert_eq!(p.vibration_pattern(), Some(&[500u64, 200][..]));
    }

    #[test]
    fn test_priority_truncates_float() {
        let p = props(json!({"title": "t", "priority": 1.9}));
        assert_eq!(p.priority(), 1);
        let p = props(json!({"title": "t", "priority": -2}));
        assert_eq!(p.priority(), -2);
    }

    #[test]
    fn test_wrong_typed_scalars_degrade_to_defaults() {
        let p = props(json!({"title": "t", "call": "true", "flagInsistent": 1, "priority": "high"}));
        assert!(!p.is_call());
        assert!(!p.flag_insistent());
        assert_eq!(p.priority(), 0);
    }

    #[test]
    fn test_copy_is_equal_and_independent() {
        let original = props(json!({"title": "t", "body": "b", "vibrate": [1, 2]}));
        let copy = original.copy();
        assert_eq!(copy, original);
        assert_eq!(copy.title(), original.title());
        assert_eq!(copy.vibration_pattern(), original.vibration_pattern());

        let changed = copy.with_entry("title", json!("changed")).unwrap();
        assert_eq!(changed.title(), Some("changed"));
        assert_eq!(original.title(), Some("t"));
        assert_ne!(changed, original);
    }

    #[test]
    fn test_equality_is_raw_payload_equality() {
        let a = props(json!({"title": "t", "extra": {"nested": [1, 2]}}));
        let b = props(json!({"extra": {"nested": [1, 2]}, "title": "t"}));
        let c = props(json!({"title": "t", "extra": {"nested": [1, 3]}}));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_external_payload_keeps_all_keys() {
        let p = props(json!({"title": "t", "custom": 42}));
        let external = p.as_external_payload();
        assert_eq!(external["title"], "t");
        assert_eq!(external["custom"], 42);

        let opened = p.opened_payload();
        assert_eq!(opened["notification"], external);
    }

    #[test]
    fn test_cold_start_origin() {
        assert!(props(json!({"title": "t", "google.message_id": "0:1"})).is_cold_start_origin());
        assert!(!props(json!({"title": "t"})).is_cold_start_origin());
    }

    #[test]
    fn test_display_lists_keys() {
        let p = props(json!({"title": "t"}));
        assert_eq!(p.to_string(), "title=\"t\", ");
    }
}
