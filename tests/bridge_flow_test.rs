//! 端到端流程测试 - 模拟宿主上的接收、投递、点击打开和冷启动

use notification_bridge::notification::{
    AlertCategory, AppLifecycleState, OpenAction, ReceiveOutcome, ResourceId,
};
use notification_bridge::{BridgeConfig, HostOptions, SimulatedHost};
use serde_json::json;
use std::time::Duration;

fn host(options: HostOptions) -> SimulatedHost {
    SimulatedHost::new(BridgeConfig::default(), options).unwrap()
}

fn background() -> HostOptions {
    HostOptions {
        state: AppLifecycleState::BackgroundReady,
        ..HostOptions::default()
    }
}

#[test]
fn test_receive_then_post_call_notification() {
    // Given: 应用在后台，屏幕熄灭
    let sim = host(HostOptions {
        screen_on: false,
        ..background()
    });
    let payload = json!({
        "gcm.notification.title": "Incoming call",
        "gcm.notification.body": "Alice",
        "call": true,
        "vibrate": [0, 1000, 500, 1000]
    });

    // When: 收到通知并请求投递
    let notification = sim.bridge.notification(payload.clone()).unwrap();
    assert_eq!(notification.on_received(), ReceiveOutcome::Background);
    let id = notification.on_post_request(Some(1001));

    // Then: 后台事件、来电样式通知、点亮屏幕
    assert_eq!(id, 1001);
    assert_eq!(sim.bus.events_for("received-background")[0].payload, payload);

    let entry = sim.tray.get(1001).unwrap();
    assert_eq!(entry.alert.title.as_deref(), Some("Incoming call"));
    assert_eq!(entry.alert.category, Some(AlertCategory::Call));
    assert!(entry.alert.options.ongoing);
    assert_eq!(entry.alert.vibration_pattern, Some(vec![0, 1000, 500, 1000]));
    assert_eq!(entry.alert.channel_id.as_deref(), Some("channel_01"));
    assert_eq!(entry.alert.small_icon, Some(ResourceId(BridgeConfig::default().host_resources.application_icon)));

    let wakes = sim.power.acquisitions();
    assert_eq!(wakes.len(), 1);
    assert_eq!(wakes[0].1, Duration::from_millis(3000));
}

#[test]
fn test_tap_on_posted_alert_opens_in_foreground() {
    let sim = host(HostOptions::default());
    let notification = sim.bridge.notification(json!({"title": "t", "id": 7})).unwrap();
    let id = notification.on_post_request(None);

    // 用户点击：宿主把点击目标里的 payload 交回桥接层
    let target = sim.tray.get(id).unwrap().alert.content_target;
    let outcome = sim.bridge.handle_opened(target.payload).unwrap();

    assert_eq!(outcome.action, OpenAction::DispatchedNow);
    let opened = sim.bus.events_for("opened");
    assert_eq!(opened.len(), 1);
    assert_eq!(opened[0].payload["notification"]["id"], 7);
}

#[test]
fn test_cold_start_initial_notification_read_once() {
    let sim = host(HostOptions {
        state: AppLifecycleState::Uninitialized,
        has_surface: false,
        ..HostOptions::default()
    });

    sim.bridge.handle_opened(json!({"title": "first"})).unwrap();
    sim.bridge.handle_opened(json!({"title": "second"})).unwrap();
    assert_eq!(sim.launcher.launch_count(), 2);
    assert!(sim.bus.is_empty());

    // 应用初始化后读取：后写覆盖先写，只能读取一次
    sim.lifecycle.set_state(AppLifecycleState::Foreground);
    let initial = sim.bridge.take_initial_notification().unwrap();
    assert_eq!(initial.title(), Some("second"));
    assert!(sim.bridge.take_initial_notification().is_none());
}

#[test]
fn test_launch_extras_from_background_provider() {
    let sim = host(HostOptions {
        state: AppLifecycleState::Uninitialized,
        has_surface: false,
        ..HostOptions::default()
    });

    let stored = sim
        .bridge
        .handle_launch_extras(json!({"title": "bg", "google.message_id": "0:42"}))
        .unwrap();
    assert!(stored);
    let ignored = sim.bridge.handle_launch_extras(json!({"title": "plain"})).unwrap();
    assert!(!ignored);

    let initial = sim.bridge.take_initial_notification().unwrap();
    assert_eq!(initial.title(), Some("bg"));
}

#[test]
fn test_deferred_open_delivered_when_app_becomes_visible() {
    let sim = host(background());
    let outcome = sim.bridge.handle_opened(json!({"title": "later"})).unwrap();

    assert_eq!(outcome.action, OpenAction::Deferred);
    assert!(sim.bus.is_empty());

    sim.lifecycle.set_state(AppLifecycleState::Foreground);
    sim.lifecycle.set_state(AppLifecycleState::BackgroundReady);
    sim.lifecycle.set_state(AppLifecycleState::Foreground);

    let opened = sim.bus.events_for("opened");
    assert_eq!(opened.len(), 1);
    assert_eq!(opened[0].payload["notification"]["title"], "later");
}

#[test]
fn test_configured_channel_and_resources() {
    let mut config = BridgeConfig::default();
    config.fallback_channel.id = "general".to_string();
    config.host_resources.drawables.insert("notification_icon".to_string(), 77);
    config.host_resources.colors.insert("colorAccent".to_string(), 0xFF12_3456);

    let sim = SimulatedHost::new(config, HostOptions::default()).unwrap();
    let id = sim.bridge.notification(json!({"title": "t"})).unwrap().on_post_request(Some(1));

    let alert = sim.tray.get(id).unwrap().alert;
    assert_eq!(alert.channel_id.as_deref(), Some("general"));
    assert_eq!(alert.small_icon, Some(ResourceId(77)));
    assert_eq!(alert.color, Some(0xFF12_3456));
    assert!(sim.channels.channel_ids().contains("general"));
}

#[test]
fn test_malformed_vibrate_still_reaches_app() {
    let sim = host(background());
    let payload = json!({"title": "t", "vibrate": [500.0, "x"]});

    // 错误类型的 vibrate 视为缺失，接收和投递照常进行
    let outcome = sim.bridge.handle_received(payload.clone()).unwrap();
    assert_eq!(outcome, ReceiveOutcome::Background);
    assert_eq!(sim.bus.events_for("received-background")[0].payload, payload);

    let id = sim.bridge.notification(payload).unwrap().on_post_request(Some(5));
    let alert = sim.tray.get(id).unwrap().alert;
    assert_eq!(alert.vibration_pattern, None);
    assert!(alert.options.vibrate_enabled);

    // 整数值浮点仍是合法的震动模式
    let id = sim
        .bridge
        .notification(json!({"title": "t", "vibrate": [500.0, 200]}))
        .unwrap()
        .on_post_request(Some(6));
    assert_eq!(sim.tray.get(id).unwrap().alert.vibration_pattern, Some(vec![500, 200]));
}
