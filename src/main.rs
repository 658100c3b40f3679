//! Notification Bridge CLI
//!
//! 用内存宿主模拟推送通知的接收、打开和投递

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use notification_bridge::notification::AppLifecycleState;
use notification_bridge::{BridgeConfig, HostOptions, NotificationProperties, SimulatedHost};
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "nbridge")]
#[command(about = "Notification Bridge - 推送通知分发与展示模拟器")]
#[command(version)]
struct Cli {
    /// 配置文件路径（默认 ~/.config/notification-bridge/config.json）
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 解析 payload 并输出规范化属性
    Parse {
        #[command(flatten)]
        payload: PayloadArgs,
    },
    /// 模拟收到通知
    Receive {
        #[command(flatten)]
        payload: PayloadArgs,
        #[command(flatten)]
        host: HostArgs,
    },
    /// 模拟用户打开通知
    Open {
        #[command(flatten)]
        payload: PayloadArgs,
        #[command(flatten)]
        host: HostArgs,
        /// 打开之后把应用切到前台
        #[arg(long)]
        resume: bool,
    },
    /// 构建并投递托盘通知
    Post {
        #[command(flatten)]
        payload: PayloadArgs,
        #[command(flatten)]
        host: HostArgs,
        /// 指定通知 id
        #[arg(long)]
        id: Option<i32>,
    },
}

#[derive(Args)]
struct PayloadArgs {
    /// JSON payload，或 @文件路径
    #[arg(long)]
    payload: String,
}

impl PayloadArgs {
    fn read(&self) -> Result<Value> {
        let text = match self.payload.strip_prefix('@') {
            Some(path) => fs::read_to_string(path)
                .with_context(|| format!("Failed to read payload file {}", path))?,
            None => self.payload.clone(),
        };
        serde_json::from_str(&text).context("Payload is not valid JSON")
    }
}

#[derive(Copy, Clone, ValueEnum)]
enum StateArg {
    Uninitialized,
    Background,
    Foreground,
    Destroyed,
}

impl From<StateArg> for AppLifecycleState {
    fn from(state: StateArg) -> Self {
        match state {
            StateArg::Uninitialized => AppLifecycleState::Uninitialized,
            StateArg::Background => AppLifecycleState::BackgroundReady,
            StateArg::Foreground => AppLifecycleState::Foreground,
            StateArg::Destroyed => AppLifecycleState::Destroyed,
        }
    }
}

#[derive(Args)]
struct HostArgs {
    /// 应用生命周期状态
    #[arg(long, value_enum, default_value = "foreground")]
    state: StateArg,
    /// 没有前台界面
    #[arg(long)]
    no_surface: bool,
    /// 屏幕处于熄灭状态
    #[arg(long)]
    screen_off: bool,
    /// 输出 JSON 格式
    #[arg(long)]
    json: bool,
}

impl HostArgs {
    fn options(&self) -> HostOptions {
        HostOptions {
            state: self.state.into(),
            has_surface: !self.no_surface,
            screen_on: !self.screen_off,
            resume_on_launch: false,
        }
    }
}

fn main() -> Result<()> {
    // 通过 RUST_LOG 环境变量控制日志级别，默认为 info
    // 例如: RUST_LOG=debug nbridge open --payload '{"title":"hi"}'
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("notification_bridge=info,nbridge=info"));

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let cli = Cli::parse();
    let config = BridgeConfig::load(cli.config.as_deref())?;
    debug!(?config, "Using bridge config");

    match cli.command {
        Commands::Parse { payload } => {
            let props = NotificationProperties::from_value(payload.read()?)?;
            println!("{}", serde_json::to_string_pretty(&props)?);
        }
        Commands::Receive { payload, host } => {
            let sim = SimulatedHost::new(config, host.options())?;
            let outcome = sim.bridge.handle_received(payload.read()?)?;
            print_report(&sim, host.json, json!({ "outcome": outcome }))?;
        }
        Commands::Open { payload, host, resume } => {
            let sim = SimulatedHost::new(config, host.options())?;
            let outcome = sim.bridge.handle_opened(payload.read()?)?;
            if resume && sim.lifecycle.state() != AppLifecycleState::Uninitialized {
                sim.lifecycle.set_state(AppLifecycleState::Foreground);
            }
            let initial = sim.bridge.cold_start().get().map(|p| p.as_external_payload());
            print_report(
                &sim,
                host.json,
                json!({ "outcome": outcome, "initial_notification": initial }),
            )?;
        }
        Commands::Post { payload, host, id } => {
            let sim = SimulatedHost::new(config, host.options())?;
            let notification = sim.bridge.notification(payload.read()?)?;
            let posted_id = notification.on_post_request(id);
            print_report(&sim, host.json, json!({ "notification_id": posted_id }))?;
        }
    }

    Ok(())
}

fn print_report(sim: &SimulatedHost, as_json: bool, mut report: Value) -> Result<()> {
    let events: Vec<Value> = sim
        .bus
        .events()
        .into_iter()
        .map(|e| json!({ "topic": e.topic, "payload": e.payload }))
        .collect();
    report["events"] = Value::Array(events);
    report["launches"] = json!(sim.launcher.launch_count());
    report["pending_listeners"] = json!(sim.lifecycle.listener_count());
    report["tray"] = serde_json::to_value(sim.tray.entries())?;
    report["wake_locks"] = json!(sim.power.acquire_count());

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if let Some(outcome) = report.get("outcome") {
        println!("结果: {}", outcome);
    }
    if let Some(id) = report.get("notification_id") {
        println!("通知 id: {}", id);
    }
    println!("启动次数: {}", sim.launcher.launch_count());
    println!("待触发订阅: {}", sim.lifecycle.listener_count());
    for event in sim.bus.events() {
        println!("  事件 {} -> {}", event.topic, event.payload);
    }
    for entry in sim.tray.entries() {
        println!(
            "  托盘 #{} | {} | 渠道: {}",
            entry.id,
            entry.alert.title.as_deref().unwrap_or("-"),
            entry.alert.channel_id.as_deref().unwrap_or("-")
        );
    }
    if let Some(Value::Object(initial)) = report.get("initial_notification") {
        println!("初始通知: {}", Value::Object(initial.clone()));
    }
    if sim.power.acquire_count() > 0 {
        println!("已点亮屏幕: {} 次", sim.power.acquire_count());
    }
    Ok(())
}
