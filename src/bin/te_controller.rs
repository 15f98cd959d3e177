//! WAN 流量工程控制器
//!
//! 加载配置，在虚拟时间（默认）或墙钟时间下运行控制循环，可把每个 tick 的快照写成 JSON。

use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use wan_te_rs::ctrl::{Controller, ControllerConfig, run_realtime, run_virtual};
use wan_te_rs::metrics::{LogSink, SnapshotRecorder};
use wan_te_rs::sim::SimTime;

#[derive(Debug, Parser)]
#[command(
    name = "te-controller",
    about = "拥塞感知 WAN 流量工程控制器仿真"
)]
struct Args {
    /// 配置文件（JSON）；缺省使用参考 WAN 拓扑
    #[arg(long)]
    config: Option<PathBuf>,

    /// 运行时长（秒）
    #[arg(long, default_value_t = 60)]
    duration_secs: u64,

    /// 覆盖配置中的随机种子
    #[arg(long)]
    seed: Option<u64>,

    /// 覆盖重路由阈值
    #[arg(long)]
    threshold: Option<f64>,

    /// 按墙钟时间运行（Ctrl-C 或到时停止）
    #[arg(long)]
    realtime: bool,

    /// 把全部快照写成 JSON 数组
    #[arg(long)]
    snapshots_json: Option<PathBuf>,

    /// 关闭日志输出
    #[arg(long)]
    quiet: bool,
}

fn load_config(args: &Args) -> Result<ControllerConfig, String> {
    let mut cfg = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .map_err(|e| format!("read config {}: {e}", path.display()))?;
            ControllerConfig::from_json(&raw).map_err(|e| e.to_string())?
        }
        None => ControllerConfig::default(),
    };
    if let Some(seed) = args.seed {
        cfg.seed = seed;
    }
    if let Some(threshold) = args.threshold {
        cfg.reroute_threshold = threshold;
    }
    Ok(cfg)
}

fn run(args: Args) -> Result<(), String> {
    let cfg = load_config(&args)?;
    let mut controller = Controller::new(cfg).map_err(|e| e.to_string())?;

    let recorder = SnapshotRecorder::default();
    controller.add_sink(LogSink);
    if args.snapshots_json.is_some() {
        controller.add_sink(recorder.clone());
    }

    let controller = if args.realtime {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| format!("start runtime: {e}"))?;
        let duration = Duration::from_secs(args.duration_secs);
        runtime.block_on(async move {
            let token = controller.shutdown_token();
            tokio::spawn(async move {
                tokio::select! {
                    _ = tokio::time::sleep(duration) => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
                token.cancel();
            });
            run_realtime(controller).await
        })
    } else {
        run_virtual(controller, SimTime::from_secs(args.duration_secs)).controller
    };

    let stats = controller.stats();
    println!(
        "done ticks={} active_flows={} reroutes={} admitted={} rejected={} retired={}",
        stats.ticks,
        controller.flows().len(),
        controller.flows().cumulative_reroutes(),
        stats.admitted,
        stats.rejected,
        stats.retired
    );

    if let Some(path) = args.snapshots_json {
        let json = serde_json::to_string_pretty(&recorder.take())
            .map_err(|e| format!("serialize snapshots: {e}"))?;
        fs::write(&path, json).map_err(|e| format!("write {}: {e}", path.display()))?;
        eprintln!("wrote snapshots to {}", path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    // 初始化 tracing
    tracing_subscriber::fmt()
        .with_env_filter(if args.quiet {
            tracing_subscriber::EnvFilter::new("off")
        } else {
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
        })
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
