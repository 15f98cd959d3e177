//! 墙钟驱动
//!
//! tokio 定时器每个间隔触发一次 tick。tick 本身不会 await，
//! 所以 `select!` 观察到的取消总是落在两个 tick 之间。

use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior, interval};
use tracing::info;

use super::controller::Controller;
use crate::sim::SimTime;

/// 运行到控制器的停止信号被触发，然后交还控制器
pub async fn run_realtime(mut controller: Controller) -> Controller {
    let token = controller.shutdown_token();
    let period = Duration::from_millis(controller.config().tick_interval_ms);
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let started = Instant::now();

    info!(period_ms = period.as_millis() as u64, "⏱️  实时控制循环启动");
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {
                let now = SimTime::from_duration(started.elapsed());
                controller.tick(now);
            }
        }
    }
    info!(ticks = controller.stats().ticks, "🛑 实时控制循环已停止");
    controller
}
