//! 快照接收端
//!
//! 控制器把每个 tick 的快照交给所有已注册的 sink，sink 只会看到完整的快照。

use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::{debug, info};

use super::snapshot::MetricsSnapshot;

pub trait MetricsSink: Send {
    fn publish(&mut self, snapshot: &MetricsSnapshot);
}

/// 发布到 tokio `watch` 通道，接收方总是读到整份快照
#[derive(Debug)]
pub struct WatchSink {
    tx: watch::Sender<Option<Arc<MetricsSnapshot>>>,
}

impl WatchSink {
    pub fn channel() -> (Self, watch::Receiver<Option<Arc<MetricsSnapshot>>>) {
        let (tx, rx) = watch::channel(None);
        (Self { tx }, rx)
    }
}

impl MetricsSink for WatchSink {
    fn publish(&mut self, snapshot: &MetricsSnapshot) {
        // 没有接收方时 send_replace 也不会失败
        self.tx.send_replace(Some(Arc::new(snapshot.clone())));
    }
}

/// 只保留最近一份快照
#[derive(Debug, Clone, Default)]
pub struct LatestSnapshot {
    inner: Arc<Mutex<Option<MetricsSnapshot>>>,
}

impl LatestSnapshot {
    pub fn latest(&self) -> Option<MetricsSnapshot> {
        self.inner.lock().ok().and_then(|g| g.clone())
    }
}

impl MetricsSink for LatestSnapshot {
    fn publish(&mut self, snapshot: &MetricsSnapshot) {
        if let Ok(mut slot) = self.inner.lock() {
            *slot = Some(snapshot.clone());
        }
    }
}

/// 累积全部快照（命令行 `--snapshots-json` 使用）
#[derive(Debug, Clone, Default)]
pub struct SnapshotRecorder {
    inner: Arc<Mutex<Vec<MetricsSnapshot>>>,
}

impl SnapshotRecorder {
    pub fn take(&self) -> Vec<MetricsSnapshot> {
        self.inner
            .lock()
            .map(|mut v| std::mem::take(&mut *v))
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MetricsSink for SnapshotRecorder {
    fn publish(&mut self, snapshot: &MetricsSnapshot) {
        if let Ok(mut v) = self.inner.lock() {
            v.push(snapshot.clone());
        }
    }
}

/// 每个 tick 通过 tracing 输出一行摘要
#[derive(Debug, Default)]
pub struct LogSink;

impl MetricsSink for LogSink {
    fn publish(&mut self, snapshot: &MetricsSnapshot) {
        info!(
            tick = snapshot.tick,
            at_ms = snapshot.at_ms,
            active_flows = snapshot.total_active_flows,
            reroutes = snapshot.cumulative_reroutes,
            congested = snapshot.congested_links(),
            max_util = format_args!("{:.3}", snapshot.max_utilization()),
            "📊 tick 指标"
        );
        for l in &snapshot.links {
            debug!(
                u = %l.u,
                v = %l.v,
                mbps = l.utilization_mbps,
                ratio = l.utilization_ratio,
                flows = l.active_flow_count,
                "链路指标"
            );
        }
    }
}
