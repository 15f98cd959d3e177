//! 快照结构
//!
//! 每个 tick 结束时从控制器拷贝出来的链路与全局指标。

use serde::{Deserialize, Serialize};

/// 单条链路在一个 tick 的观测值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSample {
    pub link: usize,
    /// 端点名：无向链路 `u < v`，有向链路为 `u -> v`
    pub u: String,
    pub v: String,
    pub capacity_mbps: f64,
    pub utilization_mbps: f64,
    /// 负载 / 容量，过载时大于 1.0
    pub utilization_ratio: f64,
    pub active_flow_count: usize,
    pub congested: bool,
}

/// 外部导出组件在一个 tick 后需要的全部数据。
/// 已从控制器拷贝出来，下一个 tick 修改状态时仍可安全读取。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub tick: u64,
    pub at_ms: u64,
    pub links: Vec<LinkSample>,
    pub total_active_flows: usize,
    pub cumulative_reroutes: u64,
}

impl MetricsSnapshot {
    pub fn link(&self, u: &str, v: &str) -> Option<&LinkSample> {
        self.links
            .iter()
            .find(|l| (l.u == u && l.v == v) || (l.u == v && l.v == u))
    }

    pub fn max_utilization(&self) -> f64 {
        self.links
            .iter()
            .map(|l| l.utilization_ratio)
            .fold(0.0, f64::max)
    }

    pub fn congested_links(&self) -> usize {
        self.links.iter().filter(|l| l.congested).count()
    }
}
