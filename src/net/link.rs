//! 链路类型
//!
//! 定义带容量、时延与当前负载的 WAN 链路。

use std::collections::BTreeSet;

use super::id::{FlowId, LinkId, NodeId};

/// WAN 链路
///
/// 无向拓扑中 `a < b`（按 `NodeId`），有向拓扑中方向为 `a -> b`。
#[derive(Debug, Clone)]
pub struct Link {
    pub id: LinkId,
    pub a: NodeId,
    pub b: NodeId,
    pub capacity_mbps: f64,
    pub latency_ms: f64,
    load_mbps: f64,
    /// 当前经过该链路的流
    flows: BTreeSet<FlowId>,
}

impl Link {
    /// 创建新链路（调用方已校验 capacity > 0）
    pub fn new(id: LinkId, a: NodeId, b: NodeId, capacity_mbps: f64, latency_ms: f64) -> Self {
        Self {
            id,
            a,
            b,
            capacity_mbps,
            latency_ms,
            load_mbps: 0.0,
            flows: BTreeSet::new(),
        }
    }

    /// 当前负载（Mbps）
    pub fn load_mbps(&self) -> f64 {
        self.load_mbps
    }

    /// 利用率 = 负载 / 容量，可能短暂超过 1.0
    pub fn utilization(&self) -> f64 {
        self.load_mbps / self.capacity_mbps
    }

    pub fn flow_count(&self) -> usize {
        self.flows.len()
    }

    pub fn flows(&self) -> impl Iterator<Item = FlowId> + '_ {
        self.flows.iter().copied()
    }

    pub fn carries(&self, flow: FlowId) -> bool {
        self.flows.contains(&flow)
    }

    /// 给定一端，返回另一端
    pub fn other_end(&self, n: NodeId) -> Option<NodeId> {
        if n == self.a {
            Some(self.b)
        } else if n == self.b {
            Some(self.a)
        } else {
            None
        }
    }

    /// 调整负载，结果不低于 0
    pub(crate) fn adjust(&mut self, delta_mbps: f64) {
        self.load_mbps = (self.load_mbps + delta_mbps).max(0.0);
    }

    pub(crate) fn attach(&mut self, flow: FlowId, demand_mbps: f64) {
        if self.flows.insert(flow) {
            self.adjust(demand_mbps);
        }
    }

    pub(crate) fn detach(&mut self, flow: FlowId, demand_mbps: f64) -> bool {
        if self.flows.remove(&flow) {
            self.adjust(-demand_mbps);
            if self.flows.is_empty() {
                // 最后一条流离开时负载精确归零，避免浮点残留。
                // 负载只应来自流，`Topology::apply_load` 因此不对外公开。
                self.load_mbps = 0.0;
            }
            true
        } else {
            false
        }
    }
}
