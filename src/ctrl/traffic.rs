//! 合成流量生成
//!
//! 泊松到达：到达间隔服从指数分布。每个 tick 覆盖一个时间窗口，
//! 窗口内落下的到达全部返回；剩余间隔延续到下一个窗口。
//! 随机源可注入，同一种子得到同一流量序列。

use rand::{Rng, RngCore};
use tracing::trace;

use super::config::FlowGenConfig;
use crate::net::NodeId;
use crate::sim::SimTime;

/// 一次抽样得到的流
#[derive(Debug, Clone, PartialEq)]
pub struct FlowDraw {
    pub src: NodeId,
    pub dst: NodeId,
    pub demand_mbps: f64,
    pub lifetime: SimTime,
}

pub struct TrafficGenerator {
    cfg: FlowGenConfig,
    endpoints: Vec<NodeId>,
    rng: Box<dyn RngCore + Send>,
    /// 距离下一次到达还剩多少秒
    until_next: f64,
}

impl TrafficGenerator {
    pub fn new(cfg: FlowGenConfig, endpoints: Vec<NodeId>, rng: Box<dyn RngCore + Send>) -> Self {
        let mut generator = Self {
            cfg,
            endpoints,
            rng,
            until_next: f64::INFINITY,
        };
        generator.until_next = generator.next_gap();
        generator
    }

    fn next_gap(&mut self) -> f64 {
        let rate = self.cfg.arrival_rate_per_sec;
        if rate <= 0.0 || self.endpoints.len() < 2 {
            return f64::INFINITY;
        }
        let u: f64 = self.rng.random();
        -(1.0 - u).ln() / rate
    }

    /// 窗口 `window` 内的全部到达
    pub fn arrivals(&mut self, window: SimTime) -> Vec<FlowDraw> {
        let mut remaining = window.as_secs_f64();
        let mut out = Vec::new();
        while self.until_next <= remaining {
            remaining -= self.until_next;
            out.extend(self.draw());
            self.until_next = self.next_gap();
        }
        self.until_next -= remaining;
        trace!(arrivals = out.len(), until_next = self.until_next, "流量抽样");
        out
    }

    /// 抽一条流：两个不同端点、均匀分布的需求和寿命。端点不足两个时返回 None。
    pub fn draw(&mut self) -> Option<FlowDraw> {
        let n = self.endpoints.len();
        if n < 2 {
            return None;
        }
        let i = self.rng.random_range(0..n);
        let mut j = self.rng.random_range(0..n - 1);
        if j >= i {
            j += 1;
        }
        let demand_mbps = self
            .rng
            .random_range(self.cfg.min_demand_mbps..=self.cfg.max_demand_mbps);
        let lifetime_ms = self
            .rng
            .random_range(self.cfg.min_lifetime_ms..=self.cfg.max_lifetime_ms);
        Some(FlowDraw {
            src: self.endpoints[i],
            dst: self.endpoints[j],
            demand_mbps,
            lifetime: SimTime::from_millis(lifetime_ms),
        })
    }
}
