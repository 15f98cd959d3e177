//! 流量工程控制器
//!
//! 单一所有者持有拓扑、流管理器与流量生成器。每个 tick 依次经过
//! Generating → Monitoring → Rerouting → Retiring → Publishing，然后回到 Idle。
//! 所有修改都发生在 `tick(&mut self)` 内，快照在 Publishing 阶段整体拷贝出去。

use std::collections::BTreeSet;
use std::fmt;

use rand::RngCore;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::config::{ConfigError, ControllerConfig};
use super::traffic::TrafficGenerator;
use crate::flow::{Flow, FlowError, FlowManager, FlowRequest, RerouteOutcome};
use crate::metrics::{LinkSample, MetricsSink, MetricsSnapshot};
use crate::net::{FlowId, LinkId, Topology};
use crate::sim::SimTime;

/// 控制循环所处阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Generating,
    Monitoring,
    Rerouting,
    Retiring,
    Publishing,
}

/// 累计统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerStats {
    pub ticks: u64,
    pub admitted: u64,
    pub rejected: u64,
    pub retired: u64,
    pub reroutes: u64,
    pub reroute_attempts: u64,
}

/// 单个 tick 的结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub at: SimTime,
    pub admitted: usize,
    pub rejected: usize,
    /// Monitoring 阶段标记的拥塞链路
    pub congested: Vec<LinkId>,
    pub rerouted: usize,
    /// 尝试了但保持原路径的流
    pub kept: usize,
    pub retired: usize,
}

pub struct Controller {
    config: ControllerConfig,
    topo: Topology,
    flows: FlowManager,
    traffic: TrafficGenerator,
    sinks: Vec<Box<dyn MetricsSink>>,
    phase: Phase,
    stats: ControllerStats,
    now: SimTime,
    shutdown: CancellationToken,
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("phase", &self.phase)
            .field("now", &self.now)
            .field("stats", &self.stats)
            .field("active_flows", &self.flows.len())
            .finish_non_exhaustive()
    }
}

impl Controller {
    /// 按配置的种子构建
    pub fn new(config: ControllerConfig) -> Result<Self, ConfigError> {
        let rng = StdRng::seed_from_u64(config.seed);
        Self::with_rng(config, Box::new(rng))
    }

    /// 注入随机源构建
    pub fn with_rng(
        config: ControllerConfig,
        rng: Box<dyn RngCore + Send>,
    ) -> Result<Self, ConfigError> {
        let topo = config.build_topology()?;
        let endpoints = config.endpoint_ids(&topo)?;
        let flows = FlowManager::new(config.admission);
        info!(
            nodes = topo.node_count(),
            links = topo.links().len(),
            endpoints = endpoints.len(),
            directed = topo.is_directed(),
            penalty = ?topo.penalty(),
            admission = ?flows.admission(),
            threshold = config.reroute_threshold,
            "🚦 控制器初始化"
        );
        Ok(Self {
            flows,
            traffic: TrafficGenerator::new(config.generation.clone(), endpoints, rng),
            topo,
            config,
            sinks: Vec::new(),
            phase: Phase::Idle,
            stats: ControllerStats::default(),
            now: SimTime::ZERO,
            shutdown: CancellationToken::new(),
        })
    }

    pub fn add_sink(&mut self, sink: impl MetricsSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn topology(&self) -> &Topology {
        &self.topo
    }

    pub fn flows(&self) -> &FlowManager {
        &self.flows
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn stats(&self) -> ControllerStats {
        self.stats
    }

    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn tick_interval(&self) -> SimTime {
        self.config.tick_interval()
    }

    /// 停止信号：当前 tick 完成后驱动器不再调度新的 tick
    pub fn stop(&self) {
        self.shutdown.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// 手动接入一条流（不经过流量生成器）
    pub fn admit(&mut self, req: FlowRequest) -> Result<FlowId, FlowError> {
        let result = self.flows.admit(&mut self.topo, req);
        match result {
            Ok(_) => self.stats.admitted += 1,
            Err(_) => self.stats.rejected += 1,
        }
        result
    }

    /// 退役一条流；未知 id 返回 None
    pub fn retire(&mut self, id: FlowId) -> Option<Flow> {
        let flow = self.flows.retire(&mut self.topo, id);
        if flow.is_some() {
            self.stats.retired += 1;
        }
        flow
    }

    /// 执行一个完整的控制周期
    #[tracing::instrument(skip(self), fields(tick = self.stats.ticks + 1))]
    pub fn tick(&mut self, now: SimTime) -> TickReport {
        self.stats.ticks += 1;
        self.now = now;
        let mut report = TickReport {
            tick: self.stats.ticks,
            at: now,
            ..TickReport::default()
        };

        self.phase = Phase::Generating;
        self.generate(now, &mut report);

        self.phase = Phase::Monitoring;
        let congested = self.topo.congested_links(self.config.reroute_threshold);
        report.congested = congested.iter().copied().collect();

        self.phase = Phase::Rerouting;
        self.reroute_congested(&congested, &mut report);

        self.phase = Phase::Retiring;
        self.retire_expired(now, &mut report);

        self.phase = Phase::Publishing;
        let snapshot = self.snapshot();
        for sink in &mut self.sinks {
            sink.publish(&snapshot);
        }

        self.phase = Phase::Idle;
        debug!(
            admitted = report.admitted,
            rejected = report.rejected,
            congested = report.congested.len(),
            rerouted = report.rerouted,
            retired = report.retired,
            active = self.flows.len(),
            "tick 完成"
        );
        report
    }

    fn generate(&mut self, now: SimTime, report: &mut TickReport) {
        let window = self.config.tick_interval();
        for draw in self.traffic.arrivals(window) {
            let req = FlowRequest::new(draw.src, draw.dst, draw.demand_mbps)
                .at(now)
                .lifetime(draw.lifetime);
            match self.admit(req) {
                Ok(_) => report.admitted += 1,
                Err(err) => {
                    debug!(%err, "生成的流未能接入");
                    report.rejected += 1;
                }
            }
        }
    }

    /// 每条受影响的流本 tick 最多尝试一次。按需求从大到小处理；
    /// 处理前按实时负载复查，已不经过拥塞链路的流跳过。
    /// 新路径只避开该流自身路径上的拥塞链路，其余热点交给拥塞惩罚。
    fn reroute_congested(&mut self, marked: &BTreeSet<LinkId>, report: &mut TickReport) {
        if marked.is_empty() {
            return;
        }
        let threshold = self.config.reroute_threshold;
        for id in self.flows.flows_crossing(marked) {
            let live = self.topo.congested_links(threshold);
            let hot: BTreeSet<LinkId> = match self.flows.get(id) {
                Some(f) => f.links.iter().filter(|l| live.contains(l)).copied().collect(),
                None => continue,
            };
            if hot.is_empty() {
                debug!(flow = %id, "路径已不再拥塞，跳过");
                continue;
            }

            self.stats.reroute_attempts += 1;
            match self.flows.reroute(&mut self.topo, id, &hot) {
                Ok(RerouteOutcome::Rerouted { .. }) => report.rerouted += 1,
                Ok(RerouteOutcome::Unchanged | RerouteOutcome::NotFound) => report.kept += 1,
                Err(err) => warn!(flow = %id, %err, "重路由失败"),
            }
        }
        self.stats.reroutes = self.flows.cumulative_reroutes();
    }

    fn retire_expired(&mut self, now: SimTime, report: &mut TickReport) {
        for id in self.flows.expired(now) {
            if self.retire(id).is_some() {
                report.retired += 1;
            }
        }
    }

    /// 拷贝当前链路与流状态
    pub fn snapshot(&self) -> MetricsSnapshot {
        let threshold = self.config.reroute_threshold;
        let links = self
            .topo
            .links()
            .iter()
            .map(|l| {
                let ratio = l.utilization();
                LinkSample {
                    link: l.id.0,
                    u: self.topo.node_name(l.a).to_string(),
                    v: self.topo.node_name(l.b).to_string(),
                    capacity_mbps: l.capacity_mbps,
                    utilization_mbps: l.load_mbps(),
                    utilization_ratio: ratio,
                    active_flow_count: l.flow_count(),
                    congested: ratio >= threshold,
                }
            })
            .collect();
        MetricsSnapshot {
            tick: self.stats.ticks,
            at_ms: self.now.as_millis(),
            links,
            total_active_flows: self.flows.len(),
            cumulative_reroutes: self.flows.cumulative_reroutes(),
        }
    }
}
