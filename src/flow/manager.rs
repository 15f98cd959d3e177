//! 流管理器
//!
//! 持有活动流集合，负责在链路上装载/卸载流的带宽需求：
//! - `admit`：算路并装载，失败则拒绝，不留下任何负载；
//! - `retire`：卸载并移除，重复调用是无操作；
//! - `reroute`：卸下自身负载后算路，找到新路径才切换，否则装回原路径。
//!
//! 所有修改都经由 `&mut self` + `&mut Topology`，同一时刻只有一个写者。

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::record::{Flow, FlowRequest};
use crate::net::{FlowId, LinkId, NodeId, PathError, Topology, shortest_path, shortest_path_avoiding};

/// 接入控制策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AdmissionPolicy {
    /// 不做接入控制，过载交给重路由处理
    #[default]
    None,
    /// 若装载后路径上任一链路利用率超过 `ratio` 则拒绝
    MaxRatio { ratio: f64 },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FlowError {
    #[error("source and destination are both {0:?}")]
    SelfLoop(NodeId),
    #[error("demand must be positive and finite, got {0}")]
    InvalidDemand(f64),
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
    #[error("no path from {src:?} to {dst:?}")]
    NoPath { src: NodeId, dst: NodeId },
    #[error("admission denied: link {link:?} would reach utilization {projected_ratio:.3}")]
    AdmissionDenied { link: LinkId, projected_ratio: f64 },
    #[error("unknown flow {0}")]
    UnknownFlow(FlowId),
}

impl From<PathError> for FlowError {
    fn from(err: PathError) -> Self {
        match err {
            PathError::NotFound { src, dst } => FlowError::NoPath { src, dst },
            PathError::UnknownNode(n) => FlowError::UnknownNode(n),
        }
    }
}

/// 重路由结果
#[derive(Debug, Clone, PartialEq)]
pub enum RerouteOutcome {
    /// 路径已替换
    Rerouted { from: Vec<NodeId>, to: Vec<NodeId> },
    /// 最优路径就是当前路径
    Unchanged,
    /// 没有可用替代路径，保持原路径
    NotFound,
}

#[derive(Debug, Default)]
pub struct FlowManager {
    flows: BTreeMap<FlowId, Flow>,
    next_id: u64,
    reroutes: u64,
    admission: AdmissionPolicy,
}

impl FlowManager {
    pub fn new(admission: AdmissionPolicy) -> Self {
        Self {
            flows: BTreeMap::new(),
            next_id: 1,
            reroutes: 0,
            admission,
        }
    }

    /// 为请求算路并装载到拓扑上
    #[tracing::instrument(skip(self, topo, req), fields(src = ?req.src, dst = ?req.dst, demand_mbps = req.demand_mbps))]
    pub fn admit(&mut self, topo: &mut Topology, req: FlowRequest) -> Result<FlowId, FlowError> {
        if req.src == req.dst {
            return Err(FlowError::SelfLoop(req.src));
        }
        if !req.demand_mbps.is_finite() || req.demand_mbps <= 0.0 {
            return Err(FlowError::InvalidDemand(req.demand_mbps));
        }

        let path = match shortest_path(topo, req.src, req.dst) {
            Ok(p) => p,
            Err(err) => {
                warn!(%err, "🚫 流被拒绝：无可用路径");
                return Err(err.into());
            }
        };

        if let AdmissionPolicy::MaxRatio { ratio } = self.admission {
            for &lid in &path.links {
                let link = topo.link(lid);
                let projected_ratio = (link.load_mbps() + req.demand_mbps) / link.capacity_mbps;
                if projected_ratio > ratio {
                    warn!(link = ?lid, projected_ratio, "🚫 流被拒绝：超过接入阈值");
                    return Err(FlowError::AdmissionDenied {
                        link: lid,
                        projected_ratio,
                    });
                }
            }
        }

        let id = FlowId(self.next_id.max(1));
        self.next_id = id.0 + 1;

        topo.attach_flow(id, &path.links, req.demand_mbps);
        info!(flow = %id, path = %topo.describe_path(&path.nodes), cost = path.cost, "➕ 流已接入");

        self.flows.insert(
            id,
            Flow {
                id,
                src: req.src,
                dst: req.dst,
                demand_mbps: req.demand_mbps,
                path: path.nodes,
                links: path.links,
                created_at: req.created_at,
                expires_at: req.lifetime.map(|l| req.created_at.saturating_add(l)),
                reroutes: 0,
            },
        );
        Ok(id)
    }

    /// 卸载并移除流。未知或已退役的流返回 None，不改变任何状态。
    #[tracing::instrument(skip(self, topo))]
    pub fn retire(&mut self, topo: &mut Topology, id: FlowId) -> Option<Flow> {
        let Some(flow) = self.flows.remove(&id) else {
            debug!("流不存在，忽略退役请求");
            return None;
        };
        topo.detach_flow(id, &flow.links, flow.demand_mbps);
        info!(flow = %id, demand_mbps = flow.demand_mbps, "➖ 流已退役");
        Some(flow)
    }

    /// 为已有流重新算路，不经过 `avoid` 中的链路。
    ///
    /// 算路前先卸下该流自身的负载，代价反映的是流离开后的链路状态；
    /// 没有找到不同的路径时把流装回原路径。整个过程在同一个 `&mut` 借用内完成。
    #[tracing::instrument(skip(self, topo, avoid), fields(avoid = avoid.len()))]
    pub fn reroute(
        &mut self,
        topo: &mut Topology,
        id: FlowId,
        avoid: &BTreeSet<LinkId>,
    ) -> Result<RerouteOutcome, FlowError> {
        let flow = self.flows.get_mut(&id).ok_or(FlowError::UnknownFlow(id))?;

        topo.detach_flow(id, &flow.links, flow.demand_mbps);
        let path = match shortest_path_avoiding(topo, flow.src, flow.dst, avoid) {
            Ok(p) if p.nodes != flow.path => p,
            Ok(_) => {
                topo.attach_flow(id, &flow.links, flow.demand_mbps);
                return Ok(RerouteOutcome::Unchanged);
            }
            Err(PathError::NotFound { .. }) => {
                topo.attach_flow(id, &flow.links, flow.demand_mbps);
                debug!(flow = %id, "没有替代路径，保持原路径");
                return Ok(RerouteOutcome::NotFound);
            }
            Err(err) => {
                topo.attach_flow(id, &flow.links, flow.demand_mbps);
                return Err(err.into());
            }
        };
        topo.attach_flow(id, &path.links, flow.demand_mbps);

        let from = std::mem::replace(&mut flow.path, path.nodes);
        flow.links = path.links;
        flow.reroutes = flow.reroutes.saturating_add(1);
        self.reroutes += 1;

        info!(
            flow = %id,
            from = %topo.describe_path(&from),
            to = %topo.describe_path(&flow.path),
            cost = path.cost,
            total_reroutes = self.reroutes,
            "🔀 流已重路由"
        );
        Ok(RerouteOutcome::Rerouted {
            from,
            to: flow.path.clone(),
        })
    }

    pub fn get(&self, id: FlowId) -> Option<&Flow> {
        self.flows.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Flow> {
        self.flows.values()
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    /// 累计重路由次数（单调不减）
    pub fn cumulative_reroutes(&self) -> u64 {
        self.reroutes
    }

    pub fn admission(&self) -> AdmissionPolicy {
        self.admission
    }

    /// 经过 `links` 中任一链路的流，按需求降序（同需求按 id 升序）
    pub fn flows_crossing(&self, links: &BTreeSet<LinkId>) -> Vec<FlowId> {
        let mut hit: Vec<&Flow> = self
            .flows
            .values()
            .filter(|f| f.links.iter().any(|l| links.contains(l)))
            .collect();
        hit.sort_by(|a, b| {
            b.demand_mbps
                .total_cmp(&a.demand_mbps)
                .then(a.id.cmp(&b.id))
        });
        hit.into_iter().map(|f| f.id).collect()
    }

    /// 截至 `now` 已到期的流
    pub fn expired(&self, now: crate::sim::SimTime) -> Vec<FlowId> {
        self.flows
            .values()
            .filter(|f| f.is_expired(now))
            .map(|f| f.id)
            .collect()
    }

    /// 流在某条链路上贡献的负载：经过则为需求，否则为 0
    pub fn load_on(&self, id: FlowId, link: LinkId) -> f64 {
        match self.flows.get(&id) {
            Some(f) if f.traverses(link) => f.demand_mbps,
            _ => 0.0,
        }
    }

    /// 退役全部流，返回数量
    pub fn retire_all(&mut self, topo: &mut Topology) -> usize {
        let ids: Vec<FlowId> = self.flows.keys().copied().collect();
        ids.into_iter()
            .filter(|id| self.retire(topo, *id).is_some())
            .count()
    }
}
