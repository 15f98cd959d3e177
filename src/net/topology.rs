//! 拓扑模型
//!
//! 持有节点、链路及每条链路的当前负载，并提供链路代价函数
//! `cost = latency_ms + penalty(utilization)`。链路集合在构建后不再变化。

use std::collections::{BTreeSet, HashMap};

use thiserror::Error;
use tracing::{debug, trace};

use super::id::{FlowId, LinkId, NodeId};
use super::link::Link;
use super::penalty::CongestionPenalty;
use super::topology_config::TopologyConfig;

/// 拓扑构建/路径校验错误
#[derive(Debug, Error, PartialEq)]
pub enum TopologyError {
    #[error("topology has no nodes")]
    Empty,
    #[error("empty node name")]
    EmptyNodeName,
    #[error("duplicate node {0:?}")]
    DuplicateNode(String),
    #[error("link {a:?}-{b:?} references unknown node {node:?}")]
    UnknownNode { a: String, b: String, node: String },
    #[error("link {0:?} connects a node to itself")]
    SelfLoop(String),
    #[error("duplicate link {a:?}-{b:?}")]
    DuplicateLink { a: String, b: String },
    #[error("link {a:?}-{b:?} has non-positive capacity {capacity_mbps}")]
    NonPositiveCapacity { a: String, b: String, capacity_mbps: f64 },
    #[error("link {a:?}-{b:?} has invalid latency {latency_ms}")]
    InvalidLatency { a: String, b: String, latency_ms: f64 },
    #[error("invalid penalty: {0}")]
    InvalidPenalty(String),
    #[error("no link between {0:?} and {1:?}")]
    NoLink(NodeId, NodeId),
    #[error("unknown node {0:?}")]
    NoSuchNode(NodeId),
}

/// WAN 拓扑
#[derive(Debug, Clone)]
pub struct Topology {
    names: Vec<String>,
    index: HashMap<String, NodeId>,
    links: Vec<Link>,
    /// 出边邻接表，按邻居 NodeId 升序（固定的松弛顺序）
    adj: Vec<Vec<(NodeId, LinkId)>>,
    edges: HashMap<(NodeId, NodeId), LinkId>,
    directed: bool,
    penalty: CongestionPenalty,
}

impl Topology {
    /// 从拓扑描述构建，拒绝任何非法定义
    #[tracing::instrument(skip_all, fields(links = cfg.links.len(), directed = cfg.directed))]
    pub fn from_config(cfg: &TopologyConfig, penalty: CongestionPenalty) -> Result<Self, TopologyError> {
        penalty.check().map_err(TopologyError::InvalidPenalty)?;

        let mut names: BTreeSet<String> = BTreeSet::new();
        for name in &cfg.nodes {
            if name.is_empty() {
                return Err(TopologyError::EmptyNodeName);
            }
            if !names.insert(name.clone()) {
                return Err(TopologyError::DuplicateNode(name.clone()));
            }
        }
        let explicit = !cfg.nodes.is_empty();
        for l in &cfg.links {
            for end in [&l.a, &l.b] {
                if end.is_empty() {
                    return Err(TopologyError::EmptyNodeName);
                }
                if explicit && !names.contains(end) {
                    return Err(TopologyError::UnknownNode {
                        a: l.a.clone(),
                        b: l.b.clone(),
                        node: end.clone(),
                    });
                }
                if !explicit {
                    names.insert(end.clone());
                }
            }
        }
        if names.is_empty() {
            return Err(TopologyError::Empty);
        }

        // BTreeSet 迭代有序：NodeId 与名字字典序一致
        let names: Vec<String> = names.into_iter().collect();
        let index: HashMap<String, NodeId> = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), NodeId(i)))
            .collect();

        let mut topo = Self {
            adj: vec![Vec::new(); names.len()],
            names,
            index,
            links: Vec::with_capacity(cfg.links.len()),
            edges: HashMap::new(),
            directed: cfg.directed,
            penalty,
        };

        for l in &cfg.links {
            if l.a == l.b {
                return Err(TopologyError::SelfLoop(l.a.clone()));
            }
            if !l.capacity_mbps.is_finite() || l.capacity_mbps <= 0.0 {
                return Err(TopologyError::NonPositiveCapacity {
                    a: l.a.clone(),
                    b: l.b.clone(),
                    capacity_mbps: l.capacity_mbps,
                });
            }
            if !l.latency_ms.is_finite() || l.latency_ms < 0.0 {
                return Err(TopologyError::InvalidLatency {
                    a: l.a.clone(),
                    b: l.b.clone(),
                    latency_ms: l.latency_ms,
                });
            }
            let a = topo.index[&l.a];
            let b = topo.index[&l.b];
            let key = topo.edge_key(a, b);
            if topo.edges.contains_key(&key) {
                return Err(TopologyError::DuplicateLink {
                    a: l.a.clone(),
                    b: l.b.clone(),
                });
            }
            let (a, b) = if topo.directed { (a, b) } else { key };
            topo.connect(a, b, l.capacity_mbps, l.latency_ms);
        }

        for nbrs in &mut topo.adj {
            nbrs.sort();
        }
        debug!(nodes = topo.names.len(), links = topo.links.len(), "🗺️  拓扑构建完成");
        Ok(topo)
    }

    fn edge_key(&self, a: NodeId, b: NodeId) -> (NodeId, NodeId) {
        if self.directed || a < b { (a, b) } else { (b, a) }
    }

    fn connect(&mut self, a: NodeId, b: NodeId, capacity_mbps: f64, latency_ms: f64) -> LinkId {
        let id = LinkId(self.links.len());
        self.links.push(Link::new(id, a, b, capacity_mbps, latency_ms));
        let key = self.edge_key(a, b);
        self.edges.insert(key, id);
        self.adj[a.0].push((b, id));
        if !self.directed {
            self.adj[b.0].push((a, id));
        }
        id
    }

    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    pub fn node_name(&self, id: NodeId) -> &str {
        &self.names[id.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.names.len()).map(NodeId)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.names.len()
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn link(&self, id: LinkId) -> &Link {
        &self.links[id.0]
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn penalty(&self) -> CongestionPenalty {
        self.penalty
    }

    /// 查找 `from -> to` 可用的链路
    pub fn link_between(&self, from: NodeId, to: NodeId) -> Option<LinkId> {
        self.edges.get(&self.edge_key(from, to)).copied()
    }

    /// `from` 的出边 (邻居, 链路)
    pub fn neighbors(&self, from: NodeId) -> &[(NodeId, LinkId)] {
        &self.adj[from.0]
    }

    /// 链路代价：时延加拥塞惩罚，永不小于时延
    pub fn cost(&self, id: LinkId) -> f64 {
        let link = &self.links[id.0];
        link.latency_ms + self.penalty.evaluate(link.utilization())
    }

    pub fn utilization(&self, id: LinkId) -> f64 {
        self.links[id.0].utilization()
    }

    /// 利用率达到 `threshold` 的链路
    pub fn congested_links(&self, threshold: f64) -> BTreeSet<LinkId> {
        self.links
            .iter()
            .filter(|l| l.utilization() >= threshold)
            .map(|l| l.id)
            .collect()
    }

    /// 直接调整链路负载（结果不低于 0），不记录流成员。
    ///
    /// 仅供 crate 内部使用：链路上最后一条流卸载时负载被精确归零，
    /// 经由这里加上的负载会随之丢失。流的装载/卸载请走 `FlowManager`。
    pub(crate) fn apply_load(&mut self, id: LinkId, delta_mbps: f64) {
        let link = &mut self.links[id.0];
        link.adjust(delta_mbps);
        trace!(link = ?id, delta_mbps, load_mbps = link.load_mbps(), "负载调整");
    }

    /// 把节点路径转换为链路序列，校验每一跳都存在
    pub fn path_links(&self, path: &[NodeId]) -> Result<Vec<LinkId>, TopologyError> {
        if let Some(&bad) = path.iter().find(|n| !self.contains(**n)) {
            return Err(TopologyError::NoSuchNode(bad));
        }
        path.windows(2)
            .map(|hop| {
                self.link_between(hop[0], hop[1])
                    .ok_or(TopologyError::NoLink(hop[0], hop[1]))
            })
            .collect()
    }

    pub(crate) fn attach_flow(&mut self, flow: FlowId, links: &[LinkId], demand_mbps: f64) {
        for &id in links {
            self.links[id.0].attach(flow, demand_mbps);
        }
    }

    pub(crate) fn detach_flow(&mut self, flow: FlowId, links: &[LinkId], demand_mbps: f64) {
        for &id in links {
            self.links[id.0].detach(flow, demand_mbps);
        }
    }

    /// 可读的路径表示，例如 `A->B->C`
    pub fn describe_path(&self, path: &[NodeId]) -> String {
        path.iter()
            .map(|n| self.node_name(*n))
            .collect::<Vec<_>>()
            .join("->")
    }
}
