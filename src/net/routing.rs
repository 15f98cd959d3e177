//! 拥塞感知最短路
//!
//! 以 `Topology::cost` 为边权做 Dijkstra。每次调用都读取当前链路负载，
//! 不缓存任何代价。
//!
//! 等价代价的平局按节点序列字典序打破：堆按 (总代价, 节点序列) 排序，
//! 目的节点第一次出堆时得到的就是代价最小且字典序最小的路径，
//! 因而同一拓扑与负载下重复计算结果完全一致。

use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap};

use thiserror::Error;
use tracing::{debug, trace};

use super::id::{LinkId, NodeId};
use super::topology::Topology;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("no path from {src:?} to {dst:?}")]
    NotFound { src: NodeId, dst: NodeId },
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
}

/// 计算结果：节点序列、对应链路序列与总代价
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub nodes: Vec<NodeId>,
    pub links: Vec<LinkId>,
    pub cost: f64,
}

struct Candidate {
    cost: f64,
    nodes: Vec<NodeId>,
    links: Vec<LinkId>,
}

// BinaryHeap 是 max-heap；需要 (代价, 节点序列) 最小者优先，因此反向比较。
impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.cost.total_cmp(&other.cost) {
            Ordering::Equal => self.nodes.cmp(&other.nodes),
            ord => ord,
        }
        .reverse()
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

/// `src -> dst` 的最小代价路径
pub fn shortest_path(topo: &Topology, src: NodeId, dst: NodeId) -> Result<Path, PathError> {
    shortest_path_avoiding(topo, src, dst, &BTreeSet::new())
}

/// 同 [`shortest_path`]，但不经过 `avoid` 中的链路
#[tracing::instrument(skip(topo, avoid), fields(avoid = avoid.len()))]
pub fn shortest_path_avoiding(
    topo: &Topology,
    src: NodeId,
    dst: NodeId,
    avoid: &BTreeSet<LinkId>,
) -> Result<Path, PathError> {
    for n in [src, dst] {
        if !topo.contains(n) {
            return Err(PathError::UnknownNode(n));
        }
    }

    let n = topo.node_count();
    let mut best = vec![f64::INFINITY; n];
    let mut settled = vec![false; n];
    let mut heap = BinaryHeap::new();

    best[src.0] = 0.0;
    heap.push(Candidate {
        cost: 0.0,
        nodes: vec![src],
        links: Vec::new(),
    });

    while let Some(Candidate { cost, nodes, links }) = heap.pop() {
        let u = *nodes.last().unwrap_or(&src);
        if settled[u.0] {
            continue;
        }
        settled[u.0] = true;

        if u == dst {
            debug!(path = %topo.describe_path(&nodes), cost, "🧭 找到最短路");
            return Ok(Path { nodes, links, cost });
        }

        for &(v, lid) in topo.neighbors(u) {
            if settled[v.0] || avoid.contains(&lid) {
                continue;
            }
            let next = cost + topo.cost(lid);
            // 等价代价仍需入堆，由字典序决定胜者
            if next > best[v.0] {
                continue;
            }
            best[v.0] = next;
            trace!(from = ?u, to = ?v, link = ?lid, next, "松弛");

            let mut next_nodes = Vec::with_capacity(nodes.len() + 1);
            next_nodes.extend_from_slice(&nodes);
            next_nodes.push(v);
            let mut next_links = Vec::with_capacity(links.len() + 1);
            next_links.extend_from_slice(&links);
            next_links.push(lid);
            heap.push(Candidate {
                cost: next,
                nodes: next_nodes,
                links: next_links,
            });
        }
    }

    debug!("目的不可达");
    Err(PathError::NotFound { src, dst })
}
