//! 流记录与接入请求

use crate::net::{FlowId, LinkId, NodeId};
use crate::sim::SimTime;

/// 已安装在某条路径上的活动流
#[derive(Debug, Clone, PartialEq)]
pub struct Flow {
    pub id: FlowId,
    pub src: NodeId,
    pub dst: NodeId,
    pub demand_mbps: f64,
    /// 从 src 到 dst 的节点序列
    pub path: Vec<NodeId>,
    /// 与 `path` 相邻节点对一一对应的链路
    pub links: Vec<LinkId>,
    pub created_at: SimTime,
    /// None 表示不会因超时退役
    pub expires_at: Option<SimTime>,
    pub reroutes: u32,
}

impl Flow {
    pub fn traverses(&self, link: LinkId) -> bool {
        self.links.contains(&link)
    }

    pub fn is_expired(&self, now: SimTime) -> bool {
        self.expires_at.is_some_and(|t| t <= now)
    }
}

/// 接入请求
#[derive(Debug, Clone, PartialEq)]
pub struct FlowRequest {
    pub src: NodeId,
    pub dst: NodeId,
    pub demand_mbps: f64,
    pub created_at: SimTime,
    pub lifetime: Option<SimTime>,
}

impl FlowRequest {
    pub fn new(src: NodeId, dst: NodeId, demand_mbps: f64) -> Self {
        Self {
            src,
            dst,
            demand_mbps,
            created_at: SimTime::ZERO,
            lifetime: None,
        }
    }

    pub fn at(mut self, created_at: SimTime) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn lifetime(mut self, lifetime: SimTime) -> Self {
        self.lifetime = Some(lifetime);
        self
    }
}
