//! 拓扑描述（可由 JSON 反序列化）

use serde::{Deserialize, Serialize};

/// 拓扑定义：节点与链路
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologyConfig {
    /// 节点名列表；为空时从链路端点推断
    #[serde(default)]
    pub nodes: Vec<String>,
    #[serde(default)]
    pub links: Vec<LinkConfig>,
    /// 有向模型：每条链路只承载 `a -> b` 方向的流量
    #[serde(default)]
    pub directed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkConfig {
    pub a: String,
    pub b: String,
    pub capacity_mbps: f64,
    #[serde(default)]
    pub latency_ms: f64,
}

impl LinkConfig {
    pub fn new(a: impl Into<String>, b: impl Into<String>, capacity_mbps: f64, latency_ms: f64) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
            capacity_mbps,
            latency_ms,
        }
    }
}
