//! 环形与多岛拓扑构建

use crate::net::{LinkConfig, TopologyConfig};

/// 环形拓扑：`names[0] - names[1] - ... - names[n-1] - names[0]`
pub fn build_ring(names: &[&str], capacity_mbps: f64, latency_ms: f64) -> TopologyConfig {
    let n = names.len();
    let links = if n < 2 {
        Vec::new()
    } else if n == 2 {
        vec![LinkConfig::new(names[0], names[1], capacity_mbps, latency_ms)]
    } else {
        (0..n)
            .map(|i| LinkConfig::new(names[i], names[(i + 1) % n], capacity_mbps, latency_ms))
            .collect()
    };
    TopologyConfig {
        nodes: names.iter().map(|s| s.to_string()).collect(),
        links,
        directed: false,
    }
}

/// 两个互不连通的环，用于验证不可达请求
pub fn build_islands(
    left: &[&str],
    right: &[&str],
    capacity_mbps: f64,
    latency_ms: f64,
) -> TopologyConfig {
    let mut cfg = build_ring(left, capacity_mbps, latency_ms);
    let other = build_ring(right, capacity_mbps, latency_ms);
    cfg.nodes.extend(other.nodes);
    cfg.links.extend(other.links);
    cfg
}
