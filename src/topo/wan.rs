//! 参考 WAN 拓扑
//!
//! 6 个站点 A-F、8 条链路，默认控制器配置使用它。

use crate::net::{LinkConfig, TopologyConfig};

/// (a, b, capacity_mbps, latency_ms)
const REFERENCE_LINKS: [(&str, &str, f64, f64); 8] = [
    ("A", "B", 50.0, 20.0),
    ("A", "C", 30.0, 40.0),
    ("B", "C", 40.0, 10.0),
    ("B", "D", 20.0, 50.0),
    ("C", "E", 30.0, 30.0),
    ("D", "E", 60.0, 20.0),
    ("D", "F", 40.0, 25.0),
    ("E", "F", 50.0, 15.0),
];

pub fn reference_wan() -> TopologyConfig {
    TopologyConfig {
        nodes: ["A", "B", "C", "D", "E", "F"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        links: REFERENCE_LINKS
            .iter()
            .map(|&(a, b, cap, lat)| LinkConfig::new(a, b, cap, lat))
            .collect(),
        directed: false,
    }
}
