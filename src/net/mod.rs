//! 拓扑模型与路径计算
//!
//! 此模块包含节点/链路标识、链路负载、拥塞惩罚、拓扑以及拥塞感知最短路。

// 子模块声明
mod id;
mod link;
mod penalty;
mod routing;
mod topology;
mod topology_config;

// 重新导出公共接口
pub use id::{FlowId, LinkId, NodeId};
pub use link::Link;
pub use penalty::CongestionPenalty;
pub use routing::{Path, PathError, shortest_path, shortest_path_avoiding};
pub use topology::{Topology, TopologyError};
pub use topology_config::{LinkConfig, TopologyConfig};
