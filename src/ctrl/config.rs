//! 控制器配置
//!
//! 所有字段都有默认值，缺省配置即参考 WAN 拓扑：平均 0.6s 到达一条流，需求 1~10 Mbps，寿命 6~20s。
//! 配置只在这里校验一次；非法配置无法构造出 `Controller`。

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::flow::AdmissionPolicy;
use crate::net::{CongestionPenalty, NodeId, Topology, TopologyConfig, TopologyError};
use crate::sim::SimTime;
use crate::topo::reference_wan;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid topology: {0}")]
    Topology(#[from] TopologyError),
    #[error("reroute threshold must be finite and > 0, got {0}")]
    InvalidThreshold(f64),
    #[error("tick interval must be > 0 ms")]
    ZeroTickInterval,
    #[error("invalid flow generation: {0}")]
    InvalidGeneration(String),
    #[error("admission ratio must be finite and > 0, got {0}")]
    InvalidAdmission(f64),
    #[error("flow endpoint {0:?} is not a topology node")]
    UnknownEndpoint(String),
    #[error("flow generation needs at least 2 distinct endpoints, got {0}")]
    TooFewEndpoints(usize),
}

/// 流量生成参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowGenConfig {
    /// 泊松到达率（流/秒），0 表示不生成
    pub arrival_rate_per_sec: f64,
    pub min_demand_mbps: f64,
    pub max_demand_mbps: f64,
    pub min_lifetime_ms: u64,
    pub max_lifetime_ms: u64,
    /// 可作为流端点的节点；None 表示全部节点
    pub endpoints: Option<Vec<String>>,
}

impl Default for FlowGenConfig {
    fn default() -> Self {
        Self {
            // 平均到达间隔 0.6s
            arrival_rate_per_sec: 1.0 / 0.6,
            min_demand_mbps: 1.0,
            max_demand_mbps: 10.0,
            min_lifetime_ms: 6_000,
            max_lifetime_ms: 20_000,
            endpoints: None,
        }
    }
}

impl FlowGenConfig {
    /// 不生成任何流（手动接入场景）
    pub fn disabled() -> Self {
        Self {
            arrival_rate_per_sec: 0.0,
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), ConfigError> {
        let bad = |msg: String| Err(ConfigError::InvalidGeneration(msg));
        if !self.arrival_rate_per_sec.is_finite() || self.arrival_rate_per_sec < 0.0 {
            return bad(format!(
                "arrival rate must be finite and >= 0, got {}",
                self.arrival_rate_per_sec
            ));
        }
        if !self.min_demand_mbps.is_finite() || self.min_demand_mbps <= 0.0 {
            return bad(format!(
                "min demand must be finite and > 0, got {}",
                self.min_demand_mbps
            ));
        }
        if !self.max_demand_mbps.is_finite() || self.max_demand_mbps < self.min_demand_mbps {
            return bad(format!(
                "max demand {} must be finite and >= min demand {}",
                self.max_demand_mbps, self.min_demand_mbps
            ));
        }
        if self.max_lifetime_ms < self.min_lifetime_ms {
            return bad(format!(
                "max lifetime {}ms is below min lifetime {}ms",
                self.max_lifetime_ms, self.min_lifetime_ms
            ));
        }
        Ok(())
    }
}

/// 控制器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub topology: TopologyConfig,
    /// 利用率达到该值的链路视为拥塞
    pub reroute_threshold: f64,
    pub tick_interval_ms: u64,
    pub penalty: CongestionPenalty,
    pub admission: AdmissionPolicy,
    pub generation: FlowGenConfig,
    /// 流量生成器的随机种子
    pub seed: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            topology: reference_wan(),
            reroute_threshold: 0.75,
            tick_interval_ms: 1_000,
            penalty: CongestionPenalty::default(),
            admission: AdmissionPolicy::None,
            generation: FlowGenConfig::default(),
            seed: 42,
        }
    }
}

impl ControllerConfig {
    /// 以给定拓扑替换参考拓扑，其余取默认值
    pub fn with_topology(topology: TopologyConfig) -> Self {
        Self {
            topology,
            ..Self::default()
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn tick_interval(&self) -> SimTime {
        SimTime::from_millis(self.tick_interval_ms)
    }

    /// 完整校验，不返回构建结果
    pub fn validate(&self) -> Result<(), ConfigError> {
        let topo = self.build_topology()?;
        self.endpoint_ids(&topo).map(|_| ())
    }

    pub(crate) fn build_topology(&self) -> Result<Topology, ConfigError> {
        if !self.reroute_threshold.is_finite() || self.reroute_threshold <= 0.0 {
            return Err(ConfigError::InvalidThreshold(self.reroute_threshold));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        if let AdmissionPolicy::MaxRatio { ratio } = self.admission {
            if !ratio.is_finite() || ratio <= 0.0 {
                return Err(ConfigError::InvalidAdmission(ratio));
            }
        }
        self.generation.check()?;
        Ok(Topology::from_config(&self.topology, self.penalty)?)
    }

    /// 解析流端点名字为 NodeId（去重、有序）
    pub(crate) fn endpoint_ids(&self, topo: &Topology) -> Result<Vec<NodeId>, ConfigError> {
        let ids: BTreeSet<NodeId> = match &self.generation.endpoints {
            Some(names) => names
                .iter()
                .map(|n| {
                    topo.node_id(n)
                        .ok_or_else(|| ConfigError::UnknownEndpoint(n.clone()))
                })
                .collect::<Result<_, _>>()?,
            None => topo.nodes().collect(),
        };
        if self.generation.arrival_rate_per_sec > 0.0 && ids.len() < 2 {
            return Err(ConfigError::TooFewEndpoints(ids.len()));
        }
        Ok(ids.into_iter().collect())
    }
}
