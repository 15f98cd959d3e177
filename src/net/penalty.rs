//! 拥塞惩罚
//!
//! 随利用率变化、叠加在链路时延上的代价项。

use serde::{Deserialize, Serialize};

/// 给定利用率时链路额外承担的代价。
///
/// 两种形状都随利用率单调不减且不为负，Dijkstra 的前提始终成立。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CongestionPenalty {
    /// `alpha * ratio`，从第一个 Mbps 起生效
    Linear { alpha: f64 },
    /// `knee` 以下为 0，之后为 `scale * ((ratio - knee) / (1 - knee)) ^ exponent`
    Knee { knee: f64, scale: f64, exponent: f64 },
}

impl Default for CongestionPenalty {
    fn default() -> Self {
        Self::Knee {
            knee: 0.75,
            scale: 1000.0,
            exponent: 2.0,
        }
    }
}

impl CongestionPenalty {
    /// 利用率对应的惩罚，结果不低于 0；NaN 视为 0
    pub fn evaluate(&self, ratio: f64) -> f64 {
        let ratio = if ratio.is_nan() { 0.0 } else { ratio.max(0.0) };
        let raw = match *self {
            Self::Linear { alpha } => alpha * ratio,
            Self::Knee {
                knee,
                scale,
                exponent,
            } => {
                if ratio <= knee {
                    0.0
                } else {
                    scale * ((ratio - knee) / (1.0 - knee)).powf(exponent)
                }
            }
        };
        raw.max(0.0)
    }

    /// 参数校验，由配置校验调用
    pub fn check(&self) -> Result<(), String> {
        match *self {
            Self::Linear { alpha } => {
                if !alpha.is_finite() || alpha < 0.0 {
                    return Err(format!("linear alpha must be finite and >= 0, got {alpha}"));
                }
            }
            Self::Knee {
                knee,
                scale,
                exponent,
            } => {
                if !(0.0..1.0).contains(&knee) {
                    return Err(format!("knee must be in [0, 1), got {knee}"));
                }
                if !scale.is_finite() || scale < 0.0 {
                    return Err(format!("knee scale must be finite and >= 0, got {scale}"));
                }
                if !exponent.is_finite() || exponent < 1.0 {
                    return Err(format!("knee exponent must be finite and >= 1, got {exponent}"));
                }
            }
        }
        Ok(())
    }
}
