//! 控制循环
//!
//! 配置、流量生成、控制器状态机，以及虚拟时间/实时两种驱动。

mod config;
mod controller;
mod driver;
mod realtime;
mod traffic;

pub use config::{ConfigError, ControllerConfig, FlowGenConfig};
pub use controller::{Controller, ControllerStats, Phase, TickReport};
pub use driver::{ControllerTick, ControllerWorld, run_virtual};
pub use realtime::run_realtime;
pub use traffic::{FlowDraw, TrafficGenerator};
