//! 流管理
//!
//! 活动流集合、接入/退役/重路由以及链路负载记账。

mod record;
mod manager;

pub use record::{Flow, FlowRequest};
pub use manager::{AdmissionPolicy, FlowError, FlowManager, RerouteOutcome};
