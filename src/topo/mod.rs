//! 预置拓扑

pub mod ring;
pub mod wan;

pub use ring::{build_islands, build_ring};
pub use wan::reference_wan;
