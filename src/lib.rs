pub mod ctrl;
pub mod flow;
pub mod metrics;
pub mod net;
pub mod sim;
pub mod topo;

#[cfg(test)]
mod test;
