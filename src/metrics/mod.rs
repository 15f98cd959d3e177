//! 指标快照
//!
//! 控制器每个 tick 产出一份 [`MetricsSnapshot`]，交给外部导出组件消费。
//! 这里不负责格式化或传输，只定义快照结构和接收端接口。

mod sink;
mod snapshot;

pub use sink::{LatestSnapshot, LogSink, MetricsSink, SnapshotRecorder, WatchSink};
pub use snapshot::{LinkSample, MetricsSnapshot};
