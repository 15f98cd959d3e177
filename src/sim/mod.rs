//! 仿真核心模块
//!
//! 虚拟时间、事件与世界，以及驱动它们的事件驱动仿真器。控制器的周期 tick
//! 以事件形式挂在这个仿真器上。

// 子模块声明
mod event;
mod scheduled_event;
mod simulator;
mod time;

// 重新导出公共接口
pub use event::{Event, World};
pub use scheduled_event::ScheduledEvent;
pub use simulator::Simulator;
pub use time::SimTime;
