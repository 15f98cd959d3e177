//! 事件与世界
//!
//! `Event` 由仿真器按时间顺序取出执行；`World` 是事件操作的业务状态，
//! 事件通过 `as_any_mut` 向下转型拿到具体类型（例如持有控制器的世界）。

use std::any::Any;

use super::simulator::Simulator;

/// 可调度的事件。执行时按值消费自身，可以把内部数据转交给新调度的事件。
pub trait Event: Send + 'static {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World);
}

/// 事件作用的业务状态
pub trait World: Any {
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// 每个事件执行完之后调用
    fn after_event(&mut self, _sim: &mut Simulator) {}
}
