//! 虚拟时间驱动
//!
//! 把控制器 tick 作为事件挂到 `Simulator` 上：每次执行后按 tick 间隔重新调度自己，
//! 直到收到停止信号或仿真到达截止时间。

use tracing::info;

use super::controller::{Controller, TickReport};
use crate::sim::{Event, SimTime, Simulator, World};
use std::any::Any;

/// 持有控制器的仿真世界
#[derive(Debug)]
pub struct ControllerWorld {
    pub controller: Controller,
    pub reports: Vec<TickReport>,
}

impl ControllerWorld {
    pub fn new(controller: Controller) -> Self {
        Self {
            controller,
            reports: Vec::new(),
        }
    }
}

impl World for ControllerWorld {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// 周期 tick 事件
#[derive(Debug)]
pub struct ControllerTick;

impl Event for ControllerTick {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let w = world
            .as_any_mut()
            .downcast_mut::<ControllerWorld>()
            .expect("world must be ControllerWorld");

        if w.controller.is_stopped() {
            info!(now = ?sim.now(), "🛑 收到停止信号，不再调度 tick");
            return;
        }

        let now = sim.now();
        let report = w.controller.tick(now);
        w.reports.push(report);

        let next = now.saturating_add(w.controller.tick_interval());
        sim.schedule(next, ControllerTick);
    }
}

/// 在虚拟时间里运行 `[0, until]`：tick 发生在 0, I, 2I, ... ≤ until
pub fn run_virtual(controller: Controller, until: SimTime) -> ControllerWorld {
    let mut sim = Simulator::default();
    let mut world = ControllerWorld::new(controller);
    sim.schedule(SimTime::ZERO, ControllerTick);
    sim.run_until(until, &mut world);
    world
}
