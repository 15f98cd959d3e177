//! 仿真器
//!
//! 最小时间优先的事件队列。时间只在取出事件时前进，`run_until` 结束后
//! 时钟停在截止时间上，便于分段推进。

use super::event::{Event, World};
use super::scheduled_event::ScheduledEvent;
use super::time::SimTime;
use std::collections::BinaryHeap;
use tracing::{debug, info, trace};

/// 事件驱动仿真器：维护当前时间与事件队列。
#[derive(Default)]
pub struct Simulator {
    now: SimTime,
    next_seq: u64,
    q: BinaryHeap<ScheduledEvent>,
}

impl Simulator {
    /// 获取当前仿真时间
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// 队列中尚未执行的事件数
    pub fn pending(&self) -> usize {
        self.q.len()
    }

    /// 调度事件在指定时间执行
    #[tracing::instrument(skip(self, ev), fields(event_type = std::any::type_name::<E>(), schedule_at = ?at))]
    pub fn schedule<E: Event>(&mut self, at: SimTime, ev: E) {
        let seq = self.next_seq;
        trace!(now = ?self.now, seq, "调度事件");

        self.next_seq = self.next_seq.wrapping_add(1);
        self.q.push(ScheduledEvent {
            at,
            seq,
            ev: Box::new(ev),
        });

        trace!(queue_size = self.q.len(), "事件已加入队列");
    }

    /// 运行直到事件队列为空或到达 `until`。返回执行的事件数。
    #[tracing::instrument(skip(self, world))]
    pub fn run_until(&mut self, until: SimTime, world: &mut dyn World) -> u64 {
        info!(now = ?self.now, queue_size = self.q.len(), "▶️  开始运行仿真");

        let mut event_count = 0;
        while let Some(top) = self.q.peek() {
            if top.at > until {
                break;
            }
            let Some(item) = self.q.pop() else { break };
            event_count += 1;
            self.now = item.at;
            debug!(event_num = event_count, now = ?self.now, seq = item.seq, "执行事件");

            item.ev.execute(self, world);
            world.after_event(self);
        }
        self.now = self.now.max(until);

        info!(total_events = event_count, final_time = ?self.now, "✅ 仿真完成");
        event_count
    }

    /// 运行所有事件直到队列为空。自我重调度的事件需要外部停止条件。
    pub fn run(&mut self, world: &mut dyn World) -> u64 {
        let mut event_count = 0;
        while let Some(item) = self.q.pop() {
            event_count += 1;
            self.now = item.at;
            item.ev.execute(self, world);
            world.after_event(self);
        }
        event_count
    }
}
