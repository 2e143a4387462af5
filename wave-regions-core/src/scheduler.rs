//! Repeating-task abstraction used by autoscroll.
//!
//! Hosts own the clock. The core only asks for a task to be fired every
//! `interval_ms` and later cancels it; firing means calling
//! [`crate::Regions::run_task`] with the task that was scheduled.

use crate::region::RegionId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskHandle(pub u64);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScheduledTask {
    /// Advance the edge autoscroll of one region by one tick.
    Autoscroll { region: RegionId },
}

pub trait TaskScheduler {
    fn schedule_repeating(&mut self, interval_ms: u32, task: ScheduledTask) -> TaskHandle;
    fn cancel(&mut self, handle: TaskHandle);
}

/// Scheduler that records tasks and leaves firing to the caller. Useful for
/// hosts driving their own frame loop, and in tests.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_handle: u64,
    live: Vec<(TaskHandle, u32, ScheduledTask)>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tasks currently scheduled, in scheduling order.
    pub fn live_tasks(&self) -> Vec<ScheduledTask> {
        self.live.iter().map(|(_, _, task)| task.clone()).collect()
    }

    pub fn is_live(&self, handle: TaskHandle) -> bool {
        self.live.iter().any(|(h, _, _)| *h == handle)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

impl TaskScheduler for ManualScheduler {
    fn schedule_repeating(&mut self, interval_ms: u32, task: ScheduledTask) -> TaskHandle {
        self.next_handle += 1;
        let handle = TaskHandle(self.next_handle);
        self.live.push((handle, interval_ms, task));
        handle
    }

    fn cancel(&mut self, handle: TaskHandle) {
        self.live.retain(|(h, _, _)| *h != handle);
    }
}
