use std::collections::HashMap;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wave_regions_core::scheduler::{ScheduledTask, TaskHandle, TaskScheduler};

struct Interval {
    id: i32,
    callback: Closure<dyn FnMut()>,
}

/// `setInterval`-backed scheduler. Ticks call back into the installed
/// runtime through [`crate::state::run_task`].
#[derive(Default)]
pub struct IntervalScheduler {
    next_handle: u64,
    live: HashMap<TaskHandle, Interval>,
    /// Callbacks of cancelled intervals. A task usually cancels itself from
    /// inside its own tick, so its closure is freed on the next schedule.
    retired: Vec<Closure<dyn FnMut()>>,
}

impl IntervalScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskScheduler for IntervalScheduler {
    fn schedule_repeating(&mut self, interval_ms: u32, task: ScheduledTask) -> TaskHandle {
        self.retired.clear();
        self.next_handle += 1;
        let handle = TaskHandle(self.next_handle);

        let Some(window) = web_sys::window() else {
            log::error!("no window, cannot schedule {task:?}");
            return handle;
        };
        let callback = Closure::<dyn FnMut()>::new(move || crate::state::run_task(&task));
        match window.set_interval_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            interval_ms as i32,
        ) {
            Ok(id) => {
                self.live.insert(handle, Interval { id, callback });
            }
            Err(e) => log::error!("setInterval failed: {:?}", e),
        }
        handle
    }

    fn cancel(&mut self, handle: TaskHandle) {
        let Some(interval) = self.live.remove(&handle) else { return };
        if let Some(window) = web_sys::window() {
            window.clear_interval_with_handle(interval.id);
        }
        self.retired.push(interval.callback);
    }
}

impl Drop for IntervalScheduler {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            for interval in self.live.values() {
                window.clear_interval_with_handle(interval.id);
            }
        }
    }
}
