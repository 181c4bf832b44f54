use chrono::{DateTime, Utc};
use core::cell::Cell;
use core::time::Duration;
use gamehub_core::{Callback, Scheduler};
use gloo::timers::callback::{Interval, Timeout};
use std::rc::Rc;

/// Scheduler on top of the browser's `setInterval` and `setTimeout`.
///
/// Dropping the handles cancels them, so stopping is just letting go.
#[derive(Default)]
pub struct IntervalScheduler {
    interval: Option<Interval>,
    timeouts: Vec<Timeout>,
    pending: Rc<Cell<usize>>,
}

fn millis(duration: Duration) -> u32 {
    duration.as_millis().try_into().unwrap_or(u32::MAX)
}

impl Scheduler for IntervalScheduler {
    fn start(&mut self, period: Duration, tick: Callback) {
        self.interval = Some(Interval::new(millis(period), move || tick()));
    }

    fn defer(&mut self, delay: Duration, callback: Callback) {
        if self.pending.get() == 0 {
            self.timeouts.clear();
        }
        self.pending.set(self.pending.get() + 1);

        let pending = self.pending.clone();
        let timeout = Timeout::new(millis(delay), move || {
            pending.set(pending.get().saturating_sub(1));
            callback();
        });
        self.timeouts.push(timeout);
    }

    fn stop(&mut self) {
        self.interval = None;
        self.timeouts.clear();
        self.pending.set(0);
    }

    fn is_running(&self) -> bool {
        self.interval.is_some() || self.pending.get() > 0
    }

    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(js_sys::Date::now() as i64).unwrap_or_default()
    }
}
