use chrono::{DateTime, TimeDelta, Utc};
use core::cell::RefCell;
use core::time::Duration;
use std::rc::Rc;

pub type Callback = Rc<dyn Fn()>;

/// Timer capability handed to a session by its host.
pub trait Scheduler {
    /// Calls `tick` every `period` until stopped, replacing any running loop.
    fn start(&mut self, period: Duration, tick: Callback);

    /// Calls `callback` once after `delay` unless stopped first.
    fn defer(&mut self, delay: Duration, callback: Callback);

    /// Cancels the loop and every deferred callback.
    fn stop(&mut self);

    fn is_running(&self) -> bool;

    fn now(&self) -> DateTime<Utc>;
}

struct Ticker {
    period: Duration,
    next: Duration,
    tick: Callback,
}

#[derive(Default)]
struct Timers {
    origin: DateTime<Utc>,
    elapsed: Duration,
    ticker: Option<Ticker>,
    deferred: Vec<(Duration, Callback)>,
}

/// Scheduler driven by hand, time only moves on [`ManualScheduler::advance`].
///
/// Clones share the same clock, so a test can keep one handle while a session owns another.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    timers: Rc<RefCell<Timers>>,
}

impl ManualScheduler {
    pub fn new(origin: DateTime<Utc>) -> Self {
        let timers = Timers {
            origin,
            ..Default::default()
        };
        Self {
            timers: Rc::new(RefCell::new(timers)),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.timers.borrow().elapsed
    }

    /// Moves the clock forward, firing every tick and deferred callback that falls due in order.
    pub fn advance(&self, by: Duration) {
        let target = self.elapsed() + by;
        while let Some(callback) = self.next_due(target) {
            callback();
        }
        self.timers.borrow_mut().elapsed = target;
    }

    fn next_due(&self, target: Duration) -> Option<Callback> {
        let mut timers = self.timers.borrow_mut();
        let tick_due = timers
            .ticker
            .as_ref()
            .map(|ticker| ticker.next)
            .filter(|&due| due <= target);
        let deferred_due = timers
            .deferred
            .iter()
            .enumerate()
            .min_by_key(|(_, (due, _))| *due)
            .map(|(index, &(due, _))| (index, due))
            .filter(|&(_, due)| due <= target);

        match (tick_due, deferred_due) {
            (_, Some((index, due))) if tick_due.is_none_or(|tick| due <= tick) => {
                timers.elapsed = due;
                Some(timers.deferred.remove(index).1)
            }
            (Some(due), _) => {
                timers.elapsed = due;
                let ticker = timers.ticker.as_mut()?;
                ticker.next += ticker.period;
                Some(ticker.tick.clone())
            }
            _ => None,
        }
    }
}

impl Scheduler for ManualScheduler {
    fn start(&mut self, period: Duration, tick: Callback) {
        let mut timers = self.timers.borrow_mut();
        let period = period.max(Duration::from_millis(1));
        let next = timers.elapsed + period;
        timers.ticker = Some(Ticker { period, next, tick });
    }

    fn defer(&mut self, delay: Duration, callback: Callback) {
        let mut timers = self.timers.borrow_mut();
        let due = timers.elapsed + delay;
        timers.deferred.push((due, callback));
    }

    fn stop(&mut self) {
        let mut timers = self.timers.borrow_mut();
        timers.ticker = None;
        timers.deferred.clear();
    }

    fn is_running(&self) -> bool {
        let timers = self.timers.borrow();
        timers.ticker.is_some() || !timers.deferred.is_empty()
    }

    fn now(&self) -> DateTime<Utc> {
        let timers = self.timers.borrow();
        let elapsed = TimeDelta::from_std(timers.elapsed).unwrap_or_else(|_| TimeDelta::zero());
        timers.origin + elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    fn counter() -> (Rc<Cell<u32>>, Callback) {
        let count = Rc::new(Cell::new(0));
        let inner = count.clone();
        (count, Rc::new(move || inner.set(inner.get() + 1)))
    }

    #[test]
    fn ticks_once_per_period() {
        let mut scheduler = ManualScheduler::default();
        let (count, tick) = counter();
        scheduler.start(Duration::from_millis(100), tick);

        scheduler.advance(Duration::from_millis(350));
        assert_eq!(count.get(), 3);
        assert_eq!(scheduler.elapsed(), Duration::from_millis(350));

        scheduler.stop();
        scheduler.advance(Duration::from_secs(1));
        assert_eq!(count.get(), 3);
        assert!(!scheduler.is_running());
    }

    #[test]
    fn deferred_fires_once() {
        let mut scheduler = ManualScheduler::default();
        let (count, callback) = counter();
        scheduler.defer(Duration::from_secs(1), callback);
        assert!(scheduler.is_running());

        scheduler.advance(Duration::from_millis(999));
        assert_eq!(count.get(), 0);
        scheduler.advance(Duration::from_millis(1));
        assert_eq!(count.get(), 1);
        scheduler.advance(Duration::from_secs(5));
        assert_eq!(count.get(), 1);
        assert!(!scheduler.is_running());
    }

    #[test]
    fn callback_can_stop_the_loop() {
        let mut scheduler = ManualScheduler::default();
        let handle = scheduler.clone();
        let count = Rc::new(Cell::new(0));
        let inner = count.clone();
        scheduler.start(
            Duration::from_millis(10),
            Rc::new(move || {
                inner.set(inner.get() + 1);
                if inner.get() == 2 {
                    handle.clone().stop();
                }
            }),
        );
        scheduler.advance(Duration::from_millis(100));
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn clock_follows_elapsed_time() {
        let origin = DateTime::<Utc>::default();
        let scheduler = ManualScheduler::new(origin);
        scheduler.advance(Duration::from_millis(1500));
        assert_eq!((scheduler.now() - origin).num_milliseconds(), 1500);
    }
}
