#![forbid(unsafe_code)]

//! Clock abstraction and single-threaded timer queue.
//!
//! Timers are the only deferred work in Weave. The [`Scheduler`] does not own
//! a thread: the host (an event loop, or the test harness advancing virtual
//! time) calls [`Scheduler::run_due`] and due callbacks run on the caller's
//! thread.
//!
//! # Invariants
//!
//! 1. Due timers fire in deadline order; equal deadlines fire in scheduling order.
//! 2. A timer is removed from the queue before its callback runs, so the
//!    callback may schedule or cancel other timers.
//! 3. Cancelling a timer that already fired or was cancelled returns `false`.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use web_time::Instant;

/// Monotonic time source.
pub trait Clock {
    /// Time elapsed since the clock's origin.
    fn now(&self) -> Duration;
}

/// Wall clock measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Virtual clock moved explicitly by tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move forward by `by`.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Jump to `to`. Moving backwards is ignored.
    pub fn set(&self, to: Duration) {
        if to > self.now.get() {
            self.now.set(to);
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

impl TimerHandle {
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

type TimerCallback = Box<dyn FnOnce()>;

struct SchedulerInner {
    clock: Rc<dyn Clock>,
    queue: RefCell<BTreeMap<(Duration, u64), TimerCallback>>,
    next_id: Cell<u64>,
    fired: Cell<u64>,
}

/// Timer queue bound to a [`Clock`]. Clones share the queue.
#[derive(Clone)]
pub struct Scheduler {
    inner: Rc<SchedulerInner>,
}

impl Scheduler {
    /// Create a scheduler reading time from `clock`.
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            inner: Rc::new(SchedulerInner {
                clock,
                queue: RefCell::new(BTreeMap::new()),
                next_id: Cell::new(1),
                fired: Cell::new(0),
            }),
        }
    }

    /// Current clock time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.inner.clock.now()
    }

    /// The clock this scheduler reads.
    #[must_use]
    pub fn clock(&self) -> Rc<dyn Clock> {
        Rc::clone(&self.inner.clock)
    }

    /// Run `callback` once `delay` has elapsed.
    pub fn schedule(&self, delay: Duration, callback: impl FnOnce() + 'static) -> TimerHandle {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        let deadline = self.now() + delay;
        self.inner
            .queue
            .borrow_mut()
            .insert((deadline, id), Box::new(callback));
        tracing::trace!(timer = id, ?deadline, "timer scheduled");
        TimerHandle(id)
    }

    /// Cancel a pending timer. Returns whether it was still pending.
    pub fn cancel(&self, handle: TimerHandle) -> bool {
        let mut queue = self.inner.queue.borrow_mut();
        let key = queue.keys().find(|(_, id)| *id == handle.0).copied();
        match key {
            Some(key) => {
                queue.remove(&key);
                tracing::trace!(timer = handle.0, "timer cancelled");
                true
            }
            None => false,
        }
    }

    /// Whether `handle` is still queued.
    #[must_use]
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.inner
            .queue
            .borrow()
            .keys()
            .any(|(_, id)| *id == handle.0)
    }

    /// Fire every timer whose deadline is at or before now. Returns how many fired.
    pub fn run_due(&self) -> usize {
        let mut count = 0;
        loop {
            let now = self.now();
            let next = {
                let mut queue = self.inner.queue.borrow_mut();
                match queue.first_key_value() {
                    Some((&(deadline, _), _)) if deadline <= now => queue.pop_first(),
                    _ => None,
                }
            };
            let Some(((_, id), callback)) = next else {
                break;
            };
            tracing::trace!(timer = id, "timer fired");
            callback();
            count += 1;
        }
        self.inner.fired.set(self.inner.fired.get() + count as u64);
        count
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.inner
            .queue
            .borrow()
            .first_key_value()
            .map(|(&(deadline, _), _)| deadline)
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.queue.borrow().len()
    }

    /// Total callbacks fired so far.
    #[must_use]
    pub fn fired_count(&self) -> u64 {
        self.inner.fired.get()
    }

    /// Drop every pending timer without running it.
    pub fn cancel_all(&self) -> usize {
        let dropped = std::mem::take(&mut *self.inner.queue.borrow_mut());
        dropped.len()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("now", &self.now())
            .field("pending", &self.pending_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manual() -> (Rc<ManualClock>, Scheduler) {
        let clock = Rc::new(ManualClock::new());
        let sched = Scheduler::new(clock.clone());
        (clock, sched)
    }

    #[test]
    fn fires_only_when_due() {
        let (clock, sched) = manual();
        let fired = Rc::new(Cell::new(false));
        let f = Rc::clone(&fired);
        sched.schedule(Duration::from_millis(200), move || f.set(true));

        clock.advance(Duration::from_millis(199));
        assert_eq!(sched.run_due(), 0);
        assert!(!fired.get());

        clock.advance(Duration::from_millis(1));
        assert_eq!(sched.run_due(), 1);
        assert!(fired.get());
        assert_eq!(sched.pending_count(), 0);
    }

    #[test]
    fn deadline_then_schedule_order() {
        let (clock, sched) = manual();
        let log = Rc::new(RefCell::new(Vec::new()));
        for (name, ms) in [("b", 20), ("a", 10), ("c", 20)] {
            let log = Rc::clone(&log);
            sched.schedule(Duration::from_millis(ms), move || log.borrow_mut().push(name));
        }
        clock.advance(Duration::from_millis(50));
        sched.run_due();
        assert_eq!(*log.borrow(), ["a", "b", "c"]);
    }

    #[test]
    fn cancel_prevents_firing() {
        let (clock, sched) = manual();
        let fired = Rc::new(Cell::new(false));
        let f = Rc::clone(&fired);
        let handle = sched.schedule(Duration::from_millis(5), move || f.set(true));
        assert!(sched.is_pending(handle));
        assert!(sched.cancel(handle));
        assert!(!sched.cancel(handle));

        clock.advance(Duration::from_millis(10));
        sched.run_due();
        assert!(!fired.get());
    }

    #[test]
    fn callback_can_schedule_more_work() {
        let (clock, sched) = manual();
        let hits = Rc::new(Cell::new(0));
        let inner_sched = sched.clone();
        let h = Rc::clone(&hits);
        sched.schedule(Duration::ZERO, move || {
            h.set(h.get() + 1);
            let h2 = Rc::clone(&h);
            inner_sched.schedule(Duration::ZERO, move || h2.set(h2.get() + 1));
        });
        clock.advance(Duration::from_millis(1));
        assert_eq!(sched.run_due(), 2);
        assert_eq!(hits.get(), 2);
        assert_eq!(sched.fired_count(), 2);
    }

    #[test]
    fn next_deadline_and_cancel_all() {
        let (_clock, sched) = manual();
        assert_eq!(sched.next_deadline(), None);
        sched.schedule(Duration::from_millis(30), || {});
        sched.schedule(Duration::from_millis(10), || {});
        assert_eq!(sched.next_deadline(), Some(Duration::from_millis(10)));
        assert_eq!(sched.cancel_all(), 2);
        assert_eq!(sched.pending_count(), 0);
    }

    #[test]
    fn manual_clock_never_goes_backwards() {
        let clock = ManualClock::new();
        clock.set(Duration::from_secs(2));
        clock.set(Duration::from_secs(1));
        assert_eq!(clock.now(), Duration::from_secs(2));
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
