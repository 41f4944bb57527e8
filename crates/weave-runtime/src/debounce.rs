#![forbid(unsafe_code)]

//! Debounced commit of rapid input into a target cell.
//!
//! A text input pushes every keystroke; only the value present once the
//! input has been quiet for `interval` is written to the bound cell.
//!
//! # Invariants
//!
//! 1. Last value wins: a push while a commit is pending replaces the pending
//!    value and restarts the interval. Intermediate values are never committed.
//! 2. A zero interval commits synchronously inside [`Debouncer::push`]; no timer is used.
//! 3. After [`Debouncer::dispose`] (or drop) no write reaches the target, even
//!    from a timer that was already scheduled.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::reactive::Observable;
use crate::timer::{Scheduler, TimerHandle};

struct DebounceInner<T> {
    target: Observable<T>,
    interval: Cell<Duration>,
    scheduler: Scheduler,
    pending: RefCell<Option<T>>,
    timer: Cell<Option<TimerHandle>>,
    disposed: Cell<bool>,
    commits: Cell<u64>,
}

impl<T: Clone + PartialEq + 'static> DebounceInner<T> {
    fn cancel_timer(&self) {
        if let Some(handle) = self.timer.take() {
            self.scheduler.cancel(handle);
        }
    }

    fn commit(&self) {
        if self.disposed.get() {
            tracing::trace!("commit on disposed debouncer ignored");
            return;
        }
        let value = self.pending.borrow_mut().take();
        if let Some(value) = value {
            self.commits.set(self.commits.get() + 1);
            self.target.set(value);
        }
    }
}

/// Buffers pushed values and commits the latest one to a target cell.
pub struct Debouncer<T: Clone + PartialEq + 'static> {
    inner: Rc<DebounceInner<T>>,
}

impl<T: Clone + PartialEq + 'static> Debouncer<T> {
    /// Debounce writes into `target` by `interval`, timing with `scheduler`.
    pub fn new(target: &Observable<T>, interval: Duration, scheduler: &Scheduler) -> Self {
        Self {
            inner: Rc::new(DebounceInner {
                target: target.clone(),
                interval: Cell::new(interval),
                scheduler: scheduler.clone(),
                pending: RefCell::new(None),
                timer: Cell::new(None),
                disposed: Cell::new(false),
                commits: Cell::new(0),
            }),
        }
    }

    /// Buffer `value`, restarting the quiet period.
    pub fn push(&self, value: T) {
        let inner = &self.inner;
        if inner.disposed.get() {
            tracing::trace!("push on disposed debouncer dropped");
            return;
        }
        inner.cancel_timer();
        *inner.pending.borrow_mut() = Some(value);

        let interval = inner.interval.get();
        if interval.is_zero() {
            inner.commit();
            return;
        }
        let weak: Weak<DebounceInner<T>> = Rc::downgrade(inner);
        let handle = inner.scheduler.schedule(interval, move || {
            if let Some(inner) = weak.upgrade() {
                inner.timer.set(None);
                inner.commit();
            }
        });
        inner.timer.set(Some(handle));
    }

    /// Commit the pending value now.
    pub fn flush(&self) {
        self.inner.cancel_timer();
        self.inner.commit();
    }

    /// Discard the pending value without committing it.
    pub fn cancel(&self) {
        self.inner.cancel_timer();
        self.inner.pending.borrow_mut().take();
    }

    /// Change the quiet period. Applies from the next push.
    pub fn set_interval(&self, interval: Duration) {
        self.inner.interval.set(interval);
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.inner.interval.get()
    }

    /// Value waiting to be committed.
    #[must_use]
    pub fn pending(&self) -> Option<T> {
        self.inner.pending.borrow().clone()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.inner.pending.borrow().is_some()
    }

    /// Number of values written to the target.
    #[must_use]
    pub fn commit_count(&self) -> u64 {
        self.inner.commits.get()
    }

    /// Cancel the timer, drop the buffer and ignore further pushes.
    pub fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }
        self.inner.cancel_timer();
        self.inner.pending.borrow_mut().take();
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }
}

impl<T: Clone + PartialEq + 'static> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> fmt::Debug for Debouncer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debouncer")
            .field("interval", &self.interval())
            .field("pending", &self.pending())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
