#![forbid(unsafe_code)]

//! The explicitly-owned registry every coordinator is constructed with.
//!
//! There is no ambient service lookup: the host creates one [`AppContext`]
//! at start, hands it to each component and coordinator constructor, and
//! calls [`AppContext::shutdown`] at the end. The context carries the clock,
//! the timer [`Scheduler`] and the [`RuntimeConfig`].

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::config::RuntimeConfig;
use crate::render::RenderTrigger;
use crate::timer::{Clock, Scheduler, SystemClock};

struct ContextInner {
    scheduler: Scheduler,
    config: RuntimeConfig,
    shut_down: Cell<bool>,
}

/// Shared runtime services. Clones refer to the same context.
#[derive(Clone)]
pub struct AppContext {
    inner: Rc<ContextInner>,
}

impl AppContext {
    /// Context timed by `clock`.
    pub fn new(clock: Rc<dyn Clock>, config: RuntimeConfig) -> Self {
        Self {
            inner: Rc::new(ContextInner {
                scheduler: Scheduler::new(clock),
                config,
                shut_down: Cell::new(false),
            }),
        }
    }

    /// Context on the wall clock with default configuration.
    #[must_use]
    pub fn system() -> Self {
        Self::new(Rc::new(SystemClock::new()), RuntimeConfig::default())
    }

    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.inner.scheduler
    }

    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    /// Current clock time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.inner.scheduler.now()
    }

    /// Fresh render trigger honoring this context's render-pass limit.
    #[must_use]
    pub fn render_trigger(&self) -> RenderTrigger {
        RenderTrigger::with_config(&self.inner.config)
    }

    /// Fire due timers (host event-loop tick).
    pub fn tick(&self) -> usize {
        if self.inner.shut_down.get() {
            return 0;
        }
        self.inner.scheduler.run_due()
    }

    /// Cancel every outstanding timer. Idempotent.
    pub fn shutdown(&self) {
        if self.inner.shut_down.replace(true) {
            return;
        }
        let dropped = self.inner.scheduler.cancel_all();
        tracing::debug!(dropped, "app context shut down");
    }

    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.inner.shut_down.get()
    }
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("scheduler", &self.inner.scheduler)
            .field("config", &self.inner.config)
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::ManualClock;

    #[test]
    fn tick_runs_due_timers() {
        let clock = Rc::new(ManualClock::new());
        let ctx = AppContext::new(clock.clone(), RuntimeConfig::default());
        let hit = Rc::new(Cell::new(false));
        let h = Rc::clone(&hit);
        ctx.scheduler()
            .schedule(Duration::from_millis(10), move || h.set(true));
        clock.advance(Duration::from_millis(10));
        assert_eq!(ctx.tick(), 1);
        assert!(hit.get());
        assert_eq!(ctx.now(), Duration::from_millis(10));
    }

    #[test]
    fn shutdown_cancels_outstanding_timers() {
        let clock = Rc::new(ManualClock::new());
        let ctx = AppContext::new(clock.clone(), RuntimeConfig::default());
        ctx.scheduler().schedule(Duration::from_millis(1), || {});
        ctx.shutdown();
        ctx.shutdown();
        assert!(ctx.is_shut_down());
        assert_eq!(ctx.scheduler().pending_count(), 0);
        clock.advance(Duration::from_millis(5));
        assert_eq!(ctx.tick(), 0);
    }

    #[test]
    fn render_trigger_uses_configured_limit() {
        let config = RuntimeConfig {
            max_render_passes: 2,
            ..RuntimeConfig::default()
        };
        let ctx = AppContext::new(Rc::new(ManualClock::new()), config);
        let trigger = ctx.render_trigger();
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let t = trigger.clone();
        let _hook = trigger.on_any_state_change(move || {
            c.set(c.get() + 1);
            t.notify();
        });
        trigger.notify();
        assert_eq!(count.get(), 2);
        assert_eq!(ctx.config().max_render_passes, 2);
    }

    #[test]
    fn system_context_starts_running() {
        let ctx = AppContext::system();
        assert!(!ctx.is_shut_down());
        assert_eq!(ctx.tick(), 0);
    }
}
