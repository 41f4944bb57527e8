#![forbid(unsafe_code)]

//! Virtual-time test context.

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use weave_core::Result;
use weave_runtime::{AppContext, ManualClock, RuntimeConfig};
use weave_widgets::Component;

use crate::rendered::RenderedComponent;

/// Owns a [`ManualClock`] and an [`AppContext`] timed by it.
///
/// Time only moves through [`advance`](TestContext::advance); timers fire at
/// their own deadlines, in order, so chained timers behave as they would on
/// a wall clock. Dropping the context shuts it down.
pub struct TestContext {
    clock: Rc<ManualClock>,
    app: AppContext,
}

impl TestContext {
    /// Context with default runtime configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    #[must_use]
    pub fn with_config(config: RuntimeConfig) -> Self {
        let clock = Rc::new(ManualClock::new());
        let app = AppContext::new(clock.clone(), config);
        Self { clock, app }
    }

    #[must_use]
    pub fn app(&self) -> &AppContext {
        &self.app
    }

    #[must_use]
    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    /// Virtual time since the context was created.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.app.now()
    }

    /// Mount `component`.
    pub fn render<C: Component + Clone + 'static>(&self, component: C) -> RenderedComponent<C> {
        RenderedComponent::mount(component, &self.app)
    }

    /// Build a component against this context and mount it.
    pub fn render_with<C, F>(&self, build: F) -> Result<RenderedComponent<C>>
    where
        C: Component + Clone + 'static,
        F: FnOnce(&AppContext) -> Result<C>,
    {
        Ok(self.render(build(&self.app)?))
    }

    /// Move virtual time forward by `by`, firing due timers. Returns how many fired.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now() + by;
        let mut fired = 0;
        while let Some(deadline) = self.app.scheduler().next_deadline() {
            if deadline > target {
                break;
            }
            self.clock.set(deadline);
            let n = self.app.tick();
            if n == 0 {
                // Shut down: the queue will not drain.
                break;
            }
            fired += n;
        }
        self.clock.set(target);
        tracing::trace!(now = ?target, fired, "advanced");
        fired
    }

    pub fn advance_ms(&self, ms: u64) -> usize {
        self.advance(Duration::from_millis(ms))
    }

    /// Timers waiting to fire.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.app.scheduler().pending_count()
    }

    /// Cancel every outstanding timer. Idempotent.
    pub fn shutdown(&self) {
        self.app.shutdown();
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for TestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestContext")
            .field("now", &self.now())
            .field("pending_timers", &self.pending_timers())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn chained_timers_fire_at_their_deadlines() {
        let ctx = TestContext::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let scheduler = ctx.app().scheduler().clone();
        let (l, s) = (log.clone(), scheduler.clone());
        scheduler.schedule(Duration::from_millis(100), move || {
            l.borrow_mut().push(("first", s.now()));
            let l2 = l.clone();
            let s2 = s.clone();
            s.schedule(Duration::from_millis(50), move || {
                l2.borrow_mut().push(("second", s2.now()));
            });
        });

        assert_eq!(ctx.advance_ms(99), 0);
        assert_eq!(ctx.advance_ms(40), 1);
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(ctx.advance_ms(1000), 1);
        assert_eq!(
            *log.borrow(),
            [("first", Duration::from_millis(100)), ("second", Duration::from_millis(150))]
        );
        assert_eq!(ctx.now(), Duration::from_millis(1139));
    }

    #[test]
    fn shutdown_drops_timers() {
        let ctx = TestContext::new();
        ctx.app().scheduler().schedule(Duration::from_millis(10), || {});
        assert_eq!(ctx.pending_timers(), 1);
        ctx.shutdown();
        assert_eq!(ctx.pending_timers(), 0);
        assert_eq!(ctx.advance_ms(20), 0);
    }
}
