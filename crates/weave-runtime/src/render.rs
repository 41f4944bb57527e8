#![forbid(unsafe_code)]

//! Synchronous re-render trigger for a mounted component tree.
//!
//! Every state cell a tree depends on is [`watch`](RenderTrigger::watch)ed;
//! a change to any of them runs the registered render hooks before the
//! mutating call returns. There is no batching: a click that changes three
//! cells renders three times, and the test observing the output right after
//! the click sees the final state.
//!
//! # Invariants
//!
//! 1. Hooks never run re-entrantly. A notification arriving while hooks are
//!    running marks the tree dirty, and one more pass runs after the current
//!    one, still inside the outermost [`notify`](RenderTrigger::notify).
//! 2. At most `max_passes` passes run per outermost notification; exceeding
//!    it logs a warning and drops the remaining dirty flag.
//! 3. After [`dispose`](RenderTrigger::dispose) notifications are ignored.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::config::RuntimeConfig;
use crate::reactive::{Observable, Subscription};

type Hook = Rc<dyn Fn()>;

struct TriggerInner {
    hooks: RefCell<Vec<(u64, Hook)>>,
    next_id: Cell<u64>,
    rendering: Cell<bool>,
    dirty: Cell<bool>,
    renders: Cell<u64>,
    max_passes: u32,
    disposed: Cell<bool>,
}

/// Runs render hooks whenever a watched cell changes. Clones share hooks.
#[derive(Clone)]
pub struct RenderTrigger {
    inner: Rc<TriggerInner>,
}

impl Default for RenderTrigger {
    fn default() -> Self {
        Self::new(RuntimeConfig::default().max_render_passes)
    }
}

impl RenderTrigger {
    /// Create a trigger allowing up to `max_passes` passes per notification.
    #[must_use]
    pub fn new(max_passes: u32) -> Self {
        Self {
            inner: Rc::new(TriggerInner {
                hooks: RefCell::new(Vec::new()),
                next_id: Cell::new(1),
                rendering: Cell::new(false),
                dirty: Cell::new(false),
                renders: Cell::new(0),
                max_passes: max_passes.max(1),
                disposed: Cell::new(false),
            }),
        }
    }

    /// Trigger configured from `config`.
    #[must_use]
    pub fn with_config(config: &RuntimeConfig) -> Self {
        Self::new(config.max_render_passes)
    }

    /// Register a render callback; it stays registered while the hook lives.
    pub fn on_any_state_change(&self, callback: impl Fn() + 'static) -> RenderHook {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner
            .hooks
            .borrow_mut()
            .push((id, Rc::new(callback)));
        RenderHook {
            trigger: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Re-render whenever `cell` changes.
    pub fn watch<T: Clone + PartialEq + 'static>(&self, cell: &Observable<T>) -> Subscription {
        let trigger = Rc::downgrade(&self.inner);
        cell.subscribe(move |_| {
            if let Some(inner) = trigger.upgrade() {
                Self { inner }.notify();
            }
        })
    }

    /// Run every hook now (or mark dirty if a pass is already running).
    pub fn notify(&self) {
        let inner = &self.inner;
        if inner.disposed.get() {
            tracing::trace!("notify on disposed render trigger ignored");
            return;
        }
        if inner.rendering.get() {
            inner.dirty.set(true);
            return;
        }
        inner.rendering.set(true);
        let _reset = ResetOnDrop(&inner.rendering);

        let mut passes = 0;
        loop {
            inner.dirty.set(false);
            let hooks: Vec<Hook> = inner
                .hooks
                .borrow()
                .iter()
                .map(|(_, h)| Rc::clone(h))
                .collect();
            for hook in hooks {
                hook();
            }
            inner.renders.set(inner.renders.get() + 1);
            passes += 1;
            if !inner.dirty.get() {
                break;
            }
            if passes >= inner.max_passes {
                tracing::warn!(
                    passes,
                    "render passes exhausted; state is still changing during render"
                );
                inner.dirty.set(false);
                break;
            }
        }
    }

    /// Completed render passes.
    #[must_use]
    pub fn render_count(&self) -> u64 {
        self.inner.renders.get()
    }

    #[must_use]
    pub fn hook_count(&self) -> usize {
        self.inner.hooks.borrow().len()
    }

    /// Drop all hooks and ignore further notifications.
    pub fn dispose(&self) {
        self.inner.disposed.set(true);
        self.inner.hooks.borrow_mut().clear();
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }
}

impl fmt::Debug for RenderTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderTrigger")
            .field("hooks", &self.hook_count())
            .field("renders", &self.render_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

struct ResetOnDrop<'a>(&'a Cell<bool>);

impl Drop for ResetOnDrop<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Registration returned by [`RenderTrigger::on_any_state_change`]. Dropping it
/// removes the hook.
#[must_use = "dropping a RenderHook unregisters it"]
pub struct RenderHook {
    trigger: Weak<TriggerInner>,
    id: u64,
}

impl Drop for RenderHook {
    fn drop(&mut self) {
        if let Some(inner) = self.trigger.upgrade() {
            inner.hooks.borrow_mut().retain(|(id, _)| *id != self.id);
        }
    }
}

impl fmt::Debug for RenderHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderHook").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watched_change_renders_synchronously() {
        let trigger = RenderTrigger::default();
        let cell = Observable::new(0);
        let seen = Rc::new(Cell::new(-1));
        let (c, s) = (cell.clone(), Rc::clone(&seen));
        let _hook = trigger.on_any_state_change(move || s.set(c.get()));
        let _watch = trigger.watch(&cell);

        cell.set(3);
        assert_eq!(seen.get(), 3);
        assert_eq!(trigger.render_count(), 1);

        cell.set(3);
        assert_eq!(trigger.render_count(), 1, "no change, no render");
    }

    #[test]
    fn each_mutation_renders_once() {
        let trigger = RenderTrigger::default();
        let a = Observable::new(0);
        let b = Observable::new(0);
        let _hook = trigger.on_any_state_change(|| {});
        let _wa = trigger.watch(&a);
        let _wb = trigger.watch(&b);
        a.set(1);
        b.set(1);
        assert_eq!(trigger.render_count(), 2);
    }

    #[test]
    fn mutation_during_render_reruns_without_reentrancy() {
        let trigger = RenderTrigger::default();
        let cell = Observable::new(0);
        let depth = Rc::new(Cell::new(0));
        let max_depth = Rc::new(Cell::new(0));
        let (c, d, m) = (cell.clone(), Rc::clone(&depth), Rc::clone(&max_depth));
        let _hook = trigger.on_any_state_change(move || {
            d.set(d.get() + 1);
            m.set(m.get().max(d.get()));
            if c.get() < 3 {
                c.set(c.get() + 1);
            }
            d.set(d.get() - 1);
        });
        let _watch = trigger.watch(&cell);

        cell.set(1);
        assert_eq!(cell.get(), 3);
        assert_eq!(max_depth.get(), 1, "hooks must never nest");
        assert_eq!(trigger.render_count(), 3);
    }

    #[test]
    fn runaway_render_is_capped() {
        let trigger = RenderTrigger::new(4);
        let cell = Observable::new(0u32);
        let c = cell.clone();
        let _hook = trigger.on_any_state_change(move || c.set(c.get() + 1));
        let _watch = trigger.watch(&cell);

        trigger.notify();
        assert_eq!(trigger.render_count(), 4);
        assert_eq!(cell.get(), 4);
    }

    #[test]
    fn dropping_hook_unregisters() {
        let trigger = RenderTrigger::default();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let hook = trigger.on_any_state_change(move || h.set(h.get() + 1));
        trigger.notify();
        drop(hook);
        trigger.notify();
        assert_eq!(hits.get(), 1);
        assert_eq!(trigger.hook_count(), 0);
    }

    #[test]
    fn disposed_trigger_ignores_notify() {
        let trigger = RenderTrigger::default();
        let cell = Observable::new(0);
        let _watch = trigger.watch(&cell);
        let _hook = trigger.on_any_state_change(|| {});
        trigger.dispose();
        cell.set(1);
        assert_eq!(trigger.render_count(), 0);
        assert!(trigger.is_disposed());
    }
}
