#![forbid(unsafe_code)]

//! Open/closed state for menus, popovers and expansion panels.
//!
//! ```text
//!            open()                      outside [auto_close]
//!   Closed ---------> Open    Open -----------------------------> Closed
//!          <---------         Open --- outside [!auto_close] ---> Open
//!            close()
//! ```
//!
//! # Invariants
//!
//! - Within one [`ExclusiveGroup`], at most one member is open after any
//!   [`Disclosure::open`]: siblings are closed before the opening member
//!   changes state.
//! - `close()` on a closed disclosure is a no-op (no notification, no render).
//! - `opened_at` is recorded on each Closed → Open transition.
//!
//! # Failure Modes
//!
//! - Any call after [`Disclosure::dispose`] is a silent no-op.
//! - Members dropped without `dispose` are pruned from their group lazily.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Deserialize;
use weave_runtime::{AppContext, Clock, Observable, Subscription};

use crate::group::Group;

static DISCLOSURE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a disclosure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisclosureId(u64);

impl DisclosureId {
    fn next() -> Self {
        Self(DISCLOSURE_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// The two states of a disclosure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisclosureState {
    Closed,
    Open,
}

/// Construction options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct DisclosureConfig {
    /// Close on outside interaction.
    pub auto_close: bool,
    /// Start in [`DisclosureState::Open`].
    pub initially_open: bool,
}

impl DisclosureConfig {
    #[must_use]
    pub fn auto_close(mut self, auto_close: bool) -> Self {
        self.auto_close = auto_close;
        self
    }

    #[must_use]
    pub fn initially_open(mut self, open: bool) -> Self {
        self.initially_open = open;
        self
    }
}

struct DisclosureInner {
    id: DisclosureId,
    open: Observable<bool>,
    auto_close: Cell<bool>,
    opened_at: Cell<Option<Duration>>,
    group: RefCell<Option<ExclusiveGroup>>,
    clock: Rc<dyn Clock>,
    disposed: Cell<bool>,
}

/// A shown/hidden widget state. Clones share state.
#[derive(Clone)]
pub struct Disclosure {
    inner: Rc<DisclosureInner>,
}

impl Disclosure {
    /// Create a disclosure timed by `ctx`'s clock.
    #[must_use]
    pub fn new(config: DisclosureConfig, ctx: &AppContext) -> Self {
        let clock = ctx.scheduler().clock();
        let opened_at = config.initially_open.then(|| clock.now());
        Self {
            inner: Rc::new(DisclosureInner {
                id: DisclosureId::next(),
                open: Observable::new(config.initially_open),
                auto_close: Cell::new(config.auto_close),
                opened_at: Cell::new(opened_at),
                group: RefCell::new(None),
                clock,
                disposed: Cell::new(false),
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> DisclosureId {
        self.inner.id
    }

    #[must_use]
    pub fn state(&self) -> DisclosureState {
        if self.is_open() {
            DisclosureState::Open
        } else {
            DisclosureState::Closed
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.inner.open.get()
    }

    /// Clock time of the most recent Closed → Open transition.
    #[must_use]
    pub fn opened_at(&self) -> Option<Duration> {
        self.inner.opened_at.get()
    }

    #[must_use]
    pub fn auto_close(&self) -> bool {
        self.inner.auto_close.get()
    }

    pub fn set_auto_close(&self, auto_close: bool) {
        self.inner.auto_close.set(auto_close);
    }

    /// Open, closing every other member of the exclusive group first.
    pub fn open(&self) {
        if self.inner.disposed.get() {
            tracing::trace!(id = self.inner.id.0, "open on disposed disclosure ignored");
            return;
        }
        let group = self.inner.group.borrow().clone();
        if let Some(group) = group {
            group.close_except(self.inner.id);
        }
        if !self.is_open() {
            self.inner.opened_at.set(Some(self.inner.clock.now()));
            tracing::debug!(id = self.inner.id.0, "disclosure opened");
        }
        self.inner.open.set(true);
    }

    /// Close. Idempotent.
    pub fn close(&self) {
        if self.inner.disposed.get() {
            tracing::trace!(id = self.inner.id.0, "close on disposed disclosure ignored");
            return;
        }
        if self.is_open() {
            tracing::debug!(id = self.inner.id.0, "disclosure closed");
        }
        self.inner.open.set(false);
    }

    /// Flip between open and closed.
    pub fn toggle_open(&self) {
        if self.is_open() {
            self.close();
        } else {
            self.open();
        }
    }

    /// React to a click or focus outside the widget. Returns whether it closed.
    pub fn handle_outside_interaction(&self) -> bool {
        if self.auto_close() && self.is_open() {
            self.close();
            return true;
        }
        false
    }

    /// Join `group`, leaving any previous group. If this disclosure is open,
    /// the other members are closed so the group keeps at most one open.
    ///
    /// Re-joining the current group is a no-op returning `false`; the member
    /// keeps its position and state.
    pub fn join(&self, group: &ExclusiveGroup) -> bool {
        let current = self.inner.group.borrow().as_ref().is_some_and(|g| g.ptr_eq(group));
        if current {
            tracing::trace!(id = self.inner.id.0, "join on current group ignored");
            return false;
        }
        self.leave_group();
        let added = group.register(self);
        *self.inner.group.borrow_mut() = Some(group.clone());
        if self.is_open() {
            group.close_except(self.inner.id);
        }
        added
    }

    /// Leave the current exclusive group, if any.
    pub fn leave_group(&self) {
        let previous = self.inner.group.borrow_mut().take();
        if let Some(group) = previous {
            group.unregister(self.inner.id);
        }
    }

    #[must_use]
    pub fn group(&self) -> Option<ExclusiveGroup> {
        self.inner.group.borrow().clone()
    }

    /// Notified with the new open flag on every change.
    pub fn subscribe(&self, callback: impl Fn(&bool) + 'static) -> Subscription {
        self.inner.open.subscribe(callback)
    }

    /// Underlying cell, for render triggers and bindings.
    #[must_use]
    pub fn observable(&self) -> &Observable<bool> {
        &self.inner.open
    }

    /// Leave the group and ignore every later call.
    pub fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }
        self.leave_group();
        self.inner.open.dispose();
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }
}

impl PartialEq for Disclosure {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl fmt::Debug for Disclosure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disclosure")
            .field("id", &self.inner.id.0)
            .field("state", &self.state())
            .field("auto_close", &self.auto_close())
            .finish()
    }
}

/// Weak membership entry; equality is by disclosure id.
#[derive(Clone)]
struct Member {
    id: DisclosureId,
    handle: Weak<DisclosureInner>,
}

impl PartialEq for Member {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Set of disclosures where opening one closes the others.
#[derive(Clone, Default)]
pub struct ExclusiveGroup {
    members: Rc<RefCell<Group<Member>>>,
}

impl ExclusiveGroup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&self, disclosure: &Disclosure) -> bool {
        self.members.borrow_mut().register(Member {
            id: disclosure.inner.id,
            handle: Rc::downgrade(&disclosure.inner),
        })
    }

    fn unregister(&self, id: DisclosureId) {
        self.members.borrow_mut().retain(|m| m.id != id);
    }

    /// Live members in registration order.
    #[must_use]
    pub fn members(&self) -> Vec<Disclosure> {
        let mut members = self.members.borrow_mut();
        members.retain(|m| m.handle.strong_count() > 0);
        members
            .iter()
            .filter_map(|m| m.handle.upgrade())
            .map(|inner| Disclosure { inner })
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registration index of the open member.
    #[must_use]
    pub fn open_index(&self) -> Option<usize> {
        self.members().iter().position(Disclosure::is_open)
    }

    /// Number of open members.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.members().iter().filter(|d| d.is_open()).count()
    }

    /// Whether two handles refer to the same group.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.members, &other.members)
    }

    /// Close every member.
    pub fn close_all(&self) {
        for member in self.members() {
            member.close();
        }
    }

    fn close_except(&self, keep: DisclosureId) {
        for member in self.members() {
            if member.inner.id != keep {
                member.close();
            }
        }
    }
}

impl fmt::Debug for ExclusiveGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExclusiveGroup")
            .field("members", &self.len())
            .field("open_index", &self.open_index())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use weave_runtime::{ManualClock, RuntimeConfig};

    fn ctx() -> (Rc<ManualClock>, AppContext) {
        let clock = Rc::new(ManualClock::new());
        let ctx = AppContext::new(clock.clone(), RuntimeConfig::default());
        (clock, ctx)
    }

    #[test]
    fn auto_close_outside_interaction_closes() {
        let (_clock, ctx) = ctx();
        let d = Disclosure::new(DisclosureConfig::default().auto_close(true), &ctx);
        assert_eq!(d.state(), DisclosureState::Closed);
        d.open();
        assert_eq!(d.state(), DisclosureState::Open);
        assert!(d.handle_outside_interaction());
        assert_eq!(d.state(), DisclosureState::Closed);
    }

    #[test]
    fn without_auto_close_outside_interaction_is_noop() {
        let (_clock, ctx) = ctx();
        let d = Disclosure::new(DisclosureConfig::default(), &ctx);
        d.open();
        assert!(!d.handle_outside_interaction());
        assert_eq!(d.state(), DisclosureState::Open);
    }

    #[test]
    fn initially_open() {
        let (_clock, ctx) = ctx();
        let d = Disclosure::new(DisclosureConfig::default().initially_open(true), &ctx);
        assert!(d.is_open());
        assert_eq!(d.opened_at(), Some(Duration::ZERO));
    }

    #[test]
    fn close_is_idempotent() {
        let (_clock, ctx) = ctx();
        let d = Disclosure::new(DisclosureConfig::default(), &ctx);
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let _sub = d.subscribe(move |_| h.set(h.get() + 1));
        d.close();
        d.close();
        assert_eq!(hits.get(), 0);
        d.toggle_open();
        d.toggle_open();
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn opened_at_tracks_transition() {
        let (clock, ctx) = ctx();
        let d = Disclosure::new(DisclosureConfig::default(), &ctx);
        assert_eq!(d.opened_at(), None);
        clock.advance(Duration::from_millis(40));
        d.open();
        clock.advance(Duration::from_millis(10));
        d.open();
        assert_eq!(d.opened_at(), Some(Duration::from_millis(40)));
    }

    #[test]
    fn exclusive_group_closes_siblings_first() {
        let (_clock, ctx) = ctx();
        let group = ExclusiveGroup::new();
        let panels: Vec<_> = (0..3)
            .map(|_| Disclosure::new(DisclosureConfig::default(), &ctx))
            .collect();
        for p in &panels {
            assert!(p.join(&group));
        }
        assert!(!panels[0].join(&group), "re-joining is idempotent");

        let order = Rc::new(RefCell::new(Vec::new()));
        let subs: Vec<_> = panels
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let order = Rc::clone(&order);
                p.subscribe(move |open| order.borrow_mut().push((i, *open)))
            })
            .collect();

        panels[0].open();
        panels[2].open();
        assert_eq!(group.open_index(), Some(2));
        assert_eq!(
            *order.borrow(),
            [(0, true), (0, false), (2, true)],
            "sibling closes before the new member opens"
        );
        drop(subs);
    }

    #[test]
    fn rejoining_keeps_position_and_state() {
        let (clock, ctx) = ctx();
        let group = ExclusiveGroup::new();
        let a = Disclosure::new(DisclosureConfig::default(), &ctx);
        let b = Disclosure::new(DisclosureConfig::default(), &ctx);
        assert!(a.join(&group));
        assert!(b.join(&group));
        clock.advance(Duration::from_millis(25));
        a.open();

        assert!(!a.join(&group));
        assert!(!a.join(&group.clone()), "clones are the same group");
        let order: Vec<_> = group.members().iter().map(Disclosure::id).collect();
        assert_eq!(order, [a.id(), b.id()]);
        assert_eq!(group.open_index(), Some(0));
        assert!(a.is_open());
        assert_eq!(a.opened_at(), Some(Duration::from_millis(25)));
    }

    #[test]
    fn joining_another_group_moves_membership() {
        let (_clock, ctx) = ctx();
        let first = ExclusiveGroup::new();
        let second = ExclusiveGroup::new();
        let a = Disclosure::new(DisclosureConfig::default(), &ctx);
        assert!(a.join(&first));
        assert!(a.join(&second));
        assert!(first.is_empty());
        assert_eq!(second.len(), 1);
        assert!(a.group().is_some_and(|g| g.ptr_eq(&second)));
        assert!(!first.ptr_eq(&second));
    }

    #[test]
    fn joining_open_member_keeps_single_open() {
        let (_clock, ctx) = ctx();
        let group = ExclusiveGroup::new();
        let a = Disclosure::new(DisclosureConfig::default().initially_open(true), &ctx);
        let b = Disclosure::new(DisclosureConfig::default().initially_open(true), &ctx);
        a.join(&group);
        b.join(&group);
        assert!(!a.is_open());
        assert!(b.is_open());
    }

    #[test]
    fn dropped_and_disposed_members_leave_group() {
        let (_clock, ctx) = ctx();
        let group = ExclusiveGroup::new();
        let a = Disclosure::new(DisclosureConfig::default(), &ctx);
        let b = Disclosure::new(DisclosureConfig::default(), &ctx);
        a.join(&group);
        b.join(&group);
        drop(b);
        assert_eq!(group.len(), 1);
        a.dispose();
        assert!(group.is_empty());
        a.open();
        assert!(!a.is_open(), "disposed disclosure ignores open");
    }

    #[test]
    fn close_all() {
        let (_clock, ctx) = ctx();
        let group = ExclusiveGroup::new();
        let a = Disclosure::new(DisclosureConfig::default(), &ctx);
        a.join(&group);
        a.open();
        group.close_all();
        assert_eq!(group.open_count(), 0);
        assert_eq!(a.group().map(|g| g.len()), Some(1));
    }

    proptest! {
        #[test]
        fn at_most_one_open_after_any_open(ops in proptest::collection::vec((0usize..4, 0u8..3), 0..50)) {
            let (_clock, ctx) = ctx();
            let group = ExclusiveGroup::new();
            let members: Vec<_> = (0..4)
                .map(|_| Disclosure::new(DisclosureConfig::default().auto_close(true), &ctx))
                .collect();
            for m in &members {
                m.join(&group);
            }
            for (index, op) in ops {
                match op {
                    0 => members[index].open(),
                    1 => members[index].close(),
                    _ => members[index].toggle_open(),
                }
                prop_assert!(group.open_count() <= 1);
            }
        }
    }
}
