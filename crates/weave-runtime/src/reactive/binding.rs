#![forbid(unsafe_code)]

//! One-way and two-way bindings between [`Observable`] cells.
//!
//! A component parameter is either read-only from the component's point of
//! view (one-way: the parent owns the value and the component derives what it
//! shows from it) or bindable in both directions (two-way: the component
//! writes back, e.g. a toggle group's selected value).
//!
//! ```ignore
//! let parent_value = Observable::new(Some("1".to_string()));
//! let group_value = Observable::new(None);
//! let _link = TwoWayBinding::new(&parent_value, &group_value);
//!
//! group_value.set(Some("2".into()));          // user clicked item 2
//! assert_eq!(parent_value.get().as_deref(), Some("2"));
//! ```
//!
//! # Invariants
//!
//! 1. [`Binding::get`] evaluates on every call and is never stale.
//! 2. A [`TwoWayBinding`] starts by copying the source into the target.
//! 3. Propagation never loops: the re-entrancy flag stops the echo.
//! 4. Dropping a [`TwoWayBinding`] or a [`BindingScope`] disconnects everything it holds.

use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use super::observable::{Observable, Subscription};

/// Read-only view over one or more cells, optionally transformed.
pub struct Binding<T> {
    eval: Rc<dyn Fn() -> T>,
}

impl<T> Clone for Binding<T> {
    fn clone(&self) -> Self {
        Self {
            eval: Rc::clone(&self.eval),
        }
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Binding").field(&self.get()).finish()
    }
}

impl<T: 'static> Binding<T> {
    /// Binding that evaluates `f` on each read.
    pub fn new(f: impl Fn() -> T + 'static) -> Self {
        Self { eval: Rc::new(f) }
    }

    /// Binding to a fixed value (a parameter the parent never changes).
    pub fn constant(value: T) -> Self
    where
        T: Clone,
    {
        Self::new(move || value.clone())
    }

    #[must_use]
    pub fn get(&self) -> T {
        (self.eval)()
    }

    /// Chain another transform.
    pub fn map<U: 'static>(self, f: impl Fn(T) -> U + 'static) -> Binding<U> {
        Binding {
            eval: Rc::new(move || f((self.eval)())),
        }
    }
}

/// Identity binding to `source`.
pub fn bind_observable<T: Clone + PartialEq + 'static>(source: &Observable<T>) -> Binding<T> {
    let source = source.clone();
    Binding::new(move || source.get())
}

/// Binding that maps `source` through `map` on each read.
pub fn bind_mapped<S, T>(source: &Observable<S>, map: impl Fn(&S) -> T + 'static) -> Binding<T>
where
    S: Clone + PartialEq + 'static,
    T: 'static,
{
    let source = source.clone();
    Binding::new(move || source.with(&map))
}

/// Binding combining two sources.
pub fn bind_mapped2<A, B, T>(
    a: &Observable<A>,
    b: &Observable<B>,
    map: impl Fn(&A, &B) -> T + 'static,
) -> Binding<T>
where
    A: Clone + PartialEq + 'static,
    B: Clone + PartialEq + 'static,
    T: 'static,
{
    let a = a.clone();
    let b = b.clone();
    Binding::new(move || a.with(|va| b.with(|vb| map(va, vb))))
}

/// [`bind_observable`] shorthand.
#[macro_export]
macro_rules! bind {
    ($obs:expr) => {
        $crate::reactive::binding::bind_observable(&$obs)
    };
}

/// [`bind_mapped`] shorthand.
#[macro_export]
macro_rules! bind_map {
    ($obs:expr, $f:expr) => {
        $crate::reactive::binding::bind_mapped(&$obs, $f)
    };
}

/// [`bind_mapped2`] shorthand.
#[macro_export]
macro_rules! bind_map2 {
    ($a:expr, $b:expr, $f:expr) => {
        $crate::reactive::binding::bind_mapped2(&$a, &$b, $f)
    };
}

/// Keeps two cells of the same type in sync.
///
/// Holds both directional subscriptions; drop it to disconnect.
pub struct TwoWayBinding<T: Clone + PartialEq + 'static> {
    _forward: Subscription,
    _backward: Subscription,
    _marker: PhantomData<T>,
}

impl<T: Clone + PartialEq + 'static> TwoWayBinding<T> {
    /// Link `source` and `target`; `target` first takes `source`'s value.
    pub fn new(source: &Observable<T>, target: &Observable<T>) -> Self {
        target.set(source.get());
        let syncing = Rc::new(Cell::new(false));
        let forward = mirror(source, target, &syncing);
        let backward = mirror(target, source, &syncing);
        Self {
            _forward: forward,
            _backward: backward,
            _marker: PhantomData,
        }
    }
}

fn mirror<T: Clone + PartialEq + 'static>(
    from: &Observable<T>,
    to: &Observable<T>,
    syncing: &Rc<Cell<bool>>,
) -> Subscription {
    let to = to.clone();
    let syncing = Rc::clone(syncing);
    from.subscribe(move |value| {
        if syncing.replace(true) {
            return;
        }
        to.set(value.clone());
        syncing.set(false);
    })
}

impl<T: Clone + PartialEq + 'static> fmt::Debug for TwoWayBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TwoWayBinding")
    }
}

/// Owns the subscriptions of one mounted component.
///
/// Unmounting the component drops the scope, which disconnects every
/// subscription and two-way link registered through it.
#[derive(Default)]
pub struct BindingScope {
    subscriptions: Vec<Subscription>,
    links: Vec<Box<dyn std::any::Any>>,
}

impl BindingScope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `sub` alive for the scope's lifetime.
    pub fn hold(&mut self, sub: Subscription) -> &mut Self {
        self.subscriptions.push(sub);
        self
    }

    /// Subscribe to `source` for the scope's lifetime.
    pub fn subscribe<T: Clone + PartialEq + 'static>(
        &mut self,
        source: &Observable<T>,
        callback: impl Fn(&T) + 'static,
    ) -> &mut Self {
        let sub = source.subscribe(callback);
        self.hold(sub)
    }

    /// Create a two-way link owned by the scope.
    pub fn link<T: Clone + PartialEq + 'static>(
        &mut self,
        source: &Observable<T>,
        target: &Observable<T>,
    ) -> &mut Self {
        self.links.push(Box::new(TwoWayBinding::new(source, target)));
        self
    }

    /// Absorb another scope's subscriptions.
    pub fn extend(&mut self, other: BindingScope) -> &mut Self {
        self.subscriptions.extend(other.subscriptions);
        self.links.extend(other.links);
        self
    }

    /// Number of subscriptions and links held.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.subscriptions.len() + self.links.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.binding_count() == 0
    }

    /// Release everything now; the scope can be reused.
    pub fn clear(&mut self) {
        self.subscriptions.clear();
        self.links.clear();
    }
}

impl fmt::Debug for BindingScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingScope")
            .field("binding_count", &self.binding_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_way_binding_follows_source() {
        let label = Observable::new("Save".to_string());
        let b = bind!(label);
        label.set("Saved".into());
        assert_eq!(b.get(), "Saved");
    }

    #[test]
    fn mapped_binding_derives_class() {
        let open = Observable::new(false);
        let class = bind_map!(open, |o| if *o { "weave-open" } else { "weave-closed" });
        assert_eq!(class.get(), "weave-closed");
        open.set(true);
        assert_eq!(class.get(), "weave-open");
    }

    #[test]
    fn mapped2_and_map_chain() {
        let count = Observable::new(2);
        let total = Observable::new(5);
        let text = bind_map2!(count, total, |c, t| (*c, *t)).map(|(c, t)| format!("{c}/{t}"));
        assert_eq!(text.get(), "2/5");
        total.set(6);
        assert_eq!(text.get(), "2/6");
    }

    #[test]
    fn constant_binding() {
        let b = Binding::constant(3);
        assert_eq!(b.clone().get(), 3);
    }

    #[test]
    fn two_way_initial_sync_and_both_directions() {
        let parent = Observable::new(Some("1".to_string()));
        let child = Observable::new(None);
        let _link = TwoWayBinding::new(&parent, &child);
        assert_eq!(child.get().as_deref(), Some("1"));

        child.set(Some("2".into()));
        assert_eq!(parent.get().as_deref(), Some("2"));

        parent.set(None);
        assert_eq!(child.get(), None);
    }

    #[test]
    fn two_way_does_not_echo() {
        let a = Observable::new(0);
        let b = Observable::new(0);
        let _link = TwoWayBinding::new(&a, &b);
        a.set(4);
        assert_eq!(a.version(), 1, "source must not be re-set by the echo");
        assert_eq!(b.version(), 1);
    }

    #[test]
    fn dropping_two_way_disconnects() {
        let a = Observable::new(1);
        let b = Observable::new(0);
        drop(TwoWayBinding::new(&a, &b));
        a.set(2);
        assert_eq!(b.get(), 1);
        assert_eq!(a.subscriber_count(), 0);
    }

    #[test]
    fn scope_releases_on_drop_and_clear() {
        let obs = Observable::new(0);
        let other = Observable::new(0);
        let seen = Rc::new(Cell::new(0));

        let mut scope = BindingScope::new();
        let s = Rc::clone(&seen);
        scope.subscribe(&obs, move |v| s.set(*v)).link(&obs, &other);
        assert_eq!(scope.binding_count(), 2);

        obs.set(3);
        assert_eq!(seen.get(), 3);
        assert_eq!(other.get(), 3);

        scope.clear();
        assert!(scope.is_empty());
        obs.set(8);
        assert_eq!(seen.get(), 3);
        assert_eq!(other.get(), 3);
    }

    #[test]
    fn scope_extend_moves_bindings() {
        let obs = Observable::new(0);
        let mut a = BindingScope::new();
        let mut b = BindingScope::new();
        b.subscribe(&obs, |_| {});
        a.extend(b);
        assert_eq!(a.binding_count(), 1);
        assert!(format!("{a:?}").contains("binding_count: 1"));
    }
}
