#![forbid(unsafe_code)]

//! Shared, version-tracked value cell with change notification.
//!
//! # Invariants
//!
//! 1. Version increments exactly once per `set`/`update` that changes the value.
//! 2. Subscribers run synchronously, in registration order, before `set` returns.
//! 3. Setting a value equal to the current one is a no-op.
//! 4. After [`Observable::dispose`], mutation and subscription are silent
//!    no-ops; reads keep returning the last value.
//!
//! # Failure Modes
//!
//! - Subscriber panic: propagates to the caller of `set`.
//! - Subscriber sets the same cell: the nested change is applied and
//!   notified in full before the outer notification loop continues.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use serde::de::DeserializeOwned;
use weave_core::param::{ParamValue, convert};

type Callback<T> = dyn Fn(&T);

struct Inner<T> {
    value: T,
    previous: Option<T>,
    version: u64,
    subscribers: Vec<Weak<Callback<T>>>,
    disposed: bool,
}

/// A shared value cell. Clones share the same value and subscriber list.
pub struct Observable<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("disposed", &inner.disposed)
            .finish()
    }
}

impl<T: Default + Clone + PartialEq + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Create a cell holding `value` at version 0.
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                value,
                previous: None,
                version: 0,
                subscribers: Vec::new(),
                disposed: false,
            })),
        }
    }

    /// Current value (cloned).
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Borrow the current value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Value before the most recent change, `None` until the first change.
    #[must_use]
    pub fn previous(&self) -> Option<T> {
        self.inner.borrow().previous.clone()
    }

    /// Number of changes applied so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Replace the value, notifying subscribers if it changed.
    pub fn set(&self, value: T) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.disposed {
                tracing::trace!("set on disposed observable ignored");
                return;
            }
            if inner.value == value {
                return;
            }
            let old = std::mem::replace(&mut inner.value, value);
            inner.previous = Some(old);
            inner.version += 1;
        }
        self.notify();
    }

    /// Mutate the value in place; notifies only if the result differs.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let current = {
            let inner = self.inner.borrow();
            if inner.disposed {
                tracing::trace!("update on disposed observable ignored");
                return;
            }
            inner.value.clone()
        };
        let mut next = current;
        f(&mut next);
        self.set(next);
    }

    /// Set from a loosely-typed parameter value.
    ///
    /// Fails with [`weave_core::Error::InvalidParameterType`] when `value`
    /// does not convert into `T`; the cell is left untouched in that case.
    pub fn set_param(&self, property: &str, value: &ParamValue) -> weave_core::Result<()>
    where
        T: DeserializeOwned,
    {
        let typed: T = convert(property, value)?;
        self.set(typed);
        Ok(())
    }

    /// Register a callback invoked with the new value after every change.
    ///
    /// The callback stays registered while the returned [`Subscription`] is alive.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: Rc<Callback<T>> = Rc::new(callback);
        let mut inner = self.inner.borrow_mut();
        if inner.disposed {
            tracing::trace!("subscribe on disposed observable ignored");
            return Subscription::empty();
        }
        inner.subscribers.push(Rc::downgrade(&strong));
        Subscription {
            guard: Some(Box::new(strong)),
        }
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    /// Drop every subscriber and ignore further mutation.
    pub fn dispose(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.disposed = true;
        inner.subscribers.clear();
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.inner.borrow().disposed
    }

    /// Whether two handles share the same cell.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn notify(&self) {
        let (value, callbacks) = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|w| w.strong_count() > 0);
            let callbacks: Vec<_> = inner.subscribers.iter().filter_map(Weak::upgrade).collect();
            (inner.value.clone(), callbacks)
        };
        for callback in callbacks {
            callback(&value);
        }
    }
}

/// RAII guard for an [`Observable`] subscription. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    guard: Option<Box<dyn Any>>,
}

impl Subscription {
    fn empty() -> Self {
        Self { guard: None }
    }

    /// Unsubscribe now.
    pub fn unsubscribe(self) {
        drop(self);
    }

    /// Whether this handle still keeps a callback registered.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.guard.is_some()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
