#![forbid(unsafe_code)]

//! Reactive value cells and bindings.
//!
//! - [`Observable`]: shared, version-tracked value with synchronous change
//!   notification. This is the bindable value cell every component state
//!   lives in.
//! - [`Subscription`]: RAII guard that unsubscribes on drop.
//! - [`Binding`] / [`TwoWayBinding`]: one-way derived reads and two-way sync
//!   between a parent's value and a component's value.
//! - [`BindingScope`]: owns every subscription of a mounted component.
//!
//! # Architecture
//!
//! Cells use `Rc<RefCell<..>>`: all state lives on one thread and is mutated
//! from event handlers and timer callbacks on that thread. Subscribers are
//! stored as `Weak` callbacks, so dropping a [`Subscription`] is enough to
//! detach; dead entries are pruned on the next notification.

pub mod binding;
pub mod observable;

pub use binding::{
    Binding, BindingScope, TwoWayBinding, bind_mapped, bind_mapped2, bind_observable,
};
pub use observable::{Observable, Subscription};
