#![forbid(unsafe_code)]

//! Single-threaded reactive runtime for Weave components.
//!
//! # Modules
//!
//! - [`reactive`]: value cells ([`Observable`]), subscriptions, one-way and
//!   two-way bindings.
//! - [`debounce`]: last-value-wins commit of rapid input into a cell.
//! - [`render`]: synchronous re-render on any watched state change.
//! - [`timer`]: clocks and the timer queue, the only deferred work.
//! - [`context`]: the [`AppContext`] registry handed to every constructor.
//! - [`config`]: [`RuntimeConfig`] loading and environment overrides.
//!
//! # Ordering
//!
//! Everything runs on the caller's thread. An event handler's mutations and
//! the renders they trigger complete before the handler returns; timer
//! callbacks run only when the host calls [`AppContext::tick`] (or
//! [`Scheduler::run_due`]).

pub mod config;
pub mod context;
pub mod debounce;
pub mod reactive;
pub mod render;
pub mod timer;

pub use config::RuntimeConfig;
pub use context::AppContext;
pub use debounce::Debouncer;
pub use reactive::{
    Binding, BindingScope, Observable, Subscription, TwoWayBinding, bind_mapped, bind_mapped2,
    bind_observable,
};
pub use render::{RenderHook, RenderTrigger};
pub use timer::{Clock, ManualClock, Scheduler, SystemClock, TimerHandle};
