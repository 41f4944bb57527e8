#![forbid(unsafe_code)]

//! Core types for Weave: the markup tree components render into, the
//! DOM-like events dispatched against it, loosely-typed parameters, and the
//! shared error type.

pub mod error;
pub mod event;
pub mod markup;
pub mod param;

pub use error::{Error, Result};
pub use event::{DomEvent, EventKind, Key};
pub use markup::{Element, Handler, Node};
pub use param::{ParamValue, Params};
