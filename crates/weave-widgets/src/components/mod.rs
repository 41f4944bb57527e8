#![forbid(unsafe_code)]

//! Concrete components built on the coordinators.
//!
//! Every component follows the same shape: a `*Config` struct parsed from
//! [`weave_core::Params`] (unknown names and mistyped values are rejected up
//! front), a cheap `Clone` handle over shared state, and a
//! [`Component`](crate::Component) impl that renders the state and watches it.

pub mod expansion;
pub mod menu;
pub mod radio_group;
pub mod text_field;
pub mod toggle_group;

pub use expansion::{ExpansionPanels, ExpansionPanelsConfig, PanelItem};
pub use menu::{Menu, MenuConfig};
pub use radio_group::{RadioGroup, RadioGroupConfig};
pub use text_field::{TextField, TextFieldConfig};
pub use toggle_group::{ToggleGroup, ToggleGroupConfig};
