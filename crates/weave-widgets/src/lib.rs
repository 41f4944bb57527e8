#![forbid(unsafe_code)]

//! State coordinators and components for Weave.
//!
//! The coordinators ([`SelectionSet`], [`Disclosure`], [`ExclusiveGroup`],
//! [`Group`]) hold the small amount of real interaction logic UI components
//! share. The [`components`] module builds concrete components on top of them;
//! each renders to a [`weave_core::Element`] tree and wires its event handlers
//! straight to coordinator methods.

pub mod classes;
pub mod components;
pub mod disclosure;
pub mod group;
pub mod selection;

pub use classes::{ClassBuilder, Density, Size, Spacing};
pub use disclosure::{Disclosure, DisclosureConfig, DisclosureId, DisclosureState, ExclusiveGroup};
pub use group::Group;
pub use selection::{SelectionMode, SelectionSet};

use weave_core::Element;
use weave_runtime::{BindingScope, RenderTrigger};

/// A mountable component.
///
/// Components are cheap handles over shared state (`Clone` shares it), so
/// event handlers in the rendered tree can capture a clone and mutate the
/// same state the next render reads.
pub trait Component {
    /// Name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Build the markup for the current state.
    fn view(&self) -> Element;

    /// Watch every state cell [`view`](Self::view) reads.
    ///
    /// The returned scope is held by the mount; dropping it stops re-renders.
    fn bind(&self, trigger: &RenderTrigger) -> BindingScope;

    /// Release timers and coordinators. Called once on unmount.
    fn dispose(&self) {}
}
