#![forbid(unsafe_code)]

//! A component mounted into the headless harness.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use weave_core::{DomEvent, Element, Error, Key, Result};
use weave_runtime::{AppContext, BindingScope, RenderHook, RenderTrigger};
use weave_widgets::Component;

use crate::selector::Selector;

struct MountState {
    tree: RefCell<Element>,
    renders: Cell<u64>,
}

/// Handle to a mounted component: query its markup and dispatch events.
///
/// The tree re-renders synchronously whenever a watched state cell changes,
/// so a query right after an event sees the updated markup.
pub struct RenderedComponent<C: Component + Clone + 'static> {
    component: C,
    state: Rc<MountState>,
    trigger: RenderTrigger,
    ctx: AppContext,
    scope: Option<BindingScope>,
    hook: Option<RenderHook>,
}

impl<C: Component + Clone + 'static> RenderedComponent<C> {
    pub(crate) fn mount(component: C, ctx: &AppContext) -> Self {
        let trigger = ctx.render_trigger();
        let state = Rc::new(MountState {
            tree: RefCell::new(component.view()),
            renders: Cell::new(1),
        });

        let view = component.clone();
        let weak = Rc::downgrade(&state);
        let hook = trigger.on_any_state_change(move || {
            let Some(state) = weak.upgrade() else { return };
            let tree = view.view();
            *state.tree.borrow_mut() = tree;
            state.renders.set(state.renders.get() + 1);
        });
        let scope = component.bind(&trigger);
        tracing::debug!(component = component.name(), bindings = scope.binding_count(), "mounted");

        Self {
            component,
            state,
            trigger,
            ctx: ctx.clone(),
            scope: Some(scope),
            hook: Some(hook),
        }
    }

    /// The mounted component handle.
    #[must_use]
    pub fn instance(&self) -> &C {
        &self.component
    }

    /// Context the component was mounted with.
    #[must_use]
    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    /// Current tree.
    #[must_use]
    pub fn root(&self) -> Element {
        self.state.tree.borrow().clone()
    }

    /// Current markup.
    #[must_use]
    pub fn markup(&self) -> String {
        self.state.tree.borrow().to_markup()
    }

    /// Number of times the tree has been rendered, including the initial mount.
    #[must_use]
    pub fn render_count(&self) -> u64 {
        self.state.renders.get()
    }

    /// First element matching `selector`.
    pub fn find(&self, selector: &str) -> Result<Element> {
        let parsed = Selector::parse(selector)?;
        let tree = self.state.tree.borrow();
        let found = parsed.select_all(&tree).first().map(|el| (*el).clone());
        found.ok_or_else(|| Error::ElementNotFound {
            selector: selector.to_owned(),
        })
    }

    /// Every element matching `selector`, in document order.
    pub fn find_all(&self, selector: &str) -> Result<Vec<Element>> {
        let parsed = Selector::parse(selector)?;
        let tree = self.state.tree.borrow();
        let found: Vec<Element> = parsed.select_all(&tree).into_iter().cloned().collect();
        Ok(found)
    }

    /// Whether anything matches `selector`.
    pub fn exists(&self, selector: &str) -> Result<bool> {
        Ok(!self.find_all(selector)?.is_empty())
    }

    /// Text content of the first element matching `selector`.
    pub fn text(&self, selector: &str) -> Result<String> {
        Ok(self.find(selector)?.text_content())
    }

    /// Dispatch `event` to the first element matching `selector`.
    ///
    /// The handler runs after the tree borrow is released, so it may
    /// re-render freely.
    pub fn dispatch(&self, selector: &str, event: DomEvent) -> Result<()> {
        let el = self.find(selector)?;
        let handler = el.handler(event.kind).ok_or_else(|| Error::NoHandler {
            element: el.describe(),
            event: event.kind.name().to_owned(),
        })?;
        tracing::trace!(element = %el.describe(), event = %event.kind, "dispatch");
        handler(&event);
        Ok(())
    }

    pub fn click(&self, selector: &str) -> Result<()> {
        self.dispatch(selector, DomEvent::click())
    }

    pub fn input(&self, selector: &str, value: &str) -> Result<()> {
        self.dispatch(selector, DomEvent::input(value))
    }

    pub fn change(&self, selector: &str, value: &str) -> Result<()> {
        self.dispatch(selector, DomEvent::change(value))
    }

    pub fn keydown(&self, selector: &str, key: Key) -> Result<()> {
        self.dispatch(selector, DomEvent::key_down(key))
    }

    pub fn blur(&self, selector: &str) -> Result<()> {
        self.dispatch(selector, DomEvent::blur())
    }

    pub fn focus(&self, selector: &str) -> Result<()> {
        self.dispatch(selector, DomEvent::focus())
    }

    /// Unmount: stop re-rendering and release the component's resources.
    /// Idempotent. The last markup stays queryable.
    pub fn dispose(&mut self) {
        let Some(scope) = self.scope.take() else {
            return;
        };
        drop(scope);
        self.hook.take();
        self.component.dispose();
        tracing::debug!(component = self.component.name(), "unmounted");
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.scope.is_none()
    }

    /// Trigger driving re-renders of this mount.
    #[must_use]
    pub fn trigger(&self) -> &RenderTrigger {
        &self.trigger
    }
}

impl<C: Component + Clone + 'static> Drop for RenderedComponent<C> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<C: Component + Clone + 'static> fmt::Debug for RenderedComponent<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderedComponent")
            .field("component", &self.component.name())
            .field("renders", &self.render_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

