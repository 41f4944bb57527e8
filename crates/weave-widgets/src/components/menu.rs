#![forbid(unsafe_code)]

//! Dropdown menu: an activator button and a popover list of items.
//!
//! While the popover is open an overlay element covers the page; a click on
//! it counts as an outside interaction and closes the menu when `AutoClose`
//! is set.

use std::rc::Rc;

use weave_core::{Element, EventKind, Key, Params, Result};
use weave_runtime::{AppContext, Binding, BindingScope, Observable, RenderTrigger, bind, bind_map};

use crate::Component;
use crate::classes::{ClassBuilder, Density};
use crate::disclosure::{Disclosure, DisclosureConfig};

/// Typed parameters of a [`Menu`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuConfig {
    pub label: String,
    pub items: Vec<String>,
    pub auto_close: bool,
    pub density: Density,
    pub disabled: bool,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            label: String::new(),
            items: Vec::new(),
            auto_close: true,
            density: Density::default(),
            disabled: false,
        }
    }
}

impl MenuConfig {
    const NAME: &'static str = "Menu";
    const PARAMS: &'static [&'static str] = &["Label", "Items", "AutoClose", "Density", "Disabled"];

    pub fn from_params(params: &Params) -> Result<Self> {
        params.reject_unknown(Self::NAME, Self::PARAMS)?;
        Ok(Self {
            label: params.get_or("Label", String::new())?,
            items: params.get_or("Items", Vec::new())?,
            auto_close: params.get_or("AutoClose", true)?,
            density: params.get_or("Density", Density::default())?,
            disabled: params.get_or("Disabled", false)?,
        })
    }
}

struct Inner {
    config: MenuConfig,
    disclosure: Disclosure,
    selected: Observable<Option<String>>,
    /// `aria-expanded` of the activator.
    expanded: Binding<String>,
    /// Item highlighted in the list.
    highlighted: Binding<Option<String>>,
}

/// Dropdown menu. Clones share state.
#[derive(Clone)]
pub struct Menu {
    inner: Rc<Inner>,
}

impl Menu {
    #[must_use]
    pub fn new(config: MenuConfig, ctx: &AppContext) -> Self {
        let disclosure = Disclosure::new(DisclosureConfig::default().auto_close(config.auto_close), ctx);
        let open = disclosure.observable().clone();
        let selected = Observable::new(None);
        Self {
            inner: Rc::new(Inner {
                config,
                disclosure,
                expanded: bind_map!(open, |open: &bool| open.to_string()),
                highlighted: bind!(selected),
                selected,
            }),
        }
    }

    pub fn from_params(params: &Params, ctx: &AppContext) -> Result<Self> {
        Ok(Self::new(MenuConfig::from_params(params)?, ctx))
    }

    #[must_use]
    pub fn disclosure(&self) -> &Disclosure {
        &self.inner.disclosure
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.inner.disclosure.is_open()
    }

    /// Bindable last chosen item.
    #[must_use]
    pub fn selected(&self) -> &Observable<Option<String>> {
        &self.inner.selected
    }

    /// Activator click.
    pub fn toggle(&self) {
        if !self.inner.config.disabled {
            self.inner.disclosure.toggle_open();
        }
    }

    /// Record `item` as chosen, closing when `AutoClose` is set.
    pub fn select(&self, item: &str) {
        if !self.is_open() {
            tracing::trace!(item, "select on closed menu ignored");
            return;
        }
        self.inner.selected.set(Some(item.to_owned()));
        if self.inner.disclosure.auto_close() {
            self.inner.disclosure.close();
        }
    }
}

impl Component for Menu {
    fn name(&self) -> &'static str {
        MenuConfig::NAME
    }

    fn view(&self) -> Element {
        let config = &self.inner.config;
        let open = self.is_open();
        let activator = {
            let this = self.clone();
            Element::new("button")
                .class("weave-menu-activator")
                .attr("type", "button")
                .attr("aria-haspopup", "true")
                .attr("aria-expanded", self.inner.expanded.get())
                .flag("disabled", config.disabled)
                .text(config.label.clone())
                .on(EventKind::Click, move |_| this.toggle())
        };

        let mut root = Element::new("div").class("weave-menu").child(activator);
        if !open {
            return root;
        }

        let selected = self.inner.highlighted.get();
        let items = config.items.iter().map(|item| {
            let this = self.clone();
            let value = item.clone();
            Element::new("div")
                .class(
                    ClassBuilder::new("weave-list-item")
                        .add(config.density.padding_class())
                        .add_if("weave-selected-item", selected.as_deref() == Some(item.as_str()))
                        .build(),
                )
                .attr("role", "menuitem")
                .attr("data-value", item.clone())
                .text(item.clone())
                .on(EventKind::Click, move |_| this.select(&value))
        });
        let escape = self.clone();
        root = root.child(
            Element::new("div")
                .class("weave-popover weave-popover-open")
                .attr("role", "menu")
                .children(items)
                .on(EventKind::KeyDown, move |e| {
                    if e.key == Some(Key::Escape) {
                        escape.inner.disclosure.close();
                    }
                }),
        );
        let outside = self.clone();
        root.child(
            Element::new("div")
                .class("weave-overlay")
                .on(EventKind::Click, move |_| {
                    outside.inner.disclosure.handle_outside_interaction();
                }),
        )
    }

    fn bind(&self, trigger: &RenderTrigger) -> BindingScope {
        let mut scope = BindingScope::new();
        scope
            .hold(trigger.watch(self.inner.disclosure.observable()))
            .hold(trigger.watch(&self.inner.selected));
        scope
    }

    fn dispose(&self) {
        self.inner.disclosure.dispose();
        self.inner.selected.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn menu(auto_close: bool) -> Menu {
        let params = Params::new()
            .with("Label", "Actions")
            .with("Items", json!(["Copy", "Paste"]))
            .with("AutoClose", auto_close);
        Menu::from_params(&params, &AppContext::system()).unwrap()
    }

    #[test]
    fn item_click_selects_and_closes() {
        let m = menu(true);
        m.toggle();
        assert!(m.is_open());
        m.select("Paste");
        assert_eq!(m.selected().get().as_deref(), Some("Paste"));
        assert!(!m.is_open());
    }

    #[test]
    fn without_auto_close_menu_stays_open() {
        let m = menu(false);
        m.toggle();
        m.select("Copy");
        assert!(m.is_open());
        assert!(!m.disclosure().handle_outside_interaction());
        m.toggle();
        assert!(!m.is_open());
    }

    #[test]
    fn overlay_only_while_open() {
        let m = menu(true);
        assert!(!m.view().to_markup().contains("weave-overlay"));
        m.toggle();
        let markup = m.view().to_markup();
        assert!(markup.contains("<div class=\"weave-overlay\" />"));
        assert!(markup.contains("data-value=\"Copy\""));
    }

    #[test]
    fn activator_tracks_open_state() {
        let m = menu(true);
        assert!(m.view().to_markup().contains("aria-expanded=\"false\""));
        m.toggle();
        m.select("Copy");
        m.toggle();
        let markup = m.view().to_markup();
        assert!(markup.contains("aria-expanded=\"true\""));
        assert!(markup.contains("weave-selected-item\" role=\"menuitem\" data-value=\"Copy\""));
    }

    #[test]
    fn select_while_closed_is_ignored() {
        let m = menu(true);
        m.select("Copy");
        assert_eq!(m.selected().get(), None);
    }
}
