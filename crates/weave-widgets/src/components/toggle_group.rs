#![forbid(unsafe_code)]

//! Toggle group: a row of buttons sharing one [`SelectionSet`].

use std::rc::Rc;

use weave_core::{Element, EventKind, Params, Result};
use weave_runtime::{BindingScope, Observable, RenderTrigger, Subscription};

use crate::Component;
use crate::classes::{ClassBuilder, Density, Spacing};
use crate::selection::{SelectionMode, SelectionSet};

/// Typed parameters of a [`ToggleGroup`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ToggleGroupConfig {
    pub selection_mode: SelectionMode,
    pub items: Vec<String>,
    pub spacing: Spacing,
    pub density: Density,
    pub disabled: bool,
    pub class: Option<String>,
    /// Initially selected items.
    pub values: Vec<String>,
}

impl ToggleGroupConfig {
    const NAME: &'static str = "ToggleGroup";
    const PARAMS: &'static [&'static str] = &[
        "SelectionMode",
        "Items",
        "Spacing",
        "Density",
        "Disabled",
        "Class",
        "Value",
        "Values",
    ];

    /// Parse and validate loosely-typed parameters.
    pub fn from_params(params: &Params) -> Result<Self> {
        params.reject_unknown(Self::NAME, Self::PARAMS)?;
        let mut values: Vec<String> = params.get_or("Values", Vec::new())?;
        if let Some(value) = params.get::<String>("Value")? {
            values.insert(0, value);
        }
        Ok(Self {
            selection_mode: params.get_or("SelectionMode", SelectionMode::default())?,
            items: params.require(Self::NAME, "Items")?,
            spacing: params.get_or("Spacing", Spacing::default())?,
            density: params.get_or("Density", Density::default())?,
            disabled: params.get_or("Disabled", false)?,
            class: params.get("Class")?,
            values,
        })
    }
}

struct Inner {
    config: ToggleGroupConfig,
    selection: SelectionSet<String>,
    value: Observable<Option<String>>,
    _sync: [Subscription; 2],
}

/// Buttons whose pressed state follows a shared selection.
#[derive(Clone)]
pub struct ToggleGroup {
    inner: Rc<Inner>,
}

impl ToggleGroup {
    /// Build from a typed config. Initial values must fit the mode.
    pub fn new(config: ToggleGroupConfig) -> Result<Self> {
        let selection = SelectionSet::new(config.selection_mode);
        selection.set_selected(config.values.clone())?;
        let value = Observable::new(selection.first());

        let v = value.clone();
        let to_value = selection.subscribe(move |items| v.set(items.first().cloned()));
        let s = selection.clone();
        let from_value = value.subscribe(move |value| {
            if s.mode().is_single_valued() {
                let items: Vec<String> = value.iter().cloned().collect();
                if let Err(err) = s.set_selected(items) {
                    tracing::warn!(%err, "toggle group value rejected");
                }
            }
        });

        Ok(Self {
            inner: Rc::new(Inner {
                config,
                selection,
                value,
                _sync: [to_value, from_value],
            }),
        })
    }

    pub fn from_params(params: &Params) -> Result<Self> {
        Self::new(ToggleGroupConfig::from_params(params)?)
    }

    #[must_use]
    pub fn config(&self) -> &ToggleGroupConfig {
        &self.inner.config
    }

    /// Shared selection.
    #[must_use]
    pub fn selection(&self) -> &SelectionSet<String> {
        &self.inner.selection
    }

    /// Bindable single value (first selected item).
    #[must_use]
    pub fn value(&self) -> &Observable<Option<String>> {
        &self.inner.value
    }

    /// Bindable multi value (all selected items in click order).
    #[must_use]
    pub fn values(&self) -> &Observable<Vec<String>> {
        self.inner.selection.observable()
    }

    /// Click the item labelled `item`.
    pub fn click(&self, item: &str) {
        if self.inner.config.disabled {
            return;
        }
        self.inner.selection.toggle(item.to_owned());
    }
}

impl Component for ToggleGroup {
    fn name(&self) -> &'static str {
        ToggleGroupConfig::NAME
    }

    fn view(&self) -> Element {
        let config = &self.inner.config;
        let group_class = ClassBuilder::new("weave-toggle-group")
            .add(config.spacing.gap_class())
            .add_if("weave-disabled", config.disabled)
            .add_user(config.class.as_deref());

        let buttons = config.items.iter().map(|item| {
            let selected = self.inner.selection.is_selected(item);
            let class = ClassBuilder::new("weave-toggle-item")
                .add(config.density.padding_class())
                .add_if("weave-toggle-item-selected", selected);
            let this = self.clone();
            let label = item.clone();
            Element::new("button")
                .class(class.build())
                .attr("type", "button")
                .attr("aria-pressed", selected.to_string())
                .attr("data-value", item.clone())
                .flag("disabled", config.disabled)
                .text(item.clone())
                .on(EventKind::Click, move |_| this.click(&label))
        });

        Element::new("div")
            .child(
                Element::new("div")
                    .class(group_class.build())
                    .attr("role", "group")
                    .children(buttons),
            )
            .child(
                Element::new("span")
                    .class("weave-toggle-group-value")
                    .text(self.inner.selection.display_text(", ")),
            )
    }

    fn bind(&self, trigger: &RenderTrigger) -> BindingScope {
        let mut scope = BindingScope::new();
        scope.hold(trigger.watch(self.inner.selection.observable()));
        scope
    }

    fn dispose(&self) {
        self.inner.selection.dispose();
        self.inner.value.dispose();
    }
}
