#![forbid(unsafe_code)]

//! Radio group: exactly-one choice with keyboard navigation.
//!
//! Options register in a [`Group`] so arrow keys can step through them by
//! position. The chosen option lives in a single-mode [`SelectionSet`] and is
//! mirrored into a bindable `Observable<Option<String>>`.

use std::cell::RefCell;
use std::rc::Rc;

use weave_core::{DomEvent, Element, EventKind, Key, Params, Result};
use weave_runtime::{BindingScope, Observable, RenderTrigger, Subscription};

use crate::Component;
use crate::classes::{ClassBuilder, Size};
use crate::group::Group;
use crate::selection::{SelectionMode, SelectionSet};

/// Typed parameters of a [`RadioGroup`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RadioGroupConfig {
    pub options: Vec<String>,
    pub value: Option<String>,
    pub size: Size,
    pub disabled: bool,
}

impl RadioGroupConfig {
    const NAME: &'static str = "RadioGroup";
    const PARAMS: &'static [&'static str] = &["Options", "Value", "Size", "Disabled"];

    pub fn from_params(params: &Params) -> Result<Self> {
        params.reject_unknown(Self::NAME, Self::PARAMS)?;
        Ok(Self {
            options: params.get_or("Options", Vec::new())?,
            value: params.get("Value")?,
            size: params.get_or("Size", Size::default())?,
            disabled: params.get_or("Disabled", false)?,
        })
    }
}

struct Inner {
    config: RadioGroupConfig,
    options: Rc<RefCell<Group<String>>>,
    selection: SelectionSet<String>,
    value: Observable<Option<String>>,
    _sync: [Subscription; 2],
}

/// Mutually exclusive options. Clones share state.
#[derive(Clone)]
pub struct RadioGroup {
    inner: Rc<Inner>,
}

impl RadioGroup {
    #[must_use]
    pub fn new(config: RadioGroupConfig) -> Self {
        let mut options = Group::new();
        for option in &config.options {
            options.register(option.clone());
        }
        let selection = SelectionSet::new(SelectionMode::Single);
        match &config.value {
            Some(value) if options.contains(value) => selection.select(value.clone()),
            Some(value) => tracing::debug!(value = %value, "initial value outside the options ignored"),
            None => {}
        }
        let options = Rc::new(RefCell::new(options));
        let value = Observable::new(selection.first());

        let v = value.clone();
        let to_value = selection.subscribe(move |items| v.set(items.first().cloned()));
        let s = selection.clone();
        let known = Rc::clone(&options);
        let v = value.clone();
        // Writes from a bound parent must name a registered option.
        let from_value = value.subscribe(move |value| match value {
            Some(item) if known.borrow().contains(item) => s.select(item.clone()),
            Some(item) => {
                tracing::debug!(item = %item, "value outside the options rejected");
                v.set(s.first());
            }
            None => s.clear(),
        });

        Self {
            inner: Rc::new(Inner {
                config,
                options,
                selection,
                value,
                _sync: [to_value, from_value],
            }),
        }
    }

    pub fn from_params(params: &Params) -> Result<Self> {
        Ok(Self::new(RadioGroupConfig::from_params(params)?))
    }

    /// Add an option after construction. Returns false for duplicates.
    pub fn register_option(&self, option: impl Into<String>) -> bool {
        self.inner.options.borrow_mut().register(option.into())
    }

    /// Remove an option, clearing the value if it was chosen.
    pub fn unregister_option(&self, option: &str) -> bool {
        let removed = self.inner.options.borrow_mut().unregister(&option.to_owned());
        if removed && self.inner.value.with(|v| v.as_deref() == Some(option)) {
            self.inner.value.set(None);
        }
        removed
    }

    #[must_use]
    pub fn options(&self) -> Vec<String> {
        self.inner.options.borrow().iter().cloned().collect()
    }

    /// Bindable chosen option.
    #[must_use]
    pub fn value(&self) -> &Observable<Option<String>> {
        &self.inner.value
    }

    /// Choose `option` if it is registered.
    pub fn choose(&self, option: &str) -> bool {
        if self.inner.config.disabled || !self.inner.options.borrow().contains(&option.to_owned()) {
            return false;
        }
        self.inner.selection.select(option.to_owned());
        true
    }

    /// Step the choice by `delta` positions, wrapping around.
    pub fn step(&self, delta: isize) {
        let next = {
            let options = self.inner.options.borrow();
            if options.is_empty() || self.inner.config.disabled {
                return;
            }
            let len = options.len() as isize;
            let current = self
                .inner
                .selection
                .first()
                .and_then(|item| options.index_of(&item));
            let index = match current {
                Some(i) => (i as isize + delta).rem_euclid(len),
                None if delta < 0 => len - 1,
                None => 0,
            };
            options.nth(index as usize).cloned()
        };
        if let Some(option) = next {
            self.inner.selection.select(option);
        }
    }

    fn on_key(&self, event: &DomEvent) {
        match event.key {
            Some(Key::ArrowDown) => self.step(1),
            Some(Key::ArrowUp) => self.step(-1),
            _ => {}
        }
    }
}

impl Component for RadioGroup {
    fn name(&self) -> &'static str {
        RadioGroupConfig::NAME
    }

    fn view(&self) -> Element {
        let config = &self.inner.config;
        let radios: Vec<Element> = self
            .inner
            .options
            .borrow()
            .iter()
            .map(|option| {
                let checked = self.inner.selection.is_selected(option);
                let this = self.clone();
                let label = option.clone();
                Element::new("label")
                    .class(
                        ClassBuilder::new("weave-radio")
                            .add(config.size.class())
                            .add_if("weave-radio-checked", checked)
                            .build(),
                    )
                    .attr("role", "radio")
                    .attr("aria-checked", checked.to_string())
                    .attr("data-value", option.clone())
                    .text(option.clone())
                    .on(EventKind::Click, move |_| {
                        this.choose(&label);
                    })
            })
            .collect();

        let this = self.clone();
        Element::new("div")
            .class(ClassBuilder::new("weave-radio-group").add_if("weave-disabled", config.disabled).build())
            .attr("role", "radiogroup")
            .attr("tabindex", "0")
            .children(radios)
            .on(EventKind::KeyDown, move |event| this.on_key(event))
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
