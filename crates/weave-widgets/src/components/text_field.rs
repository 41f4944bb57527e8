#![forbid(unsafe_code)]

//! Text field with debounced commit and required-value validation.
//!
//! Typing updates the displayed `text` immediately and pushes into a
//! [`Debouncer`]; the bound `value` only changes once input goes quiet, on
//! blur, on Enter, or on a `change` event. Validation runs whenever the
//! committed value changes and on blur; failures are state (`error`,
//! `error_text`), not errors.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use weave_core::{DomEvent, Element, EventKind, Key, Params, Result};
use weave_runtime::{AppContext, Binding, BindingScope, Debouncer, Observable, RenderTrigger, Subscription, bind_map2};

use crate::Component;
use crate::classes::ClassBuilder;

const DEFAULT_REQUIRED_ERROR: &str = "Required";

/// Typed parameters of a [`TextField`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextFieldConfig {
    pub label: Option<String>,
    pub placeholder: Option<String>,
    /// Falls back to the context's `default_debounce_ms` when unset.
    pub debounce_interval: Option<Duration>,
    pub immediate: bool,
    pub required: bool,
    pub required_error: Option<String>,
    pub disabled: bool,
    pub value: String,
}

impl TextFieldConfig {
    const NAME: &'static str = "TextField";
    const PARAMS: &'static [&'static str] = &[
        "Label",
        "Placeholder",
        "DebounceInterval",
        "Immediate",
        "Required",
        "RequiredError",
        "Disabled",
        "Value",
    ];

    pub fn from_params(params: &Params) -> Result<Self> {
        params.reject_unknown(Self::NAME, Self::PARAMS)?;
        Ok(Self {
            label: params.get("Label")?,
            placeholder: params.get("Placeholder")?,
            debounce_interval: params.get::<u64>("DebounceInterval")?.map(Duration::from_millis),
            immediate: params.get_or("Immediate", false)?,
            required: params.get_or("Required", false)?,
            required_error: params.get("RequiredError")?,
            disabled: params.get_or("Disabled", false)?,
            value: params.get_or("Value", String::new())?,
        })
    }

    fn required_message(&self) -> &str {
        self.required_error.as_deref().unwrap_or(DEFAULT_REQUIRED_ERROR)
    }
}

struct Inner {
    config: TextFieldConfig,
    text: Observable<String>,
    value: Observable<String>,
    error: Observable<bool>,
    error_text: Observable<String>,
    debouncer: Debouncer<String>,
    /// Message shown under the input, `None` while valid.
    helper: Binding<Option<String>>,
    sync: RefCell<Option<Subscription>>,
}

impl Inner {
    fn validate(&self) {
        let failed = self.config.required && self.value.with(|v| v.trim().is_empty());
        self.error.set(failed);
        self.error_text.set(if failed {
            self.config.required_message().to_owned()
        } else {
            String::new()
        });
    }
}

/// Single-line input. Clones share state.
#[derive(Clone)]
pub struct TextField {
    inner: Rc<Inner>,
}

impl TextField {
    #[must_use]
    pub fn new(config: TextFieldConfig, ctx: &AppContext) -> Self {
        let interval = if config.immediate {
            Duration::ZERO
        } else {
            config
                .debounce_interval
                .unwrap_or_else(|| ctx.config().default_debounce())
        };
        let text = Observable::new(config.value.clone());
        let value = Observable::new(config.value.clone());
        let debouncer = Debouncer::new(&value, interval, ctx.scheduler());

        let inner = Rc::new_cyclic(|weak: &Weak<Inner>| {
            let weak = weak.clone();
            let sync = value.subscribe(move |committed: &String| {
                let Some(inner) = weak.upgrade() else { return };
                // Parent writes land in the box too, unless typing is pending.
                if !inner.debouncer.is_pending() {
                    inner.text.set(committed.clone());
                }
                inner.validate();
            });
            let error = Observable::new(false);
            let error_text = Observable::new(String::new());
            let helper = bind_map2!(error, error_text, |failed: &bool, message: &String| {
                failed.then(|| message.clone())
            });
            Inner {
                config,
                text,
                value,
                error,
                error_text,
                debouncer,
                helper,
                sync: RefCell::new(Some(sync)),
            }
        });
        Self { inner }
    }

    pub fn from_params(params: &Params, ctx: &AppContext) -> Result<Self> {
        Ok(Self::new(TextFieldConfig::from_params(params)?, ctx))
    }

    /// Bindable committed value.
    #[must_use]
    pub fn value(&self) -> &Observable<String> {
        &self.inner.value
    }

    /// Text currently shown in the box.
    #[must_use]
    pub fn text(&self) -> String {
        self.inner.text.get()
    }

    #[must_use]
    pub fn error(&self) -> bool {
        self.inner.error.get()
    }

    #[must_use]
    pub fn error_text(&self) -> String {
        self.inner.error_text.get()
    }

    #[must_use]
    pub fn debounce_interval(&self) -> Duration {
        self.inner.debouncer.interval()
    }

    /// A keystroke: show it now, commit later.
    pub fn input(&self, text: &str) {
        if self.inner.config.disabled {
            return;
        }
        self.inner.text.set(text.to_owned());
        self.inner.debouncer.push(text.to_owned());
    }

    /// Commit `text` now, dropping any pending keystrokes.
    pub fn change(&self, text: &str) {
        if self.inner.config.disabled {
            return;
        }
        self.inner.debouncer.cancel();
        self.inner.text.set(text.to_owned());
        self.inner.value.set(text.to_owned());
    }

    /// Focus left the field: commit and validate.
    pub fn blur(&self) {
        self.inner.debouncer.flush();
        self.inner.validate();
    }

    fn on_key(&self, event: &DomEvent) {
        if event.key == Some(Key::Enter) {
            self.inner.debouncer.flush();
            self.inner.validate();
        }
    }
}

impl Component for TextField {
    fn name(&self) -> &'static str {
        TextFieldConfig::NAME
    }

    fn view(&self) -> Element {
        let config = &self.inner.config;
        let error = self.inner.error.get();

        let input = {
            let on_input = self.clone();
            let on_change = self.clone();
            let on_blur = self.clone();
            let on_key = self.clone();
            let mut input = Element::new("input")
                .class("weave-input-slot")
                .attr("type", "text")
                .attr("value", self.inner.text.get())
                .attr("aria-invalid", error.to_string())
                .flag("required", config.required)
                .flag("disabled", config.disabled)
                .on(EventKind::Input, move |e| on_input.input(e.value_or_empty()))
                .on(EventKind::Change, move |e| on_change.change(e.value_or_empty()))
                .on(EventKind::Blur, move |_| on_blur.blur())
                .on(EventKind::KeyDown, move |e| on_key.on_key(e));
            if let Some(placeholder) = &config.placeholder {
                input = input.attr("placeholder", placeholder.clone());
            }
            input
        };

        let mut root = Element::new("div").class(
            ClassBuilder::new("weave-input-control")
                .add_if("weave-input-error", error)
                .add_if("weave-disabled", config.disabled)
                .build(),
        );
        if let Some(label) = &config.label {
            root = root.child(Element::new("label").class("weave-input-label").text(label.clone()));
        }
        root = root.child(input);
        if let Some(message) = self.inner.helper.get() {
            root = root.child(
                Element::new("p")
                    .class("weave-input-helper-text weave-error-text")
                    .text(message),
            );
        }
        root
    }

    fn bind(&self, trigger: &RenderTrigger) -> BindingScope {
        let mut scope = BindingScope::new();
        scope
            .hold(trigger.watch(&self.inner.text))
            .hold(trigger.watch(&self.inner.error))
            .hold(trigger.watch(&self.inner.error_text));
        scope
    }

    fn dispose(&self) {
        self.inner.debouncer.dispose();
        self.inner.sync.borrow_mut().take();
        self.inner.text.dispose();
        self.inner.error.dispose();
        self.inner.error_text.dispose();
    }
}
