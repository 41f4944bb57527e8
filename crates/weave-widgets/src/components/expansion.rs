#![forbid(unsafe_code)]

//! Expansion panels: a stack of collapsible sections.
//!
//! Each panel is a [`Disclosure`]. Unless `MultiExpansion` is set, all panels
//! join one [`ExclusiveGroup`], so expanding one collapses the rest.

use std::rc::Rc;

use serde::Deserialize;
use weave_core::{Element, Error, EventKind, Params, Result};
use weave_runtime::{AppContext, BindingScope, RenderTrigger};

use crate::Component;
use crate::classes::ClassBuilder;
use crate::disclosure::{Disclosure, DisclosureConfig, ExclusiveGroup};

/// One panel as declared in the `Panels` parameter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct PanelItem {
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub expanded: bool,
    #[serde(default)]
    pub disabled: bool,
}

impl PanelItem {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    #[must_use]
    pub fn expanded(mut self, expanded: bool) -> Self {
        self.expanded = expanded;
        self
    }

    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// Typed parameters of [`ExpansionPanels`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExpansionPanelsConfig {
    pub multi_expansion: bool,
    pub panels: Vec<PanelItem>,
}

impl ExpansionPanelsConfig {
    const NAME: &'static str = "ExpansionPanels";
    const PARAMS: &'static [&'static str] = &["MultiExpansion", "Panels"];

    pub fn from_params(params: &Params) -> Result<Self> {
        params.reject_unknown(Self::NAME, Self::PARAMS)?;
        let config = Self {
            multi_expansion: params.get_or("MultiExpansion", false)?,
            panels: params.get_or("Panels", Vec::new())?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let expanded = self.panels.iter().filter(|p| p.expanded).count();
        if !self.multi_expansion && expanded > 1 {
            return Err(Error::invalid_config(
                Self::NAME,
                format!("{expanded} panels start expanded without MultiExpansion"),
            ));
        }
        Ok(())
    }
}

struct Panel {
    item: PanelItem,
    disclosure: Disclosure,
}

struct Inner {
    multi_expansion: bool,
    group: Option<ExclusiveGroup>,
    panels: Vec<Panel>,
}

/// Collapsible panels. Clones share state.
#[derive(Clone)]
pub struct ExpansionPanels {
    inner: Rc<Inner>,
}

impl ExpansionPanels {
    pub fn new(config: ExpansionPanelsConfig, ctx: &AppContext) -> Result<Self> {
        config.validate()?;
        let group = (!config.multi_expansion).then(ExclusiveGroup::new);
        let panels = config
            .panels
            .into_iter()
            .map(|item| {
                let disclosure = Disclosure::new(
                    DisclosureConfig::default().initially_open(item.expanded),
                    ctx,
                );
                if let Some(group) = &group {
                    disclosure.join(group);
                }
                Panel { item, disclosure }
            })
            .collect();
        Ok(Self {
            inner: Rc::new(Inner {
                multi_expansion: config.multi_expansion,
                group,
                panels,
            }),
        })
    }

    pub fn from_params(params: &Params, ctx: &AppContext) -> Result<Self> {
        Self::new(ExpansionPanelsConfig::from_params(params)?, ctx)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.panels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.panels.is_empty()
    }

    /// Disclosure of the panel at `index`.
    #[must_use]
    pub fn panel(&self, index: usize) -> Option<&Disclosure> {
        self.inner.panels.get(index).map(|p| &p.disclosure)
    }

    /// Indices of expanded panels.
    #[must_use]
    pub fn expanded(&self) -> Vec<usize> {
        self.inner
            .panels
            .iter()
            .enumerate()
            .filter(|(_, p)| p.disclosure.is_open())
            .map(|(i, _)| i)
            .collect()
    }

    /// Header click on panel `index`. Disabled panels ignore it.
    pub fn toggle(&self, index: usize) {
        match self.inner.panels.get(index) {
            Some(panel) if !panel.item.disabled => panel.disclosure.toggle_open(),
            Some(_) => tracing::trace!(index, "toggle on disabled panel ignored"),
            None => tracing::trace!(index, "toggle on missing panel ignored"),
        }
    }

    /// Expand every panel. Only valid with `MultiExpansion`.
    pub fn expand_all(&self) -> Result<()> {
        if !self.inner.multi_expansion {
            return Err(Error::invalid_config(
                ExpansionPanelsConfig::NAME,
                "expand_all requires MultiExpansion",
            ));
        }
        for panel in self.inner.panels.iter().filter(|p| !p.item.disabled) {
            panel.disclosure.open();
        }
        Ok(())
    }

    pub fn collapse_all(&self) {
        match &self.inner.group {
            Some(group) => group.close_all(),
            None => self.inner.panels.iter().for_each(|p| p.disclosure.close()),
        }
    }
}

impl Component for ExpansionPanels {
    fn name(&self) -> &'static str {
        ExpansionPanelsConfig::NAME
    }

    fn view(&self) -> Element {
        let panels = self.inner.panels.iter().enumerate().map(|(index, panel)| {
            let open = panel.disclosure.is_open();
            let this = self.clone();
            let header = Element::new("button")
                .class("weave-expand-panel-header")
                .attr("type", "button")
                .attr("aria-expanded", open.to_string())
                .flag("disabled", panel.item.disabled)
                .text(panel.item.title.clone())
                .on(EventKind::Click, move |_| this.toggle(index));
            let mut el = Element::new("div")
                .class(
                    ClassBuilder::new("weave-expand-panel")
                        .add_if("weave-panel-expanded", open)
                        .add_if("weave-panel-disabled", panel.item.disabled)
                        .build(),
                )
                .attr("data-index", index.to_string())
                .child(header);
            if open {
                el = el.child(
                    Element::new("div")
                        .class("weave-expand-panel-content")
                        .text(panel.item.text.clone()),
                );
            }
            el
        });
        Element::new("div")
            .class("weave-expansion-panels")
            .children(panels)
    }

    fn bind(&self, trigger: &RenderTrigger) -> BindingScope {
        let mut scope = BindingScope::new();
        for panel in &self.inner.panels {
            scope.hold(trigger.watch(panel.disclosure.observable()));
        }
        scope
    }

    fn dispose(&self) {
        for panel in &self.inner.panels {
            panel.disclosure.dispose();
        }
    }
}
