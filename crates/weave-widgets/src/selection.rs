#![forbid(unsafe_code)]

//! Selection state shared by a group of sibling items.
//!
//! A [`SelectionSet`] is owned by the parent group (toggle group, radio group,
//! chip set) and shared with every item; items mutate it only through
//! [`SelectionSet::toggle`] and friends.
//!
//! # Invariants
//!
//! 1. In [`SelectionMode::Single`] and [`SelectionMode::Toggle`] at most one
//!    item is selected.
//! 2. The selection keeps click order, not declaration order: clicking 2, 1,
//!    3 displays as `"2, 1, 3"`; removing 1 leaves `"2, 3"`.
//! 3. Every change is a single [`Observable`] update, so each mutation
//!    notifies (and re-renders) exactly once.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Several items for a single-valued set | Caller mirrors a multi set into a single one | `Err(InvalidConfiguration)`, selection unchanged |
//! | Unknown mode string | Bad `SelectionMode` parameter | `Err(InvalidParameterType)` from parameter parsing |

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use serde::Deserialize;
use weave_core::{Error, Result};
use weave_runtime::{Observable, Subscription};

/// How clicks change the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum SelectionMode {
    /// Clicking selects the item, replacing any other. Re-clicking keeps it.
    #[default]
    #[serde(alias = "SingleSelection")]
    Single,
    /// Clicking adds or removes the item.
    #[serde(alias = "MultiSelection")]
    Multi,
    /// Like `Single`, but re-clicking the selected item clears the selection.
    #[serde(alias = "ToggleSelection")]
    Toggle,
}

impl SelectionMode {
    /// Whether at most one item can be selected.
    #[must_use]
    pub const fn is_single_valued(self) -> bool {
        matches!(self, Self::Single | Self::Toggle)
    }
}

/// Ordered selection with a mode policy. Clones share state.
pub struct SelectionSet<K: Clone + PartialEq + 'static> {
    mode: Rc<Cell<SelectionMode>>,
    selected: Observable<Vec<K>>,
}

impl<K: Clone + PartialEq + 'static> Clone for SelectionSet<K> {
    fn clone(&self) -> Self {
        Self {
            mode: Rc::clone(&self.mode),
            selected: self.selected.clone(),
        }
    }
}

impl<K: Clone + PartialEq + fmt::Debug + 'static> fmt::Debug for SelectionSet<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionSet")
            .field("mode", &self.mode())
            .field("selected", &self.selected())
            .finish()
    }
}

impl<K: Clone + PartialEq + 'static> SelectionSet<K> {
    /// Empty selection using `mode`.
    #[must_use]
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode: Rc::new(Cell::new(mode)),
            selected: Observable::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn mode(&self) -> SelectionMode {
        self.mode.get()
    }

    /// Switch policy. Narrowing to a single-valued mode keeps only the most
    /// recently selected item.
    pub fn set_mode(&self, mode: SelectionMode) {
        self.mode.set(mode);
        if mode.is_single_valued() {
            self.selected.update(|items| {
                if items.len() > 1 {
                    let last = items.pop();
                    items.clear();
                    items.extend(last);
                }
            });
        }
    }

    /// Apply a click on `item`. Returns whether `item` is selected afterwards.
    pub fn toggle(&self, item: K) -> bool {
        if self.selected.is_disposed() {
            tracing::trace!("toggle on disposed selection ignored");
            return false;
        }
        let mode = self.mode();
        let mut now_selected = false;
        self.selected.update(|items| match mode {
            SelectionMode::Single => {
                items.clear();
                items.push(item);
                now_selected = true;
            }
            SelectionMode::Toggle => {
                let sole = items.len() == 1 && items[0] == item;
                items.clear();
                if !sole {
                    items.push(item);
                    now_selected = true;
                }
            }
            SelectionMode::Multi => match items.iter().position(|k| *k == item) {
                Some(index) => {
                    items.remove(index);
                }
                None => {
                    items.push(item);
                    now_selected = true;
                }
            },
        });
        tracing::debug!(?mode, now_selected, "selection toggled");
        now_selected
    }

    /// Select `item` regardless of its current state.
    pub fn select(&self, item: K) {
        let single = self.mode().is_single_valued();
        self.selected.update(|items| {
            if single {
                items.clear();
                items.push(item);
            } else if !items.contains(&item) {
                items.push(item);
            }
        });
    }

    /// Deselect `item` if selected.
    pub fn deselect(&self, item: &K) {
        self.selected.update(|items| items.retain(|k| k != item));
    }

    /// Remove every item.
    pub fn clear(&self) {
        self.selected.set(Vec::new());
    }

    /// Replace the whole selection, e.g. when mirroring another set.
    pub fn set_selected(&self, items: Vec<K>) -> Result<()> {
        if self.mode().is_single_valued() && items.len() > 1 {
            return Err(Error::invalid_config(
                "SelectionSet",
                format!(
                    "{:?} mode holds at most one item, got {}",
                    self.mode(),
                    items.len()
                ),
            ));
        }
        let mut deduped: Vec<K> = Vec::with_capacity(items.len());
        for item in items {
            if !deduped.contains(&item) {
                deduped.push(item);
            }
        }
        self.selected.set(deduped);
        Ok(())
    }

    #[must_use]
    pub fn is_selected(&self, item: &K) -> bool {
        self.selected.with(|items| items.contains(item))
    }

    /// Selected items in click order.
    #[must_use]
    pub fn selected(&self) -> Vec<K> {
        self.selected.get()
    }

    /// First selected item (the only one in single-valued modes).
    #[must_use]
    pub fn first(&self) -> Option<K> {
        self.selected.with(|items| items.first().cloned())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.selected.with(Vec::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Join the selection in click order.
    #[must_use]
    pub fn display_text(&self, separator: &str) -> String
    where
        K: fmt::Display,
    {
        self.selected.with(|items| {
            items
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(separator)
        })
    }

    /// Notified with the full selection after every change.
    pub fn subscribe(&self, callback: impl Fn(&Vec<K>) + 'static) -> Subscription {
        self.selected.subscribe(callback)
    }

    /// Underlying cell, for render triggers and bindings.
    #[must_use]
    pub fn observable(&self) -> &Observable<Vec<K>> {
        &self.selected
    }

    /// Stop notifying; later mutations are ignored.
    pub fn dispose(&self) {
        self.selected.dispose();
    }
}
