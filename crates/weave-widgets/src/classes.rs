#![forbid(unsafe_code)]

//! CSS class composition and the parameter-to-class lookup tables.
//!
//! The tables are literal: a parameter value maps to exactly one class
//! string and nothing is derived beyond what the table lists. Values
//! outside a table are rejected when the component is configured.

use serde::Deserialize;
use weave_core::{Error, Result};

/// Builds a space-separated class attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassBuilder {
    classes: Vec<String>,
}

impl ClassBuilder {
    /// Start from a base class.
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        Self::default().add(base)
    }

    /// Add a class (skips empty strings and duplicates).
    #[must_use]
    pub fn add(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !class.is_empty() && !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    #[must_use]
    pub fn add_if(self, class: impl Into<String>, cond: bool) -> Self {
        if cond { self.add(class) } else { self }
    }

    #[must_use]
    pub fn add_opt(self, class: Option<impl Into<String>>) -> Self {
        match class {
            Some(class) => self.add(class),
            None => self,
        }
    }

    /// Append user-supplied classes verbatim (the `Class` parameter).
    #[must_use]
    pub fn add_user(self, classes: Option<&str>) -> Self {
        classes
            .into_iter()
            .flat_map(str::split_whitespace)
            .fold(self, |b, c| b.add(c))
    }

    #[must_use]
    pub fn build(&self) -> String {
        self.classes.join(" ")
    }
}

/// Horizontal padding preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum Density {
    Dense,
    #[default]
    Normal,
    Comfortable,
}

impl Density {
    #[must_use]
    pub const fn padding_class(self) -> &'static str {
        match self {
            Self::Dense => "px-1",
            Self::Normal => "px-2",
            Self::Comfortable => "px-4",
        }
    }
}

/// Component size preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum Size {
    Small,
    #[default]
    Medium,
    Large,
}

impl Size {
    #[must_use]
    pub const fn class(self) -> &'static str {
        match self {
            Self::Small => "weave-size-small",
            Self::Medium => "weave-size-medium",
            Self::Large => "weave-size-large",
        }
    }
}

/// Gap between children, in spacing units `0..=16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "u8")]
pub struct Spacing(u8);

impl Spacing {
    pub const MAX: u8 = 16;

    pub fn new(units: u8) -> Result<Self> {
        if units > Self::MAX {
            return Err(Error::invalid_config(
                "Spacing",
                format!("gap must be at most {}, got {units}", Self::MAX),
            ));
        }
        Ok(Self(units))
    }

    #[must_use]
    pub const fn units(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn gap_class(self) -> String {
        format!("gap-{}", self.0)
    }
}

impl Default for Spacing {
    fn default() -> Self {
        Self(3)
    }
}

impl TryFrom<u8> for Spacing {
    type Error = Error;

    fn try_from(units: u8) -> Result<Self> {
        Self::new(units)
    }
}
