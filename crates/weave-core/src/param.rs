#![forbid(unsafe_code)]

//! Loosely-typed component parameters.
//!
//! Components are mounted with a bag of named values, the way a markup
//! attribute list would hand them over. Each component turns the bag into a
//! typed config struct up front: unknown names and values outside a
//! property's domain are rejected with a structured [`Error`] naming the
//! property and both types, instead of failing later during a render.

use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// A single parameter value.
pub type ParamValue = serde_json::Value;

/// Ordered bag of named parameter values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, ParamValue)>,
}

impl Params {
    /// Create an empty parameter bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object.
    pub fn from_json(value: ParamValue) -> Result<Self> {
        match value {
            ParamValue::Object(map) => Ok(Self {
                entries: map.into_iter().collect(),
            }),
            other => Err(Error::InvalidParameterType {
                property: "<parameters>".into(),
                source_type: json_type_name(&other).into(),
                target_type: "object".into(),
                detail: "parameters must be a JSON object".into(),
            }),
        }
    }

    /// Add or replace a parameter (builder form).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Add or replace a parameter.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Raw value for `name`.
    #[must_use]
    pub fn raw(&self, name: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Typed value for `name`, `None` when absent.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        self.raw(name).map(|v| convert(name, v)).transpose()
    }

    /// Typed value for `name`, or `default` when absent.
    pub fn get_or<T: DeserializeOwned>(&self, name: &str, default: T) -> Result<T> {
        Ok(self.get(name)?.unwrap_or(default))
    }

    /// Typed value that must be present.
    pub fn require<T: DeserializeOwned>(&self, component: &str, name: &str) -> Result<T> {
        self.get(name)?.ok_or_else(|| Error::MissingParameter {
            component: component.into(),
            property: name.into(),
        })
    }

    /// Fail on the first parameter whose name is not in `known`.
    pub fn reject_unknown(&self, component: &str, known: &[&str]) -> Result<()> {
        match self.entries.iter().find(|(n, _)| !known.contains(&n.as_str())) {
            Some((name, _)) => Err(Error::UnknownParameter {
                component: component.into(),
                property: name.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Parameter names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Convert one value into `T`, reporting failures as
/// [`Error::InvalidParameterType`] for `property`.
pub fn convert<T: DeserializeOwned>(property: &str, value: &ParamValue) -> Result<T> {
    serde_json::from_value(value.clone()).map_err(|e| Error::InvalidParameterType {
        property: property.into(),
        source_type: json_type_name(value).into(),
        target_type: short_type_name::<T>(),
        detail: e.to_string(),
    })
}

/// JSON type name of a value.
#[must_use]
pub fn json_type_name(value: &ParamValue) -> &'static str {
    match value {
        ParamValue::Null => "null",
        ParamValue::Bool(_) => "bool",
        ParamValue::Number(_) => "number",
        ParamValue::String(_) => "string",
        ParamValue::Array(_) => "array",
        ParamValue::Object(_) => "object",
    }
}

/// `std::any::type_name` with module paths stripped
/// (`alloc::vec::Vec<alloc::string::String>` becomes `Vec<String>`).
#[must_use]
pub fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    let mut chars = full.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == ':' && chars.peek() == Some(&':') {
            chars.next();
            segment.clear();
        } else if ch.is_alphanumeric() || ch == '_' {
            segment.push(ch);
        } else {
            out.push_str(&segment);
            segment.clear();
            out.push(ch);
        }
    }
    out.push_str(&segment);
    out
}
