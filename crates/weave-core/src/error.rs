#![forbid(unsafe_code)]

//! Error type shared by every Weave crate.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Bad parameter type | Enum cell given an unknown string, wrong JSON type | `InvalidParameterType` returned to the caller |
//! | Unknown parameter | Typo in a parameter name | `UnknownParameter` at construction |
//! | Misconfiguration | Out-of-table spacing, multi-item selection in single mode | `InvalidConfiguration` |
//! | Use after dispose | Late timer or event after unmount | Not an error: silent no-op |
//! | Validation failure | Required field left empty | Not an error: modeled as component state |

/// Result alias using the shared [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised by Weave.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A parameter value could not be converted into the property's type.
    #[error(
        "unable to set property '{property}': source type '{source_type}' is not assignable to '{target_type}' ({detail})"
    )]
    InvalidParameterType {
        /// Name of the property being assigned.
        property: String,
        /// Type of the supplied value (JSON type name).
        source_type: String,
        /// Declared type of the property.
        target_type: String,
        /// Conversion message.
        detail: String,
    },

    /// A parameter was supplied that the component does not declare.
    #[error("component '{component}' has no parameter named '{property}'")]
    UnknownParameter {
        /// Component receiving the parameter.
        component: String,
        /// The unrecognized name.
        property: String,
    },

    /// A required parameter was not supplied.
    #[error("component '{component}' requires parameter '{property}'")]
    MissingParameter {
        /// Component being constructed.
        component: String,
        /// The missing name.
        property: String,
    },

    /// A combination of parameters or a state change is outside the allowed domain.
    #[error("invalid configuration for '{component}': {reason}")]
    InvalidConfiguration {
        /// Component or coordinator being configured.
        component: String,
        /// What is wrong.
        reason: String,
    },

    /// A selector string could not be parsed.
    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector {
        /// The selector as written.
        selector: String,
        /// Parse failure.
        reason: String,
    },

    /// No element in the rendered tree matched a selector.
    #[error("no element matches '{selector}'")]
    ElementNotFound {
        /// The selector as written.
        selector: String,
    },

    /// An event was dispatched to an element that does not handle it.
    #[error("element '{element}' has no '{event}' handler")]
    NoHandler {
        /// Short description of the element.
        element: String,
        /// Event name.
        event: String,
    },

    /// Runtime configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Shorthand for [`Error::InvalidConfiguration`].
    pub fn invalid_config(component: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            component: component.into(),
            reason: reason.into(),
        }
    }
}
