//! Option types and overlay resolution

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::coerce::{ListFormat, TypeTag};
use crate::merge::MergeStrategy;

/// Whether a field with a falsy value still contributes to output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyPolicy {
    /// Detect the best choice based on the element
    #[default]
    Auto,
    /// Include the value in the output
    Include,
    /// Do not add the field at all
    Omit,
}

/// The part an element plays in serialization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A value-contributing field
    #[default]
    Field,
    /// A checkbox-like element that switches its nearest toggleable ancestor
    Toggle,
    /// A container of fields that can be switched on or off
    Toggleable,
}

/// Whether an element is considered for value extraction/insertion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncludePolicy {
    #[default]
    Auto,
    Always,
    Never,
}

/// Whether insertion may grow the document to fit array data
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpandPolicy {
    #[default]
    Auto,
    Never,
}

/// Fully resolved options for one element or operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub empty: EmptyPolicy,
    pub role: Role,
    #[serde(rename = "type")]
    pub value_type: TypeTag,
    pub enabled_only: bool,
    pub merge: MergeStrategy,
    pub include: IncludePolicy,
    pub expand: ExpandPolicy,
    pub separator: Option<String>,
    pub trim: bool,
}

impl Options {
    /// Produce a new set of options with the overlay's declared values
    /// taking precedence.
    pub fn apply(&self, overlay: &OptionsOverlay) -> Options {
        let mut resolved = self.clone();
        if let Some(empty) = overlay.empty {
            resolved.empty = empty;
        }
        if let Some(role) = overlay.role {
            resolved.role = role;
        }
        if let Some(value_type) = overlay.value_type {
            resolved.value_type = value_type;
        }
        if let Some(enabled_only) = overlay.enabled_only {
            resolved.enabled_only = enabled_only;
        }
        if let Some(merge) = overlay.merge {
            resolved.merge = merge;
        }
        if let Some(include) = overlay.include {
            resolved.include = include;
        }
        if let Some(expand) = overlay.expand {
            resolved.expand = expand;
        }
        if let Some(separator) = &overlay.separator {
            resolved.separator = Some(separator.clone());
        }
        if let Some(trim) = overlay.trim {
            resolved.trim = trim;
        }
        resolved
    }

    /// List splitting/joining settings for coercion
    pub fn list_format(&self) -> ListFormat {
        ListFormat {
            separator: self.separator.clone(),
            trim: self.trim,
        }
    }
}

/// A partial set of options contributed by one layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionsOverlay {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empty: Option<EmptyPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<TypeTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge: Option<MergeStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<IncludePolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expand: Option<ExpandPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trim: Option<bool>,
}

impl OptionsOverlay {
    /// Parse an overlay from a JSON object, e.g. an element's declared
    /// options. Unknown keys are ignored; unknown enum values are errors.
    pub fn from_value(value: Value) -> Result<Self, OptionsError> {
        serde_json::from_value(value).map_err(|e| OptionsError::Parse(e.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        *self == OptionsOverlay::default()
    }
}

/// Options errors
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("invalid options: {0}")]
    Parse(String),
}
