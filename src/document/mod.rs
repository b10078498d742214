//! Headless document model
//!
//! An in-memory element tree standing in for whatever surface actually hosts
//! the fields. The pipeline only sees this model: ordered field discovery,
//! per-field contribution chains, raw value access, and the enablement and
//! empty-inclusion policies.

mod expand;

pub use expand::expand;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{EmptyPolicy, IncludePolicy, Options, OptionsOverlay, Role};
use crate::template::Template;

/// One node of the element tree.
///
/// `name` carries the declarative path contribution; `kind` describes the
/// widget an element stands for (`"checkbox"` gets special empty-value
/// treatment); `value` is the raw string value of a field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Element {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opts: Option<OptionsOverlay>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
}

/// Position of an element under a root, as child indices
pub type NodePath = Vec<usize>;

/// A contribution chain entry: the name and declared options of one
/// element, leaf first
#[derive(Debug, Clone)]
pub struct Contribution<'a> {
    pub name: Option<&'a str>,
    pub opts: Option<&'a OptionsOverlay>,
}

/// Document errors
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("no toggle element found for toggleable {0:?}")]
    NoToggle(String),
    #[error("multiple toggle elements found for toggleable {0:?}")]
    MultipleToggles(String),
}

impl Element {
    /// The element at a child-index path under this one.
    pub fn node(&self, path: &[usize]) -> Option<&Element> {
        let mut node = self;
        for &index in path {
            node = node.children.get(index)?;
        }
        Some(node)
    }

    /// Mutable access to the element at a child-index path.
    pub fn node_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let mut node = self;
        for &index in path {
            node = node.children.get_mut(index)?;
        }
        Some(node)
    }

    /// The raw string value of this element; absent values read as empty.
    pub fn raw_value(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }

    /// The declared name, treating an empty string as undeclared.
    pub fn declared_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }

    /// Whether this element declares any options.
    pub fn has_opts(&self) -> bool {
        self.opts.is_some()
    }

    /// A short label for diagnostics.
    pub fn label(&self) -> String {
        self.id
            .clone()
            .or_else(|| self.name.clone())
            .unwrap_or_else(|| "<anonymous>".to_string())
    }

    pub(crate) fn is_checkbox(&self) -> bool {
        self.kind.as_deref() == Some("checkbox")
    }
}

/// Resolve the effective options for one element: the operation settings
/// with the element's own declared options on top.
pub fn resolve_options(settings: &Options, elem: &Element) -> Options {
    match &elem.opts {
        Some(overlay) => settings.apply(overlay),
        None => settings.clone(),
    }
}

/// Select the field elements under a root, in document order.
///
/// A field is a named descendant that can hold a value: it carries a value
/// or declares a widget kind, or it is a leaf. The per-element include
/// policy can force either way. The root itself is never a field, though
/// its name still contributes to chains.
pub fn select_fields(root: &Element, settings: &Options) -> Vec<NodePath> {
    let mut fields = Vec::new();
    collect_fields(root, settings, &mut Vec::new(), &mut fields);
    fields
}

fn collect_fields(
    elem: &Element,
    settings: &Options,
    path: &mut NodePath,
    fields: &mut Vec<NodePath>,
) {
    if !path.is_empty() && elem.declared_name().is_some() && has_value_slot(elem, settings) {
        fields.push(path.clone());
    }
    for (index, child) in elem.children.iter().enumerate() {
        path.push(index);
        collect_fields(child, settings, path, fields);
        path.pop();
    }
}

/// Whether an element could receive or produce a value.
pub fn has_value_slot(elem: &Element, settings: &Options) -> bool {
    match resolve_options(settings, elem).include {
        IncludePolicy::Always => true,
        IncludePolicy::Never => false,
        IncludePolicy::Auto => {
            elem.value.is_some() || elem.kind.is_some() || elem.children.is_empty()
        }
    }
}

/// The contribution chain for an element: the `(name, options)` pairs from
/// the element itself up to the root, inclusive, skipping elements that
/// declare neither.
pub fn contribution_chain<'a>(root: &'a Element, path: &[usize]) -> Vec<Contribution<'a>> {
    let mut chain = Vec::new();
    for depth in (0..=path.len()).rev() {
        let Some(elem) = root.node(&path[..depth]) else {
            continue;
        };
        let name = elem.declared_name();
        if name.is_some() || elem.has_opts() {
            chain.push(Contribution {
                name,
                opts: elem.opts.as_ref(),
            });
        }
    }
    chain
}

/// Whether an element is eligible by enablement: no ancestor toggleable is
/// switched off.
pub fn enabled(root: &Element, path: &[usize]) -> Result<bool, DocumentError> {
    for depth in (0..path.len()).rev() {
        let Some(elem) = root.node(&path[..depth]) else {
            continue;
        };
        if elem.declared_name().is_none() && !elem.has_opts() {
            continue;
        }
        let role = resolve_options(&Options::default(), elem).role;
        if role == Role::Toggleable && !toggled(elem)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// The switch state of a toggleable element.
///
/// Taken from its single descendant with role `toggle` whose nearest
/// toggleable ancestor is this element; zero or several such descendants is
/// an error.
pub fn toggled(toggleable: &Element) -> Result<bool, DocumentError> {
    let mut candidates = Vec::new();
    collect_toggles(toggleable, &mut Vec::new(), toggleable, &mut candidates);

    match candidates.len() {
        0 => Err(DocumentError::NoToggle(toggleable.label())),
        1 => Ok(!candidates[0].raw_value().is_empty()),
        _ => Err(DocumentError::MultipleToggles(toggleable.label())),
    }
}

fn collect_toggles<'a>(
    elem: &'a Element,
    path: &mut NodePath,
    toggleable: &'a Element,
    candidates: &mut Vec<&'a Element>,
) {
    for (index, child) in elem.children.iter().enumerate() {
        path.push(index);
        let role = resolve_options(&Options::default(), child).role;
        if role == Role::Toggle && nearest_toggleable_is_root(toggleable, path) {
            candidates.push(child);
        }
        collect_toggles(child, path, toggleable, candidates);
        path.pop();
    }
}

/// Whether the first named-or-opted ancestor with role toggleable, walking
/// up from the element's parent, is the root itself.
fn nearest_toggleable_is_root(root: &Element, path: &[usize]) -> bool {
    for depth in (0..path.len()).rev() {
        let Some(elem) = root.node(&path[..depth]) else {
            continue;
        };
        if elem.declared_name().is_none() && !elem.has_opts() {
            continue;
        }
        if resolve_options(&Options::default(), elem).role == Role::Toggleable {
            return depth == 0;
        }
    }
    // No toggleable between the element and the root; the root is nearest.
    true
}

/// Decide whether a field's empty value should still contribute to output.
pub fn include_when_empty(composed: &Template, elem: &Element, opts: &Options) -> bool {
    match opts.empty {
        EmptyPolicy::Include => true,
        EmptyPolicy::Omit => false,
        EmptyPolicy::Auto => {
            if elem.required {
                true
            } else if composed.has_array_slot() {
                false
            } else {
                !elem.is_checkbox()
            }
        }
    }
}
