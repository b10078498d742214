//! Serialization pipeline
//!
//! Orchestrates the round trip between a document and a nested data tree:
//! - extract: compose each eligible field's contribution chain, substitute
//!   its coerced value, and deep-merge the result into one tree
//! - insert: merge each field's sentinel-bearing template into a scratch
//!   workspace to discover the field's true path (array entries collapse
//!   here exactly as they do during extraction), then follow that path into
//!   the caller's data and write the value back
//!
//! A single call processes fields in stable document order; merge outcomes
//! are order-dependent, so reordering fields is an observable change.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::coerce::{coerce, format, CoerceError, TypeTag};
use crate::config::{Options, OptionsOverlay};
use crate::document::{
    contribution_chain, enabled, expand, include_when_empty, resolve_options, select_fields,
    DocumentError, Element, NodePath,
};
use crate::merge::{merge, MergeStrategy};
use crate::path::{follow, locate, set_at, Step};
use crate::template::{compose, TemplateError};

/// Marker substituted for "the value goes here" during path discovery
const SENTINEL: char = '\u{fffc}';

fn sentinel() -> Value {
    Value::String(SENTINEL.to_string())
}

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("coercion error: {0}")]
    Coerce(#[from] CoerceError),

    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    #[error("document error: {0}")]
    Document(#[from] DocumentError),
}

/// How one field maps into the data tree.
///
/// `path` is resolved against the shared workspace, so repeated fields that
/// coalesce into one array entry report the same collapsed indices insert
/// will use. `None` means the field could not be resolved and insertion
/// would skip it.
#[derive(Debug, Serialize)]
pub struct FieldPlan {
    #[serde(skip)]
    node: NodePath,
    /// Diagnostic label of the element
    pub element: String,
    /// The declared name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Composed template in textual form
    pub template: String,
    /// Declared value type
    #[serde(rename = "type")]
    pub value_type: TypeTag,
    /// Resolved path into the data tree
    pub path: Option<Vec<Step>>,
}

/// Extract data from every eligible field under `root`.
pub fn extract(
    root: &Element,
    overrides: Option<&OptionsOverlay>,
) -> Result<Value, PipelineError> {
    let settings = settings_for(overrides);
    let mut data = Value::Object(Map::new());

    for field_path in eligible_fields(root, &settings)? {
        let Some(elem) = root.node(&field_path) else {
            continue;
        };
        let opts = resolve_options(&settings, elem);
        let chain = contribution_chain(root, &field_path);
        let Some(composed) = compose(chain.iter().map(|c| c.name))? else {
            debug!(field = %elem.label(), "field has no name contribution, skipping");
            continue;
        };

        let raw = elem.raw_value();
        if raw.is_empty() && !include_when_empty(&composed, elem, &opts) {
            continue;
        }

        let value = coerce(raw, opts.value_type, &opts.list_format())?;
        merge(&mut data, composed.fill(value), settings.merge);
    }
    Ok(data)
}

/// Insert values from `data` into the document's fields.
///
/// The document is expanded first so repeated fields can hold every array
/// entry. Fields whose path cannot be resolved, or for which the data has
/// no value, are left untouched; one bad field never blocks the rest.
pub fn insert(
    root: &mut Element,
    data: &Value,
    overrides: Option<&OptionsOverlay>,
) -> Result<(), PipelineError> {
    let settings = settings_for(overrides);
    expand(root, data, &settings)?;

    for plan in plan_fields(root, &settings)? {
        let Some(path) = &plan.path else { continue };
        let Some(value) = follow(path, data) else {
            continue;
        };
        let Some(elem) = root.node_mut(&plan.node) else {
            continue;
        };
        let formatted = if elem.is_checkbox() && falsy(value) {
            String::new()
        } else {
            format(value, plan.value_type)
        };
        elem.value = Some(formatted);
    }
    Ok(())
}

/// Report how each eligible field maps into the data tree, without touching
/// any values.
pub fn plan(
    root: &Element,
    overrides: Option<&OptionsOverlay>,
) -> Result<Vec<FieldPlan>, PipelineError> {
    let settings = settings_for(overrides);
    plan_fields(root, &settings)
}

fn settings_for(overrides: Option<&OptionsOverlay>) -> Options {
    match overrides {
        Some(overlay) => Options::default().apply(overlay),
        None => Options::default(),
    }
}

/// Eligible fields in document order: value-bearing, and enabled when the
/// settings restrict to enabled fields.
fn eligible_fields(root: &Element, settings: &Options) -> Result<Vec<NodePath>, DocumentError> {
    let mut fields = Vec::new();
    for path in select_fields(root, settings) {
        if settings.enabled_only && !enabled(root, &path)? {
            continue;
        }
        fields.push(path);
    }
    Ok(fields)
}

/// Resolve every eligible field's true path via the shared workspace.
///
/// Each field's sentinel position is overwritten with its current coerced
/// value immediately, so later fields' safe-merge tests see real data and
/// cannot mistake an occupied slot for their own.
fn plan_fields(root: &Element, settings: &Options) -> Result<Vec<FieldPlan>, PipelineError> {
    let mut workspace = Value::Object(Map::new());
    let mut plans = Vec::new();

    for field_path in eligible_fields(root, settings)? {
        let Some(elem) = root.node(&field_path) else {
            continue;
        };
        let opts = resolve_options(settings, elem);
        let chain = contribution_chain(root, &field_path);
        let Some(composed) = compose(chain.iter().map(|c| c.name))? else {
            debug!(field = %elem.label(), "field has no name contribution, skipping");
            continue;
        };

        merge(&mut workspace, composed.fill(sentinel()), MergeStrategy::Auto);
        let located = locate(&workspace, &sentinel());
        match &located {
            Some(path) => {
                let current = coerce(elem.raw_value(), opts.value_type, &opts.list_format())?;
                set_at(&mut workspace, path, current);
            }
            None => {
                warn!(
                    field = %elem.label(),
                    template = %composed,
                    "value placeholder lost in workspace, skipping field"
                );
            }
        }

        plans.push(FieldPlan {
            node: field_path,
            element: elem.label(),
            name: elem.declared_name().map(str::to_string),
            template: composed.to_string(),
            value_type: opts.value_type,
            path: located,
        });
    }
    Ok(plans)
}

fn falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
