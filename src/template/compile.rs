//! Field name compiler
//!
//! Converts a declarative name string into a path template. The name format
//! is a hybrid of key-value-coding dot paths and PHP-style array brackets:
//!
//! - `foo`          → `{"foo":$$$}`
//! - `foo.bar`      → `{"foo":{"bar":$$$}}`
//! - `[]`           → `[$$$]`
//! - `list[]`       → `{"list":[$$$]}`
//! - `foo[bar]`     → `{"foo":{"bar":$$$}}`
//! - `foo[bar].baz[]` → `{"foo":{"bar":{"baz":[$$$]}}}`

use regex_lite::Regex;
use serde_json::Value;

use super::{parse_template, Template, TemplateError, PLACEHOLDER};

/// Compile a name string into a path template.
///
/// An empty or whitespace-only name contributes nothing. A name already in
/// textual template form (it contains the placeholder token) is parsed as
/// one instead of tokenized, the escape hatch for manually authored
/// templates.
pub fn compile_name(name: &str) -> Result<Option<Template>, TemplateError> {
    if name.is_empty() {
        return Ok(None);
    }
    if name.contains(PLACEHOLDER) {
        return parse_template(name).map(Some);
    }

    let ws_brackets = Regex::new(r"\[\s+\]").unwrap();
    let keyed_brackets = Regex::new(r"\[([^\]]+)\]").unwrap();
    let parts_re = Regex::new(r"[^\[\].]+|\[\]").unwrap();

    let name = name.trim();
    let name = ws_brackets.replace_all(name, "[]");
    let name = keyed_brackets.replace_all(&name, ".$1");

    let parts: Vec<&str> = parts_re.find_iter(&name).map(|m| m.as_str()).collect();
    if parts.is_empty() {
        return Ok(None);
    }

    // Fold innermost-first so the first part ends up outermost, directly
    // mirroring repeated substitution at the placeholder.
    let mut template = Template::Slot;
    for part in parts.iter().rev() {
        let part = part.trim();
        template = if part == "[]" {
            Template::Item(Box::new(template))
        } else {
            let key = if part.is_empty() { "undefined" } else { part };
            Template::Key(key.to_string(), Box::new(template))
        };
    }
    Ok(Some(template))
}

/// Compose a contribution chain, leaf first, into a single template.
///
/// Each named contribution wraps the current result; entries without a name
/// are transparent. `None` when nothing in the chain contributes a name.
pub fn compose<'a, I>(names: I) -> Result<Option<Template>, TemplateError>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut composed: Option<Template> = None;
    for name in names {
        let Some(name) = name else { continue };
        let Some(template) = compile_name(name)? else {
            continue;
        };
        composed = Some(match composed {
            Some(inner) => template.substitute(inner),
            None => template,
        });
    }
    Ok(composed)
}

/// Compose a contribution chain with a concrete value in the slot.
pub fn compose_value<'a, I>(names: I, value: Value) -> Result<Option<Value>, TemplateError>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    Ok(compose(names)?.map(|template| template.fill(value)))
}
