//! Path templates
//!
//! A path template is a nested-structure skeleton with exactly one value
//! placeholder. Templates are modeled as a tagged variant rather than a
//! placeholder-bearing string, so substitution and rendering are structural
//! recursion with no sentinel-escaping edge cases. The textual form
//! (`{"person":[{"name":$$$}]}`) is still parsed and printed, keeping
//! manually authored templates working.

mod compile;

pub use compile::{compile_name, compose, compose_value};

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::path::Step;

/// A nested-structure skeleton with exactly one value slot.
///
/// `Key` and `Item` each hold exactly one child, so the single-slot
/// invariant holds by construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Template {
    /// The value goes here
    Slot,
    /// An object wrapping with a single key
    Key(String, Box<Template>),
    /// An array wrapping with a single element
    Item(Box<Template>),
}

/// Placeholder token used by the textual template form
pub const PLACEHOLDER: &str = "$$$";

/// Template errors
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("malformed template near byte {0} in {1:?}")]
    Malformed(usize, String),
}

impl Template {
    /// Replace this template's slot with another template.
    ///
    /// Composing a contribution chain is repeated substitution: the current
    /// result is substituted into each successive ancestor's template,
    /// nesting outward.
    pub fn substitute(self, inner: Template) -> Template {
        match self {
            Template::Slot => inner,
            Template::Key(key, child) => {
                Template::Key(key, Box::new(child.substitute(inner)))
            }
            Template::Item(child) => Template::Item(Box::new(child.substitute(inner))),
        }
    }

    /// Build the literal tree with `value` in place of the slot.
    pub fn fill(&self, value: Value) -> Value {
        match self {
            Template::Slot => value,
            Template::Key(key, child) => {
                let mut map = serde_json::Map::new();
                map.insert(key.clone(), child.fill(value));
                Value::Object(map)
            }
            Template::Item(child) => Value::Array(vec![child.fill(value)]),
        }
    }

    /// Whether the slot sits directly inside an array (`[$$$]` textually).
    ///
    /// Fields shaped this way contribute "next array slot" entries; the
    /// empty-value policy and document expansion both key off this.
    pub fn has_array_slot(&self) -> bool {
        match self {
            Template::Slot => false,
            Template::Item(child) => matches!(**child, Template::Slot) || child.has_array_slot(),
            Template::Key(_, child) => child.has_array_slot(),
        }
    }

    /// The access path from the template root down to the slot.
    pub fn slot_path(&self) -> Vec<Step> {
        let mut path = Vec::new();
        let mut current = self;
        loop {
            match current {
                Template::Slot => return path,
                Template::Key(key, child) => {
                    path.push(Step::Key(key.clone()));
                    current = child;
                }
                Template::Item(child) => {
                    path.push(Step::Index(0));
                    current = child;
                }
            }
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Template::Slot => f.write_str(PLACEHOLDER),
            Template::Key(key, child) => {
                let quoted = serde_json::to_string(key).map_err(|_| fmt::Error)?;
                write!(f, "{{{}:{}}}", quoted, child)
            }
            Template::Item(child) => write!(f, "[{}]", child),
        }
    }
}

/// Parse the textual template form.
pub fn parse_template(text: &str) -> Result<Template, TemplateError> {
    let mut parser = Parser { text, pos: 0 };
    parser.skip_ws();
    let template = parser.template()?;
    parser.skip_ws();
    if parser.pos != text.len() {
        return Err(parser.malformed());
    }
    Ok(template)
}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.text.len() - trimmed.len();
    }

    fn malformed(&self) -> TemplateError {
        TemplateError::Malformed(self.pos, self.text.to_string())
    }

    fn expect(&mut self, ch: char) -> Result<(), TemplateError> {
        if self.rest().starts_with(ch) {
            self.pos += ch.len_utf8();
            Ok(())
        } else {
            Err(self.malformed())
        }
    }

    fn template(&mut self) -> Result<Template, TemplateError> {
        if self.rest().starts_with(PLACEHOLDER) {
            self.pos += PLACEHOLDER.len();
            return Ok(Template::Slot);
        }
        if self.rest().starts_with('{') {
            self.pos += 1;
            self.skip_ws();
            let key = self.string()?;
            self.skip_ws();
            self.expect(':')?;
            self.skip_ws();
            let child = self.template()?;
            self.skip_ws();
            self.expect('}')?;
            return Ok(Template::Key(key, Box::new(child)));
        }
        if self.rest().starts_with('[') {
            self.pos += 1;
            self.skip_ws();
            let child = self.template()?;
            self.skip_ws();
            self.expect(']')?;
            return Ok(Template::Item(Box::new(child)));
        }
        Err(self.malformed())
    }

    /// Parse a JSON string literal for an object key.
    fn string(&mut self) -> Result<String, TemplateError> {
        let start = self.pos;
        let rest = self.rest();
        if !rest.starts_with('"') {
            return Err(self.malformed());
        }
        let bytes = rest.as_bytes();
        let mut i = 1;
        while i < bytes.len() {
            match bytes[i] {
                b'\\' => i += 2,
                b'"' => {
                    let literal = &rest[..i + 1];
                    self.pos = start + i + 1;
                    return serde_json::from_str(literal)
                        .map_err(|_| TemplateError::Malformed(start, self.text.to_string()));
                }
                _ => i += 1,
            }
        }
        Err(self.malformed())
    }
}
