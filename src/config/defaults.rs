//! Built-in option defaults (layer 1)

use super::options::{EmptyPolicy, ExpandPolicy, IncludePolicy, Options, Role};
use crate::coerce::TypeTag;
use crate::merge::MergeStrategy;

impl Default for Options {
    fn default() -> Self {
        Self {
            empty: EmptyPolicy::Auto,
            role: Role::Field,
            value_type: TypeTag::Auto,
            enabled_only: true,
            merge: MergeStrategy::Auto,
            include: IncludePolicy::Auto,
            expand: ExpandPolicy::Auto,
            separator: None,
            trim: true,
        }
    }
}
