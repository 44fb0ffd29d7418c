//! Parsers turning feature and Ruby step files into the node model.

mod blocks;
pub mod feature;
pub mod hook;
pub mod nested_steps;
pub mod step_definition;

pub use feature::parse_feature;
pub use hook::{parse_hooks, parse_tag_filters};
pub use nested_steps::{classify_line, closes_literal, resolve_nested_steps, LineClass};
pub use step_definition::{parse_parameters, parse_step_definitions};
