mod selector;
mod template;

pub use selector::{Selector, SelectorError};
pub use template::{
    collect_references, parse_template, reference, Segment, Template, TemplateError,
};
