use std::collections::HashSet;

use serde_json::Value;

use crate::expressions::{collect_references, parse_template, reference};
use crate::validate::validator::{Validator, NAME_RE};
use crate::values::Input;

pub(crate) fn validate_reference(v: &mut Validator, path: &str, name: &str) {
    if let Err(e) = parse_template(&reference(name)) {
        v.push(path, format!("invalid context reference: {e}"));
    }
}

pub(crate) fn validate_value_templates(v: &mut Validator, path: &str, value: &Value) {
    let mut refs = std::collections::BTreeSet::new();
    if let Err(e) = collect_references(value, &mut refs) {
        v.push(path, format!("invalid template: {e}"));
    }
}

pub(crate) fn validate_inputs(v: &mut Validator, path: &str, inputs: &[Input]) {
    let mut names = HashSet::new();
    for input in inputs {
        let ipath = format!("{path}.{}", input.name());
        if !NAME_RE.is_match(input.name()) {
            v.push(&ipath, "name must match regex [A-Za-z0-9_]+");
        }
        if !names.insert(input.name()) {
            v.push(&ipath, "must be unique within the document");
        }
        if let Some(default) = input.default() {
            if let Err(e) = input.validate_value(default) {
                v.push(format!("{ipath}.default"), e.to_string());
            }
        }
        if (input.min_items().is_some() || input.max_items().is_some())
            && !input.data_type().is_list()
        {
            v.push(&ipath, "minItems/maxItems only apply to list types");
        }
        if let (Some(min), Some(max)) = (input.min_items(), input.max_items()) {
            if min > max {
                v.push(&ipath, "minItems must not exceed maxItems");
            }
        }
    }
}
