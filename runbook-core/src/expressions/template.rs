use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// `Name`, `Step.Output`, or a `prefix:VARIABLE` built-in such as `global:ACCOUNT_ID`.
static REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_]+(?:[.:][A-Za-z0-9_]+)?$").expect("valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Reference(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub segments: Vec<Segment>,
}

impl Template {
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Reference(r) => Some(r.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// The reference when the whole template is exactly one `{{ ref }}`.
    pub fn single_reference(&self) -> Option<&str> {
        match self.segments.as_slice() {
            [Segment::Reference(r)] => Some(r),
            _ => None,
        }
    }
}

/// Wire-format reference to a context value: `{{ name }}`.
pub fn reference(name: &str) -> String {
    format!("{{{{ {name} }}}}")
}

pub fn parse_template(input: &str) -> Result<Template, TemplateError> {
    let mut segments = Vec::new();
    let mut rest = input;

    while let Some(start) = rest.find("{{") {
        let (literal, tail) = rest.split_at(start);
        let tail = &tail[2..];
        let end = tail.find("}}").ok_or(TemplateError::Unclosed)?;
        let inner = tail[..end].trim();
        if !REFERENCE_RE.is_match(inner) {
            return Err(TemplateError::InvalidReference(inner.to_string()));
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal.to_string()));
        }
        segments.push(Segment::Reference(inner.to_string()));
        rest = &tail[end + 2..];
    }

    if !rest.is_empty() {
        segments.push(Segment::Literal(rest.to_string()));
    }

    Ok(Template { segments })
}

/// Collect every reference used anywhere inside `value`.
pub fn collect_references(value: &Value, out: &mut BTreeSet<String>) -> Result<(), TemplateError> {
    match value {
        Value::Null | Value::Bool(_) | Value::Number(_) => Ok(()),
        Value::String(s) => {
            let tpl = parse_template(s)?;
            out.extend(tpl.references().map(str::to_string));
            Ok(())
        }
        Value::Array(items) => {
            for item in items {
                collect_references(item, out)?;
            }
            Ok(())
        }
        Value::Object(map) => {
            for v in map.values() {
                collect_references(v, out)?;
            }
            Ok(())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("unclosed reference (missing '}}}}')")]
    Unclosed,
    #[error("invalid reference {0:?} (expected Name or Step.Output)")]
    InvalidReference(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_mixed_template() {
        let tpl = parse_template("i-{{ InstanceId }}/{{Describe.State}}").unwrap();
        assert_eq!(
            tpl.segments,
            vec![
                Segment::Literal("i-".to_string()),
                Segment::Reference("InstanceId".to_string()),
                Segment::Literal("/".to_string()),
                Segment::Reference("Describe.State".to_string()),
            ]
        );
        assert_eq!(tpl.single_reference(), None);
    }

    #[test]
    fn single_reference_is_detected() {
        let tpl = parse_template("{{ global:ACCOUNT_ID }}").unwrap();
        assert_eq!(tpl.single_reference(), Some("global:ACCOUNT_ID"));
    }

    #[test]
    fn single_braces_are_literal() {
        let tpl = parse_template(r#"{"a": 1}"#).unwrap();
        assert!(tpl.references().next().is_none());
    }

    #[test]
    fn rejects_unclosed_and_malformed() {
        assert_eq!(parse_template("{{ Name"), Err(TemplateError::Unclosed));
        assert!(matches!(
            parse_template("{{ a b }}"),
            Err(TemplateError::InvalidReference(_))
        ));
    }

    #[test]
    fn collects_nested_references() {
        let mut refs = BTreeSet::new();
        collect_references(
            &json!({"Ids": ["{{ InstanceId }}"], "Filter": {"Name": "{{ Tag.Key }}"}}),
            &mut refs,
        )
        .unwrap();
        assert_eq!(
            refs.into_iter().collect::<Vec<_>>(),
            vec!["InstanceId".to_string(), "Tag.Key".to_string()]
        );
    }

    #[test]
    fn reference_renders_wire_syntax() {
        assert_eq!(reference("Role"), "{{ Role }}");
    }
}
