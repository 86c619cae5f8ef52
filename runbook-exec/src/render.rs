//! Resolve `{{ ref }}` templates in step inputs against the execution context.

use runbook_core::expressions::{parse_template, Segment};
use serde_json::Value;

use crate::context::Scope;
use crate::error::StepError;

/// Render every template inside `value`.
///
/// A string that is exactly one reference becomes the referenced value with
/// its type preserved. Mixed text renders to a string.
pub fn render_value<S: Scope + ?Sized>(value: &Value, scope: &S) -> Result<Value, StepError> {
    match value {
        Value::String(s) => render_str(s, scope),
        Value::Array(items) => items
            .iter()
            .map(|v| render_value(v, scope))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                out.insert(k.clone(), render_value(v, scope)?);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other.clone()),
    }
}

fn render_str<S: Scope + ?Sized>(s: &str, scope: &S) -> Result<Value, StepError> {
    let template = parse_template(s).map_err(|e| StepError::non_retriable(e.to_string()))?;
    if let Some(name) = template.single_reference() {
        return scope.lookup(name).ok_or_else(|| StepError::MissingInput(name.to_string()));
    }

    let mut out = String::with_capacity(s.len());
    for segment in &template.segments {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Reference(name) => {
                let value = scope.lookup(name).ok_or_else(|| StepError::MissingInput(name.clone()))?;
                out.push_str(&display(&value));
            }
        }
    }
    Ok(Value::String(out))
}

/// Text form of a value spliced into a larger string.
pub fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scope() -> serde_json::Map<String, Value> {
        let mut m = serde_json::Map::new();
        m.insert("Count".into(), json!(3));
        m.insert("Describe.State".into(), json!("running"));
        m
    }

    #[test]
    fn single_reference_keeps_type() {
        assert_eq!(render_value(&json!("{{ Count }}"), &scope()).unwrap(), json!(3));
    }

    #[test]
    fn mixed_text_renders_to_string() {
        let v = json!({"msg": ["state={{ Describe.State }} n={{Count}}"]});
        assert_eq!(
            render_value(&v, &scope()).unwrap(),
            json!({"msg": ["state=running n=3"]})
        );
    }

    #[test]
    fn missing_reference_is_reported() {
        assert_eq!(
            render_value(&json!("{{ Nope }}"), &scope()),
            Err(StepError::MissingInput("Nope".into()))
        );
    }
}
