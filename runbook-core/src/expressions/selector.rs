use serde_json::Value;
use serde_json_path::JsonPath;

/// A JSONPath query that pulls one output value out of a step response.
///
/// The selector text is kept verbatim so emitted documents carry it unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    raw: String,
}

impl Selector {
    pub fn parse(raw: &str) -> Result<Self, SelectorError> {
        JsonPath::parse(raw).map_err(|e| SelectorError::Invalid {
            selector: raw.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            raw: raw.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the query addresses at most one node: only name and index
    /// segments, no wildcard, filter, slice, union or descendant segment.
    pub fn is_singular(&self) -> bool {
        let mut quote: Option<char> = None;
        let mut depth = 0usize;
        let mut prev = '\0';
        for c in self.raw.chars() {
            match quote {
                Some(q) => {
                    if c == q && prev != '\\' {
                        quote = None;
                    }
                }
                None => match c {
                    '\'' | '"' => quote = Some(c),
                    '[' => depth += 1,
                    ']' => depth = depth.saturating_sub(1),
                    '*' | '?' => return false,
                    '.' if prev == '.' => return false,
                    ':' | ',' if depth > 0 => return false,
                    _ => {}
                },
            }
            prev = c;
        }
        true
    }

    /// Evaluate against `response`.
    ///
    /// A singular query yields its node, or `Ok(None)` when nothing matches.
    /// Any other query yields the list of matched nodes, possibly empty.
    pub fn resolve(&self, response: &Value) -> Result<Option<Value>, SelectorError> {
        let path = JsonPath::parse(&self.raw).map_err(|e| SelectorError::Invalid {
            selector: self.raw.clone(),
            message: e.to_string(),
        })?;
        let nodes = path.query(response).all();
        if self.is_singular() {
            return Ok(nodes.first().map(|v| (*v).clone()));
        }
        Ok(Some(Value::Array(nodes.into_iter().cloned().collect())))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("invalid selector {selector}: {message}")]
    Invalid { selector: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolves_nested_field() {
        let sel = Selector::parse("$.Reservations[0].Instances[0].State.Name").unwrap();
        let resp = json!({"Reservations": [{"Instances": [{"State": {"Name": "running"}}]}]});
        assert_eq!(sel.resolve(&resp).unwrap(), Some(json!("running")));
    }

    #[test]
    fn missing_field_resolves_to_none() {
        let sel = Selector::parse("$.Missing").unwrap();
        assert_eq!(sel.resolve(&json!({"Other": 1})).unwrap(), None);
    }

    #[test]
    fn wildcard_matches_collect_into_list() {
        let sel = Selector::parse("$.Items[*].Id").unwrap();
        let resp = json!({"Items": [{"Id": "a"}, {"Id": "b"}]});
        assert_eq!(sel.resolve(&resp).unwrap(), Some(json!(["a", "b"])));
    }

    #[test]
    fn wildcard_keeps_list_shape_for_one_or_no_match() {
        let sel = Selector::parse("$.Items[*].Id").unwrap();
        assert_eq!(
            sel.resolve(&json!({"Items": [{"Id": "a"}]})).unwrap(),
            Some(json!(["a"]))
        );
        assert_eq!(sel.resolve(&json!({"Items": []})).unwrap(), Some(json!([])));
    }

    #[test]
    fn classifies_query_shape() {
        for singular in ["$", "$.State.Name", "$.Items[0].Id", "$['a.b'][1]", "$['x*']"] {
            assert!(Selector::parse(singular).unwrap().is_singular(), "{singular}");
        }
        for many in ["$.Items[*]", "$.*", "$..Id", "$.Items[0:2]", "$.Items[0,1]", "$.Items[?@.Id == 'a']"] {
            assert!(!Selector::parse(many).unwrap().is_singular(), "{many}");
        }
    }

    #[test]
    fn resolving_twice_is_idempotent() {
        let sel = Selector::parse("$.Payload.count").unwrap();
        let resp = json!({"Payload": {"count": 4}});
        assert_eq!(sel.resolve(&resp).unwrap(), sel.resolve(&resp).unwrap());
    }

    #[test]
    fn rejects_malformed_selector() {
        assert!(Selector::parse("Payload.count").is_err());
    }
}
