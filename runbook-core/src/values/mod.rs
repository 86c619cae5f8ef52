mod input;
mod output;

pub use input::{Input, InputError};
pub use output::Output;

use serde_json::Value;

/// Primitive types a parameter or step output may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DataType {
    String,
    Integer,
    Boolean,
    StringList,
    StringMap,
    MapList,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::String => "String",
            DataType::Integer => "Integer",
            DataType::Boolean => "Boolean",
            DataType::StringList => "StringList",
            DataType::StringMap => "StringMap",
            DataType::MapList => "MapList",
        }
    }

    /// Whether `value` satisfies this type at run time.
    ///
    /// `Integer` accepts JSON integers only: booleans and floats are rejected.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            DataType::String => value.is_string(),
            DataType::Integer => value.is_i64() || value.is_u64(),
            DataType::Boolean => value.is_boolean(),
            DataType::StringList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
            DataType::StringMap => value.is_object(),
            DataType::MapList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_object)),
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, DataType::StringList | DataType::MapList)
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Short name of the JSON type of `value`, for error messages.
pub fn runtime_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn boolean_does_not_satisfy_integer() {
        assert!(DataType::Integer.matches(&json!(3)));
        assert!(!DataType::Integer.matches(&json!(true)));
        assert!(!DataType::Integer.matches(&json!(1.5)));
    }

    #[test]
    fn string_list_requires_every_item_to_be_a_string() {
        assert!(DataType::StringList.matches(&json!(["a", "b"])));
        assert!(DataType::StringList.matches(&json!([])));
        assert!(!DataType::StringList.matches(&json!(["a", 1])));
        assert!(!DataType::StringList.matches(&json!("a")));
    }

    #[test]
    fn map_list_requires_objects() {
        assert!(DataType::MapList.matches(&json!([{"a": 1}])));
        assert!(!DataType::MapList.matches(&json!([1])));
    }

    #[test]
    fn serializes_as_wire_name() {
        assert_eq!(serde_json::to_value(DataType::StringList).unwrap(), json!("StringList"));
    }
}
