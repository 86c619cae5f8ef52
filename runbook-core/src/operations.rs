//! Typed comparison predicates used by branch choices.
//!
//! Each operation declares the operand type it compares. A tested value of any
//! other type is an error, never a silent "no match".

use serde_json::Value;

use crate::values::runtime_type_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Operation {
    BooleanEquals,
    StringEquals,
    EqualsIgnoreCase,
    StartsWith,
    EndsWith,
    Contains,
    NumericEquals,
    NumericGreater,
    NumericGreaterOrEquals,
    NumericLesser,
    NumericLesserOrEquals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandType {
    Boolean,
    String,
    Numeric,
}

impl OperandType {
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            OperandType::Boolean => value.is_boolean(),
            OperandType::String => value.is_string(),
            OperandType::Numeric => value.is_number(),
        }
    }
}

impl std::fmt::Display for OperandType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            OperandType::Boolean => "boolean",
            OperandType::String => "string",
            OperandType::Numeric => "number",
        })
    }
}

impl Operation {
    /// Key used for this operation inside a wire-format choice.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Operation::BooleanEquals => "BooleanEquals",
            Operation::StringEquals => "StringEquals",
            Operation::EqualsIgnoreCase => "EqualsIgnoreCase",
            Operation::StartsWith => "StartsWith",
            Operation::EndsWith => "EndsWith",
            Operation::Contains => "Contains",
            Operation::NumericEquals => "NumericEquals",
            Operation::NumericGreater => "NumericGreater",
            Operation::NumericGreaterOrEquals => "NumericGreaterOrEquals",
            Operation::NumericLesser => "NumericLesser",
            Operation::NumericLesserOrEquals => "NumericLesserOrEquals",
        }
    }

    pub fn operand_type(&self) -> OperandType {
        match self {
            Operation::BooleanEquals => OperandType::Boolean,
            Operation::StringEquals
            | Operation::EqualsIgnoreCase
            | Operation::StartsWith
            | Operation::EndsWith
            | Operation::Contains => OperandType::String,
            Operation::NumericEquals
            | Operation::NumericGreater
            | Operation::NumericGreaterOrEquals
            | Operation::NumericLesser
            | Operation::NumericLesserOrEquals => OperandType::Numeric,
        }
    }

    pub fn check_operand(&self, value: &Value) -> Result<(), OperationError> {
        let expected = self.operand_type();
        if expected.accepts(value) {
            Ok(())
        } else {
            Err(OperationError::OperandType {
                operation: self.wire_name(),
                expected,
                actual: runtime_type_name(value),
            })
        }
    }

    /// Compare the tested `actual` value against the choice `constant`.
    pub fn evaluate(&self, actual: &Value, constant: &Value) -> Result<bool, OperationError> {
        self.check_operand(actual)?;
        self.check_operand(constant)?;

        let matched = match self.operand_type() {
            OperandType::Boolean => actual.as_bool() == constant.as_bool(),
            OperandType::String => {
                let a = actual.as_str().unwrap_or_default();
                let c = constant.as_str().unwrap_or_default();
                match self {
                    Operation::StringEquals => a == c,
                    Operation::EqualsIgnoreCase => a.to_lowercase() == c.to_lowercase(),
                    Operation::StartsWith => a.starts_with(c),
                    Operation::EndsWith => a.ends_with(c),
                    Operation::Contains => a.contains(c),
                    _ => false,
                }
            }
            OperandType::Numeric => {
                let (Some(a), Some(c)) = (actual.as_f64(), constant.as_f64()) else {
                    return Ok(false);
                };
                match self {
                    Operation::NumericEquals => a == c,
                    Operation::NumericGreater => a > c,
                    Operation::NumericGreaterOrEquals => a >= c,
                    Operation::NumericLesser => a < c,
                    Operation::NumericLesserOrEquals => a <= c,
                    _ => false,
                }
            }
        };
        Ok(matched)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OperationError {
    #[error("{operation} compares {expected} values, found {actual}")]
    OperandType {
        operation: &'static str,
        expected: OperandType,
        actual: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_predicates() {
        let v = json!("i-0abc.running");
        assert!(Operation::EndsWith.evaluate(&v, &json!("running")).unwrap());
        assert!(Operation::Contains.evaluate(&v, &json!("0abc")).unwrap());
        assert!(Operation::StartsWith.evaluate(&v, &json!("i-")).unwrap());
        assert!(Operation::EqualsIgnoreCase
            .evaluate(&json!("Running"), &json!("RUNNING"))
            .unwrap());
        assert!(!Operation::StringEquals
            .evaluate(&json!("Running"), &json!("running"))
            .unwrap());
    }

    #[test]
    fn numeric_ordering() {
        assert!(Operation::NumericGreater.evaluate(&json!(5), &json!(3)).unwrap());
        assert!(Operation::NumericLesserOrEquals.evaluate(&json!(3), &json!(3)).unwrap());
        assert!(Operation::NumericEquals.evaluate(&json!(2.0), &json!(2)).unwrap());
    }

    #[test]
    fn boolean_equality() {
        assert!(Operation::BooleanEquals.evaluate(&json!(true), &json!(true)).unwrap());
        assert!(!Operation::BooleanEquals.evaluate(&json!(false), &json!(true)).unwrap());
    }

    #[test]
    fn operand_type_mismatch_is_an_error() {
        let err = Operation::NumericGreater
            .evaluate(&json!("5"), &json!(3))
            .unwrap_err();
        assert_eq!(err.to_string(), "NumericGreater compares number values, found string");
        assert!(Operation::BooleanEquals.evaluate(&json!(1), &json!(true)).is_err());
    }
}
