//! JSON Schema validation of function call arguments

use super::error::{LlmError, LlmResult};
use serde_json::{Map, Value};

/// Errors reported per failed validation
const MAX_REPORTED_ERRORS: usize = 3;

/// Compiled parameter schema of one function declaration
pub struct ArgumentValidator {
    validator: jsonschema::Validator,
}

impl ArgumentValidator {
    /// Compile `schema`; an invalid schema is a configuration problem
    pub fn new(schema: &Value) -> LlmResult<Self> {
        let validator = jsonschema::validator_for(schema).map_err(|e| {
            LlmError::Configuration(format!("Invalid function parameter schema: {}", e))
        })?;
        Ok(Self { validator })
    }

    /// Check `arguments` and return them as an object map
    pub fn validate(&self, arguments: Value) -> LlmResult<Map<String, Value>> {
        if self.validator.validate(&arguments).is_err() {
            let messages: Vec<String> = self
                .validator
                .iter_errors(&arguments)
                .take(MAX_REPORTED_ERRORS)
                .map(|err| format!("{} at '{}'", err, err.instance_path))
                .collect();
            return Err(LlmError::Validation(messages.join("; ")));
        }

        match arguments {
            Value::Object(map) => Ok(map),
            other => Err(LlmError::Validation(format!(
                "expected a JSON object of arguments, got {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {"queries": {"type": "array", "items": {"type": "string"}}},
            "required": ["queries"]
        })
    }

    #[test]
    fn test_valid_arguments_pass() {
        let validator = ArgumentValidator::new(&schema()).unwrap();
        let map = validator.validate(json!({"queries": ["capital of France"]})).unwrap();
        assert_eq!(map["queries"], json!(["capital of France"]));
    }

    #[test]
    fn test_missing_required_fails() {
        let validator = ArgumentValidator::new(&schema()).unwrap();
        let err = validator.validate(json!({"query": "oops"})).unwrap_err();
        match err {
            LlmError::Validation(message) => assert!(message.contains("queries")),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_object_rejected_without_type_constraint() {
        let validator = ArgumentValidator::new(&json!({})).unwrap();
        assert!(matches!(
            validator.validate(json!([1, 2])),
            Err(LlmError::Validation(_))
        ));
    }

    #[test]
    fn test_invalid_schema_is_configuration_error() {
        let result = ArgumentValidator::new(&json!({"type": 12}));
        assert!(matches!(result, Err(LlmError::Configuration(_))));
    }
}
