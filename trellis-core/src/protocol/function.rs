//! Function declarations for structured (tool-call) generation
//!
//! A [`Function`] both constrains what the model may emit and describes the
//! JSON Schema the emitted arguments are validated against.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// A single declared parameter of a function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FunctionProperty {
    /// Scalar parameter such as a string, number or boolean
    Primitive {
        name: String,
        #[serde(rename = "type")]
        property_type: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        enum_values: Option<Vec<String>>,
        description: String,
    },
    /// List parameter whose items share one type
    Array {
        name: String,
        items_type: String,
        description: String,
    },
}

impl FunctionProperty {
    pub fn primitive(
        name: impl Into<String>,
        property_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        FunctionProperty::Primitive {
            name: name.into(),
            property_type: property_type.into(),
            enum_values: None,
            description: description.into(),
        }
    }

    pub fn enumeration(
        name: impl Into<String>,
        values: Vec<String>,
        description: impl Into<String>,
    ) -> Self {
        FunctionProperty::Primitive {
            name: name.into(),
            property_type: "string".to_string(),
            enum_values: Some(values),
            description: description.into(),
        }
    }

    pub fn array(
        name: impl Into<String>,
        items_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        FunctionProperty::Array {
            name: name.into(),
            items_type: items_type.into(),
            description: description.into(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            FunctionProperty::Primitive { name, .. } | FunctionProperty::Array { name, .. } => name,
        }
    }

    fn schema(&self) -> Value {
        match self {
            FunctionProperty::Primitive {
                property_type,
                enum_values,
                description,
                ..
            } => {
                let mut schema = json!({
                    "type": property_type,
                    "description": description,
                });
                if let Some(values) = enum_values {
                    schema["enum"] = json!(values);
                }
                schema
            }
            FunctionProperty::Array {
                items_type,
                description,
                ..
            } => json!({
                "type": "array",
                "items": {"type": items_type},
                "description": description,
            }),
        }
    }
}

/// Required and optional parameters of a function
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionParameters {
    pub required_properties: Vec<FunctionProperty>,
    #[serde(default)]
    pub optional_properties: Vec<FunctionProperty>,
}

impl FunctionParameters {
    pub fn new(required_properties: Vec<FunctionProperty>) -> Self {
        Self {
            required_properties,
            optional_properties: Vec::new(),
        }
    }

    pub fn with_optional(mut self, property: FunctionProperty) -> Self {
        self.optional_properties.push(property);
        self
    }

    /// JSON Schema object describing these parameters
    pub fn to_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .required_properties
            .iter()
            .chain(&self.optional_properties)
            .map(|p| (p.name().to_string(), p.schema()))
            .collect();
        let required: Vec<&str> = self.required_properties.iter().map(|p| p.name()).collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// A function the model is forced to call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub description: String,
    pub parameters: FunctionParameters,
}

impl Function {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: FunctionParameters,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// Tool declaration body: name, description and parameter schema
    pub fn declaration(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "parameters": self.parameters.to_schema(),
        })
    }
}
