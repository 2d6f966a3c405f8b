//! Parameter schemas: one source for both declarations and validation.

use std::fmt;

use nate_common::ToolError;
use serde_json::{json, Map, Value};

use crate::ToolDeclaration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl ParamType {
    pub fn as_str(self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::Array => "array",
            ParamType::Object => "object",
        }
    }

    /// Whether `value` is acceptable for this type. Integers also accept
    /// whole-valued floats and integer strings, which models emit often.
    fn accepts(self, value: &Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Integer => match value {
                Value::Number(n) => {
                    n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
                }
                Value::String(s) => s.trim().parse::<i64>().is_ok(),
                _ => false,
            },
            ParamType::Number => value.is_number(),
            ParamType::Boolean => value.is_boolean(),
            ParamType::Array => value.is_array(),
            ParamType::Object => value.is_object(),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamType,
    pub description: String,
    pub required: bool,
    pub enum_values: Option<Vec<String>>,
    /// Item schema for arrays, passed through to the declaration.
    pub items: Option<Value>,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, kind: ParamType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
            required: false,
            enum_values: None,
            items: None,
        }
    }

    pub fn string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, ParamType::String, description)
    }

    pub fn integer(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, ParamType::Integer, description)
    }

    pub fn number(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, ParamType::Number, description)
    }

    pub fn array(name: impl Into<String>, description: impl Into<String>, items: Value) -> Self {
        Self {
            items: Some(items),
            ..Self::new(name, ParamType::Array, description)
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn one_of(mut self, values: &[&str]) -> Self {
        self.enum_values = Some(values.iter().map(|v| v.to_string()).collect());
        self
    }

    fn schema(&self) -> Value {
        let mut schema = json!({
            "type": self.kind.as_str(),
            "description": self.description,
        });
        if let Some(values) = &self.enum_values {
            schema["enum"] = json!(values);
        }
        if let Some(items) = &self.items {
            schema["items"] = items.clone();
        }
        schema
    }

    fn check(&self, value: &Value) -> Result<(), ToolError> {
        if !self.kind.accepts(value) {
            return Err(ToolError::InvalidArgument {
                name: self.name.clone(),
                reason: format!("expected {}, got {value}", self.kind),
            });
        }
        if let (Some(allowed), Some(text)) = (&self.enum_values, value.as_str()) {
            if !allowed.iter().any(|a| a == text) {
                return Err(ToolError::InvalidArgument {
                    name: self.name.clone(),
                    reason: format!("{text:?} is not one of {allowed:?}"),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub params: Vec<ParamSpec>,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    pub fn declaration(&self) -> ToolDeclaration {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for param in &self.params {
            properties.insert(param.name.clone(), param.schema());
            if param.required {
                required.push(param.name.clone());
            }
        }
        ToolDeclaration {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: json!({
                "type": "object",
                "properties": properties,
                "required": required,
            }),
        }
    }

    /// Check required presence first (reporting every missing key in
    /// declaration order), then the type of each declared value present.
    /// Keys the tool does not declare are ignored.
    pub fn validate(&self, args: &Map<String, Value>) -> Result<(), ToolError> {
        let missing: Vec<String> = self
            .params
            .iter()
            .filter(|p| p.required && args.get(&p.name).map_or(true, Value::is_null))
            .map(|p| p.name.clone())
            .collect();
        if !missing.is_empty() {
            return Err(ToolError::MissingArgument {
                tool: self.name.clone(),
                missing,
            });
        }

        for param in &self.params {
            match args.get(&param.name) {
                Some(Value::Null) | None => {}
                Some(value) => param.check(value)?,
            }
        }
        Ok(())
    }
}
