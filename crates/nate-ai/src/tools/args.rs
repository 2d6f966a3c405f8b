//! Typed access to a validated argument map.

use nate_common::ToolError;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArgs {
    values: Map<String, Value>,
}

impl ToolArgs {
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// The value under `key`; JSON null counts as absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key).filter(|v| !v.is_null())
    }

    pub fn str(&self, key: &str) -> Result<Option<&str>, ToolError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(invalid(key, format!("expected string, got {other}"))),
        }
    }

    pub fn required_str(&self, key: &str) -> Result<&str, ToolError> {
        self.str(key)?.ok_or_else(|| missing(key))
    }

    pub fn i64(&self, key: &str) -> Result<Option<i64>, ToolError> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        let parsed = match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        parsed
            .map(Some)
            .ok_or_else(|| invalid(key, format!("expected integer, got {value}")))
    }

    pub fn required_i64(&self, key: &str) -> Result<i64, ToolError> {
        self.i64(key)?.ok_or_else(|| missing(key))
    }

    /// A list of scalars, each rendered as text.
    pub fn string_list(&self, key: &str) -> Result<Option<Vec<String>>, ToolError> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        let Value::Array(items) = value else {
            return Err(invalid(key, format!("expected array, got {value}")));
        };
        items
            .iter()
            .map(|item| scalar_text(item).ok_or_else(|| invalid(key, format!("{item} is not a scalar"))))
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    /// A list whose items are either scalars (one-element rows) or lists of
    /// scalars, e.g. `[["count", ">", "5"]]` or `["name", ["count", "desc"]]`.
    pub fn rows(&self, key: &str) -> Result<Vec<Vec<String>>, ToolError> {
        let Some(value) = self.get(key) else {
            return Ok(Vec::new());
        };
        let Value::Array(items) = value else {
            return Err(invalid(key, format!("expected array, got {value}")));
        };
        items
            .iter()
            .map(|item| match item {
                Value::Array(cells) => cells
                    .iter()
                    .map(|c| scalar_text(c).ok_or_else(|| invalid(key, format!("{c} is not a scalar"))))
                    .collect(),
                other => scalar_text(other)
                    .map(|s| vec![s])
                    .ok_or_else(|| invalid(key, format!("{other} is not a scalar or list"))),
            })
            .collect()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }
}

impl From<Map<String, Value>> for ToolArgs {
    fn from(values: Map<String, Value>) -> Self {
        Self::new(values)
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn invalid(key: &str, reason: String) -> ToolError {
    ToolError::InvalidArgument {
        name: key.to_string(),
        reason,
    }
}

fn missing(key: &str) -> ToolError {
    ToolError::InvalidArgument {
        name: key.to_string(),
        reason: "value is required".into(),
    }
}
