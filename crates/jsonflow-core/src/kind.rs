use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Kinds of values that are inlined as properties of their owning node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    String,
    Number,
    Boolean,
    Null,
}

/// Kinds of values that get a graph node of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    Object,
    Array,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueKind {
    Primitive(PrimitiveKind),
    Container(ContainerKind),
}

impl ValueKind {
    pub fn is_primitive(self) -> bool {
        matches!(self, ValueKind::Primitive(_))
    }

    pub fn is_container(self) -> bool {
        matches!(self, ValueKind::Container(_))
    }

    pub fn label(self) -> &'static str {
        match self {
            ValueKind::Primitive(PrimitiveKind::String) => "string",
            ValueKind::Primitive(PrimitiveKind::Number) => "number",
            ValueKind::Primitive(PrimitiveKind::Boolean) => "boolean",
            ValueKind::Primitive(PrimitiveKind::Null) => "null",
            ValueKind::Container(ContainerKind::Object) => "object",
            ValueKind::Container(ContainerKind::Array) => "array",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a JSON value by its variant. Total over every `Value`.
pub fn classify(value: &Value) -> ValueKind {
    match value {
        Value::String(_) => ValueKind::Primitive(PrimitiveKind::String),
        Value::Number(_) => ValueKind::Primitive(PrimitiveKind::Number),
        Value::Bool(_) => ValueKind::Primitive(PrimitiveKind::Boolean),
        Value::Null => ValueKind::Primitive(PrimitiveKind::Null),
        Value::Object(_) => ValueKind::Container(ContainerKind::Object),
        Value::Array(_) => ValueKind::Container(ContainerKind::Array),
    }
}

/// Lexical text of a primitive value, or `None` for containers.
///
/// Strings come back raw: no surrounding quotes and no escaping. Quoting is
/// left to whoever draws the value.
pub fn render_primitive(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some("null".to_string()),
        Value::Object(_) | Value::Array(_) => None,
    }
}
