// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The closed type universe predictors describe their parameters with.
//!
//! Inputs are restricted to the seven [`BaseType`]s and to unions, lists and
//! literals built from them. Outputs may additionally use [`Annotation::Any`],
//! named object types and lazy sequences ([`Annotation::Iterator`]).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{self, Display, Formatter};

/// Leaf types a predictor input may be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseType {
    Text,
    Integer,
    Float,
    Boolean,
    File,
    Path,
    Secret,
}

impl BaseType {
    pub const ALL: [BaseType; 7] = [
        BaseType::Text,
        BaseType::Integer,
        BaseType::Float,
        BaseType::Boolean,
        BaseType::File,
        BaseType::Path,
        BaseType::Secret,
    ];

    /// Name used in error messages and schema titles.
    pub fn name(&self) -> &'static str {
        match self {
            BaseType::Text => "str",
            BaseType::Integer => "int",
            BaseType::Float => "float",
            BaseType::Boolean => "bool",
            BaseType::File => "File",
            BaseType::Path => "Path",
            BaseType::Secret => "Secret",
        }
    }

    /// The base type of a literal value, if it has one.
    pub fn of_literal(value: &Value) -> Option<BaseType> {
        match value {
            Value::String(_) => Some(BaseType::Text),
            Value::Bool(_) => Some(BaseType::Boolean),
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(BaseType::Integer),
            Value::Number(_) => Some(BaseType::Float),
            _ => None,
        }
    }
}

impl Display for BaseType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A declared type, as written on a parameter or a return value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "of", rename_all = "snake_case")]
pub enum Annotation {
    Base(BaseType),
    List(Box<Annotation>),
    Union(Vec<Annotation>),
    Literal(Vec<Value>),
    /// A lazily produced sequence. Only meaningful as a return type.
    Iterator(Box<Annotation>),
    Any,
    /// A user-defined object type, identified by name.
    Named(String),
}

impl Annotation {
    pub fn text() -> Self {
        Annotation::Base(BaseType::Text)
    }

    pub fn integer() -> Self {
        Annotation::Base(BaseType::Integer)
    }

    pub fn float() -> Self {
        Annotation::Base(BaseType::Float)
    }

    pub fn boolean() -> Self {
        Annotation::Base(BaseType::Boolean)
    }

    pub fn file() -> Self {
        Annotation::Base(BaseType::File)
    }

    pub fn path() -> Self {
        Annotation::Base(BaseType::Path)
    }

    pub fn secret() -> Self {
        Annotation::Base(BaseType::Secret)
    }

    pub fn list_of(item: Annotation) -> Self {
        Annotation::List(Box::new(item))
    }

    pub fn iterator_of(item: Annotation) -> Self {
        Annotation::Iterator(Box::new(item))
    }

    pub fn named(name: impl Into<String>) -> Self {
        Annotation::Named(name.into())
    }

    /// The type's own name, used to decide whether an output needs wrapping.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Annotation::Named(name) => Some(name),
            _ => None,
        }
    }

    /// Render the annotation as a JSON-schema fragment.
    pub fn json_schema(&self) -> Value {
        match self {
            Annotation::Base(base) => base_json_schema(*base),
            Annotation::List(item) => serde_json::json!({
                "type": "array",
                "items": item.json_schema(),
            }),
            Annotation::Union(members) => serde_json::json!({
                "anyOf": members.iter().map(Annotation::json_schema).collect::<Vec<_>>(),
            }),
            Annotation::Literal(values) => serde_json::json!({ "enum": values }),
            Annotation::Iterator(item) => serde_json::json!({
                "type": "array",
                "items": item.json_schema(),
                "x-cog-array-type": "iterator",
            }),
            Annotation::Any => serde_json::json!({}),
            Annotation::Named(name) => serde_json::json!({ "title": name, "type": "object" }),
        }
    }
}

pub(crate) fn base_json_schema(base: BaseType) -> Value {
    match base {
        BaseType::Text => serde_json::json!({ "type": "string" }),
        BaseType::Integer => serde_json::json!({ "type": "integer" }),
        BaseType::Float => serde_json::json!({ "type": "number" }),
        BaseType::Boolean => serde_json::json!({ "type": "boolean" }),
        BaseType::File | BaseType::Path => {
            serde_json::json!({ "type": "string", "format": "uri" })
        }
        BaseType::Secret => serde_json::json!({
            "type": "string",
            "format": "password",
            "writeOnly": true,
            "x-cog-secret": true,
        }),
    }
}

impl Display for Annotation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Annotation::Base(base) => write!(f, "{}", base),
            Annotation::List(item) => write!(f, "List[{}]", item),
            Annotation::Union(members) => {
                let names: Vec<String> = members.iter().map(|m| m.to_string()).collect();
                write!(f, "Union[{}]", names.join(", "))
            }
            Annotation::Literal(values) => {
                let names: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "Literal[{}]", names.join(", "))
            }
            Annotation::Iterator(item) => write!(f, "Iterator[{}]", item),
            Annotation::Any => f.write_str("Any"),
            Annotation::Named(name) => f.write_str(name),
        }
    }
}

/// The set of base types inputs may resolve to.
///
/// Injected into [`crate::schema::SchemaDeriver`] so tests and embedders can
/// narrow the universe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedTypes(pub Vec<BaseType>);

impl AllowedTypes {
    pub fn new(types: Vec<BaseType>) -> Self {
        Self(types)
    }

    pub fn contains(&self, base: BaseType) -> bool {
        self.0.contains(&base)
    }

    /// Comma separated list for error messages, e.g. `str, int, float`.
    pub fn readable(&self) -> String {
        self.0
            .iter()
            .map(|t| t.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for AllowedTypes {
    fn default() -> Self {
        Self(BaseType::ALL.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_literal_base_types() {
        assert_eq!(BaseType::of_literal(&json!("a")), Some(BaseType::Text));
        assert_eq!(BaseType::of_literal(&json!(3)), Some(BaseType::Integer));
        assert_eq!(BaseType::of_literal(&json!(3.5)), Some(BaseType::Float));
        assert_eq!(BaseType::of_literal(&json!(true)), Some(BaseType::Boolean));
        assert_eq!(BaseType::of_literal(&json!({"a": 1})), None);
        assert_eq!(BaseType::of_literal(&json!(null)), None);
    }

    #[test]
    fn test_annotation_display() {
        let ann = Annotation::Union(vec![
            Annotation::text(),
            Annotation::list_of(Annotation::integer()),
        ]);
        assert_eq!(ann.to_string(), "Union[str, List[int]]");
        assert_eq!(
            Annotation::iterator_of(Annotation::file()).to_string(),
            "Iterator[File]"
        );
    }

    #[test]
    fn test_allowed_types_readable() {
        let allowed = AllowedTypes::default();
        assert_eq!(
            allowed.readable(),
            "str, int, float, bool, File, Path, Secret"
        );
        let narrow = AllowedTypes::new(vec![BaseType::Text]);
        assert!(!narrow.contains(BaseType::Integer));
    }

    #[test]
    fn test_annotation_serde_tagging() {
        let ann = Annotation::list_of(Annotation::text());
        let encoded = serde_json::to_value(&ann).unwrap();
        assert_eq!(
            encoded,
            json!({"kind": "list", "of": {"kind": "base", "of": "text"}})
        );
        let decoded: Annotation = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, ann);
    }
}
