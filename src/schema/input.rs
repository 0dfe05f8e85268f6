// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Derived input schemas and payload validation.
//!
//! An [`InputSchema`] is the closed, ordered description of what a
//! predict()/train() callable accepts. It is produced once by the
//! [`crate::schema::SchemaDeriver`] and then used for every payload:
//! [`InputSchema::validate`] checks types, choice sets and field constraints,
//! fills in defaults, and collects every failing field into one
//! [`ValidationError`].

use crate::errors::{FieldError, ValidationError};
use crate::schema::signature::InputField;
use crate::schema::types::{base_json_schema, BaseType};
use crate::schema::values::Inputs;
use regex::Regex;
use serde_json::{Map, Value};

/// Validated type of an input field.
///
/// Mirrors the input subset of [`crate::schema::Annotation`], plus the
/// synthesized choice-restricted enumeration.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Base(BaseType),
    List(Box<FieldType>),
    Union(Vec<FieldType>),
    Literal(Vec<Value>),
    Choice(ChoiceSet),
}

/// A restricted enumeration built from a parameter's declared choices.
///
/// Members keep their declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceSet {
    pub name: String,
    pub base: BaseType,
    pub members: Vec<Value>,
}

impl FieldType {
    fn coerce(&self, value: &Value) -> Result<Value, String> {
        match self {
            FieldType::Base(base) => coerce_base(*base, value),
            FieldType::List(item) => {
                let items = value
                    .as_array()
                    .ok_or_else(|| "value is not a valid list".to_string())?;
                items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| item.coerce(v).map_err(|e| format!("[{}]: {}", i, e)))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array)
            }
            FieldType::Union(members) => members
                .iter()
                .find_map(|member| member.coerce(value).ok())
                .ok_or_else(|| {
                    let names: Vec<String> = members.iter().map(FieldType::type_name).collect();
                    format!("value does not match any of {}", names.join(", "))
                }),
            FieldType::Literal(values) => {
                if values.contains(value) {
                    Ok(value.clone())
                } else {
                    Err(format!("unexpected value; permitted: {}", readable_values(values)))
                }
            }
            FieldType::Choice(set) => {
                let coerced = coerce_base(set.base, value)?;
                if set.members.contains(&coerced) {
                    Ok(coerced)
                } else {
                    Err(format!(
                        "value is not a valid enumeration member; permitted: {}",
                        readable_values(&set.members)
                    ))
                }
            }
        }
    }

    fn type_name(&self) -> String {
        match self {
            FieldType::Base(base) => base.name().to_string(),
            FieldType::List(item) => format!("List[{}]", item.type_name()),
            FieldType::Union(members) => {
                let names: Vec<String> = members.iter().map(FieldType::type_name).collect();
                format!("Union[{}]", names.join(", "))
            }
            FieldType::Literal(values) => format!("Literal[{}]", readable_values(values)),
            FieldType::Choice(set) => set.name.clone(),
        }
    }

    pub fn json_schema(&self) -> Value {
        match self {
            FieldType::Base(base) => base_json_schema(*base),
            FieldType::List(item) => serde_json::json!({
                "type": "array",
                "items": item.json_schema(),
            }),
            FieldType::Union(members) => serde_json::json!({
                "anyOf": members.iter().map(FieldType::json_schema).collect::<Vec<_>>(),
            }),
            FieldType::Literal(values) => serde_json::json!({ "enum": values }),
            FieldType::Choice(set) => {
                let mut schema = base_json_schema(set.base);
                if let Value::Object(map) = &mut schema {
                    map.insert("title".to_string(), Value::String(set.name.clone()));
                    map.insert("description".to_string(), Value::from("An enumeration."));
                    map.insert("enum".to_string(), Value::Array(set.members.clone()));
                }
                schema
            }
        }
    }
}

const I64_MIN_F: f64 = i64::MIN as f64;

fn coerce_base(base: BaseType, value: &Value) -> Result<Value, String> {
    match base {
        BaseType::Text | BaseType::Secret => match value {
            Value::String(_) => Ok(value.clone()),
            _ => Err("str type expected".to_string()),
        },
        BaseType::Integer => match value {
            Value::Number(n) if n.is_i64() => Ok(value.clone()),
            Value::Number(n) if n.is_u64() => Err("value is not a valid integer".to_string()),
            Value::Number(n) => match n.as_f64() {
                // i64::MAX is not representable as f64; the bound is exclusive.
                Some(f) if f.fract() == 0.0 && f >= I64_MIN_F && f < -I64_MIN_F => Ok(Value::from(f as i64)),
                _ => Err("value is not a valid integer".to_string()),
            },
            _ => Err("value is not a valid integer".to_string()),
        },
        BaseType::Float => match value.as_f64() {
            Some(f) => Ok(Value::from(f)),
            None => Err("value is not a valid float".to_string()),
        },
        BaseType::Boolean => match value {
            Value::Bool(_) => Ok(value.clone()),
            _ => Err("value could not be parsed to a boolean".to_string()),
        },
        BaseType::File | BaseType::Path => match value {
            Value::String(s) if !s.trim().is_empty() => Ok(value.clone()),
            _ => Err("expected a URL or path string".to_string()),
        },
    }
}

fn readable_values(values: &[Value]) -> String {
    values
        .iter()
        .map(|v| match v {
            Value::String(s) => format!("'{}'", s),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Human title for a field name, `max_tokens` -> `Max Tokens`.
fn title_case(name: &str) -> String {
    name.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Compiled `regex` constraint, compared by its source pattern.
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Pattern)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

/// One field of an [`InputSchema`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    pub name: String,
    pub ty: FieldType,
    /// Default-carrier. Choices live in `ty`, never here.
    pub field: InputField,
    /// Declaration position, starting at 0.
    pub order: usize,
    pub(crate) pattern: Option<Pattern>,
}

impl ParameterSpec {
    pub fn is_required(&self) -> bool {
        self.field.is_required()
    }

    pub fn default(&self) -> Option<&Value> {
        self.field.default.as_ref()
    }

    pub fn choices(&self) -> Option<&[Value]> {
        match &self.ty {
            FieldType::Choice(set) => Some(&set.members),
            _ => None,
        }
    }

    fn check(&self, value: &Value) -> Result<Value, String> {
        let value = self.ty.coerce(value)?;

        if let Some(number) = value.as_f64() {
            if let Some(ge) = self.field.ge {
                if number < ge {
                    return Err(format!("ensure this value is greater than or equal to {}", ge));
                }
            }
            if let Some(le) = self.field.le {
                if number > le {
                    return Err(format!("ensure this value is less than or equal to {}", le));
                }
            }
        }

        let length = match &value {
            Value::String(s) => Some(s.chars().count()),
            Value::Array(items) => Some(items.len()),
            _ => None,
        };
        if let Some(length) = length {
            if let Some(min) = self.field.min_length {
                if length < min {
                    return Err(format!("ensure this value has at least {} characters", min));
                }
            }
            if let Some(max) = self.field.max_length {
                if length > max {
                    return Err(format!("ensure this value has at most {} characters", max));
                }
            }
        }

        if let (Some(pattern), Value::String(s)) = (&self.pattern, &value) {
            if !pattern.0.is_match(s) {
                return Err(format!("string does not match regex \"{}\"", pattern.as_str()));
            }
        }

        Ok(value)
    }

    pub fn json_schema(&self) -> Value {
        let mut schema = Map::new();
        schema.insert("title".to_string(), Value::String(title_case(&self.name)));
        match self.ty.json_schema() {
            Value::Object(type_schema) if !matches!(self.ty, FieldType::Choice(_)) => {
                schema.extend(type_schema);
            }
            choice => {
                schema.insert("allOf".to_string(), Value::Array(vec![choice]));
            }
        }
        schema.insert("x-order".to_string(), Value::from(self.order));

        let field = &self.field;
        if let Some(default) = &field.default {
            schema.insert("default".to_string(), default.clone());
        }
        if let Some(description) = &field.description {
            schema.insert("description".to_string(), Value::String(description.clone()));
        }
        if let Some(ge) = field.ge {
            schema.insert("minimum".to_string(), Value::from(ge));
        }
        if let Some(le) = field.le {
            schema.insert("maximum".to_string(), Value::from(le));
        }
        if let Some(min) = field.min_length {
            schema.insert("minLength".to_string(), Value::from(min));
        }
        if let Some(max) = field.max_length {
            schema.insert("maxLength".to_string(), Value::from(max));
        }
        if let Some(regex) = &field.regex {
            schema.insert("pattern".to_string(), Value::String(regex.clone()));
        }
        if let Some(deprecated) = field.deprecated {
            schema.insert("deprecated".to_string(), Value::Bool(deprecated));
        }
        Value::Object(schema)
    }
}

/// Ordered, closed description of a callable's inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct InputSchema {
    name: String,
    parameters: Vec<ParameterSpec>,
}

impl InputSchema {
    pub(crate) fn new(name: impl Into<String>, parameters: Vec<ParameterSpec>) -> Self {
        Self {
            name: name.into(),
            parameters,
        }
    }

    /// `Input` or `TrainingInput`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Validate a payload, filling defaults.
    ///
    /// A `null` value counts as absent. Keys the schema does not declare are
    /// dropped. All failing fields are reported together.
    pub fn validate(&self, payload: &Map<String, Value>) -> Result<Inputs, ValidationError> {
        let mut values = Map::new();
        let mut errors = Vec::new();

        for spec in &self.parameters {
            let supplied = payload.get(&spec.name).filter(|v| !v.is_null());
            match (supplied, spec.default()) {
                (Some(value), _) => match spec.check(value) {
                    Ok(value) => {
                        values.insert(spec.name.clone(), value);
                    }
                    Err(message) => errors.push(FieldError {
                        field: spec.name.clone(),
                        message,
                    }),
                },
                (None, Some(default)) => {
                    values.insert(spec.name.clone(), default.clone());
                }
                (None, None) => errors.push(FieldError {
                    field: spec.name.clone(),
                    message: "field required".to_string(),
                }),
            }
        }

        if errors.is_empty() {
            Ok(Inputs::new(values))
        } else {
            Err(ValidationError {
                schema: self.name.clone(),
                errors,
            })
        }
    }

    pub fn json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| (p.name.clone(), p.json_schema()))
            .collect();
        let required: Vec<Value> = self
            .parameters
            .iter()
            .filter(|p| p.is_required())
            .map(|p| Value::String(p.name.clone()))
            .collect();

        let mut schema = serde_json::json!({
            "title": self.name,
            "type": "object",
            "properties": properties,
        });
        if !required.is_empty() {
            schema["required"] = Value::Array(required);
        }
        schema
    }
}
