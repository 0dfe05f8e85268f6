// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Schema derivation from structured signatures.
//!
//! [`SchemaDeriver`] turns a predictor's [`Signature`] into a closed
//! [`InputSchema`] and an [`OutputSchema`]. Derivation is a pure function of
//! the signature and the injected [`AllowedTypes`]: the same signature always
//! yields structurally identical schemas.
//!
//! # Rules
//!
//! * every parameter needs a type, resolvable (through unions, lists and
//!   literals) to allowed base types
//! * choices are only accepted on `str` and `int`, and become a
//!   [`ChoiceSet`] in declaration order
//! * ordinals follow declaration order, starting at 0
//! * a return type is mandatory (`Any` is an explicit opt-out); an
//!   `Iterator[T]` return becomes a streaming `List[T]`
//! * the output is enveloped in `Output`/`TrainingOutput` unless it is
//!   already named that way

use crate::errors::SchemaError;
use crate::observability::messages::schema::{SchemaDerivationFailed, SchemaDerived};
use crate::observability::messages::StructuredLog;
use crate::schema::input::{ChoiceSet, FieldType, InputSchema, ParameterSpec, Pattern};
use crate::schema::output::OutputSchema;
use crate::schema::signature::{ParameterDecl, Signature};
use crate::schema::types::{AllowedTypes, Annotation, BaseType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Which entry point of a predictor a schema describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Predict,
    Train,
}

impl Mode {
    pub fn method(&self) -> &'static str {
        match self {
            Mode::Predict => "predict",
            Mode::Train => "train",
        }
    }

    pub fn input_name(&self) -> &'static str {
        match self {
            Mode::Predict => "Input",
            Mode::Train => "TrainingInput",
        }
    }

    pub fn output_name(&self) -> &'static str {
        match self {
            Mode::Predict => "Output",
            Mode::Train => "TrainingOutput",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method())
    }
}

/// Builds input/output schemas from signatures.
#[derive(Debug, Clone, Default)]
pub struct SchemaDeriver {
    allowed: AllowedTypes,
}

impl SchemaDeriver {
    pub fn new(allowed: AllowedTypes) -> Self {
        Self { allowed }
    }

    pub fn allowed(&self) -> &AllowedTypes {
        &self.allowed
    }

    /// Derive both schemas for one entry point.
    pub fn derive(
        &self,
        signature: &Signature,
        mode: Mode,
    ) -> Result<(InputSchema, OutputSchema), SchemaError> {
        let derived = self
            .derive_input(&signature.parameters, mode)
            .and_then(|input| {
                self.derive_output(signature.returns.as_ref(), mode)
                    .map(|output| (input, output))
            });

        match &derived {
            Ok((input, output)) => SchemaDerived {
                method: mode.method(),
                parameter_count: input.len(),
                streaming: output.is_streaming(),
            }
            .log(),
            Err(error) => SchemaDerivationFailed {
                method: mode.method(),
                error,
            }
            .log(),
        }

        derived
    }

    pub fn derive_input(
        &self,
        parameters: &[ParameterDecl],
        mode: Mode,
    ) -> Result<InputSchema, SchemaError> {
        let mut seen = HashSet::new();
        let mut specs = Vec::with_capacity(parameters.len());

        for (order, parameter) in parameters.iter().enumerate() {
            if !seen.insert(parameter.name.as_str()) {
                return Err(SchemaError::DuplicateParameter {
                    name: parameter.name.clone(),
                });
            }
            specs.push(self.parameter_spec(parameter, order)?);
        }

        Ok(InputSchema::new(mode.input_name(), specs))
    }

    pub fn derive_output(
        &self,
        returns: Option<&Annotation>,
        mode: Mode,
    ) -> Result<OutputSchema, SchemaError> {
        let declared = returns.ok_or_else(|| SchemaError::MissingOutputType {
            callable: mode.method().to_string(),
        })?;

        let (ty, streaming) = match declared {
            Annotation::Iterator(item) => (Annotation::List(item.clone()), true),
            other => (other.clone(), false),
        };

        let expected = mode.output_name();
        let wrapped = ty.type_name() != Some(expected);
        Ok(OutputSchema::new(expected, ty, streaming, wrapped))
    }

    fn parameter_spec(
        &self,
        parameter: &ParameterDecl,
        order: usize,
    ) -> Result<ParameterSpec, SchemaError> {
        let name = &parameter.name;
        let annotation = parameter
            .annotation
            .as_ref()
            .ok_or_else(|| SchemaError::MissingType {
                name: name.clone(),
                supported: self.allowed.readable(),
            })?;

        let mut ty = self.resolve_input_type(annotation, name)?;
        let mut field = parameter.field();

        if let Some(choices) = field.choices.take().filter(|c| !c.is_empty()) {
            ty = choice_type(name, &ty, choices)?;
        }

        let pattern = match field.regex.as_deref() {
            Some(source) => Some(Pattern::new(source).map_err(|e| {
                SchemaError::InvalidConstraint {
                    name: name.clone(),
                    reason: e.to_string(),
                }
            })?),
            None => None,
        };

        Ok(ParameterSpec {
            name: name.clone(),
            ty,
            field,
            order,
            pattern,
        })
    }

    fn resolve_input_type(&self, annotation: &Annotation, name: &str) -> Result<FieldType, SchemaError> {
        match annotation {
            Annotation::Base(base) if self.allowed.contains(*base) => Ok(FieldType::Base(*base)),
            Annotation::List(item) => Ok(FieldType::List(Box::new(
                self.resolve_input_type(item, name)?,
            ))),
            Annotation::Union(members) => members
                .iter()
                .map(|member| self.resolve_input_type(member, name))
                .collect::<Result<Vec<_>, _>>()
                .map(FieldType::Union),
            Annotation::Literal(values) => {
                for value in values {
                    match BaseType::of_literal(value) {
                        Some(base) => {
                            self.resolve_input_type(&Annotation::Base(base), name)?;
                        }
                        None => return Err(self.unsupported(annotation, name)),
                    }
                }
                Ok(FieldType::Literal(values.clone()))
            }
            other => Err(self.unsupported(other, name)),
        }
    }

    fn unsupported(&self, annotation: &Annotation, name: &str) -> SchemaError {
        SchemaError::UnsupportedType {
            name: name.to_string(),
            type_name: annotation.to_string(),
            supported: self.allowed.readable(),
        }
    }
}

fn choice_type(name: &str, ty: &FieldType, choices: Vec<serde_json::Value>) -> Result<FieldType, SchemaError> {
    let base = match ty {
        FieldType::Base(base @ (BaseType::Text | BaseType::Integer)) => *base,
        _ => {
            return Err(SchemaError::InvalidChoiceType {
                name: name.to_string(),
            })
        }
    };

    if let Some(bad) = choices.iter().find(|c| BaseType::of_literal(c) != Some(base)) {
        return Err(SchemaError::InvalidConstraint {
            name: name.to_string(),
            reason: format!("choice {} is not a valid {}", bad, base),
        });
    }

    Ok(FieldType::Choice(ChoiceSet {
        name: name.to_string(),
        base,
        members: choices,
    }))
}
