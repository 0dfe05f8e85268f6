// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Predictor type universe and schema derivation.
//!
//! * `types` - the closed set of base types and the [`Annotation`] tree
//! * `signature` - structured description of a callable's parameters
//! * `deriver` - turns a [`Signature`] into [`InputSchema`]/[`OutputSchema`]
//! * `input` - validation of prediction payloads against an input schema
//! * `output` - the derived output description
//! * `values` - validated payload accessors and the redacted [`Secret`]

pub mod deriver;
pub mod input;
pub mod output;
pub mod signature;
pub mod types;
pub mod values;

pub use deriver::{Mode, SchemaDeriver};
pub use input::{ChoiceSet, FieldType, InputSchema, ParameterSpec};
pub use output::OutputSchema;
pub use signature::{DefaultValue, InputField, ParameterDecl, Signature};
pub use types::{AllowedTypes, Annotation, BaseType};
pub use values::{Inputs, Secret};
