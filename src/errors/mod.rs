// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod load;
mod prediction;
mod protocol;
mod schema;
mod startup;

pub use config::ConfigError;
pub use load::LoadError;
pub use prediction::{FieldError, PredictionError, ValidationError};
pub use protocol::ProtocolError;
pub use schema::SchemaError;
pub use startup::StartupError;
