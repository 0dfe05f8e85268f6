// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Predictor reference resolution and loading.

mod predictor_loader;
mod reference;
mod registry_host;

#[cfg(test)]
mod integration_tests;

pub use predictor_loader::PredictorLoader;
pub use reference::{ModuleSpec, PredictorRef};
pub use registry_host::{FullBuilder, RegistryHost, SlimBuilder};
