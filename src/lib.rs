// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod builtins;   // compiled-in predictors
pub mod config;     // cog.yaml + environment settings
pub mod errors;     // error handling
pub mod loader;     // predictor references -> instances
pub mod observability;
pub mod predictor;  // handle, context, outputs, weights
pub mod protocol;   // worker/supervisor wire protocol
pub mod schema;     // signature -> input/output schemas
pub mod supervisor; // parent side
pub mod tools;      // agent tools and remote predictors
pub mod traits;     // unified abstractions
pub mod utils;
pub mod worker;     // child side
