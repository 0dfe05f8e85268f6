// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Agent tool management: the per-framework registry and remote predictor
//! tools.

pub mod registry;
pub mod remote;

pub use registry::ToolRegistry;
pub use remote::{RemotePredictor, RemotePredictorMetadata, RemotePredictorSpec, RemoteTool};
