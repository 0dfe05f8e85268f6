// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod agent_adapter;
pub mod module_host;
pub mod predictor;

pub use agent_adapter::{AgentAdapter, AgentHandle, Tool, ToolFn, Workflow};
pub use module_host::{ClassFactory, ImportContext, LoadedModule, ModuleHost, Symbol};
pub use predictor::{PredictFn, Predictor};
