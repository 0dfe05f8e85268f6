// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod loader;
mod settings;

pub mod consts;

pub use loader::{load_config, load_project_config, ProjectConfig};
pub use settings::RuntimeSettings;
