// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while turning a predictor reference into an instance.
///
/// Failures of the slim strategy never surface as a `LoadError`; only the
/// full strategy's failure does.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The module file could not be found by the host.
    #[error("Module not found: {}", path.display())]
    ModuleNotFound { path: PathBuf },

    /// Executing the module failed.
    #[error("Failed to execute module '{module}': {reason}")]
    ModuleExecution { module: String, reason: String },

    /// The module executed but does not define the named symbol.
    #[error("Module '{module}' has no attribute '{symbol}'")]
    SymbolNotFound { module: String, symbol: String },

    /// The class was found but constructing it failed.
    #[error("Failed to instantiate '{symbol}': {reason}")]
    Instantiation { symbol: String, reason: String },
}
