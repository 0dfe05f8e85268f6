// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::path::PathBuf;

/// Errors that make a project unusable before any worker is started
#[derive(Debug)]
pub enum ConfigError {
    /// The project configuration file is missing
    DoesNotExist {
        /// Where the configuration was expected
        path: PathBuf,
    },
    /// The project configuration file could not be read or parsed
    Invalid {
        /// The configuration file
        path: PathBuf,
        /// What went wrong
        reason: String,
    },
    /// Neither a `predict` nor a `train` entry (whichever was asked for) is set
    PredictorNotSet {
        /// `predict` or `train`
        mode: String,
    },
    /// A predictor reference is not of the form `<module-path>:<name>`
    InvalidReference {
        /// The offending reference
        reference: String,
    },
    /// A predictor reference points to a module that does not exist
    ModuleNotFound {
        /// The reference as written
        reference: String,
        /// The resolved module path
        path: PathBuf,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::DoesNotExist { path } => {
                write!(f, "Could not find {}", path.display())
            }
            ConfigError::Invalid { path, reason } => {
                write!(f, "Invalid configuration in {}: {}", path.display(), reason)
            }
            ConfigError::PredictorNotSet { mode } => {
                write!(
                    f,
                    "Can't run predictions: '{}' option not found in configuration",
                    mode
                )
            }
            ConfigError::InvalidReference { reference } => {
                write!(
                    f,
                    "Invalid predictor reference '{}': expected '<module-path>:<ClassOrFunctionName>'",
                    reference
                )
            }
            ConfigError::ModuleNotFound { reference, path } => {
                write!(
                    f,
                    "Predictor reference '{}' points to a missing module: {}",
                    reference,
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}
