// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    DEFAULT_REMOTE_BASE_URL, ENV_PROJECT_ROOT, ENV_REMOTE_BASE_URL, ENV_SLIM_LOADER, ENV_WEIGHTS,
};
use std::path::PathBuf;

/// Process-level settings taken from the environment.
///
/// # Example
/// ```
/// use cogwheel::config::RuntimeSettings;
///
/// let settings = RuntimeSettings::from_lookup(|key| match key {
///     "COG_SLIM_LOADER" => Some("off".to_string()),
///     _ => None,
/// });
/// assert!(!settings.slim_loader);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeSettings {
    pub project_root: PathBuf,
    /// Raw weights locator for setup(), if one was given.
    pub weights: Option<String>,
    pub slim_loader: bool,
    pub remote_base_url: String,
}

impl RuntimeSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let project_root = lookup(ENV_PROJECT_ROOT)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));

        let slim_loader = lookup(ENV_SLIM_LOADER)
            .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "off" | "no"))
            .unwrap_or(true);

        Self {
            project_root,
            weights: lookup(ENV_WEIGHTS).filter(|v| !v.is_empty()),
            slim_loader,
            remote_base_url: lookup(ENV_REMOTE_BASE_URL)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_REMOTE_BASE_URL.to_string()),
        }
    }
}
