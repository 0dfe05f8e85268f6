// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::CONFIG_FILE_NAME;
use crate::errors::ConfigError;
use crate::loader::PredictorRef;
use crate::schema::Mode;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Project configuration as read from `cog.yaml`.
///
/// Only the entry points matter to the runtime; everything else in the file
/// (build settings and the like) is kept as opaque values.
///
/// # Example
/// ```yaml
/// predict: "predict.py:Predictor"
/// train: "train.py:train"
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct ProjectConfig {
    pub predict: Option<String>,
    pub train: Option<String>,
    #[serde(flatten)]
    pub other: HashMap<String, serde_yaml::Value>,
}

impl ProjectConfig {
    /// The raw reference configured for `mode`.
    pub fn entry(&self, mode: Mode) -> Option<&str> {
        match mode {
            Mode::Predict => self.predict.as_deref(),
            Mode::Train => self.train.as_deref(),
        }
    }

    /// The parsed reference configured for `mode`.
    pub fn predictor_ref(&self, mode: Mode) -> Result<PredictorRef, ConfigError> {
        let entry = self.entry(mode).ok_or_else(|| ConfigError::PredictorNotSet {
            mode: mode.method().to_string(),
        })?;
        PredictorRef::parse(entry)
    }
}

/// Load a project config from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ProjectConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConfigError::DoesNotExist {
            path: path.to_path_buf(),
        },
        _ => ConfigError::Invalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    })?;

    // An empty file is a valid, entry-less config.
    if content.trim().is_empty() {
        return Ok(ProjectConfig::default());
    }

    serde_yaml::from_str(&content).map_err(|e| ConfigError::Invalid {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Load `cog.yaml` from a project root
pub fn load_project_config<P: AsRef<Path>>(root: P) -> Result<ProjectConfig, ConfigError> {
    load_config(root.as_ref().join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic_config() {
        let yaml = r#"
build:
  python_version: "3.11"
predict: "predict.py:Predictor"
"#;

        let cfg: ProjectConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.predict.as_deref(), Some("predict.py:Predictor"));
        assert!(cfg.train.is_none());
        assert!(cfg.other.contains_key("build"));

        let reference = cfg.predictor_ref(Mode::Predict).unwrap();
        assert_eq!(reference.module(), "predict.py");
        assert_eq!(reference.symbol(), "Predictor");
    }

    #[test]
    fn test_missing_train_entry() {
        let cfg: ProjectConfig = serde_yaml::from_str("predict: \"predict.py:Predictor\"").unwrap();
        let error = cfg.predictor_ref(Mode::Train).unwrap_err();
        assert!(matches!(error, ConfigError::PredictorNotSet { ref mode } if mode == "train"));
        assert!(error.to_string().contains("'train' option not found"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let error = load_project_config(dir.path()).unwrap_err();
        assert!(matches!(error, ConfigError::DoesNotExist { .. }));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "predict: [unclosed").unwrap();
        let error = load_project_config(dir.path()).unwrap_err();
        assert!(matches!(error, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_load_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "").unwrap();
        let cfg = load_project_config(dir.path()).unwrap();
        assert!(cfg.predictor_ref(Mode::Predict).is_err());
    }
}
