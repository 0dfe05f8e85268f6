// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::ConfigError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// A `"<module-path>:<ClassOrFunctionName>"` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictorRef {
    module: String,
    symbol: String,
}

impl PredictorRef {
    /// Split on the last `:` so drive-letter paths survive.
    pub fn parse(reference: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidReference {
            reference: reference.to_string(),
        };
        let (module, symbol) = reference.trim().rsplit_once(':').ok_or_else(invalid)?;
        if module.is_empty() || symbol.is_empty() || !is_identifier(symbol) {
            return Err(invalid());
        }
        Ok(Self {
            module: module.to_string(),
            symbol: symbol.to_string(),
        })
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Locate the module relative to the project root.
    pub fn resolve(&self, root: &Path) -> ModuleSpec {
        let relative = Path::new(&self.module);
        let path = if relative.is_absolute() {
            relative.to_path_buf()
        } else {
            root.join(relative)
        };
        let module_name = relative
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.module.clone());

        ModuleSpec {
            reference: self.to_string(),
            relative: self.module.clone(),
            path,
            module_name,
        }
    }
}

impl fmt::Display for PredictorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.symbol)
    }
}

impl FromStr for PredictorRef {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// A module a reference points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSpec {
    /// The reference as written.
    pub reference: String,
    /// Module path as written in the reference.
    pub relative: String,
    /// Module path resolved against the project root.
    pub path: PathBuf,
    pub module_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let reference = PredictorRef::parse("predict.py:Predictor").unwrap();
        assert_eq!(reference.module(), "predict.py");
        assert_eq!(reference.symbol(), "Predictor");
        assert_eq!(reference.to_string(), "predict.py:Predictor");

        let nested: PredictorRef = "models/sd/predict.py:run_model".parse().unwrap();
        assert_eq!(nested.module(), "models/sd/predict.py");
        assert_eq!(nested.symbol(), "run_model");

        let drive = PredictorRef::parse("C:/src/predict.py:Predictor").unwrap();
        assert_eq!(drive.module(), "C:/src/predict.py");
    }

    #[test]
    fn test_parse_rejects() {
        for bad in ["predict.py", ":Predictor", "predict.py:", "predict.py:Pre-dictor", "predict.py:9lives"] {
            assert!(
                matches!(PredictorRef::parse(bad), Err(ConfigError::InvalidReference { .. })),
                "accepted '{}'",
                bad
            );
        }
    }

    #[test]
    fn test_resolve() {
        let spec = PredictorRef::parse("models/predict.py:Predictor")
            .unwrap()
            .resolve(Path::new("/src"));
        assert_eq!(spec.path, PathBuf::from("/src/models/predict.py"));
        assert_eq!(spec.relative, "models/predict.py");
        assert_eq!(spec.module_name, "predict");
        assert_eq!(spec.reference, "models/predict.py:Predictor");
    }
}
