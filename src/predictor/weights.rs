// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Resolution of the `weights` argument handed to setup().

use crate::config::consts::WEIGHTS_PATH;
use crate::errors::StartupError;
use crate::schema::{Annotation, BaseType};
use std::path::Path;

/// The weights argument, shaped after the declared parameter type.
///
/// File and Path locators may be URLs when they come from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Weights {
    File(String),
    Path(String),
    Text(String),
}

impl Weights {
    pub fn locator(&self) -> &str {
        match self {
            Weights::File(s) | Weights::Path(s) | Weights::Text(s) => s,
        }
    }
}

/// Pick the weights for setup().
///
/// An explicit locator wins and is shaped after `weights_type`; otherwise a
/// `weights` entry in the project root is used for File/Path types;
/// otherwise setup() gets nothing.
pub fn resolve_weights(
    weights_type: Option<&Annotation>,
    locator: Option<&str>,
    root: &Path,
) -> Result<Option<Weights>, StartupError> {
    let Some(declared) = weights_type.map(strip_optional) else {
        return Ok(None);
    };

    if let Some(locator) = locator {
        let weights = match declared {
            Annotation::Base(BaseType::File) => Weights::File(locator.to_string()),
            Annotation::Base(BaseType::Path) => Weights::Path(locator.to_string()),
            Annotation::Base(BaseType::Text) => Weights::Text(locator.to_string()),
            other => return Err(StartupError::UnsupportedWeightsType(other.to_string())),
        };
        return Ok(Some(weights));
    }

    let local = root.join(WEIGHTS_PATH);
    if local.exists() {
        let path = local.to_string_lossy().into_owned();
        return match declared {
            Annotation::Base(BaseType::File) => Ok(Some(Weights::File(path))),
            Annotation::Base(BaseType::Path) => Ok(Some(Weights::Path(path))),
            other => Err(StartupError::UnsupportedWeightsType(other.to_string())),
        };
    }

    Ok(None)
}

/// `Union[T, None]` is treated as `T`.
fn strip_optional(annotation: &Annotation) -> &Annotation {
    match annotation {
        Annotation::Union(members) if members.len() == 2 && members[1] == Annotation::named("None") => &members[0],
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_weights_parameter() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolve_weights(None, Some("https://x/w.bin"), dir.path()).unwrap(), None);
    }

    #[test]
    fn test_locator_follows_declared_type() {
        let dir = tempfile::tempdir().unwrap();
        let cases = vec![
            (Annotation::file(), Weights::File("https://x/w.bin".to_string())),
            (Annotation::path(), Weights::Path("https://x/w.bin".to_string())),
            (Annotation::text(), Weights::Text("https://x/w.bin".to_string())),
            (
                Annotation::Union(vec![Annotation::path(), Annotation::named("None")]),
                Weights::Path("https://x/w.bin".to_string()),
            ),
        ];
        for (declared, expected) in cases {
            let resolved = resolve_weights(Some(&declared), Some("https://x/w.bin"), dir.path()).unwrap();
            assert_eq!(resolved, Some(expected));
        }

        let error = resolve_weights(Some(&Annotation::integer()), Some("1"), dir.path()).unwrap_err();
        assert!(matches!(error, StartupError::UnsupportedWeightsType(ref t) if t == "int"));
    }

    #[test]
    fn test_local_weights_path() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolve_weights(Some(&Annotation::path()), None, dir.path()).unwrap(), None);

        std::fs::write(dir.path().join(WEIGHTS_PATH), b"weights").unwrap();
        let resolved = resolve_weights(Some(&Annotation::path()), None, dir.path()).unwrap().unwrap();
        assert!(matches!(resolved, Weights::Path(_)));
        assert!(resolved.locator().ends_with(WEIGHTS_PATH));

        assert!(resolve_weights(Some(&Annotation::text()), None, dir.path()).is_err());
    }
}
