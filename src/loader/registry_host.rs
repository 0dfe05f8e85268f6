// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::LoadError;
use crate::loader::ModuleSpec;
use crate::schema::Mode;
use crate::traits::{ImportContext, LoadedModule, ModuleHost};

/// Runs a module as written.
pub type FullBuilder = Arc<dyn Fn(&ImportContext) -> Result<LoadedModule, LoadError> + Send + Sync>;

/// Runs the reduced form of a module for one symbol and entry point.
pub type SlimBuilder =
    Arc<dyn Fn(&str, Mode, &ImportContext) -> Result<Option<LoadedModule>, LoadError> + Send + Sync>;

struct Registered {
    full: FullBuilder,
    slim: Option<SlimBuilder>,
}

/// In-process [`ModuleHost`] backed by compiled-in modules.
///
/// Modules are registered under the path a reference would use, e.g.
/// `"builtins/echo.rs"`. Registering a slim builder makes the slim strategy
/// available for that module; modules without one only load fully.
#[derive(Default)]
pub struct RegistryHost {
    modules: HashMap<String, Registered>,
}

impl RegistryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, path: impl Into<String>, full: F) -> &mut Self
    where
        F: Fn(&ImportContext) -> Result<LoadedModule, LoadError> + Send + Sync + 'static,
    {
        self.modules.insert(
            path.into(),
            Registered {
                full: Arc::new(full),
                slim: None,
            },
        );
        self
    }

    pub fn register_with_slim<F, S>(&mut self, path: impl Into<String>, full: F, slim: S) -> &mut Self
    where
        F: Fn(&ImportContext) -> Result<LoadedModule, LoadError> + Send + Sync + 'static,
        S: Fn(&str, Mode, &ImportContext) -> Result<Option<LoadedModule>, LoadError> + Send + Sync + 'static,
    {
        self.modules.insert(
            path.into(),
            Registered {
                full: Arc::new(full),
                slim: Some(Arc::new(slim)),
            },
        );
        self
    }

    /// Registered module paths, sorted.
    pub fn modules(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.modules.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    fn lookup(&self, spec: &ModuleSpec) -> Result<&Registered, LoadError> {
        self.modules
            .get(&spec.relative)
            .ok_or_else(|| LoadError::ModuleNotFound {
                path: spec.path.clone(),
            })
    }
}

impl ModuleHost for RegistryHost {
    fn supports_slim(&self) -> bool {
        self.modules.values().any(|m| m.slim.is_some())
    }

    fn module_exists(&self, spec: &ModuleSpec) -> bool {
        self.modules.contains_key(&spec.relative)
    }

    fn exec_full(&self, spec: &ModuleSpec, ctx: &ImportContext) -> Result<LoadedModule, LoadError> {
        (self.lookup(spec)?.full)(ctx)
    }

    fn exec_slim(
        &self,
        spec: &ModuleSpec,
        symbol: &str,
        mode: Mode,
        ctx: &ImportContext,
    ) -> Result<Option<LoadedModule>, LoadError> {
        match &self.lookup(spec)?.slim {
            Some(slim) => slim(symbol, mode, ctx),
            None => Ok(None),
        }
    }
}
