// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::errors::LoadError;
use crate::loader::ModuleSpec;
use crate::schema::Mode;
use crate::traits::predictor::{PredictFn, Predictor};

/// Zero-argument constructor of a predictor class.
pub type ClassFactory = Arc<dyn Fn() -> anyhow::Result<Box<dyn Predictor>> + Send + Sync>;

/// A top-level symbol found in an executed module.
#[derive(Clone)]
pub enum Symbol {
    Class(ClassFactory),
    Function(Arc<dyn PredictFn>),
}

impl Symbol {
    pub fn kind(&self) -> &'static str {
        match self {
            Symbol::Class(_) => "class",
            Symbol::Function(_) => "function",
        }
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol::{}", self.kind())
    }
}

/// The namespace left behind by executing a module.
#[derive(Debug, Clone, Default)]
pub struct LoadedModule {
    pub name: String,
    symbols: HashMap<String, Symbol>,
}

impl LoadedModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbols: HashMap::new(),
        }
    }

    pub fn with_symbol(mut self, name: impl Into<String>, symbol: Symbol) -> Self {
        self.symbols.insert(name.into(), symbol);
        self
    }

    pub fn symbol(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn symbol_names(&self) -> impl Iterator<Item = &String> {
        self.symbols.keys()
    }
}

/// Process-visible arguments as seen by an imported module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportContext {
    argv: Vec<String>,
}

impl ImportContext {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::args().collect())
    }

    pub fn args(&self) -> &[String] {
        &self.argv
    }

    /// The context a module is imported under: program name only.
    pub fn hidden(&self) -> Self {
        Self::new(self.argv.first().cloned().into_iter().collect())
    }
}

/// Executes predictor modules on behalf of the loader.
///
/// `exec_full` runs a module as written. `exec_slim` runs a reduced module
/// containing only what the requested entry point needs; returning
/// `Ok(None)` means the slim path has nothing to offer for this module.
pub trait ModuleHost: Send + Sync {
    fn supports_slim(&self) -> bool {
        false
    }

    fn module_exists(&self, spec: &ModuleSpec) -> bool {
        spec.path.exists()
    }

    fn exec_full(&self, spec: &ModuleSpec, ctx: &ImportContext) -> Result<LoadedModule, LoadError>;

    fn exec_slim(
        &self,
        _spec: &ModuleSpec,
        _symbol: &str,
        _mode: Mode,
        _ctx: &ImportContext,
    ) -> Result<Option<LoadedModule>, LoadError> {
        Ok(None)
    }
}
