// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;

use crate::errors::{ConfigError, LoadError};
use crate::loader::{ModuleSpec, PredictorRef};
use crate::observability::messages::loader::{PredictorLoadStarted, PredictorLoaded, SlimLoadFallback};
use crate::observability::messages::StructuredLog;
use crate::predictor::FunctionPredictor;
use crate::schema::Mode;
use crate::traits::{ImportContext, LoadedModule, ModuleHost, Predictor, Symbol};
use crate::utils::panic_message;

/// Turns predictor references into live instances.
///
/// The slim strategy is tried first when enabled and the host supports it.
/// Whatever goes wrong there (an error, a panic, no module, a missing symbol)
/// is logged at debug level and the full strategy runs instead. Only a failure
/// of the full strategy is reported.
pub struct PredictorLoader {
    host: Arc<dyn ModuleHost>,
    root: PathBuf,
    slim_enabled: bool,
    import_context: ImportContext,
}

impl PredictorLoader {
    pub fn new(host: Arc<dyn ModuleHost>, root: impl Into<PathBuf>) -> Self {
        Self {
            host,
            root: root.into(),
            slim_enabled: true,
            import_context: ImportContext::from_env(),
        }
    }

    pub fn with_slim(mut self, enabled: bool) -> Self {
        self.slim_enabled = enabled;
        self
    }

    pub fn with_import_context(mut self, context: ImportContext) -> Self {
        self.import_context = context;
        self
    }

    /// Confirm the reference points at an existing module.
    pub fn check(&self, reference: &PredictorRef) -> Result<ModuleSpec, ConfigError> {
        let spec = reference.resolve(&self.root);
        if !self.host.module_exists(&spec) {
            return Err(ConfigError::ModuleNotFound {
                reference: reference.to_string(),
                path: spec.path,
            });
        }
        Ok(spec)
    }

    pub fn load(&self, reference: &PredictorRef, mode: Mode) -> Result<Box<dyn Predictor>, LoadError> {
        let spec = reference.resolve(&self.root);
        let context = self.import_context.hidden();
        let slim = self.slim_enabled && self.host.supports_slim();
        let label = reference.to_string();

        PredictorLoadStarted {
            reference: &label,
            mode: mode.method(),
            slim,
        }
        .log();

        if slim {
            match self.load_slim(&spec, reference.symbol(), mode, &context) {
                Ok((predictor, kind)) => {
                    PredictorLoaded {
                        reference: &label,
                        kind,
                        slim: true,
                    }
                    .log();
                    return Ok(predictor);
                }
                Err(reason) => SlimLoadFallback {
                    module: &spec.relative,
                    symbol: reference.symbol(),
                    reason: &reason,
                }
                .log(),
            }
        }

        let (predictor, kind) = self.load_full(&spec, reference.symbol(), &context)?;
        PredictorLoaded {
            reference: &label,
            kind,
            slim: false,
        }
        .log();
        Ok(predictor)
    }

    fn load_slim(
        &self,
        spec: &ModuleSpec,
        symbol: &str,
        mode: Mode,
        context: &ImportContext,
    ) -> Result<(Box<dyn Predictor>, &'static str), String> {
        let attempt = catch_unwind(AssertUnwindSafe(|| {
            let module = self
                .host
                .exec_slim(spec, symbol, mode, context)
                .map_err(|e| e.to_string())?
                .ok_or_else(|| "host produced no slim module".to_string())?;
            instantiate(&module, symbol).map_err(|e| e.to_string())
        }));
        match attempt {
            Ok(result) => result,
            Err(payload) => Err(format!("panicked: {}", panic_message(payload.as_ref()))),
        }
    }

    fn load_full(
        &self,
        spec: &ModuleSpec,
        symbol: &str,
        context: &ImportContext,
    ) -> Result<(Box<dyn Predictor>, &'static str), LoadError> {
        let attempt = catch_unwind(AssertUnwindSafe(|| {
            let module = self.host.exec_full(spec, context)?;
            instantiate(&module, symbol)
        }));
        attempt.unwrap_or_else(|payload| {
            Err(LoadError::ModuleExecution {
                module: spec.relative.clone(),
                reason: format!("panicked: {}", panic_message(payload.as_ref())),
            })
        })
    }
}

/// A class is constructed with no arguments; a function becomes the
/// predict callable.
fn instantiate(module: &LoadedModule, name: &str) -> Result<(Box<dyn Predictor>, &'static str), LoadError> {
    let symbol = module.symbol(name).ok_or_else(|| LoadError::SymbolNotFound {
        module: module.name.clone(),
        symbol: name.to_string(),
    })?;

    let predictor: Box<dyn Predictor> = match symbol {
        Symbol::Class(construct) => construct().map_err(|e| LoadError::Instantiation {
            symbol: name.to_string(),
            reason: format!("{:#}", e),
        })?,
        Symbol::Function(entry) => Box::new(FunctionPredictor::new(name, Arc::clone(entry))),
    };
    Ok((predictor, symbol.kind()))
}
