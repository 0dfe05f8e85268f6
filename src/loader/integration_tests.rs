// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::builtins::{builtin_host, Echo, ECHO_MODULE, SHOUT_MODULE};
use crate::errors::{ConfigError, LoadError};
use crate::loader::{PredictorLoader, PredictorRef, RegistryHost};
use crate::schema::{Mode, SchemaDeriver};
use crate::traits::{ImportContext, LoadedModule, ModuleHost, Predictor, Symbol};

fn echo_module() -> LoadedModule {
    LoadedModule::new("echo").with_symbol(
        "Echo",
        Symbol::Class(Arc::new(|| Ok(Box::new(Echo::default()) as Box<dyn Predictor>))),
    )
}

fn reference(raw: &str) -> PredictorRef {
    PredictorRef::parse(raw).unwrap()
}

/// Host whose slim path misbehaves in a configurable way.
fn host_with_slim<S>(slim: S) -> RegistryHost
where
    S: Fn(&str, Mode, &ImportContext) -> Result<Option<LoadedModule>, LoadError> + Send + Sync + 'static,
{
    let mut host = RegistryHost::new();
    host.register_with_slim(ECHO_MODULE, |_ctx| Ok(echo_module()), slim);
    host
}

fn loader(host: RegistryHost) -> PredictorLoader {
    PredictorLoader::new(Arc::new(host), "/src")
        .with_import_context(ImportContext::new(vec!["cogwheel".to_string(), "--secret-flag".to_string()]))
}

#[test]
fn test_slim_failures_fall_back_to_full_load() {
    let full = loader(host_with_slim(|_, _, _| Ok(None)))
        .with_slim(false)
        .load(&reference("builtins/echo.rs:Echo"), Mode::Predict)
        .unwrap();
    let deriver = SchemaDeriver::default();
    let expected = deriver.derive(&full.predict_signature(), Mode::Predict).unwrap();

    let hosts: Vec<(&str, RegistryHost)> = vec![
        ("returns nothing", host_with_slim(|_, _, _| Ok(None))),
        (
            "errors",
            host_with_slim(|_, _, _| {
                Err(LoadError::ModuleExecution {
                    module: "echo".to_string(),
                    reason: "syntax error".to_string(),
                })
            }),
        ),
        ("panics", host_with_slim(|_, _, _| panic!("runtime fault in stripped module"))),
        (
            "misses the symbol",
            host_with_slim(|_, _, _| Ok(Some(LoadedModule::new("echo")))),
        ),
        (
            "fails to instantiate",
            host_with_slim(|_, _, _| {
                Ok(Some(LoadedModule::new("echo").with_symbol(
                    "Echo",
                    Symbol::Class(Arc::new(|| Err(anyhow::anyhow!("stripped import missing")))),
                )))
            }),
        ),
    ];

    for (case, host) in hosts {
        let predictor = loader(host)
            .load(&reference("builtins/echo.rs:Echo"), Mode::Predict)
            .unwrap_or_else(|e| panic!("slim path that {} was not recovered: {}", case, e));
        assert_eq!(predictor.name(), full.name(), "{}", case);
        assert_eq!(
            deriver.derive(&predictor.predict_signature(), Mode::Predict).unwrap(),
            expected,
            "{}",
            case
        );
    }
}

#[test]
fn test_slim_path_is_used_when_it_works() {
    let full_runs = Arc::new(AtomicUsize::new(0));
    let slim_runs = Arc::new(AtomicUsize::new(0));

    let mut host = RegistryHost::new();
    let full_counter = Arc::clone(&full_runs);
    let slim_counter = Arc::clone(&slim_runs);
    host.register_with_slim(
        ECHO_MODULE,
        move |_ctx| {
            full_counter.fetch_add(1, Ordering::SeqCst);
            Ok(echo_module())
        },
        move |_symbol, _mode, _ctx| {
            slim_counter.fetch_add(1, Ordering::SeqCst);
            Ok(Some(echo_module()))
        },
    );

    loader(host)
        .load(&reference("builtins/echo.rs:Echo"), Mode::Predict)
        .unwrap();
    assert_eq!(slim_runs.load(Ordering::SeqCst), 1);
    assert_eq!(full_runs.load(Ordering::SeqCst), 0);
}

#[test]
fn test_disabled_slim_is_never_attempted() {
    let slim_runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&slim_runs);
    let host = host_with_slim(move |_, _, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Some(echo_module()))
    });

    loader(host)
        .with_slim(false)
        .load(&reference("builtins/echo.rs:Echo"), Mode::Predict)
        .unwrap();
    assert_eq!(slim_runs.load(Ordering::SeqCst), 0);
}

#[test]
fn test_module_sees_only_program_name() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);

    let mut host = RegistryHost::new();
    host.register(ECHO_MODULE, move |ctx| {
        if let Ok(mut args) = recorder.lock() {
            *args = ctx.args().to_vec();
        }
        Ok(echo_module())
    });

    loader(host)
        .load(&reference("builtins/echo.rs:Echo"), Mode::Predict)
        .unwrap();
    assert_eq!(*seen.lock().unwrap(), vec!["cogwheel".to_string()]);
}

#[test]
fn test_function_symbol_becomes_predictor() {
    let predictor = loader(builtin_host())
        .load(&reference("builtins/shout.rs:shout"), Mode::Predict)
        .unwrap();
    assert_eq!(predictor.name(), "shout");
    assert!(predictor.train_signature().is_some());
    assert_eq!(predictor.predict_signature().parameters.len(), 2);
}

#[test]
fn test_full_load_failures() {
    let missing_symbol = loader(builtin_host())
        .load(&reference("builtins/echo.rs:Nope"), Mode::Predict)
        .err()
        .unwrap();
    assert!(matches!(missing_symbol, LoadError::SymbolNotFound { ref symbol, .. } if symbol == "Nope"));

    let missing_module = loader(builtin_host())
        .load(&reference("missing.rs:Predictor"), Mode::Predict)
        .err()
        .unwrap();
    assert!(matches!(missing_module, LoadError::ModuleNotFound { .. }));

    let mut host = RegistryHost::new();
    host.register(SHOUT_MODULE, |_ctx| -> Result<LoadedModule, LoadError> { panic!("import-time crash") });
    let panicked = loader(host)
        .load(&reference("builtins/shout.rs:shout"), Mode::Predict)
        .err()
        .unwrap();
    assert!(panicked.to_string().contains("import-time crash"));
}

#[test]
fn test_check_reports_missing_module() {
    let loader = loader(builtin_host());
    let spec = loader.check(&reference("builtins/echo.rs:Echo")).unwrap();
    assert_eq!(spec.module_name, "echo");

    let error = loader.check(&reference("predict.py:Predictor")).unwrap_err();
    assert!(matches!(error, ConfigError::ModuleNotFound { .. }));
}

#[test]
fn test_default_host_checks_filesystem() {
    struct FsHost;

    impl ModuleHost for FsHost {
        fn exec_full(&self, _spec: &crate::loader::ModuleSpec, _ctx: &ImportContext) -> Result<LoadedModule, LoadError> {
            Ok(echo_module())
        }
    }

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("predict.py"), "class Predictor: ...").unwrap();
    let loader = PredictorLoader::new(Arc::new(FsHost), dir.path());

    assert!(loader.check(&reference("predict.py:Predictor")).is_ok());
    assert!(loader.check(&reference("other.py:Predictor")).is_err());
}
