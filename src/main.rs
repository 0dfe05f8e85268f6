// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::sync::Arc;

use anyhow::{bail, Context};
use cogwheel::builtins::builtin_host;
use cogwheel::config::{load_project_config, RuntimeSettings};
use cogwheel::loader::PredictorRef;
use cogwheel::observability::init_tracing;
use cogwheel::protocol::LogSource;
use cogwheel::schema::Mode;
use cogwheel::supervisor::{PredictionResult, Supervisor};
use cogwheel::worker::{build_handle, Worker};
use serde_json::{Map, Value};

const USAGE: &str = "\
Usage: cogwheel worker [<module-path>:<Name>] [--train]
       cogwheel predict [<module-path>:<Name>] <json-input> [--train]
       cogwheel schema [<module-path>:<Name>] [--train]

When the reference is omitted it is read from cog.yaml in the project root
(COG_PROJECT_ROOT, default: the current directory).";

/// Parsed command line.
struct Invocation {
    command: String,
    positional: Vec<String>,
    mode: Mode,
}

fn parse_args(args: &[String]) -> Option<Invocation> {
    let command = args.get(1)?.clone();
    let mut positional = Vec::new();
    let mut mode = Mode::Predict;
    for arg in &args[2..] {
        match arg.as_str() {
            "--train" => mode = Mode::Train,
            "-h" | "--help" => return None,
            _ => positional.push(arg.clone()),
        }
    }
    Some(Invocation {
        command,
        positional,
        mode,
    })
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();
    let Some(invocation) = parse_args(&args) else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };

    init_tracing("info");

    if let Err(e) = run(invocation).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(invocation: Invocation) -> anyhow::Result<()> {
    let settings = RuntimeSettings::from_env();
    let mode = invocation.mode;

    match (invocation.command.as_str(), invocation.positional.as_slice()) {
        ("worker", []) => run_worker(resolve_reference(None, mode, &settings)?, mode, &settings).await,
        ("worker", [reference]) => run_worker(resolve_reference(Some(reference), mode, &settings)?, mode, &settings).await,
        ("predict", [input]) => run_predict(resolve_reference(None, mode, &settings)?, input, mode).await,
        ("predict", [reference, input]) => {
            run_predict(resolve_reference(Some(reference), mode, &settings)?, input, mode).await
        }
        ("schema", []) => run_schema(resolve_reference(None, mode, &settings)?, mode, &settings).await,
        ("schema", [reference]) => run_schema(resolve_reference(Some(reference), mode, &settings)?, mode, &settings).await,
        _ => bail!("unrecognized arguments\n\n{}", USAGE),
    }
}

fn resolve_reference(explicit: Option<&String>, mode: Mode, settings: &RuntimeSettings) -> anyhow::Result<PredictorRef> {
    match explicit {
        Some(reference) => Ok(PredictorRef::parse(reference)?),
        None => Ok(load_project_config(&settings.project_root)?.predictor_ref(mode)?),
    }
}

/// Serve one predictor over stdin/stdout until told to stop.
async fn run_worker(reference: PredictorRef, mode: Mode, settings: &RuntimeSettings) -> anyhow::Result<()> {
    let handle = build_handle(Arc::new(builtin_host()), &reference, mode, settings).await?;
    Worker::new(Arc::new(handle))
        .with_remote_base_url(settings.remote_base_url.clone())
        .serve(tokio::io::stdin(), tokio::io::stdout())
        .await?;
    Ok(())
}

/// Run a single prediction in a worker child process.
async fn run_predict(reference: PredictorRef, input: &str, mode: Mode) -> anyhow::Result<()> {
    let payload: Map<String, Value> = serde_json::from_str(input).context("input must be a JSON object")?;

    let program = env::current_exe().context("locating own executable")?;
    let mut args = vec!["worker".to_string(), reference.to_string()];
    if mode == Mode::Train {
        args.push("--train".to_string());
    }
    let mut supervisor = Supervisor::spawn(&program, &args, &reference.to_string())?;

    let prediction = supervisor.predict(payload, None)?;
    let canceler = prediction.canceler();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = canceler.cancel();
        }
    });
    let result = prediction.collect().await;
    interrupt.abort();
    supervisor.shutdown().await?;

    report(result?)
}

fn report(result: PredictionResult) -> anyhow::Result<()> {
    for (source, line) in &result.logs {
        match source {
            LogSource::Stdout => eprintln!("{}", line),
            LogSource::Stderr => eprintln!("[stderr] {}", line),
        }
    }
    if result.canceled {
        bail!("prediction canceled");
    }
    if result.error {
        bail!(
            "prediction failed: {}",
            result.error_detail.as_deref().unwrap_or("unknown error")
        );
    }

    if result.multi {
        for output in &result.outputs {
            println!("{}", serde_json::to_string(output)?);
        }
    } else if let Some(output) = result.output() {
        println!("{}", serde_json::to_string_pretty(output)?);
    }
    Ok(())
}

/// Print the OpenAPI document of the predictor's active entry point.
async fn run_schema(reference: PredictorRef, mode: Mode, settings: &RuntimeSettings) -> anyhow::Result<()> {
    let handle = build_handle(Arc::new(builtin_host()), &reference, mode, settings).await?;
    println!("{}", serde_json::to_string_pretty(&handle.openapi())?);
    Ok(())
}
