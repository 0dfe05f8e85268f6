// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The worker side of the protocol.
//!
//! A worker owns one [`PredictorHandle`], built once at startup by
//! [`build_handle`], and serves requests for it over a framed channel until
//! told to shut down.

mod runner;


use std::sync::Arc;

pub use runner::Worker;

use crate::errors::StartupError;
use crate::config::RuntimeSettings;
use crate::loader::{PredictorLoader, PredictorRef};
use crate::predictor::PredictorHandle;
use crate::schema::{Mode, SchemaDeriver};
use crate::traits::ModuleHost;

/// Load, derive and set up the predictor a worker will serve.
///
/// Any failure here is fatal: the worker never reaches its request loop.
pub async fn build_handle(
    host: Arc<dyn ModuleHost>,
    reference: &PredictorRef,
    mode: Mode,
    settings: &RuntimeSettings,
) -> Result<PredictorHandle, StartupError> {
    let loader = PredictorLoader::new(host, &settings.project_root).with_slim(settings.slim_loader);
    loader.check(reference)?;
    let predictor = loader.load(reference, mode)?;
    PredictorHandle::build(predictor, mode, &SchemaDeriver::default(), settings).await
}
