// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Project configuration file, looked up in the project root
pub const CONFIG_FILE_NAME: &str = "cog.yaml";
/// Conventional local weights location, relative to the project root
pub const WEIGHTS_PATH: &str = "weights";

/// Overrides the project root (defaults to the working directory)
pub const ENV_PROJECT_ROOT: &str = "COG_PROJECT_ROOT";
/// Weights locator handed to setup()
pub const ENV_WEIGHTS: &str = "COG_WEIGHTS";
/// `0`/`false`/`off` disables the slim loading strategy
pub const ENV_SLIM_LOADER: &str = "COG_SLIM_LOADER";
/// Base URL remote predictor tools post to
pub const ENV_REMOTE_BASE_URL: &str = "COG_REMOTE_PREDICTOR_URL";

pub const DEFAULT_REMOTE_BASE_URL: &str = "http://localhost:5002";

/// Longest protocol frame accepted (16 MiB)
pub const MAX_FRAME_LENGTH: usize = 16 * 1024 * 1024;
/// How long a worker gets to exit after Shutdown before it is killed
pub const SHUTDOWN_GRACE_MS: u64 = 5_000;
