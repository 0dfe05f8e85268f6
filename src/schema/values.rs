// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;

/// A validated prediction payload, as handed to predict()/train().
///
/// Every declared parameter is present: either supplied by the caller or
/// filled from its default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inputs(Map<String, Value>);

impl Inputs {
    pub fn new(values: Map<String, Value>) -> Self {
        Self(values)
    }

    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Deserialize a parameter into `T`.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> anyhow::Result<T> {
        let value = self
            .0
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("missing input '{}'", name))?;
        serde_json::from_value(value.clone())
            .map_err(|e| anyhow::anyhow!("input '{}' has an unexpected shape: {}", name, e))
    }

    pub fn text(&self, name: &str) -> anyhow::Result<String> {
        self.get(name)
    }

    pub fn integer(&self, name: &str) -> anyhow::Result<i64> {
        self.get(name)
    }

    pub fn float(&self, name: &str) -> anyhow::Result<f64> {
        self.get(name)
    }

    pub fn boolean(&self, name: &str) -> anyhow::Result<bool> {
        self.get(name)
    }

    pub fn path(&self, name: &str) -> anyhow::Result<PathBuf> {
        self.get(name)
    }

    pub fn secret(&self, name: &str) -> anyhow::Result<Secret> {
        self.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

/// A secret input. Never printed.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(\"**********\")")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("**********")
    }
}
