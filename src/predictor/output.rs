// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use futures::stream::{self, BoxStream, Stream, StreamExt};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// What predict()/train() returns: one value, or a lazy sequence of values.
pub enum Output {
    Value(Value),
    Stream(BoxStream<'static, anyhow::Result<Value>>),
}

impl Output {
    pub fn value<T: Serialize>(value: T) -> anyhow::Result<Self> {
        Ok(Output::Value(serde_json::to_value(value)?))
    }

    pub fn stream<S>(items: S) -> Self
    where
        S: Stream<Item = anyhow::Result<Value>> + Send + 'static,
    {
        Output::Stream(items.boxed())
    }

    /// A stream over already computed items.
    pub fn items<I, T>(items: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Serialize,
    {
        let values = items
            .into_iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Output::stream(stream::iter(values.into_iter().map(Ok))))
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, Output::Stream(_))
    }

    /// Drain into plain values. Used outside the worker, e.g. by tools.
    pub async fn collect(self) -> anyhow::Result<Vec<Value>> {
        match self {
            Output::Value(value) => Ok(vec![value]),
            Output::Stream(mut items) => {
                let mut values = Vec::new();
                while let Some(item) = items.next().await {
                    values.push(item?);
                }
                Ok(values)
            }
        }
    }
}

impl From<Value> for Output {
    fn from(value: Value) -> Self {
        Output::Value(value)
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Output::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}
