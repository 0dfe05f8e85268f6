// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors on the supervisor/worker channel.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// A frame could not be decoded.
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    /// An encoded frame exceeds what the peer will accept.
    #[error("Frame of {length} bytes exceeds the {limit} byte limit")]
    FrameTooLarge { length: usize, limit: usize },

    /// The underlying transport failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The peer closed the channel.
    #[error("Channel closed")]
    ChannelClosed,

    /// A request was issued after Shutdown.
    #[error("Worker has been shut down")]
    ShutDown,

    /// A message arrived that breaks the per-prediction sequencing rules.
    #[error("Protocol violation: {0}")]
    Violation(String),
}

impl From<std::io::Error> for ProtocolError {
    fn from(error: std::io::Error) -> Self {
        ProtocolError::Transport(error.to_string())
    }
}

impl From<serde_json::Error> for ProtocolError {
    fn from(error: serde_json::Error) -> Self {
        ProtocolError::MalformedFrame(error.to_string())
    }
}

impl From<tokio_util::codec::LinesCodecError> for ProtocolError {
    fn from(error: tokio_util::codec::LinesCodecError) -> Self {
        ProtocolError::Transport(error.to_string())
    }
}
