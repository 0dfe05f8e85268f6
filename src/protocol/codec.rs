// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Newline-delimited JSON framing over any async byte stream.

use crate::config::consts::MAX_FRAME_LENGTH;
use crate::errors::ProtocolError;
use futures::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};

/// Reads one `T` per line. Blank lines are skipped.
pub struct FrameReader<R, T> {
    inner: FramedRead<R, LinesCodec>,
    _frame: PhantomData<fn() -> T>,
}

impl<R, T> FrameReader<R, T>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    pub fn new(reader: R) -> Self {
        Self {
            inner: FramedRead::new(reader, LinesCodec::new_with_max_length(MAX_FRAME_LENGTH)),
            _frame: PhantomData,
        }
    }

    /// Next frame, or `None` once the peer has closed the stream.
    pub async fn next(&mut self) -> Option<Result<T, ProtocolError>> {
        loop {
            match self.inner.next().await? {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => return Some(decode(&line)),
                Err(e) => return Some(Err(e.into())),
            }
        }
    }

    /// Like [`FrameReader::next`], but a line that is not a JSON object is
    /// handed back as [`Line::Text`] instead of failing.
    ///
    /// A JSON object that does not decode as `T` is still malformed.
    pub async fn next_line(&mut self) -> Option<Result<Line<T>, ProtocolError>> {
        loop {
            match self.inner.next().await? {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => {
                    return Some(match decode(&line) {
                        Ok(frame) => Ok(Line::Frame(frame)),
                        Err(_) if !is_json_object(&line) => Ok(Line::Text(line)),
                        Err(e) => Err(e),
                    })
                }
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

/// One line read by [`FrameReader::next_line`].
#[derive(Debug, PartialEq)]
pub enum Line<T> {
    Frame(T),
    Text(String),
}

fn decode<T: DeserializeOwned>(line: &str) -> Result<T, ProtocolError> {
    serde_json::from_str(line).map_err(|e| ProtocolError::MalformedFrame(format!("{}: {}", e, truncate(line))))
}

fn is_json_object(line: &str) -> bool {
    matches!(serde_json::from_str::<serde_json::Value>(line), Ok(serde_json::Value::Object(_)))
}

/// Writes one `T` per line, flushing after each frame.
pub struct FrameWriter<W, T> {
    inner: FramedWrite<W, LinesCodec>,
    _frame: PhantomData<fn(T)>,
}

impl<W, T> FrameWriter<W, T>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    pub fn new(writer: W) -> Self {
        Self {
            inner: FramedWrite::new(writer, LinesCodec::new()),
            _frame: PhantomData,
        }
    }

    /// Frames longer than [`MAX_FRAME_LENGTH`] are refused with
    /// [`ProtocolError::FrameTooLarge`]; the peer's reader would reject them.
    pub async fn send(&mut self, frame: &T) -> Result<(), ProtocolError> {
        let line = serde_json::to_string(frame)?;
        check_length(line.len())?;
        self.inner.send(line).await?;
        Ok(())
    }

    pub async fn close(&mut self) -> Result<(), ProtocolError> {
        SinkExt::<String>::close(&mut self.inner).await?;
        Ok(())
    }
}

/// Whether an encoded frame of `length` bytes fits on the wire.
pub fn check_length(length: usize) -> Result<(), ProtocolError> {
    if length > MAX_FRAME_LENGTH {
        return Err(ProtocolError::FrameTooLarge {
            length,
            limit: MAX_FRAME_LENGTH,
        });
    }
    Ok(())
}

fn truncate(line: &str) -> String {
    const SHOWN: usize = 120;
    if line.chars().count() <= SHOWN {
        line.to_string()
    } else {
        format!("{}...", line.chars().take(SHOWN).collect::<String>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::messages::Event;

    #[tokio::test]
    async fn test_frames_cross_a_pipe_in_order() {
        let (client, server) = tokio::io::duplex(1024);
        let mut writer: FrameWriter<_, Event> = FrameWriter::new(client);
        let mut reader: FrameReader<_, Event> = FrameReader::new(server);

        writer.send(&Event::stdout("one")).await.unwrap();
        writer.send(&Event::succeeded()).await.unwrap();
        drop(writer);

        assert_eq!(reader.next().await.unwrap().unwrap(), Event::stdout("one"));
        assert_eq!(reader.next().await.unwrap().unwrap(), Event::succeeded());
        assert!(reader.next().await.is_none());
    }

    #[tokio::test]
    async fn test_malformed_frame_does_not_end_the_stream() {
        let input: &[u8] = b"not json\n\n{\"type\":\"Done\"}\n";
        let mut reader: FrameReader<_, Event> = FrameReader::new(input);

        assert!(matches!(
            reader.next().await,
            Some(Err(ProtocolError::MalformedFrame(_)))
        ));
        assert_eq!(reader.next().await.unwrap().unwrap(), Event::succeeded());
        assert!(reader.next().await.is_none());
    }

    #[tokio::test]
    async fn test_plain_text_lines_are_returned_as_text() {
        let input: &[u8] = b"loading weights... 50%\n42\n{\"type\":\"Bogus\"}\n{\"type\":\"Done\"}\n";
        let mut reader: FrameReader<_, Event> = FrameReader::new(input);

        assert_eq!(
            reader.next_line().await.unwrap().unwrap(),
            Line::Text("loading weights... 50%".to_string())
        );
        assert_eq!(reader.next_line().await.unwrap().unwrap(), Line::Text("42".to_string()));
        assert!(matches!(
            reader.next_line().await,
            Some(Err(ProtocolError::MalformedFrame(_)))
        ));
        assert_eq!(reader.next_line().await.unwrap().unwrap(), Line::Frame(Event::succeeded()));
        assert!(reader.next_line().await.is_none());
    }

    #[tokio::test]
    async fn test_oversized_frame_is_refused_and_writer_stays_usable() {
        let (client, server) = tokio::io::duplex(1024);
        let mut writer: FrameWriter<_, Event> = FrameWriter::new(client);
        let mut reader: FrameReader<_, Event> = FrameReader::new(server);

        let huge = Event::PredictionOutput {
            payload: serde_json::Value::String("x".repeat(MAX_FRAME_LENGTH)),
        };
        assert!(matches!(
            writer.send(&huge).await,
            Err(ProtocolError::FrameTooLarge { limit: MAX_FRAME_LENGTH, .. })
        ));

        writer.send(&Event::succeeded()).await.unwrap();
        drop(writer);
        assert_eq!(reader.next().await.unwrap().unwrap(), Event::succeeded());
        assert!(reader.next().await.is_none());
    }
}
