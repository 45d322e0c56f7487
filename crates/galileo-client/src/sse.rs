//! Server-sent event decoding.
//!
//! [`SseDecoder`] is a push parser: feed it arbitrary byte chunks as they
//! arrive and collect the complete events. [`PairwiseStream`] drives it over
//! the pairwise-matrix response body.

use std::collections::VecDeque;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use log::{debug, info, trace};
use reqwest::Response;
use serde::Deserialize;

use crate::error::{ClientError, Result};

/// Event name of the terminal event on the pairwise-matrix stream.
pub const DONE_EVENT: &str = "done";

/// One dispatched event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseEvent {
    /// Value of the last `event:` field, if any.
    pub event: Option<String>,
    /// `data:` lines joined by `\n`.
    pub data: String,
    pub id: Option<String>,
}

impl SseEvent {
    /// Returns the event type, `message` when none was named.
    pub fn name(&self) -> &str {
        self.event.as_deref().unwrap_or("message")
    }
}

/// Incremental `text/event-stream` parser.
///
/// Lines may end in `\n` or `\r\n` and may be split across chunks at any
/// byte. An event is dispatched on a blank line if it carried at least one
/// `data:` field. A partial event pending when the input ends is discarded.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Option<String>,
    id: Option<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes a chunk and returns every event it completed.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.buffer[start..].iter().position(|&b| b == b'\n') {
            let end = start + offset;
            let line = self.buffer[start..end].strip_suffix(b"\r").unwrap_or(&self.buffer[start..end]);
            let line = String::from_utf8_lossy(line).into_owned();
            start = end + 1;

            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
        }
        self.buffer.drain(..start);

        events
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            trace!(comment = line; "Skipping event stream comment");
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => match &mut self.data {
                Some(data) => {
                    data.push('\n');
                    data.push_str(value);
                }
                None => self.data = Some(value.to_string()),
            },
            "id" => self.id = Some(value.to_string()),
            // `retry` and unknown fields carry nothing the client acts on.
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event = self.event.take();
        let id = self.id.take();
        let data = self.data.take()?;
        Some(SseEvent { event, data, id })
    }
}

/// One progressive rendering of the pairwise scatter matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct PairwiseFrame {
    /// Fraction of rows rendered so far, in `0.0..=1.0`.
    pub progress: f64,
    /// PNG image bytes.
    pub image: Vec<u8>,
}

#[derive(Deserialize)]
struct RawFrame {
    progress: f64,
    image: String,
}

impl PairwiseFrame {
    /// Decodes the JSON payload of a data event.
    pub fn from_event(event: &SseEvent) -> Result<Self> {
        let raw: RawFrame = serde_json::from_str(&event.data).map_err(|source| ClientError::Decode {
            context: "pairwise matrix event".to_string(),
            source,
        })?;
        Ok(Self {
            progress: raw.progress,
            image: STANDARD.decode(raw.image.trim())?,
        })
    }
}

/// Live pairwise-matrix event stream.
///
/// Yields frames until the backend sends `event: done`, after which the
/// connection is dropped and [`PairwiseStream::next_frame`] keeps returning
/// `None`. Dropping the stream closes the connection too.
pub struct PairwiseStream {
    body: Option<BoxStream<'static, reqwest::Result<Bytes>>>,
    decoder: SseDecoder,
    pending: VecDeque<SseEvent>,
    frames: usize,
}

impl std::fmt::Debug for PairwiseStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PairwiseStream")
            .field("open", &self.body.is_some())
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}

impl PairwiseStream {
    pub(crate) fn new(response: Response) -> Self {
        Self::from_byte_stream(response.bytes_stream())
    }

    /// Wraps any byte stream carrying `text/event-stream` content.
    pub fn from_byte_stream<S>(stream: S) -> Self
    where
        S: futures_util::Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
    {
        Self {
            body: Some(stream.boxed()),
            decoder: SseDecoder::new(),
            pending: VecDeque::new(),
            frames: 0,
        }
    }

    /// Waits for the next frame.
    ///
    /// # Errors
    ///
    /// Fails on transport errors, undecodable frames, or when the body ends
    /// before the `done` event. The stream is closed after any error.
    pub async fn next_frame(&mut self) -> Result<Option<PairwiseFrame>> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                match event.name() {
                    DONE_EVENT => {
                        info!(frames = self.frames; "Pairwise matrix stream finished");
                        self.close();
                        return Ok(None);
                    }
                    "message" => {
                        let frame = PairwiseFrame::from_event(&event).inspect_err(|_| self.close())?;
                        self.frames += 1;
                        debug!(progress = frame.progress, bytes = frame.image.len(); "Received pairwise frame");
                        return Ok(Some(frame));
                    }
                    other => {
                        debug!(event = other; "Ignoring unexpected event");
                        continue;
                    }
                }
            }

            let Some(body) = self.body.as_mut() else {
                return Ok(None);
            };

            match body.next().await {
                Some(Ok(chunk)) => {
                    let events = self.decoder.feed(&chunk);
                    self.pending.extend(events);
                }
                Some(Err(err)) => {
                    self.close();
                    return Err(err.into());
                }
                None => {
                    self.close();
                    return Err(ClientError::Stream(
                        "event stream ended before completion".to_string(),
                    ));
                }
            }
        }
    }

    /// Drops the connection and any undelivered events.
    pub fn close(&mut self) {
        self.body = None;
        self.pending.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.body.is_none() && self.pending.is_empty()
    }

    /// Number of frames delivered so far.
    pub fn frames(&self) -> usize {
        self.frames
    }
}
