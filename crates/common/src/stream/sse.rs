use crate::error::Error;
use async_stream::stream;
use bytes::{Bytes, BytesMut};
use faststr::FastStr;
use futures_util::{Stream, StreamExt, pin_mut};
use serde::Deserialize;
use std::fmt::Display;
use tracing::{debug, warn};

const DATA_MARKER: &str = "data:";
pub const DONE_SENTINEL: &str = "[DONE]";

/// What the browser gets told, one frame per event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    Text(FastStr),
    Done,
    Error(FastStr),
}

impl RelayEvent {
    /// `Done` and `Error` end the stream.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RelayEvent::Text(_))
    }
}

impl Display for RelayEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(t) => write!(f, "{t}"),
            Self::Done => write!(f, "Done"),
            Self::Error(e) => write!(f, "Error: {e}"),
        }
    }
}

/// Upstream event payloads, keyed by their `type` field.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    ContentBlockDelta { delta: Delta },
    MessageStop,
    Error {
        #[serde(default)]
        error: StreamErrorDetail,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Delta {
    TextDelta { text: FastStr },
    #[serde(other)]
    Other,
}

#[derive(Debug, Default, Deserialize)]
pub struct StreamErrorDetail {
    #[serde(default)]
    pub message: Option<FastStr>,
}

impl StreamEvent {
    pub fn into_relay(self) -> Option<RelayEvent> {
        match self {
            StreamEvent::ContentBlockDelta {
                delta: Delta::TextDelta { text },
            } => Some(RelayEvent::Text(text)),
            StreamEvent::MessageStop => Some(RelayEvent::Done),
            StreamEvent::Error { error } => Some(RelayEvent::Error(
                error
                    .message
                    .unwrap_or_else(|| FastStr::from_static_str("Upstream stream error")),
            )),
            _ => None,
        }
    }
}

/// Decodes one line of the upstream body. Lines without the data marker,
/// undecodable JSON and unknown event types all yield `None`.
pub fn decode_line(line: &str) -> Option<RelayEvent> {
    let payload = line.strip_prefix(DATA_MARKER)?;
    let payload = payload.strip_prefix(' ').unwrap_or(payload);
    if payload.trim() == DONE_SENTINEL {
        return Some(RelayEvent::Done);
    }
    match serde_json::from_str::<StreamEvent>(payload) {
        Ok(event) => event.into_relay(),
        Err(err) => {
            debug!("skipping undecodable event line: {err}");
            None
        }
    }
}

/// Holds the bytes of the line currently being received.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf:     BytesMut,
    /// Prefix of `buf` already known to hold no newline.
    scanned: usize,
}

impl LineBuffer {
    pub fn extend(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Pops the next complete line without its `\n` or `\r\n` ending.
    pub fn next_line(&mut self) -> Option<String> {
        let Some(offset) = self.buf[self.scanned..].iter().position(|b| *b == b'\n') else {
            self.scanned = self.buf.len();
            return None;
        };
        let line = self.buf.split_to(self.scanned + offset + 1);
        self.scanned = 0;
        let text = String::from_utf8_lossy(&line);
        Some(text.trim_end_matches(['\n', '\r']).to_owned())
    }

    /// Terminates a trailing partial line so it can be popped.
    pub fn finish(&mut self) {
        if !self.buf.is_empty() {
            self.buf.extend_from_slice(b"\n");
        }
    }
}

/// Lazily turns an upstream body into relay events. Stops after the first
/// terminal event; a body that simply ends is treated as done.
pub fn relay_events<S>(body: S) -> impl Stream<Item = RelayEvent>
where
    S: Stream<Item = Result<Bytes, Error>>,
{
    stream! {
        let mut lines = LineBuffer::default();
        pin_mut!(body);
        loop {
            let finished = match body.next().await {
                Some(Ok(chunk)) => {
                    lines.extend(&chunk);
                    false
                }
                Some(Err(err)) => {
                    warn!("upstream stream broke: {err}");
                    yield RelayEvent::Error(err.client_message());
                    return;
                }
                None => {
                    lines.finish();
                    true
                }
            };
            while let Some(line) = lines.next_line() {
                if let Some(event) = decode_line(&line) {
                    let terminal = event.is_terminal();
                    yield event;
                    if terminal {
                        return;
                    }
                }
            }
            if finished {
                break;
            }
        }
        debug!("upstream stream ended without a stop event");
        yield RelayEvent::Done;
    }
}
