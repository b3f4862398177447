//! Server-sent events decoding for streamed chat completions.

use crate::http::extract_error_message;
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use hext_core::agent::TextStream;
use hext_core::error::{HextError, Result};
use serde::Deserialize;
use std::collections::VecDeque;

/// One decoded `data:` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    Data(String),
    Done,
}

/// Incremental line decoder. Chunks may split lines (and UTF-8 sequences)
/// anywhere; only complete lines are decoded.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk and returns the events completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(event) = decode_line(&line) {
                events.push(event);
            }
        }
        events
    }

    /// Decodes whatever is left once the body ends without a final newline.
    pub fn finish(&mut self) -> Option<SseEvent> {
        let rest = std::mem::take(&mut self.buffer);
        decode_line(&rest)
    }
}

fn decode_line(line: &[u8]) -> Option<SseEvent> {
    let line = String::from_utf8_lossy(line);
    let line = line.trim_end_matches(&['\r', '\n'][..]);

    // Blank lines separate events; lines starting with ':' are comments.
    let data = line.strip_prefix("data:")?;
    let data = data.strip_prefix(' ').unwrap_or(data);

    if data.trim() == "[DONE]" {
        Some(SseEvent::Done)
    } else {
        Some(SseEvent::Data(data.to_string()))
    }
}

#[derive(Deserialize)]
struct ChunkResponse {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Option<ChunkDelta>,
}

#[derive(Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Extracts the text delta of one chunk. Chunks without content (role
/// announcements, usage reports) yield `None`.
fn parse_chunk(data: &str) -> Result<Option<String>> {
    if let Some(message) = extract_error_message(data) {
        return Err(HextError::from_status(200, message, None));
    }

    let chunk: ChunkResponse = serde_json::from_str(data).map_err(|err| {
        HextError::unexpected(format!("Malformed stream chunk '{data}': {err}"))
    })?;

    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta)
        .and_then(|delta| delta.content)
        .filter(|content| !content.is_empty()))
}

struct StreamState {
    body: BoxStream<'static, Result<Vec<u8>>>,
    decoder: SseDecoder,
    pending: VecDeque<String>,
    finished: bool,
}

/// Turns a raw SSE body into text deltas.
///
/// The stream ends at `data: [DONE]` or at the end of the body, whichever
/// comes first. The first error ends it too.
pub fn text_deltas(body: BoxStream<'static, Result<Vec<u8>>>) -> TextStream {
    let state = StreamState {
        body,
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    Box::pin(stream::unfold(state, |mut state| async move {
        loop {
            if let Some(data) = state.pending.pop_front() {
                match parse_chunk(&data) {
                    Ok(Some(text)) => return Some((Ok(text), state)),
                    Ok(None) => continue,
                    Err(err) => {
                        state.pending.clear();
                        state.finished = true;
                        return Some((Err(err), state));
                    }
                }
            }

            if state.finished {
                return None;
            }

            match state.body.next().await {
                Some(Ok(chunk)) => {
                    for event in state.decoder.push(&chunk) {
                        match event {
                            SseEvent::Data(data) => state.pending.push_back(data),
                            SseEvent::Done => {
                                state.finished = true;
                                break;
                            }
                        }
                    }
                }
                Some(Err(err)) => {
                    state.finished = true;
                    return Some((Err(err), state));
                }
                None => {
                    state.finished = true;
                    if let Some(SseEvent::Data(data)) = state.decoder.finish() {
                        state.pending.push_back(data);
                    }
                }
            }
        }
    }))
}
