//! Incremental parser for the `text/event-stream` wire format.
//!
//! Field lines per the SSE protocol:
//! - `event:` names the event type
//! - `data:` carries the payload (multiple lines join with `\n`)
//! - `id:` carries the event ID
//! - an empty line terminates the frame
//! - lines starting with `:` are comments (the server uses them as keepalive)
//!
//! Bytes are buffered until a full line is available, so frames split
//! across network chunks (including mid-character) reassemble correctly.

/// A complete parsed event frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFrame {
    /// Event type from the `event:` field; `None` means the default
    /// `message` type.
    pub event: Option<String>,
    /// Payload from the `data:` field(s).
    pub data: String,
    /// ID from the `id:` field.
    pub id: Option<String>,
}

/// Streaming parser that accumulates bytes and yields complete frames.
#[derive(Default)]
pub struct FrameParser {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
    id: Option<String>,
}

impl FrameParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of bytes, returning any frames completed by it.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<EventFrame> {
        self.buffer.extend_from_slice(bytes);

        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line_bytes: Vec<u8> = self.buffer.drain(..=pos).collect();
            // Strip the \n and a preceding \r (CRLF servers).
            let end = line_bytes.len() - 1;
            let end = if end > 0 && line_bytes[end - 1] == b'\r' {
                end - 1
            } else {
                end
            };

            let Ok(line) = std::str::from_utf8(&line_bytes[..end]) else {
                tracing::warn!("dropping non-UTF-8 line from event stream");
                continue;
            };

            if let Some(frame) = self.consume_line(line) {
                frames.push(frame);
            }
        }
        frames
    }

    /// Apply one complete line; an empty line finishes the pending frame.
    fn consume_line(&mut self, line: &str) -> Option<EventFrame> {
        if line.is_empty() {
            if self.data.is_empty() && self.event.is_none() {
                return None;
            }
            let frame = EventFrame {
                event: self.event.take(),
                data: self.data.join("\n"),
                id: self.id.take(),
            };
            self.data.clear();
            return Some(frame);
        }

        if let Some(value) = line.strip_prefix("event:") {
            self.event = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("data:") {
            // Both "data: value" and "data:value" occur in the wild.
            self.data
                .push(value.strip_prefix(' ').unwrap_or(value).to_string());
        } else if let Some(value) = line.strip_prefix("id:") {
            self.id = Some(value.trim().to_string());
        } else if !line.starts_with(':') {
            tracing::trace!(line, "ignoring unknown event stream field");
        }
        None
    }

    /// Discard buffered state, for reuse across reconnects.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.event = None;
        self.data.clear();
        self.id = None;
    }
}
