//! Incremental decoder for the `text/event-stream` format.
//!
//! Network chunks do not respect line boundaries (or even UTF-8 character
//! boundaries), so bytes are buffered until a full line is available:
//!
//! ```text
//! : keep-alive
//! event: status_changed
//! data: {"type":"status_changed","transactionId":"T1"}
//!
//! ```
//!
//! Only `data` fields matter; the event type travels inside the JSON.

use crate::domain::sync::TransportError;

/// Longest unterminated line accepted before the stream is abandoned.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Buffers raw bytes and yields complete event payloads.
#[derive(Debug)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data: Vec<String>,
    max_line: usize,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::with_max_line(MAX_LINE_BYTES)
    }
}

impl SseDecoder {
    /// Creates an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_line(max_line: usize) -> Self {
        Self {
            buffer: Vec::new(),
            data: Vec::new(),
            max_line,
        }
    }

    /// Feeds one chunk, returning every payload it completed.
    ///
    /// Fails once a line grows past the limit without a newline; the
    /// decoder is then empty and the stream should be dropped.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<String>, TransportError> {
        self.buffer.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=newline).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let line = String::from_utf8_lossy(&line);
            if let Some(payload) = self.process_line(&line) {
                payloads.push(payload);
            }
        }

        if self.buffer.len() > self.max_line {
            let pending = self.buffer.len();
            self.buffer = Vec::new();
            self.data.clear();
            return Err(TransportError::stream(format!(
                "Line exceeds {} bytes ({} pending)",
                self.max_line, pending
            )));
        }
        Ok(payloads)
    }

    fn process_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        if field == "data" {
            self.data.push(value.to_string());
        }
        None
    }

    fn dispatch(&mut self) -> Option<String> {
        if self.data.is_empty() {
            return None;
        }
        Some(std::mem::take(&mut self.data).join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_single_event() {
        let mut decoder = SseDecoder::new();
        let out = decoder.push(b"event: status_changed\ndata: {\"type\":\"x\"}\n\n").unwrap();
        assert_eq!(out, vec![r#"{"type":"x"}"#.to_string()]);
    }

    #[test]
    fn buffers_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: {\"ty").unwrap().is_empty());
        assert!(decoder.push(b"pe\":\"x\"}\n").unwrap().is_empty());
        assert_eq!(decoder.push(b"\n").unwrap(), vec![r#"{"type":"x"}"#.to_string()]);
    }

    #[test]
    fn utf8_split_across_chunks_survives() {
        let bytes = "data: {\"content\":\"héllo\"}\n\n".as_bytes();
        let split = bytes.iter().position(|b| *b == 0xC3).unwrap() + 1;
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(&bytes[..split]).unwrap().is_empty());
        assert_eq!(decoder.push(&bytes[split..]).unwrap(), vec![r#"{"content":"héllo"}"#.to_string()]);
    }

    #[test]
    fn multiline_data_is_joined() {
        let mut decoder = SseDecoder::new();
        let out = decoder.push(b"data: line one\ndata: line two\n\n").unwrap();
        assert_eq!(out, vec!["line one\nline two".to_string()]);
    }

    #[test]
    fn crlf_line_endings_are_accepted() {
        let mut decoder = SseDecoder::new();
        let out = decoder.push(b"data: {}\r\n\r\n").unwrap();
        assert_eq!(out, vec!["{}".to_string()]);
    }

    #[test]
    fn comments_and_blank_events_yield_nothing() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b": keep-alive\n\n\n").unwrap().is_empty());
    }

    #[test]
    fn several_events_in_one_chunk() {
        let mut decoder = SseDecoder::new();
        let out = decoder.push(b"data: a\n\ndata: b\n\nid: 3\ndata: c\n\n").unwrap();
        assert_eq!(out, vec!["a", "b", "c"]);
    }

    #[test]
    fn data_without_space_after_colon() {
        let mut decoder = SseDecoder::new();
        assert_eq!(decoder.push(b"data:x\n\n").unwrap(), vec!["x"]);
    }

    #[test]
    fn unterminated_event_is_not_dispatched() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: partial\n").unwrap().is_empty());
    }

    #[test]
    fn overlong_line_is_rejected() {
        let mut decoder = SseDecoder::with_max_line(16);
        assert!(decoder.push(b"data: 0123456").unwrap().is_empty());

        let result = decoder.push(b"789abcdef");

        assert!(matches!(result, Err(TransportError::Stream(_))));
    }

    #[test]
    fn long_line_is_fine_once_terminated() {
        let mut decoder = SseDecoder::with_max_line(16);
        let out = decoder.push(b"data: 0123456789abcdef\n\n").unwrap();
        assert_eq!(out, vec!["0123456789abcdef"]);
    }
}
