use bytes::{Buf, BytesMut};
use serde::Serialize;

use crate::config::AssemblerConfig;
use crate::metrics::PARSE_METRICS;
use crate::models::StreamEnvelope;

/// Counters reported by [`StreamAssembler::stats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AssemblerStats {
    pub processed_lines: usize,
    pub buffer_size: usize,
    pub has_buffered_content: bool,
}

/// Stateful assembler for a newline-delimited envelope stream
///
/// Owns the trailing partial line between calls. One instance serves one
/// stream; call [`reset`](Self::reset) before reusing it for another.
pub struct StreamAssembler {
    buffer: BytesMut,
    processed_lines: usize,
    initial_capacity: usize,
    max_retained_capacity: usize,
}

impl StreamAssembler {
    pub fn new() -> Self {
        Self::with_config(&AssemblerConfig::default())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_config(&AssemblerConfig {
            initial_capacity: capacity,
            max_retained_capacity: capacity.max(AssemblerConfig::default().max_retained_capacity),
        })
    }

    pub fn with_config(config: &AssemblerConfig) -> Self {
        Self {
            buffer: BytesMut::with_capacity(config.initial_capacity),
            processed_lines: 0,
            initial_capacity: config.initial_capacity,
            max_retained_capacity: config.max_retained_capacity,
        }
    }

    /// Feed new bytes and extract every completed envelope line
    ///
    /// Lines are split on raw `\n` bytes, so a multi-byte character cut by
    /// a chunk boundary is reassembled before decoding.
    pub fn process_chunk(&mut self, chunk: &[u8]) -> Vec<StreamEnvelope> {
        self.buffer.extend_from_slice(chunk);
        let mut results = Vec::new();

        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let line = self.buffer.split_to(newline);
            self.buffer.advance(1);
            if let Some(envelope) = self.process_line(&line) {
                results.push(envelope);
            }
        }

        results
    }

    pub fn process_str(&mut self, chunk: &str) -> Vec<StreamEnvelope> {
        self.process_chunk(chunk.as_bytes())
    }

    fn process_line(&mut self, line: &[u8]) -> Option<StreamEnvelope> {
        let text = String::from_utf8_lossy(line);
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        self.processed_lines += 1;

        match StreamEnvelope::from_line(trimmed) {
            Some(envelope) => {
                tracing::debug!(
                    line = self.processed_lines,
                    kind = %envelope.kind,
                    "Parsed stream line"
                );
                PARSE_METRICS.record_envelope();
                Some(envelope)
            }
            None => {
                tracing::warn!(
                    line = self.processed_lines,
                    length = trimmed.len(),
                    preview = %preview(trimmed, 100),
                    "Dropped stream line without a typed JSON object"
                );
                PARSE_METRICS.record_dropped_line();
                None
            }
        }
    }

    /// Drain the trailing partial line at end of stream
    ///
    /// A leftover that is not a typed envelope is surfaced as a `content`
    /// envelope, unless it looks like a truncated JSON fragment.
    pub fn flush(&mut self) -> Vec<StreamEnvelope> {
        let mut results = Vec::new();
        if self.buffer.is_empty() {
            return results;
        }

        let remaining = self.buffer.split();
        let text = String::from_utf8_lossy(&remaining);
        let content = text.trim();
        if content.is_empty() {
            return results;
        }

        if let Some(envelope) = StreamEnvelope::from_line(content) {
            PARSE_METRICS.record_envelope();
            results.push(envelope);
        } else if !looks_like_incomplete_json(content) {
            tracing::debug!(size = content.len(), "Flushed buffer as text content");
            PARSE_METRICS.record_envelope();
            results.push(StreamEnvelope::content(content));
        } else {
            tracing::warn!(
                size = content.len(),
                preview = %preview(content, 100),
                "Discarded incomplete JSON at end of stream"
            );
            PARSE_METRICS.record_dropped_line();
        }

        results
    }

    /// Reset the assembler state between streams
    pub fn reset(&mut self) {
        self.buffer.clear();
        if self.buffer.capacity() > self.max_retained_capacity {
            self.buffer = BytesMut::with_capacity(self.initial_capacity);
        }
        self.processed_lines = 0;
        tracing::debug!("Stream assembler reset");
    }

    pub fn stats(&self) -> AssemblerStats {
        AssemblerStats {
            processed_lines: self.processed_lines,
            buffer_size: self.buffer.len(),
            has_buffered_content: self.buffer.iter().any(|b| !b.is_ascii_whitespace()),
        }
    }
}

impl Default for StreamAssembler {
    fn default() -> Self {
        Self::new()
    }
}

/// Heuristic for a leftover that was cut off mid-JSON
pub fn looks_like_incomplete_json(content: &str) -> bool {
    let content = content.trim();
    let unterminated = |open: char, close: char| {
        content
            .strip_prefix(open)
            .is_some_and(|rest| !rest.contains(close))
    };

    unterminated('{', '}')
        || unterminated('[', ']')
        || unterminated('"', '"')
        || content.ends_with(',')
        || content.ends_with(':')
}

fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
