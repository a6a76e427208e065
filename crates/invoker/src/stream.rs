// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stream-JSON frame extraction and line buffering.
//!
//! The agent subprocess emits newline-delimited JSON frames. Three
//! channels can carry human-readable text, in preference order:
//!
//! 1. `content_block_delta` frames (`delta.text`)
//! 2. `assistant` message frames (text content blocks)
//! 3. the final `result` frame (`result`)
//!
//! Once a delta has been seen, the later channels are fallbacks for
//! the same text and are ignored. Unparseable lines are dropped
//! silently — the stream routinely interleaves non-JSON noise.

use serde_json::Value;

/// Extracts display text from stream-JSON frames.
#[derive(Debug, Default)]
pub struct FrameExtractor {
    saw_delta: bool,
}

impl FrameExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract text from one frame line, if it carries any.
    pub fn extract(&mut self, line: &str) -> Option<String> {
        let frame: Value = serde_json::from_str(line).ok()?;
        match frame.get("type").and_then(Value::as_str)? {
            "content_block_delta" => {
                let text = frame.get("delta")?.get("text")?.as_str()?;
                self.saw_delta = true;
                Some(text.to_string())
            }
            "assistant" if !self.saw_delta => {
                let blocks = frame.get("message")?.get("content")?.as_array()?;
                let mut out = String::new();
                for block in blocks {
                    if block.get("type").and_then(Value::as_str) == Some("text") {
                        if let Some(text) = block.get("text").and_then(Value::as_str) {
                            out.push_str(text);
                        }
                    }
                }
                (!out.is_empty()).then_some(out)
            }
            "result" if !self.saw_delta => {
                frame.get("result")?.as_str().map(str::to_string)
            }
            _ => None,
        }
    }
}

/// Accumulates text chunks and yields complete lines.
///
/// Splits on `\r?\n`. The trailing partial line is held until
/// [`LineBuffer::flush`] at stream close.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: String,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk; return the complete lines it released.
    pub fn push(&mut self, chunk: &str) -> Vec<String> {
        self.pending.push_str(chunk);
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.find('\n') {
            let mut line: String = self.pending.drain(..=pos).collect();
            line.pop(); // the \n
            if line.ends_with('\r') {
                line.pop();
            }
            lines.push(line);
        }
        lines
    }

    /// Yield the trailing partial line, if any.
    pub fn flush(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }
}

#[cfg(test)]
#[path = "stream_tests.rs"]
mod tests;
