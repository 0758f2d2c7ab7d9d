//! Incremental decoding of a chat-completion event stream.
//!
//! The wire format is `data: <json>` lines with a `[DONE]` sentinel, but
//! chunks arrive split at arbitrary byte offsets. Decoding is staged:
//! bytes to UTF-8 ([`Utf8StreamDecoder`]), text to lines
//! ([`LineAssembler`]), lines to deltas ([`parse_line`]). Each stage keeps
//! its own partial tail so a multi-byte character or half a line can span
//! chunks without corruption.

use std::io::Read;

use anyhow::{Context, Result};
use serde_json::Value;

const READ_CHUNK_BYTES: usize = 2048;

// ---------------------------------------------------------------------------
// Byte stage
// ---------------------------------------------------------------------------

/// Streaming UTF-8 decoder. Emits the longest valid prefix of the bytes
/// seen so far and retains an incomplete trailing sequence (at most 3
/// bytes) for the next chunk. Truly invalid bytes are replaced with
/// U+FFFD and skipped; a split character mid-stream never is.
#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    pending: Vec<u8>,
}

impl Utf8StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk, returning the decodable text.
    pub fn feed(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);
        let mut out = String::new();
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(valid) => {
                    out.push_str(valid);
                    self.pending.clear();
                    break;
                }
                Err(err) => {
                    let valid_len = err.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid_len]));
                    match err.error_len() {
                        // Incomplete tail: keep it for the next chunk.
                        None => {
                            self.pending.drain(..valid_len);
                            break;
                        }
                        // Invalid sequence: replace and move on.
                        Some(bad) => {
                            out.push('\u{FFFD}');
                            self.pending.drain(..valid_len + bad);
                        }
                    }
                }
            }
        }
        out
    }

    /// Flush at end of stream. A dangling partial character becomes U+FFFD.
    pub fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }
}

// ---------------------------------------------------------------------------
// Line stage
// ---------------------------------------------------------------------------

/// Splits decoded text into complete lines, keeping the unterminated tail.
#[derive(Debug, Default)]
pub struct LineAssembler {
    buf: String,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append text and return every newly completed line, `\r` stripped.
    pub fn push(&mut self, text: &str) -> Vec<String> {
        self.buf.push_str(text);
        let mut lines = Vec::new();
        while let Some(pos) = self.buf.find('\n') {
            let mut line: String = self.buf.drain(..=pos).collect();
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
            lines.push(line);
        }
        lines
    }

    /// The final unterminated line, if any.
    pub fn take_remainder(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.buf))
        }
    }
}

// ---------------------------------------------------------------------------
// Event stage
// ---------------------------------------------------------------------------

/// One parsed stream line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseLine {
    /// A content fragment to append.
    Delta(String),
    /// The `[DONE]` sentinel.
    Done,
    /// Blank, malformed, or content-free; ignored.
    Skip,
}

/// Parse a single line of the stream. The `data: ` prefix is optional so
/// a server answering with plain JSON lines still decodes. Malformed
/// JSON is skipped silently.
pub fn parse_line(line: &str) -> SseLine {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return SseLine::Skip;
    }
    let payload = trimmed.strip_prefix("data: ").unwrap_or(trimmed);
    if payload == "[DONE]" {
        return SseLine::Done;
    }
    match serde_json::from_str::<Value>(payload) {
        Ok(value) => match extract_content(&value) {
            Some(text) => SseLine::Delta(text),
            None => SseLine::Skip,
        },
        Err(_) => SseLine::Skip,
    }
}

/// `choices[0].delta.content`, falling back to `choices[0].message.content`
/// when the delta is absent or empty.
fn extract_content(value: &Value) -> Option<String> {
    let choice = value.get("choices")?.get(0)?;
    let delta = choice
        .pointer("/delta/content")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty());
    let message = choice
        .pointer("/message/content")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty());
    delta.or(message).map(str::to_string)
}

// ---------------------------------------------------------------------------
// Read loop
// ---------------------------------------------------------------------------

/// Drain `reader` sequentially, pushing each delta to `on_delta` as it
/// decodes and returning the accumulated text. `[DONE]` ends the stream
/// without the sentinel; at EOF the final unterminated line is processed
/// like any other.
pub fn read_stream<R, F>(mut reader: R, mut on_delta: F) -> Result<String>
where
    R: Read,
    F: FnMut(&str),
{
    let mut decoder = Utf8StreamDecoder::new();
    let mut assembler = LineAssembler::new();
    let mut accumulated = String::new();
    let mut buf = [0u8; READ_CHUNK_BYTES];

    loop {
        let n = reader
            .read(&mut buf)
            .context("reading model response stream")?;
        if n == 0 {
            break;
        }
        for line in assembler.push(&decoder.feed(&buf[..n])) {
            match parse_line(&line) {
                SseLine::Delta(delta) => {
                    on_delta(&delta);
                    accumulated.push_str(&delta);
                }
                SseLine::Done => return Ok(accumulated),
                SseLine::Skip => {}
            }
        }
    }

    // EOF without the sentinel: flush both partial tails.
    let mut trailing = assembler.push(&decoder.finish());
    if let Some(last) = assembler.take_remainder() {
        trailing.push(last);
    }
    for line in trailing {
        match parse_line(&line) {
            SseLine::Delta(delta) => {
                on_delta(&delta);
                accumulated.push_str(&delta);
            }
            SseLine::Done => break,
            SseLine::Skip => {}
        }
    }
    Ok(accumulated)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Reader that hands out at most `step` bytes per read call.
    struct Trickle<'a> {
        data: &'a [u8],
        pos: usize,
        step: usize,
    }

    impl<'a> Trickle<'a> {
        fn new(data: &'a [u8], step: usize) -> Self {
            Self { data, pos: 0, step }
        }
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = self.step.min(self.data.len() - self.pos).min(buf.len());
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    fn delta_line(text: &str) -> String {
        format!(
            "data: {}\n",
            serde_json::json!({"choices": [{"delta": {"content": text}}]})
        )
    }

    #[test]
    fn decoder_holds_split_multibyte_character() {
        let mut dec = Utf8StreamDecoder::new();
        let bytes = "你好".as_bytes();
        assert_eq!(dec.feed(&bytes[..1]), "");
        assert_eq!(dec.feed(&bytes[1..4]), "你");
        assert_eq!(dec.feed(&bytes[4..]), "好");
        assert_eq!(dec.finish(), "");
    }

    #[test]
    fn decoder_replaces_invalid_bytes() {
        let mut dec = Utf8StreamDecoder::new();
        assert_eq!(dec.feed(&[0xFF, b'a']), "\u{FFFD}a");
    }

    #[test]
    fn decoder_finish_replaces_dangling_partial() {
        let mut dec = Utf8StreamDecoder::new();
        assert_eq!(dec.feed(&"你".as_bytes()[..2]), "");
        assert_eq!(dec.finish(), "\u{FFFD}");
    }

    #[test]
    fn assembler_splits_lines_and_keeps_tail() {
        let mut asm = LineAssembler::new();
        assert_eq!(asm.push("a\r\nb\npartial"), vec!["a", "b"]);
        assert_eq!(asm.push(" end\n"), vec!["partial end"]);
        assert_eq!(asm.take_remainder(), None);
    }

    #[test]
    fn parse_line_handles_sentinel_and_blank() {
        assert_eq!(parse_line(""), SseLine::Skip);
        assert_eq!(parse_line("   "), SseLine::Skip);
        assert_eq!(parse_line("data: [DONE]"), SseLine::Done);
        assert_eq!(parse_line("[DONE]"), SseLine::Done);
    }

    #[test]
    fn parse_line_extracts_delta_and_message_content() {
        let delta = r#"data: {"choices":[{"delta":{"content":"hi"}}]}"#;
        assert_eq!(parse_line(delta), SseLine::Delta("hi".into()));
        // Whole-message shape, no data prefix.
        let msg = r#"{"choices":[{"message":{"content":"full"}}]}"#;
        assert_eq!(parse_line(msg), SseLine::Delta("full".into()));
        // Empty delta falls back to message content.
        let both = r#"data: {"choices":[{"delta":{"content":""},"message":{"content":"m"}}]}"#;
        assert_eq!(parse_line(both), SseLine::Delta("m".into()));
    }

    #[test]
    fn parse_line_skips_malformed_json() {
        assert_eq!(parse_line("data: {not json"), SseLine::Skip);
        assert_eq!(parse_line(r#"data: {"choices":[]}"#), SseLine::Skip);
    }

    #[test]
    fn read_stream_accumulates_in_arrival_order() {
        let mut wire = String::new();
        wire.push_str(&delta_line("第一"));
        wire.push('\n');
        wire.push_str(&delta_line("段, "));
        wire.push_str(&delta_line("done"));
        wire.push_str("data: [DONE]\n");
        wire.push_str(&delta_line("after sentinel"));

        let mut seen = Vec::new();
        let acc = read_stream(Cursor::new(wire.as_bytes()), |d| seen.push(d.to_string()))
            .expect("stream reads");
        assert_eq!(acc, "第一段, done");
        assert_eq!(seen, vec!["第一", "段, ", "done"]);
    }

    #[test]
    fn chunk_boundaries_never_change_the_result() {
        let mut wire = String::new();
        wire.push_str(&delta_line("多字节内容流"));
        wire.push_str(&delta_line(" across chunks"));
        wire.push_str("data: [DONE]\n");

        let whole = read_stream(Cursor::new(wire.as_bytes()), |_| {}).expect("whole read");
        for step in [1, 2, 3, 7] {
            let trickled = read_stream(Trickle::new(wire.as_bytes(), step), |_| {})
                .unwrap_or_else(|_| panic!("trickle step {step}"));
            assert_eq!(trickled, whole, "step {step}");
        }
    }

    #[test]
    fn eof_without_sentinel_processes_final_line() {
        let wire = delta_line("first");
        let tail = r#"data: {"choices":[{"delta":{"content":"last"}}]}"#;
        let joined = format!("{wire}{tail}");
        let acc = read_stream(Cursor::new(joined.as_bytes()), |_| {}).expect("stream reads");
        assert_eq!(acc, "firstlast");
    }
}
