//! Incremental decoder for `text/event-stream` bodies
//!
//! Network chunks arrive at arbitrary byte boundaries, so bytes are buffered
//! until a full line is available. Lines are only decoded as UTF-8 once
//! complete, which keeps multi-byte characters split across chunks intact.
//! Only `data:` fields matter here; `event:`, `id:`, `retry:` and comments
//! are skipped.

use crate::LlmError;

/// Longest line accepted before the body is treated as malformed
pub const MAX_LINE_BYTES: usize = 4 * 1024 * 1024;

/// Buffers raw bytes and yields the data payload of each completed event
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    // Bytes at the front of `buffer` already known to hold no newline
    scanned: usize,
    data_lines: Vec<String>,
}

impl SseDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of bytes, returning the payloads of events it completed
    ///
    /// Fails once an unterminated line grows past [`MAX_LINE_BYTES`].
    ///
    /// # Examples
    ///
    /// ```
    /// use auditor_llm::sse::SseDecoder;
    ///
    /// let mut decoder = SseDecoder::new();
    /// assert!(decoder.feed(b"data: {\"a\"").unwrap().is_empty());
    /// assert_eq!(decoder.feed(b":1}\r\n\r\n").unwrap(), vec!["{\"a\":1}".to_string()]);
    /// ```
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<String>, LlmError> {
        let mut buffer = std::mem::take(&mut self.buffer);
        buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        let mut start = 0;
        let mut search_from = self.scanned;
        while let Some(offset) = buffer[search_from..].iter().position(|&b| b == b'\n') {
            let end = search_from + offset;
            if let Some(event) = self.process_line(strip_cr(&buffer[start..end])) {
                events.push(event);
            }
            start = end + 1;
            search_from = start;
        }

        buffer.drain(..start);
        self.scanned = buffer.len();
        self.buffer = buffer;

        if self.scanned > MAX_LINE_BYTES {
            self.buffer.clear();
            self.scanned = 0;
            return Err(LlmError::InvalidResponse(format!(
                "Event line exceeds {} bytes",
                MAX_LINE_BYTES
            )));
        }
        Ok(events)
    }

    /// Flush whatever is left once the body has ended
    pub fn finish(&mut self) -> Vec<String> {
        let mut events = Vec::new();

        self.scanned = 0;
        if !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            if let Some(event) = self.process_line(strip_cr(&line)) {
                events.push(event);
            }
        }
        if let Some(event) = self.dispatch() {
            events.push(event);
        }
        events
    }

    fn process_line(&mut self, line: &[u8]) -> Option<String> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line[0] == b':' {
            return None;
        }

        let line = String::from_utf8_lossy(line);
        let (field, value) = match line.find(':') {
            Some(idx) => {
                let value = &line[idx + 1..];
                (&line[..idx], value.strip_prefix(' ').unwrap_or(value))
            }
            None => (&line[..], ""),
        };

        if field == "data" {
            self.data_lines.push(value.to_string());
        }
        None
    }

    fn dispatch(&mut self) -> Option<String> {
        if self.data_lines.is_empty() {
            return None;
        }
        let data = self.data_lines.join("\n");
        self.data_lines.clear();
        Some(data)
    }
}

fn strip_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_event() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b"data: hello\n\n").unwrap();
        assert_eq!(events, vec!["hello"]);
    }

    #[test]
    fn test_multiple_events_in_one_chunk() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b"data: one\r\n\r\ndata: two\r\n\r\n").unwrap();
        assert_eq!(events, vec!["one", "two"]);
    }

    #[test]
    fn test_multiline_data_is_joined() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b"data: first\ndata: second\n\n").unwrap();
        assert_eq!(events, vec!["first\nsecond"]);
    }

    #[test]
    fn test_ignores_comments_and_other_fields() {
        let mut decoder = SseDecoder::new();
        let events = decoder
            .feed(b": keep-alive\nevent: message\nid: 7\ndata: x\n\n")
            .unwrap();
        assert_eq!(events, vec!["x"]);
    }

    #[test]
    fn test_blank_lines_without_data_emit_nothing() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"\n\n\r\n").unwrap().is_empty());
    }

    #[test]
    fn test_byte_at_a_time_matches_whole_body() {
        let body = "data: {\"text\":\"Ação cível nº 123\"}\r\n\r\ndata: {\"text\":\"Perdidos\"}\r\n\r\n";

        let mut whole = SseDecoder::new();
        let expected = whole.feed(body.as_bytes()).unwrap();

        let mut split = SseDecoder::new();
        let mut events = Vec::new();
        for byte in body.as_bytes() {
            events.extend(split.feed(std::slice::from_ref(byte)).unwrap());
        }

        assert_eq!(events, expected);
        assert_eq!(events[0], "{\"text\":\"Ação cível nº 123\"}");
    }

    #[test]
    fn test_line_split_across_many_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data: par").unwrap().is_empty());
        assert!(decoder.feed(b"ti").unwrap().is_empty());
        assert!(decoder.feed(b"al\r").unwrap().is_empty());
        assert_eq!(decoder.feed(b"\n\ndata: next\n\n").unwrap(), vec!["partial", "next"]);
    }

    #[test]
    fn test_finish_flushes_unterminated_event() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data: tail").unwrap().is_empty());
        assert_eq!(decoder.finish(), vec!["tail"]);
        assert!(decoder.finish().is_empty());
    }

    #[test]
    fn test_field_without_space() {
        let mut decoder = SseDecoder::new();
        assert_eq!(decoder.feed(b"data:compact\n\n").unwrap(), vec!["compact"]);
    }

    #[test]
    fn test_unterminated_line_over_limit_fails() {
        let mut decoder = SseDecoder::new();
        let mut chunk = b"data: ".to_vec();
        chunk.resize(MAX_LINE_BYTES, b'a');
        assert!(decoder.feed(&chunk).unwrap().is_empty());

        let err = decoder.feed(b"a").unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }

    #[test]
    fn test_long_body_of_short_lines_is_accepted() {
        let mut decoder = SseDecoder::new();
        let line = b"data: x\n\n";
        let mut total = 0;
        let mut count = 0;
        while total <= MAX_LINE_BYTES {
            count += decoder.feed(line).unwrap().len();
            total += line.len();
        }
        assert_eq!(count, total / line.len());
    }
}
