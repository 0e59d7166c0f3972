use std::collections::VecDeque;

use crate::error::StreamError;

/// Byte buffer that yields complete `\n`-terminated lines.
///
/// Bytes after the last newline stay buffered until more data arrives, so
/// frames and multi-byte characters may be split across reads.
pub struct CircularLineBuffer {
    buffer: VecDeque<u8>,
}

impl CircularLineBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
        }
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend(bytes);
    }

    /// Next complete line without its terminator (`\n` or `\r\n`).
    /// Returns None if no complete line is available.
    pub fn next_line(&mut self) -> Option<Result<String, StreamError>> {
        let newline_pos = self.buffer.iter().position(|&b| b == b'\n')?;
        let line_bytes: Vec<u8> = self.buffer.drain(..=newline_pos).collect();

        match std::str::from_utf8(&line_bytes) {
            Ok(line) => Some(Ok(line.trim_end_matches(['\n', '\r']).to_string())),
            Err(e) => Some(Err(StreamError::MalformedStream {
                event: "unknown".into(),
                reason: format!("invalid UTF-8: {}", e),
            })),
        }
    }

    /// Drain whatever is left as a final unterminated line.
    pub fn take_remainder(&mut self) -> Option<Result<String, StreamError>> {
        if self.buffer.is_empty() {
            return None;
        }
        self.buffer.push_back(b'\n');
        self.next_line()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circular_buffer_basic() {
        let mut buffer = CircularLineBuffer::with_capacity(64);

        buffer.extend(b"line1\nline2\r\n");

        assert_eq!(buffer.next_line().unwrap().unwrap(), "line1");
        assert_eq!(buffer.next_line().unwrap().unwrap(), "line2");
        assert!(buffer.next_line().is_none());
    }

    #[test]
    fn test_partial_line() {
        let mut buffer = CircularLineBuffer::with_capacity(64);

        buffer.extend(b"partial");
        assert!(buffer.next_line().is_none());
        assert_eq!(buffer.len(), 7);

        buffer.extend(b" line\n");
        assert_eq!(buffer.next_line().unwrap().unwrap(), "partial line");
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_multibyte_char_split_across_reads() {
        let bytes = "caf\u{e9}\n".as_bytes();
        let mut buffer = CircularLineBuffer::with_capacity(16);

        buffer.extend(&bytes[..4]);
        assert!(buffer.next_line().is_none());
        buffer.extend(&bytes[4..]);

        assert_eq!(buffer.next_line().unwrap().unwrap(), "caf\u{e9}");
    }

    #[test]
    fn test_take_remainder() {
        let mut buffer = CircularLineBuffer::with_capacity(16);
        buffer.extend(b"tail");

        assert_eq!(buffer.take_remainder().unwrap().unwrap(), "tail");
        assert!(buffer.take_remainder().is_none());
    }
}
