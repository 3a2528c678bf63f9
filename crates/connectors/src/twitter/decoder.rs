//! Line framing for the filter stream body
//!
//! The stream is newline-delimited JSON with blank keep-alive lines in
//! between. Chunks from the HTTP body can split a line anywhere.

use bytes::{Bytes, BytesMut};

use crate::error::ConnectorError;

/// Largest single line accepted before the connection is dropped
pub const MAX_LINE_BYTES: usize = 4 * 1024 * 1024;

/// Accumulates body chunks and yields complete non-blank lines
#[derive(Debug)]
pub struct LineDecoder {
    buf: BytesMut,
    max_line: usize,
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::with_max_line(MAX_LINE_BYTES)
    }

    pub fn with_max_line(max_line: usize) -> Self {
        Self {
            buf: BytesMut::new(),
            max_line,
        }
    }

    /// Feed one chunk, returning every line it completed
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<Bytes>, ConnectorError> {
        self.buf.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let mut line = self.buf.split_to(pos + 1);
            line.truncate(pos);
            if line.last() == Some(&b'\r') {
                line.truncate(pos - 1);
            }
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            lines.push(line.freeze());
        }

        if self.buf.len() > self.max_line {
            return Err(ConnectorError::LineTooLong { max: self.max_line });
        }
        Ok(lines)
    }

    /// Bytes waiting for a terminating newline
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_lines() {
        let mut decoder = LineDecoder::new();
        let lines = decoder.push(b"{\"a\":1}\r\n{\"b\":2}\n").unwrap();

        assert_eq!(lines, vec![Bytes::from_static(b"{\"a\":1}"), Bytes::from_static(b"{\"b\":2}")]);
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn test_line_across_chunks() {
        let mut decoder = LineDecoder::new();

        assert!(decoder.push(b"{\"text\":\"hel").unwrap().is_empty());
        assert!(decoder.push(b"lo\"}").unwrap().is_empty());
        let lines = decoder.push(b"\r\n{\"x\"").unwrap();

        assert_eq!(lines, vec![Bytes::from_static(b"{\"text\":\"hello\"}")]);
        assert_eq!(decoder.pending(), 4);
    }

    #[test]
    fn test_skips_keep_alives() {
        let mut decoder = LineDecoder::new();
        let lines = decoder.push(b"\r\n\r\n\n{}\r\n\r\n").unwrap();
        assert_eq!(lines, vec![Bytes::from_static(b"{}")]);
    }

    #[test]
    fn test_line_too_long() {
        let mut decoder = LineDecoder::with_max_line(8);

        assert!(decoder.push(b"12345678").is_ok());
        let err = decoder.push(b"9").unwrap_err();
        assert!(matches!(err, ConnectorError::LineTooLong { max: 8 }));
    }
}
