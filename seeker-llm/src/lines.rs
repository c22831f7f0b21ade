//! Line framing for streamed HTTP bodies.
//!
//! Network chunks split lines (and multi-byte characters) at arbitrary
//! points, so bytes are buffered until a newline arrives and only whole
//! lines are decoded.
use bytes::{Buf, BytesMut};

#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: BytesMut,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and drain every complete line. Line terminators
    /// (`\n` or `\r\n`) are stripped; invalid UTF-8 is replaced.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let line = self.buf.split_to(pos);
            self.buf.advance(1);
            lines.push(decode(&line));
        }
        lines
    }

    /// Whatever is left after the body ended without a final newline.
    pub fn finish(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        let rest = self.buf.split();
        Some(decode(&rest))
    }
}

fn decode(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_split_across_chunks_are_reassembled() {
        let mut lb = LineBuffer::new();
        assert!(lb.push(b"data: {\"a\"").is_empty());
        assert_eq!(lb.push(b":1}\r\n\ndata: [DO"), vec!["data: {\"a\":1}", ""]);
        assert_eq!(lb.push(b"NE]\n"), vec!["data: [DONE]"]);
        assert_eq!(lb.finish(), None);
    }

    #[test]
    fn multibyte_character_split_between_chunks() {
        let bytes = "é☀\n".as_bytes();
        let mut lb = LineBuffer::new();
        assert!(lb.push(&bytes[..1]).is_empty());
        assert!(lb.push(&bytes[1..3]).is_empty());
        assert_eq!(lb.push(&bytes[3..]), vec!["é☀"]);
    }

    #[test]
    fn unterminated_tail_is_returned_on_finish() {
        let mut lb = LineBuffer::new();
        assert!(lb.push(b"{\"done\":true}").is_empty());
        assert_eq!(lb.finish().as_deref(), Some("{\"done\":true}"));
        assert_eq!(lb.finish(), None);
    }
}
