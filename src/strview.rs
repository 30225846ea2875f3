//! Non-owning byte-slice scanner and a growable response builder.
//!
//! `StrView` scans the raw recv buffer (finding delimiters, slicing sub-ranges) without
//! allocating; only once a span's extent is known does the codec copy it into the arena.
//! `StringBuilder` is the inverse: a growable buffer a worker reuses across every response it
//! encodes, cleared (not reallocated) between jobs.

use std::fmt;

/// A `(pointer, length)` view into an existing byte buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StrView<'a> {
    bytes: &'a [u8],
}

impl<'a> StrView<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn as_str(&self) -> Option<&'a str> {
        std::str::from_utf8(self.bytes).ok()
    }

    /// Returns the view covering `[start, start+len)`. Panics if that range isn't in bounds,
    /// mirroring slice indexing.
    pub fn slice(&self, start: usize, len: usize) -> StrView<'a> {
        StrView::new(&self.bytes[start..start + len])
    }

    /// Returns the view covering `[start, end)`.
    pub fn slice_from(&self, start: usize) -> StrView<'a> {
        StrView::new(&self.bytes[start..])
    }

    /// Index of the first occurrence of `b`, if any.
    pub fn find_byte(&self, b: u8) -> Option<usize> {
        self.bytes.iter().position(|&x| x == b)
    }

    /// Index of the first occurrence of `needle`, if any.
    pub fn find_sub(&self, needle: &[u8]) -> Option<usize> {
        if needle.is_empty() || needle.len() > self.bytes.len() {
            return None;
        }
        self.bytes.windows(needle.len()).position(|w| w == needle)
    }
}

/// A growable byte buffer with `std::fmt::Write` support, reused by a worker across jobs.
#[derive(Debug, Default)]
pub struct StringBuilder {
    buf: Vec<u8>,
}

impl StringBuilder {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            buf: Vec::with_capacity(cap),
        }
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    pub fn push_str(&mut self, s: &str) {
        self.buf.extend_from_slice(s.as_bytes());
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl fmt::Write for StringBuilder {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write;

    #[test]
    fn find_sub_locates_crlf_crlf() {
        let view = StrView::new(b"GET / HTTP/1.1\r\nHost: x\r\n\r\nbody");
        let idx = view.find_sub(b"\r\n\r\n").unwrap();
        assert_eq!(&view.as_bytes()[idx + 4..], b"body");
    }

    #[test]
    fn find_sub_absent_returns_none() {
        let view = StrView::new(b"no terminator here");
        assert_eq!(view.find_sub(b"\r\n\r\n"), None);
    }

    #[test]
    fn slice_and_slice_from_match_raw_slicing() {
        let view = StrView::new(b"hello world");
        assert_eq!(view.slice(0, 5).as_bytes(), b"hello");
        assert_eq!(view.slice_from(6).as_bytes(), b"world");
    }

    #[test]
    fn find_byte_first_space() {
        let view = StrView::new(b"GET /index.html HTTP/1.1");
        assert_eq!(view.find_byte(b' '), Some(3));
    }

    #[test]
    fn as_str_rejects_invalid_utf8() {
        let view = StrView::new(&[0xff, 0xfe]);
        assert_eq!(view.as_str(), None);
    }

    #[test]
    fn string_builder_formats_and_clears() {
        let mut sb = StringBuilder::with_capacity(64);
        write!(sb, "HTTP/1.1 {} {}\r\n", 200, "OK").unwrap();
        sb.push_str("\r\n");
        assert_eq!(sb.as_bytes(), b"HTTP/1.1 200 OK\r\n\r\n");
        sb.clear();
        assert!(sb.is_empty());
    }
}
