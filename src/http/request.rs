//! Request-line and header parsing, scanning the raw recv buffer with `StrView` and copying only
//! the matched spans into the per-request arena.

use crate::arena::Arena;
use crate::hashmap::ChainedMap;
use crate::strview::StrView;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("malformed body: missing \\r\\n\\r\\n header terminator")]
    MalformedBody,
    #[error("malformed headers: bad request line or header line")]
    MalformedHeaders,
}

/// A parsed request, entirely arena-owned: every `&'a str`/`&'a [u8]` here stays valid until the
/// worker resets its arena at the end of the job.
#[derive(Debug)]
pub struct Request<'a> {
    pub method: &'a str,
    pub target: &'a str,
    pub version: &'a str,
    pub headers: ChainedMap<&'a str, &'a str>,
    pub body: &'a [u8],
}

impl<'a> Request<'a> {
    pub fn header(&self, name: &str) -> Option<&'a str> {
        self.headers.get(&name).copied()
    }
}

/// Parses a single received buffer into a `Request` arena-allocated by `arena`.
pub fn parse_request<'a>(buf: &[u8], arena: &'a Arena) -> Result<Request<'a>, ParseError> {
    let view = StrView::new(buf);
    let header_end = view.find_sub(b"\r\n\r\n").ok_or(ParseError::MalformedBody)?;
    let header_block = view.slice(0, header_end);
    let body_view = view.slice_from(header_end + 4);

    let line_end = header_block.find_sub(b"\r\n").unwrap_or(header_block.len());
    let request_line = header_block.slice(0, line_end);
    let header_lines = if line_end < header_block.len() {
        header_block.slice_from(line_end + 2)
    } else {
        header_block.slice_from(header_block.len())
    };

    let (method, target, version) = parse_request_line(request_line, arena)?;
    let headers = parse_headers(header_lines, arena)?;
    let body = arena.alloc_slice(body_view.as_bytes());

    Ok(Request {
        method,
        target,
        version,
        headers,
        body,
    })
}

fn parse_request_line<'a>(
    line: StrView,
    arena: &'a Arena,
) -> Result<(&'a str, &'a str, &'a str), ParseError> {
    let sp1 = line.find_byte(b' ').ok_or(ParseError::MalformedHeaders)?;
    let method = line.slice(0, sp1);
    let rest = line.slice_from(sp1 + 1);

    let sp2 = rest.find_byte(b' ').ok_or(ParseError::MalformedHeaders)?;
    let target = rest.slice(0, sp2);
    // Everything after the second space is the version, taken verbatim (not re-split).
    let version = rest.slice_from(sp2 + 1);

    Ok((
        copy_str(arena, method)?,
        copy_str(arena, target)?,
        copy_str(arena, version)?,
    ))
}

fn parse_headers<'a>(
    mut remaining: StrView,
    arena: &'a Arena,
) -> Result<ChainedMap<&'a str, &'a str>, ParseError> {
    let mut headers = ChainedMap::new();
    while !remaining.is_empty() {
        let line_len = remaining.find_sub(b"\r\n").unwrap_or(remaining.len());
        let line = remaining.slice(0, line_len);

        let colon = line.find_byte(b':').ok_or(ParseError::MalformedHeaders)?;
        let name = copy_str(arena, line.slice(0, colon))?;
        // Whitespace after the colon is preserved as-is; see SPEC_FULL.md §9.
        let value = copy_str(arena, line.slice_from(colon + 1))?;
        headers.insert(name, value);

        if line_len >= remaining.len() {
            break;
        }
        remaining = remaining.slice_from(line_len + 2);
    }
    Ok(headers)
}

fn copy_str<'a>(arena: &'a Arena, view: StrView) -> Result<&'a str, ParseError> {
    let s = view.as_str().ok_or(ParseError::MalformedHeaders)?;
    Ok(arena.alloc_str(s))
}
