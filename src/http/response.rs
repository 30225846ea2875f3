//! Response status codes and wire encoding.

use crate::hashmap::ChainedMap;
use crate::strview::StringBuilder;
use std::fmt::Write as _;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok,
    BadRequest,
    NotFound,
}

impl StatusCode {
    pub fn code(self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
        }
    }

    pub fn reason(self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad request",
            StatusCode::NotFound => "Not found",
        }
    }
}

/// A response body either borrows from the request's own arena, or shares ownership of a file
/// cache entry's bytes — see SPEC_FULL.md's Data Model: "body (optional byte slice whose
/// ownership is a reference-counted, shared borrow from the file cache)". Keeping both variants
/// lets a response carry the cache's `Arc<[u8]>` straight through to encoding with no copy.
pub enum Body<'a> {
    Borrowed(&'a [u8]),
    Shared(Arc<[u8]>),
}

impl Body<'_> {
    fn as_bytes(&self) -> &[u8] {
        match self {
            Body::Borrowed(b) => b,
            Body::Shared(b) => b,
        }
    }
}

/// A response, ready to encode. `headers` is empty for every response this server builds (see
/// SPEC_FULL.md §9, "No automatic headers"); the field exists so the codec is symmetric with
/// `Request` and so a future caller could populate it without changing the wire format.
pub struct Response<'a> {
    pub status: StatusCode,
    pub headers: ChainedMap<&'static str, String>,
    pub body: Option<Body<'a>>,
}

impl<'a> Response<'a> {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: ChainedMap::new(),
            body: None,
        }
    }

    pub fn with_body(status: StatusCode, body: &'a [u8]) -> Self {
        Self {
            status,
            headers: ChainedMap::new(),
            body: Some(Body::Borrowed(body)),
        }
    }

    /// Builds a response whose body is a cloned handle onto a file cache entry's reference-counted
    /// contents — no copy into the arena.
    pub fn with_shared_body(status: StatusCode, body: Arc<[u8]>) -> Self {
        Self {
            status,
            headers: ChainedMap::new(),
            body: Some(Body::Shared(body)),
        }
    }

    /// Appends the wire-format encoding of this response to `builder`.
    pub fn encode(&self, builder: &mut StringBuilder) {
        write!(builder, "HTTP/1.1 {} {}\r\n", self.status.code(), self.status.reason())
            .expect("writing to a StringBuilder never fails");
        for (name, value) in self.headers.iter() {
            write!(builder, "{}: {}\r\n", name, value).expect("writing to a StringBuilder never fails");
        }
        builder.push_str("\r\n");
        if let Some(body) = &self.body {
            builder.push_bytes(body.as_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_200_with_body() {
        let body = b"<h1>hi</h1>";
        let res = Response::with_body(StatusCode::Ok, body);
        let mut sb = StringBuilder::with_capacity(64);
        res.encode(&mut sb);
        assert_eq!(sb.as_bytes(), b"HTTP/1.1 200 OK\r\n\r\n<h1>hi</h1>");
    }

    #[test]
    fn encodes_200_with_a_shared_body_and_no_copy_into_the_caller() {
        let contents: Arc<[u8]> = Arc::from(b"<h1>shared</h1>".as_slice());
        let res = Response::with_shared_body(StatusCode::Ok, Arc::clone(&contents));
        let mut sb = StringBuilder::with_capacity(64);
        res.encode(&mut sb);
        assert_eq!(sb.as_bytes(), b"HTTP/1.1 200 OK\r\n\r\n<h1>shared</h1>");
        // The response held its own clone; the original handle is still usable.
        assert_eq!(&*contents, b"<h1>shared</h1>");
    }

    #[test]
    fn encodes_404_with_no_body() {
        let res = Response::new(StatusCode::NotFound);
        let mut sb = StringBuilder::with_capacity(64);
        res.encode(&mut sb);
        assert_eq!(sb.as_bytes(), b"HTTP/1.1 404 Not found\r\n\r\n");
    }

    #[test]
    fn encodes_400_with_no_body() {
        let res = Response::new(StatusCode::BadRequest);
        let mut sb = StringBuilder::with_capacity(64);
        res.encode(&mut sb);
        assert_eq!(sb.as_bytes(), b"HTTP/1.1 400 Bad request\r\n\r\n");
    }

    #[test]
    fn encoded_headers_round_trip_through_the_request_parser() {
        use crate::arena::Arena;
        use crate::http::parse_request;

        let mut res = Response::new(StatusCode::Ok);
        res.headers.insert("X-Custom", "value".to_string());
        let mut sb = StringBuilder::with_capacity(64);
        res.encode(&mut sb);

        // Parse the encoded status line + headers back as if it were a request's header block,
        // to check the wire shapes agree (modulo header ordering, which the map doesn't promise).
        let mut framed = Vec::new();
        // encode() ends with "\r\n" + no body; wrap it as a request line + headers for the parser.
        framed.extend_from_slice(b"GET / HTTP/1.1\r\n");
        let encoded = sb.as_bytes();
        let headers_start = encoded.windows(2).position(|w| w == b"\r\n").unwrap() + 2;
        framed.extend_from_slice(&encoded[headers_start..]);
        framed.extend_from_slice(b"\r\n");

        let arena = Arena::new();
        let req = parse_request(&framed, &arena).unwrap();
        assert_eq!(req.header("X-Custom"), Some("value"));
    }
}
