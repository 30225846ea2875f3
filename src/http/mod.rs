//! HTTP/1.1 request parsing and response encoding.

mod request;
mod response;

pub use request::{parse_request, ParseError, Request};
pub use response::{Response, StatusCode};
