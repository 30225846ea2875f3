//! Accept loop and per-connection handling: read a request, derive a filesystem path, consult the
//! cache, build and send a response. Runs entirely on the thread pool's worker threads.

use crate::arena::Arena;
use crate::cache::FileCache;
use crate::http::{self, ParseError, Response, StatusCode};
use crate::pool::ThreadPool;
use crate::strview::StringBuilder;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;

const RECV_BUFFER_SIZE: usize = 1024;
const INDEX_FILE: &str = "index.html";

/// Runs the accept loop forever, handing each accepted connection to the pool as a job. Does not
/// return under normal operation; only a fatal `accept` error would end the loop (logged, not
/// propagated, since there is nothing the caller could do differently).
pub fn serve(listener: TcpListener, cache: Arc<FileCache>, pool: Arc<ThreadPool>) {
    for conn in listener.incoming() {
        match conn {
            Ok(stream) => {
                let cache = Arc::clone(&cache);
                pool.schedule(Box::new(move |arena, builder, _worker| {
                    handle_connection(stream, &cache, arena, builder);
                }));
            }
            Err(e) => {
                log::warn!("accept failed: {e}");
            }
        }
    }
}

fn handle_connection(mut stream: TcpStream, cache: &FileCache, arena: &mut Arena, builder: &mut StringBuilder) {
    let mut buf = [0u8; RECV_BUFFER_SIZE];
    let n = match stream.read(&mut buf) {
        Ok(0) => return, // client closed without sending a request; not an error
        Ok(n) => n,
        Err(e) => {
            log::warn!("recv error: {e}");
            return;
        }
    };

    let response = build_response(&buf[..n], cache, arena);
    response.encode(builder);

    if let Err(e) = stream.write_all(builder.as_bytes()) {
        log::warn!("send error: {e}");
    }
}

fn build_response<'a>(raw: &[u8], cache: &'a FileCache, arena: &'a Arena) -> Response<'a> {
    let request = match http::parse_request(raw, arena) {
        Ok(request) => request,
        Err(ParseError::MalformedBody) | Err(ParseError::MalformedHeaders) => {
            return Response::new(StatusCode::BadRequest);
        }
    };

    match resolve_path(request.target) {
        // The cache hands back a cloned `Arc<[u8]>` handle; the response keeps that handle
        // directly instead of copying the bytes into the per-request arena.
        Some(path) => match cache.get(&path) {
            Some(contents) => Response::with_shared_body(StatusCode::Ok, contents),
            None => Response::new(StatusCode::NotFound),
        },
        None => Response::new(StatusCode::NotFound),
    }
}

/// Maps a request target to a relative filesystem path under the served root. `/` maps to
/// `index.html`; any other target has its leading `/` stripped. Targets with a `..` component are
/// rejected (`None`) rather than served, since the allowed status codes don't include 403.
fn resolve_path(target: &str) -> Option<String> {
    if target == "/" {
        return Some(INDEX_FILE.to_string());
    }

    let relative = target.strip_prefix('/').unwrap_or(target);
    if relative
        .split('/')
        .any(|segment| segment == ".." || segment == ".")
    {
        return None;
    }
    Some(relative.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_target_maps_to_index_html() {
        assert_eq!(resolve_path("/"), Some("index.html".to_string()));
    }

    #[test]
    fn plain_target_strips_leading_slash() {
        assert_eq!(resolve_path("/a.txt"), Some("a.txt".to_string()));
    }

    #[test]
    fn traversal_component_is_rejected() {
        assert_eq!(resolve_path("/../Cargo.toml"), None);
        assert_eq!(resolve_path("/a/../../Cargo.toml"), None);
    }

    #[test]
    fn single_dot_component_is_rejected() {
        assert_eq!(resolve_path("/./Cargo.toml"), None);
    }
}
