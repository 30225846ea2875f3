//! Fatal startup errors. Per-request failures (parse errors, cache misses) are recovered into
//! HTTP responses or logged-and-dropped connections and never reach this type; see `http::ParseError`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid arguments: {0}")]
    Args(String),

    /// `-h/--help` (or `--version`): the message should be printed and the process should exit
    /// 0, unlike every other `StartupError` variant.
    #[error("{0}")]
    Help(String),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}
