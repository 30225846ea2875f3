//! Multi-threaded static-file HTTP/1.1 server: a hand-rolled codec, a per-worker-queue thread
//! pool, and an mtime-revalidated file cache, built from the ground up on bump allocators and a
//! chained hash map rather than pulling in a general-purpose HTTP stack.

pub mod arena;
pub mod cache;
pub mod config;
pub mod error;
pub mod hashmap;
pub mod http;
pub mod pool;
pub mod server;
pub mod strview;
