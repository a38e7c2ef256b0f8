//! Range-Serving HTTP Daemon
//!
//! This module serves registered files to a browser-side client over
//! loopback HTTP:
//! - `/file/{token}` is the only route; anything else is 404
//! - Single-interval `Range` requests answered with 206 Partial Content
//! - Permissive CORS headers on every response
//! - Bodies streamed in fixed-size chunks; client disconnects are expected

mod daemon;
mod error;
mod global;
mod mime;
mod range;
mod routes;
mod stream;

pub use self::daemon::{DaemonHandle, DaemonState, FileServer};
pub use self::error::{RequestError, ServerError};
pub use self::global::{default_server, ensure_server_running, get_server_port, register_file};
pub use self::mime::content_type_for;
pub use self::range::{parse_range, ByteRange};
pub use self::routes::{
    build_router, route_path, RouteState, ALLOW_HEADERS, ALLOW_METHODS, EXPOSE_HEADERS,
    FILE_ROUTE,
};
