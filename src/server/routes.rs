//! Daemon routes and middleware
//!
//! The only route is `/file/:token`. Every response, including 404s from the
//! fallback and 405s for other methods, passes through the CORS header layers
//! so a page on any origin can read it.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{rejection::PathRejection, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{AppendHeaders, IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::fs::File;
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use super::error::RequestError;
use super::mime::content_type_for;
use super::range::{parse_range, ByteRange};
use super::stream::file_body;
use crate::core::utils::short_token;
use crate::registry::FileRegistry;

/// Route pattern served by the daemon
pub const FILE_ROUTE: &str = "/file/:token";

pub const ALLOW_METHODS: &str = "GET, HEAD, OPTIONS";
pub const ALLOW_HEADERS: &str = "Range, Content-Type, Accept-Encoding";
pub const EXPOSE_HEADERS: &str = "Content-Range, Content-Length, Accept-Ranges";

/// Request path for a token, relative to the daemon root
pub fn route_path(token: &str) -> String {
    format!("/file/{}", token)
}

/// State shared with handlers
#[derive(Clone)]
pub struct RouteState {
    pub registry: Arc<FileRegistry>,
    pub chunk_size: usize,
}

/// Build the router with the file route, fallback, and header layers
pub fn build_router(state: RouteState) -> Router {
    let layers = ServiceBuilder::new()
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
        )
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_EXPOSE_HEADERS,
            HeaderValue::from_static(EXPOSE_HEADERS),
        ));

    Router::new()
        .route(FILE_ROUTE, get(serve_file).head(head_file).options(preflight))
        .fallback(not_found)
        .layer(layers)
        .with_state(state)
}

/// Serve a registered file, whole or by range
///
/// Route: GET /file/:token
pub async fn serve_file(
    State(state): State<RouteState>,
    token: Result<Path<String>, PathRejection>,
    headers: HeaderMap,
) -> Result<Response, RequestError> {
    let Path(token) = token.map_err(|_| RequestError::UnknownToken)?;
    let transfer = Transfer::prepare(&state, &token, &headers).await?;

    // The file may disappear between the metadata check and here
    let file = File::open(&transfer.path)
        .await
        .map_err(|_| RequestError::FileVanished)?;
    let body = file_body(
        file,
        transfer.start(),
        transfer.content_length(),
        state.chunk_size,
        short_token(&token),
    )
    .await
    .map_err(|_| RequestError::FileVanished)?;

    Ok(transfer.into_response(body))
}

/// Same headers as GET, no body
///
/// Route: HEAD /file/:token
pub async fn head_file(
    State(state): State<RouteState>,
    token: Result<Path<String>, PathRejection>,
    headers: HeaderMap,
) -> Result<Response, RequestError> {
    let Path(token) = token.map_err(|_| RequestError::UnknownToken)?;
    let transfer = Transfer::prepare(&state, &token, &headers).await?;
    Ok(transfer.into_response(Body::empty()))
}

/// CORS preflight, answered regardless of token validity
///
/// Route: OPTIONS /file/:token
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// What a GET or HEAD for a token resolves to
struct Transfer {
    path: PathBuf,
    file_size: u64,
    range: Option<ByteRange>,
    content_type: &'static str,
}

impl Transfer {
    async fn prepare(
        state: &RouteState,
        token: &str,
        headers: &HeaderMap,
    ) -> Result<Self, RequestError> {
        let path = state
            .registry
            .lookup(token)
            .ok_or(RequestError::UnknownToken)?;

        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|_| RequestError::FileVanished)?;
        if !metadata.is_file() {
            return Err(RequestError::FileVanished);
        }
        let file_size = metadata.len();

        let range = match headers.get(header::RANGE) {
            Some(value) => {
                let raw = value.to_str().map_err(|_| RequestError::MalformedRange {
                    header: String::from_utf8_lossy(value.as_bytes()).into_owned(),
                })?;
                parse_range(raw, file_size)?
            }
            None => None,
        };

        let content_type = content_type_for(&path);
        Ok(Self {
            path,
            file_size,
            range,
            content_type,
        })
    }

    fn start(&self) -> u64 {
        self.range.map_or(0, |r| r.start)
    }

    fn content_length(&self) -> u64 {
        self.range.map_or(self.file_size, |r| r.len())
    }

    fn into_response(self, body: Body) -> Response {
        let mut headers = vec![
            (header::CONTENT_TYPE, self.content_type.to_string()),
            (header::CONTENT_LENGTH, self.content_length().to_string()),
            (header::ACCEPT_RANGES, "bytes".to_string()),
        ];

        let status = match self.range {
            Some(range) => {
                headers.push((header::CONTENT_RANGE, range.content_range(self.file_size)));
                StatusCode::PARTIAL_CONTENT
            }
            None => StatusCode::OK,
        };

        (status, AppendHeaders(headers), body).into_response()
    }
}
