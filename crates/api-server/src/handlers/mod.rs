mod chat_completion;
mod chat_stream;
mod static_files;

pub use chat_completion::handle_chat;
pub use chat_stream::handle_chat_stream;
pub use static_files::serve_static;

use crate::error::{Error, Result};
use crate::tools::{API_KEY_HEADER, log_request, preflight_response};
use bytes::Bytes;
use common::data::{ChatMode, ChatRequest, Credential, UpstreamPayload};
use common::proxy::ChatUpstream;
use http::{HeaderMap, Method};
use http_body_util::BodyExt;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use volo_http::{
    body::Body,
    response::Response,
    server::{Router, route::any},
    utils::Extension,
};

pub type Request = http::Request<Body>;

/// Immutable per-process state handed to every request.
#[derive(Debug, Clone)]
pub struct AppState<U> {
    pub upstream:   U,
    pub static_dir: Arc<PathBuf>,
}

impl<U: ChatUpstream> AppState<U> {
    pub fn new(upstream: U, static_dir: PathBuf) -> Self {
        Self {
            upstream,
            static_dir: Arc::new(static_dir),
        }
    }
}

pub fn router<U: ChatUpstream>(state: AppState<U>) -> Router {
    Router::new()
        .route("/api/chat", any(chat_completion_handler::<U>))
        .route("/api/chat/stream", any(chat_stream_handler::<U>))
        .fallback(fallback_handler::<U>)
        .layer(Extension(state))
}

async fn chat_completion_handler<U: ChatUpstream>(
    Extension(state): Extension<AppState<U>>,
    req: Request,
) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let resp = match method {
        Method::POST => match read_request(req).await {
            Ok((headers, body)) => handle_chat(&state.upstream, &headers, &body).await,
            Err(err) => err.to_response(),
        },
        Method::OPTIONS => preflight_response(),
        _ => Error::NotFound.to_response(),
    };
    log_request(&method, &path, &resp);
    resp
}

async fn chat_stream_handler<U: ChatUpstream>(
    Extension(state): Extension<AppState<U>>,
    req: Request,
) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let resp = match method {
        Method::POST => match read_request(req).await {
            Ok((headers, body)) => handle_chat_stream(&state.upstream, &headers, &body),
            Err(err) => err.to_response(),
        },
        Method::OPTIONS => preflight_response(),
        _ => Error::NotFound.to_response(),
    };
    log_request(&method, &path, &resp);
    resp
}

/// Everything outside the chat endpoints: preflights, static files, 404.
async fn fallback_handler<U: ChatUpstream>(
    Extension(state): Extension<AppState<U>>,
    req: Request,
) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let resp = match method {
        Method::OPTIONS => preflight_response(),
        Method::GET => serve_static(&state.static_dir, &path).await,
        _ => Error::NotFound.to_response(),
    };
    log_request(&method, &path, &resp);
    resp
}

async fn read_request(req: Request) -> Result<(HeaderMap, Bytes)> {
    let (parts, body) = req.into_parts();
    let body = body
        .collect()
        .await
        .map_err(|e| Error::ReadBody(e.to_string().into()))?
        .to_bytes();
    Ok((parts.headers, body))
}

/// Validates one chat request: JSON first, then the API key, then that the
/// body is an object. The key check always happens before any upstream call.
/// Field values are forwarded as sent.
pub fn parse_chat(
    headers: &HeaderMap,
    body: &[u8],
    mode: ChatMode,
) -> Result<(UpstreamPayload, Credential)> {
    let value: Value = serde_json::from_slice(body).map_err(Error::InvalidJson)?;
    let credential = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Credential::new(v.to_owned()))
        .ok_or(Error::MissingApiKey)?;
    if !value.is_object() {
        return Err(Error::InvalidRequestBody("expected a JSON object".into()));
    }
    let request: ChatRequest = serde_json::from_value(value)
        .map_err(|e| Error::InvalidRequestBody(e.to_string().into()))?;
    Ok((request.into_payload(mode), credential))
}
