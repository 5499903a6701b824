use crate::error::Result;
use async_stream::stream;
use common::stream::{DONE_SENTINEL, RelayEvent};
use faststr::FastStr;
use futures_util::{Stream, StreamExt, pin_mut};
use http::{HeaderValue, Method, header};
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, error, info};
use volo_http::{
    body::Body,
    response::Response,
    server::{
        IntoResponse,
        response::sse::{Event, Sse},
    },
};

pub const API_KEY_HEADER: &str = "x-api-key";

const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, X-API-Key";

#[inline]
pub fn with_cors(mut resp: Response) -> Response {
    resp.headers_mut().insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    resp
}

/// Answer to a CORS preflight on any path: permissive headers, no body.
pub fn preflight_response() -> Response {
    let mut resp = with_cors(Response::new(Body::empty()));
    let headers = resp.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    resp
}

pub fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Response {
    let (status, body) = match serde_json::to_string(value) {
        Ok(body) => (status, body),
        Err(e) => {
            error!("failed to encode response body: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "success": false, "error": e.to_string() }).to_string(),
            )
        }
    };
    let mut resp = with_cors(Response::new(Body::from(body)));
    *resp.status_mut() = status;
    resp.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    resp
}

#[inline]
pub fn json_error(status: StatusCode, message: &str) -> Response {
    json_response(status, &json!({ "success": false, "error": message }))
}

#[inline]
pub fn create_text_frame(text: &str) -> FastStr {
    json!({ "type": "text", "text": text }).to_string().into()
}

#[inline]
pub fn create_error_frame(message: &str) -> FastStr {
    json!({ "type": "error", "error": message }).to_string().into()
}

/// The `data:` payload for one relay event.
pub fn relay_frame(event: &RelayEvent) -> FastStr {
    match event {
        RelayEvent::Text(t) => create_text_frame(t),
        RelayEvent::Done => FastStr::from_static_str(DONE_SENTINEL),
        RelayEvent::Error(e) => create_error_frame(e),
    }
}

/// Frames relay events as server-sent events, one frame each, and stops
/// after the first terminal event.
pub fn create_sse_response<S>(input: S) -> Sse<impl Stream<Item = Result<Event>>>
where
    S: Stream<Item = RelayEvent> + Send + Sync + 'static,
{
    let stream = stream! {
        pin_mut!(input);
        while let Some(event) = input.next().await {
            debug!(event=%event, "relay");
            let terminal = event.is_terminal();
            yield Ok(Event::new().data(relay_frame(&event)));
            if terminal {
                break;
            }
        }
    };

    Sse::new(stream)
}

/// Commits the event-stream headers. Nothing after this can change the
/// status; failures travel as `error` frames.
pub fn sse_response<S>(input: S) -> Response
where
    S: Stream<Item = RelayEvent> + Send + Sync + 'static,
{
    let mut resp = with_cors(create_sse_response(input).into_response());
    *resp.status_mut() = StatusCode::OK;
    let headers = resp.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/event-stream"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    resp
}

#[inline]
pub fn log_request(method: &Method, path: &str, resp: &Response) {
    info!(method=%method, path=%path, status=%resp.status().as_u16(), "request");
}
