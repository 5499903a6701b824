use super::parse_chat;
use crate::tools::sse_response;
use common::data::{ChatMode, Credential, UpstreamPayload};
use common::proxy::ChatUpstream;
use common::stream::{RelayEvent, relay_events};
use futures_util::{StreamExt, pin_mut};
use http::HeaderMap;
use tokio::sync::mpsc::{Sender, channel};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};
use volo_http::response::Response;

/// `POST /api/chat/stream`. Validation failures still get a plain JSON
/// error; past that point the response is an event stream fed by a
/// producer task that owns the upstream connection. The channel holds a
/// single event, so the upstream is read no faster than the client drains.
pub fn handle_chat_stream<U: ChatUpstream>(upstream: &U, headers: &HeaderMap, body: &[u8]) -> Response {
    let (payload, credential) = match parse_chat(headers, body, ChatMode::Stream) {
        Ok(parsed) => parsed,
        Err(err) => {
            debug!("rejected chat stream request: {err}");
            return err.to_response();
        }
    };

    let (tx, rx) = channel(1);
    tokio::spawn(relay_upstream(upstream.clone(), payload, credential, tx));
    sse_response(ReceiverStream::new(rx))
}

async fn relay_upstream<U: ChatUpstream>(
    upstream: U,
    payload: UpstreamPayload,
    credential: Credential,
    tx: Sender<RelayEvent>,
) {
    tokio::select! {
        _ = tx.closed() => info!("client went away, dropping upstream stream"),
        _ = forward_events(&upstream, payload, credential, &tx) => {}
    }
}

async fn forward_events<U: ChatUpstream>(
    upstream: &U,
    payload: UpstreamPayload,
    credential: Credential,
    tx: &Sender<RelayEvent>,
) {
    let body = match upstream.stream(payload, credential).await {
        Ok(body) => body,
        Err(err) => {
            warn!(status=%err.status(), "chat stream failed: {err}");
            let _ = tx.send(RelayEvent::Error(err.client_message())).await;
            return;
        }
    };

    let events = relay_events(body);
    pin_mut!(events);
    while let Some(event) = events.next().await {
        let terminal = event.is_terminal();
        if tx.send(event).await.is_err() {
            warn!("send event error: channel may closed");
            return;
        }
        if terminal {
            return;
        }
    }
}
