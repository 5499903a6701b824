use super::parse_chat;
use crate::error::{Error, Result};
use crate::tools::json_response;
use common::data::{ChatMode, ChatResult};
use common::proxy::ChatUpstream;
use http::HeaderMap;
use reqwest::StatusCode;
use tracing::{debug, warn};
use volo_http::response::Response;

/// `POST /api/chat`: one upstream call, one JSON answer.
pub async fn handle_chat<U: ChatUpstream>(upstream: &U, headers: &HeaderMap, body: &[u8]) -> Response {
    match chat_completion(upstream, headers, body).await {
        Ok(result) => json_response(StatusCode::OK, &result),
        Err(err) => {
            match &err {
                Error::Upstream(e) => warn!(status=%err.status(), "chat completion failed: {e}"),
                e => debug!("rejected chat request: {e}"),
            }
            err.to_response()
        }
    }
}

async fn chat_completion<U: ChatUpstream>(
    upstream: &U,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<ChatResult> {
    let (payload, credential) = parse_chat(headers, body, ChatMode::Complete)?;
    let result = upstream.complete(payload, credential).await?;
    Ok(ChatResult::from_upstream(&result))
}
