pub mod anthropic;

use crate::data::{Credential, UpstreamPayload};
use crate::error::{Error, Result};
use bytes::Bytes;
use futures_util::stream::BoxStream;
use serde_json::Value;
use std::future::Future;

pub use anthropic::AnthropicClient;

/// Raw upstream body, chunk by chunk.
pub type ByteStream = BoxStream<'static, std::result::Result<Bytes, Error>>;

/// One chat-completion backend. Each call owns its payload and credential
/// and shares nothing with other calls.
pub trait ChatUpstream: Clone + Send + Sync + 'static {
    /// Waits for the whole reply and returns the upstream message object.
    fn complete(
        &self,
        payload: UpstreamPayload,
        credential: Credential,
    ) -> impl Future<Output = Result<Value>> + Send;

    /// Opens a streaming exchange. Errors before the first byte, including
    /// upstream error statuses, are returned here rather than in the stream.
    fn stream(
        &self,
        payload: UpstreamPayload,
        credential: Credential,
    ) -> impl Future<Output = Result<ByteStream>> + Send;
}
