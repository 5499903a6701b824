use super::{ByteStream, ChatUpstream};
use crate::error::{Error, Result};
use crate::{
    RequestBuilder,
    data::{Credential, RequestData, UpstreamPayload},
};
use faststr::FastStr;
use futures_util::{StreamExt, TryStreamExt};
use reqwest::Client as ReqwestClient;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

pub const COMPLETE_TIMEOUT: Duration = Duration::from_secs(60);
pub const STREAM_TIMEOUT: Duration = Duration::from_secs(120);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the Anthropic Messages endpoint.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http:     ReqwestClient,
    endpoint: FastStr,
}

impl AnthropicClient {
    pub fn new<T: Into<FastStr>>(endpoint: T) -> Result<Self> {
        let http = ReqwestClient::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(Error::BuildClient)?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn prepare_messages(&self, payload: &UpstreamPayload, credential: &Credential) -> Result<RequestData> {
        let body = serde_json::to_value(payload)?;
        let mut request_data = RequestData::new(self.endpoint.clone(), body);
        request_data.header("content-type", "application/json");
        request_data.header("x-api-key", credential.expose().to_owned());
        request_data.header("anthropic-version", ANTHROPIC_VERSION);
        Ok(request_data)
    }

    /// Sends the request and turns any non-2xx answer into
    /// [`Error::UpstreamStatus`] carrying the upstream body.
    async fn send(
        &self,
        payload: &UpstreamPayload,
        credential: &Credential,
        timeout: Duration,
    ) -> Result<reqwest::Response> {
        let request_data = self.prepare_messages(payload, credential)?;
        let builder = request_builder(request_data, &self.http).timeout(timeout);
        debug!(model=%payload.model, stream=payload.stream, messages=payload.messages.as_array().map_or(0, Vec::len), "sending upstream request");
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "upstream returned an error status");
            return Err(Error::UpstreamStatus {
                status,
                body: body.into(),
            });
        }
        Ok(response)
    }
}

impl ChatUpstream for AnthropicClient {
    async fn complete(&self, payload: UpstreamPayload, credential: Credential) -> Result<Value> {
        let response = self.send(&payload, &credential, COMPLETE_TIMEOUT).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn stream(&self, payload: UpstreamPayload, credential: Credential) -> Result<ByteStream> {
        let response = self.send(&payload, &credential, STREAM_TIMEOUT).await?;
        Ok(response.bytes_stream().map_err(Error::from).boxed())
    }
}

fn request_builder(request_data: RequestData, client: &ReqwestClient) -> RequestBuilder {
    let RequestData {
        url, body, headers, ..
    } = request_data;
    let mut builder = client.post(url.as_str());
    for (k, v) in headers {
        builder = builder.header(k.as_str(), v.as_str());
    }
    builder = builder.json(&body);
    builder
}
