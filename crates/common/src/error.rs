use faststr::FastStr;
use reqwest::StatusCode;
use serde_json::Value;
use std::error::Error as StdError;
use thiserror::Error;

/// Failures of a single upstream exchange.
#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP Error {}: {}", .status.as_u16(), .status.canonical_reason().unwrap_or("Unknown"))]
    UpstreamStatus { status: StatusCode, body: FastStr },
    #[error("Network error: {}", error_chain(.0))]
    Network(#[source] reqwest::Error),
    #[error("Invalid upstream response: {0}")]
    InvalidResponse(#[from] serde_json::Error),
    #[error("failed to build http client: {0}")]
    BuildClient(#[source] reqwest::Error),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err)
    }
}

impl Error {
    /// Status to answer the browser with when headers are not yet sent.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::UpstreamStatus { status, .. } => *status,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the browser. Upstream status errors prefer the
    /// upstream's own `error.message`, then the raw body.
    pub fn client_message(&self) -> FastStr {
        match self {
            Error::UpstreamStatus { body, .. } => serde_json::from_str::<Value>(body)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(FastStr::new))
                .or_else(|| (!body.is_empty()).then(|| body.clone()))
                .unwrap_or_else(|| self.to_string().into()),
            _ => self.to_string().into(),
        }
    }
}

/// Renders an error with all of its sources, `outer: inner: root`.
pub fn error_chain(err: &dyn StdError) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !out.contains(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}

pub type Result<T> = std::result::Result<T, Error>;
