use crate::tools::json_error;
use faststr::FastStr;
use reqwest::StatusCode;
use thiserror::Error;
use volo_http::response::Response;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Missing API key")]
    MissingApiKey,

    #[error("Invalid request body: {0}")]
    InvalidRequestBody(FastStr),

    #[error("failed to read request body: {0}")]
    ReadBody(FastStr),

    #[error("Not Found")]
    NotFound,

    #[error(transparent)]
    Upstream(#[from] common::error::Error),

    #[error("invalid value for {0}: {1}")]
    Config(&'static str, FastStr),

    #[error("server error: {0}")]
    Server(FastStr),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::InvalidJson(_) | Error::MissingApiKey | Error::InvalidRequestBody(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::Upstream(e) => e.status(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn client_message(&self) -> FastStr {
        match self {
            Error::Upstream(e) => e.client_message(),
            _ => self.to_string().into(),
        }
    }

    /// `{success: false, error}` with the matching status.
    pub fn to_response(&self) -> Response {
        json_error(self.status(), &self.client_message())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
