use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;
use url::ParseError;

pub type Result<T, E = JobBoardError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum JobBoardError {
    #[error("Client Error: status={status}, message={message}, detail={detail:?}")]
    ClientError {
        status: StatusCode,
        message: String,
        detail: Option<Value>,
        header: HeaderMap,
    },

    #[error("Server Error: status={status}, message={message}")]
    ServerError {
        status: StatusCode,
        message: String,
        header: HeaderMap,
    },

    #[error("WebSocket Error: {0}")]
    WebsocketError(String),

    #[error("HTTP Request Error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON Serialization/Deserialization Error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Query String Serialization Error: {0}")]
    QueryStringError(#[from] serde_qs::Error),

    #[error("URL Parsing Error: {0}")]
    UrlParseError(#[from] ParseError),

    #[error("Invalid HTTP Header Value: {0}")]
    InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
}
