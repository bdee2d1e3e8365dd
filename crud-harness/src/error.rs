use crate::ResponseData;
use hyper::http;
use std::{io, sync};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IoError: {0}")]
    IoError(#[from] io::Error),
    #[error("The lock was poisoned")]
    PoisonedLock,
    #[error("The harness hasn't been configured: {0}")]
    NotConfigured(String),
    #[error("reqwest error: {0}")]
    ReqwestError(#[from] reqwest::Error),
    #[error("Invalid header name")]
    InvalidHeaderName,
    #[error("Invalid header value")]
    InvalidHeaderValue,
    #[error("Invalid body")]
    InvalidBody,
    #[error("Hyper error: {0}")]
    HyperError(#[from] hyper::Error),
    #[error("Http Error: {0}")]
    HttpError(#[from] http::Error),
    #[error("Json error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Expected status code {expected}, got {actual}")]
    UnexpectedStatus {
        expected: u16,
        actual: u16,
        response: Box<ResponseData>,
    },
    #[error("Interceptors were never matched: {}", .0.join(", "))]
    PendingInterceptors(Vec<String>),
    #[error("Teardown failed: {0}")]
    Teardown(Box<Error>),
}

impl Error {
    /// The response that caused the error, if the server answered at all.
    pub fn response(&self) -> Option<&ResponseData> {
        match self {
            Error::UnexpectedStatus { response, .. } => Some(&**response),
            _ => None,
        }
    }
}

impl<T> From<sync::PoisonError<T>> for Error {
    fn from(_: sync::PoisonError<T>) -> Self {
        Error::PoisonedLock
    }
}

impl From<hyper::header::InvalidHeaderName> for Error {
    fn from(_: hyper::header::InvalidHeaderName) -> Self {
        Error::InvalidHeaderName
    }
}

impl From<hyper::header::InvalidHeaderValue> for Error {
    fn from(_: hyper::header::InvalidHeaderValue) -> Self {
        Error::InvalidHeaderValue
    }
}
