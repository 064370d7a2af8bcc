// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for the API client
//!
//! Every failure that originates from a dispatch (timeout, transport failure,
//! rejected status) is classified into a single [`HttpError`] carrying the
//! config, a request echo and, when one was received, the response.
//! Builder misuse and local failures get their own variants.

use std::fmt;

use reqwest::Method;
use thiserror::Error;

use crate::http::{Headers, HttpResponse, RequestConfig};

/// Result type alias for API client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed failure reported by a transport
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for the API client
#[derive(Error, Debug)]
pub enum Error {
    /// Classified dispatch failure
    #[error(transparent)]
    Http(Box<HttpError>),

    /// Caller misuse detected before any network activity
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Flow short-circuit: the hosting environment should redirect
    #[error("Redirect to {location}")]
    Redirect { location: String },

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Classification code attached to every [`HttpError`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The engine's own timeout fired before a response arrived
    ConnAborted,
    /// Transport-level failure (DNS, connection reset, invalid URL, ...)
    Network,
    /// A response arrived but failed `validate_status`
    BadResponse,
    /// The caller-supplied cancellation signal fired
    Canceled,
    /// Any other code, set by interceptors or custom transports
    Other(String),
}

impl ErrorCode {
    /// Wire name of the code
    pub fn as_str(&self) -> &str {
        match self {
            ErrorCode::ConnAborted => "ECONNABORTED",
            ErrorCode::Network => "ERR_NETWORK",
            ErrorCode::BadResponse => "ERR_BAD_RESPONSE",
            ErrorCode::Canceled => "ERR_CANCELED",
            ErrorCode::Other(code) => code,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimal echo of what was put on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestEcho {
    /// Final URL (base + path + query)
    pub url: String,
    /// Request method
    pub method: Method,
    /// Headers after normalization and body preparation
    pub headers: Headers,
}

/// Classified dispatch error
#[derive(Debug)]
pub struct HttpError {
    /// Human readable message
    pub message: String,
    /// Classification code
    pub code: ErrorCode,
    /// Config that produced the failing request
    pub config: RequestConfig,
    /// What was sent, when the request got that far
    pub request: Option<RequestEcho>,
    /// Response, present only for rejected statuses
    pub response: Option<HttpResponse>,
    /// Underlying transport failure
    pub cause: Option<TransportError>,
}

impl HttpError {
    /// Create a new classified error
    pub fn new(message: impl Into<String>, code: ErrorCode, config: RequestConfig) -> Self {
        Self {
            message: message.into(),
            code,
            config,
            request: None,
            response: None,
            cause: None,
        }
    }

    /// Attach the request echo
    pub fn with_request(mut self, request: RequestEcho) -> Self {
        self.request = Some(request);
        self
    }

    /// Attach the response
    pub fn with_response(mut self, response: HttpResponse) -> Self {
        self.response = Some(response);
        self
    }

    /// Attach the underlying cause
    pub fn with_cause(mut self, cause: TransportError) -> Self {
        self.cause = Some(cause);
        self
    }

    /// Status of the attached response
    pub fn status(&self) -> Option<u16> {
        self.response.as_ref().map(|r| r.status)
    }

    /// Diagnostic summary: `{message, name, code, status}`
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "message": self.message,
            "name": "HttpError",
            "code": self.code.as_str(),
            "status": self.status(),
        })
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|c| c.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl From<HttpError> for Error {
    fn from(err: HttpError) -> Self {
        Error::Http(Box::new(err))
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Create a redirect signal
    pub fn redirect(location: impl Into<String>) -> Self {
        Error::Redirect {
            location: location.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// The classified error, if this is one
    pub fn as_http(&self) -> Option<&HttpError> {
        match self {
            Error::Http(err) => Some(err),
            _ => None,
        }
    }

    /// Classification code, if this is a classified error
    pub fn code(&self) -> Option<&ErrorCode> {
        self.as_http().map(|e| &e.code)
    }

    /// Check if the engine's timeout fired
    pub fn is_timeout(&self) -> bool {
        matches!(self.code(), Some(ErrorCode::ConnAborted))
    }

    /// Check if this is a transport-level failure
    pub fn is_network(&self) -> bool {
        matches!(self.code(), Some(ErrorCode::Network))
    }

    /// Check if the caller cancelled the request
    pub fn is_canceled(&self) -> bool {
        matches!(self.code(), Some(ErrorCode::Canceled))
    }

    /// Check if this is the missing-cookie redirect signal
    pub fn is_redirect(&self) -> bool {
        matches!(self, Error::Redirect { .. })
    }

    /// Get HTTP status code if a response was received
    pub fn status_code(&self) -> Option<u16> {
        self.as_http().and_then(HttpError::status)
    }

    /// Get the request URL if available
    pub fn url(&self) -> Option<&str> {
        match self {
            Error::Http(err) => err.request.as_ref().map(|r| r.url.as_str()),
            Error::Redirect { location } => Some(location),
            _ => None,
        }
    }
}

/// Raw outcome of a dispatch before classification
#[derive(Debug)]
pub enum DispatchFailure {
    /// The merged cancellation signal fired
    Aborted,
    /// A response arrived but its status failed validation
    Rejected(Box<HttpResponse>),
    /// The transport failed
    Transport(TransportError),
}

/// Convert a dispatch failure into the classified error shape.
///
/// Order matters: an abort counts as a timeout only when the engine's own
/// timer fired; otherwise it was the caller's signal.
pub fn classify(
    failure: DispatchFailure,
    config: &RequestConfig,
    request: &RequestEcho,
    timed_out: bool,
) -> Error {
    match failure {
        DispatchFailure::Aborted if timed_out => {
            let ms = config.timeout.map(|t| t.as_millis()).unwrap_or_default();
            HttpError::new(
                format!("timeout of {}ms exceeded", ms),
                ErrorCode::ConnAborted,
                config.clone(),
            )
            .with_request(request.clone())
            .into()
        }
        DispatchFailure::Aborted => {
            HttpError::new("canceled", ErrorCode::Canceled, config.clone())
                .with_request(request.clone())
                .into()
        }
        DispatchFailure::Rejected(response) => HttpError::new(
            format!("Request failed with status code {}", response.status),
            ErrorCode::BadResponse,
            config.clone(),
        )
        .with_request(request.clone())
        .with_response(*response)
        .into(),
        DispatchFailure::Transport(cause) => {
            let message = match cause.to_string() {
                m if m.is_empty() => "Network Error".to_string(),
                m => m,
            };
            HttpError::new(message, ErrorCode::Network, config.clone())
                .with_request(request.clone())
                .with_cause(cause)
                .into()
        }
    }
}
