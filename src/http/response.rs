// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP response types and body decoding

use std::fmt;
use std::pin::Pin;
use std::str::FromStr;

use bytes::{Bytes, BytesMut};
use parking_lot::Mutex;
use futures::stream::{self, Stream, TryStreamExt};
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::header::Headers;
use super::headers::CONTENT_TYPE;
use super::request::RequestConfig;
use crate::error::{Error, RequestEcho, Result, TransportError};

/// Streaming response body
pub type BodyStream = Pin<Box<dyn Stream<Item = std::result::Result<Bytes, TransportError>> + Send>>;

/// Declared response type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseType {
    Json,
    Text,
    Blob,
    ArrayBuffer,
    Stream,
    Document,
}

impl FromStr for ResponseType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ResponseType::Json),
            "text" => Ok(ResponseType::Text),
            "blob" => Ok(ResponseType::Blob),
            "arraybuffer" => Ok(ResponseType::ArrayBuffer),
            "stream" => Ok(ResponseType::Stream),
            "document" => Ok(ResponseType::Document),
            other => Err(Error::invalid_argument(format!(
                "unknown response type '{}'",
                other
            ))),
        }
    }
}

/// Response as handed back by a transport, body not yet read
pub struct RawResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: HeaderMap,
    pub body: BodyStream,
}

impl RawResponse {
    /// Build a response around a complete in-memory body
    pub fn from_bytes(status: u16, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        let body: Bytes = body.into();
        Self {
            status,
            status_text: reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("")
                .to_string(),
            headers,
            body: Box::pin(stream::once(async move { Ok::<_, TransportError>(body) })),
        }
    }

    /// Content type header, if any
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }
}

impl fmt::Debug for RawResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawResponse")
            .field("status", &self.status)
            .field("status_text", &self.status_text)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Decoded response body
pub enum ResponseData {
    /// Parsed JSON
    Json(Value),
    /// Decoded text, including bodies that were not valid JSON
    Text(String),
    /// Raw bytes (`arraybuffer` / `blob`)
    Bytes(Bytes),
    /// Unread body (`stream`), taken once with [`ResponseData::take_stream`]
    Stream(Mutex<Option<BodyStream>>),
}

impl ResponseData {
    /// Parsed JSON value, if the body was JSON
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseData::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Text body, if decoded as text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseData::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Raw bytes, if read as binary
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            ResponseData::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Take the unread body; `None` if not a stream or already taken
    pub fn take_stream(&self) -> Option<BodyStream> {
        match self {
            ResponseData::Stream(body) => body.lock().take(),
            _ => None,
        }
    }

    /// Lossy text rendering for logs
    pub fn to_text_lossy(&self) -> String {
        match self {
            ResponseData::Json(value) => value.to_string(),
            ResponseData::Text(text) => text.clone(),
            ResponseData::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            ResponseData::Stream(_) => "<stream>".to_string(),
        }
    }
}

impl fmt::Debug for ResponseData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseData::Json(value) => f.debug_tuple("Json").field(value).finish(),
            ResponseData::Text(text) => f.debug_tuple("Text").field(text).finish(),
            ResponseData::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            ResponseData::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Check if a content type denotes JSON
pub fn is_json_content_type(content_type: &str) -> bool {
    content_type.contains("application/json") || content_type.contains("+json")
}

async fn collect_body(body: BodyStream) -> std::result::Result<Bytes, TransportError> {
    let buf = body
        .try_fold(BytesMut::new(), |mut acc, chunk| async move {
            acc.extend_from_slice(&chunk);
            Ok::<_, TransportError>(acc)
        })
        .await?;
    Ok(buf.freeze())
}

/// Decode a raw body according to the declared response type.
///
/// Binary types return bytes and `stream` hands the body back unread. The
/// default reads text and attempts a JSON parse; malformed JSON is returned
/// as text, never as an error.
pub async fn read_response_data(
    raw: RawResponse,
    response_type: Option<ResponseType>,
) -> std::result::Result<(RawResponseHead, ResponseData), TransportError> {
    let head = RawResponseHead {
        status: raw.status,
        status_text: raw.status_text,
        headers: raw.headers,
    };
    let data = match response_type {
        Some(ResponseType::ArrayBuffer | ResponseType::Blob) => {
            ResponseData::Bytes(collect_body(raw.body).await?)
        }
        Some(ResponseType::Stream) => ResponseData::Stream(Mutex::new(Some(raw.body))),
        Some(ResponseType::Text | ResponseType::Document) => {
            let bytes = collect_body(raw.body).await?;
            ResponseData::Text(String::from_utf8_lossy(&bytes).into_owned())
        }
        Some(ResponseType::Json) | None => {
            let bytes = collect_body(raw.body).await?;
            let text = String::from_utf8_lossy(&bytes).into_owned();
            if text.is_empty() {
                ResponseData::Text(text)
            } else {
                match serde_json::from_str::<Value>(&text) {
                    Ok(value) => ResponseData::Json(value),
                    Err(e) => {
                        let declared_json = response_type.is_none()
                            && head
                                .headers
                                .get(CONTENT_TYPE)
                                .and_then(|v| v.to_str().ok())
                                .map_or(false, is_json_content_type);
                        if declared_json {
                            tracing::debug!(error = %e, "JSON content type with unparseable body");
                        }
                        ResponseData::Text(text)
                    }
                }
            }
        }
    };
    Ok((head, data))
}

/// Status line and headers of a response whose body has been consumed
#[derive(Debug, Clone)]
pub struct RawResponseHead {
    pub status: u16,
    pub status_text: String,
    pub headers: HeaderMap,
}

/// HTTP response representation
#[derive(Debug)]
pub struct HttpResponse {
    /// Decoded body
    pub data: ResponseData,
    /// Response status code
    pub status: u16,
    /// Reason phrase
    pub status_text: String,
    /// Normalized response headers
    pub headers: Headers,
    /// Config that produced this response
    pub config: RequestConfig,
    /// What was sent
    pub request: RequestEcho,
}

impl HttpResponse {
    /// Check if status is success (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get a header value
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Get content type
    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE)
    }

    /// Deserialize the body into `T`
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        match &self.data {
            ResponseData::Json(value) => Ok(T::deserialize(value)?),
            ResponseData::Text(text) => Ok(serde_json::from_str(text)?),
            ResponseData::Bytes(bytes) => Ok(serde_json::from_slice(bytes)?),
            ResponseData::Stream(_) => Err(Error::other("stream body has not been read")),
        }
    }

    /// Lossy text rendering of the body
    pub fn text_lossy(&self) -> String {
        self.data.to_text_lossy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use reqwest::header::HeaderValue;
    use serde::Deserialize;

    fn raw(body: &'static str, content_type: Option<&'static str>) -> RawResponse {
        let mut headers = HeaderMap::new();
        if let Some(ct) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(ct));
        }
        RawResponse::from_bytes(200, headers, body)
    }

    #[tokio::test]
    async fn test_default_parses_json() {
        let (_, data) = read_response_data(raw(r#"{"id":5}"#, None), None).await.unwrap();
        assert_eq!(data.as_json().unwrap()["id"], 5);
    }

    #[tokio::test]
    async fn test_malformed_json_falls_back_to_text() {
        let (_, data) = read_response_data(raw("{oops", Some("application/json")), None)
            .await
            .unwrap();
        assert_eq!(data.as_text(), Some("{oops"));
    }

    #[tokio::test]
    async fn test_empty_body_is_empty_text() {
        let (_, data) = read_response_data(raw("", None), Some(ResponseType::Json))
            .await
            .unwrap();
        assert_eq!(data.as_text(), Some(""));
    }

    #[tokio::test]
    async fn test_text_type_skips_parsing() {
        let (_, data) = read_response_data(raw("[1,2]", Some("application/json")), Some(ResponseType::Text))
            .await
            .unwrap();
        assert_eq!(data.as_text(), Some("[1,2]"));
    }

    #[tokio::test]
    async fn test_binary_and_stream_types() {
        let (_, data) = read_response_data(raw("abc", None), Some(ResponseType::ArrayBuffer))
            .await
            .unwrap();
        assert_eq!(data.as_bytes().unwrap().as_ref(), b"abc");

        let (head, data) = read_response_data(raw("abc", None), Some(ResponseType::Stream))
            .await
            .unwrap();
        assert_eq!(head.status, 200);
        let mut body = data.take_stream().expect("stream body");
        assert!(data.take_stream().is_none());
        assert_eq!(body.next().await.unwrap().unwrap().as_ref(), b"abc");
    }

    #[test]
    fn test_response_type_parsing() {
        assert_eq!("ArrayBuffer".parse::<ResponseType>().unwrap(), ResponseType::ArrayBuffer);
        assert!("xml".parse::<ResponseType>().is_err());
    }

    #[test]
    fn test_json_content_type_detection() {
        assert!(is_json_content_type("application/json; charset=utf-8"));
        assert!(is_json_content_type("application/problem+json"));
        assert!(!is_json_content_type("text/html"));
    }

    #[test]
    fn test_typed_json_access() {
        #[derive(Deserialize)]
        struct User {
            name: String,
        }
        let response = HttpResponse {
            data: ResponseData::Json(serde_json::json!({"name": "a"})),
            status: 200,
            status_text: "OK".to_string(),
            headers: Headers::new(),
            config: RequestConfig::get("/users/5"),
            request: RequestEcho {
                url: "https://api.example.com/users/5".to_string(),
                method: reqwest::Method::GET,
                headers: Headers::new(),
            },
        };
        assert_eq!(response.json::<User>().unwrap().name, "a");
        assert!(response.is_success());
    }
}
