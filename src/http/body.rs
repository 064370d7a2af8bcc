// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request bodies and their wire preparation

use bytes::Bytes;
use reqwest::Method;
use serde_json::Value;

use super::header::Headers;
use super::headers::CONTENT_TYPE;
use crate::error::Result;

/// Payload attached to a request config
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Structured value, serialized when the content type is JSON
    Json(Value),
    /// Pre-serialized text
    Text(String),
    /// Pre-serialized binary payload
    Bytes(Bytes),
    /// Multipart form; the transport picks the boundary
    Form(FormData),
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        RequestBody::Json(value)
    }
}

/// `None` means no payload at all
impl<T: Into<RequestBody>> From<Option<T>> for RequestBody {
    fn from(data: Option<T>) -> Self {
        data.map_or(RequestBody::Json(Value::Null), Into::into)
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        RequestBody::Text(text)
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        RequestBody::Text(text.to_string())
    }
}

impl From<Bytes> for RequestBody {
    fn from(bytes: Bytes) -> Self {
        RequestBody::Bytes(bytes)
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        RequestBody::Bytes(Bytes::from(bytes))
    }
}

impl From<FormData> for RequestBody {
    fn from(form: FormData) -> Self {
        RequestBody::Form(form)
    }
}

/// Multipart form container
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    parts: Vec<FormPart>,
}

/// One named field of a [`FormData`]
#[derive(Debug, Clone, PartialEq)]
pub struct FormPart {
    pub name: String,
    pub value: FormValue,
}

/// Field value of a [`FormPart`]
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Text(String),
    File {
        bytes: Bytes,
        filename: Option<String>,
        mime: Option<String>,
    },
}

impl FormData {
    /// Create an empty form
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text field
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            value: FormValue::Text(value.into()),
        });
        self
    }

    /// Append a file field
    pub fn file(
        mut self,
        name: impl Into<String>,
        bytes: impl Into<Bytes>,
        filename: Option<String>,
        mime: Option<String>,
    ) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            value: FormValue::File {
                bytes: bytes.into(),
                filename,
                mime,
            },
        });
        self
    }

    /// Fields in insertion order
    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// Body in the form the transport sends it
#[derive(Debug, Clone, PartialEq)]
pub enum WireBody {
    Text(String),
    Bytes(Bytes),
    Multipart(FormData),
}

impl WireBody {
    /// Text view of the body, for logging and tests
    pub fn as_text(&self) -> Option<&str> {
        match self {
            WireBody::Text(text) => Some(text),
            WireBody::Bytes(bytes) => std::str::from_utf8(bytes).ok(),
            WireBody::Multipart(_) => None,
        }
    }
}

/// Whether a method may carry a body at all
pub fn method_allows_body(method: &Method) -> bool {
    *method != Method::GET && *method != Method::HEAD
}

/// Decide what goes on the wire for `data`.
///
/// GET and HEAD never carry a body, and neither does a JSON null. Multipart forms drop any explicit
/// content type so the transport can set the boundary. Structured JSON is
/// serialized; pre-serialized payloads pass through.
pub fn prepare_body(
    method: &Method,
    data: Option<&RequestBody>,
    headers: &mut Headers,
) -> Result<Option<WireBody>> {
    let Some(data) = data else {
        return Ok(None);
    };
    if !method_allows_body(method) {
        return Ok(None);
    }

    let body = match data {
        RequestBody::Form(form) => {
            headers.remove(CONTENT_TYPE);
            WireBody::Multipart(form.clone())
        }
        RequestBody::Json(value @ (Value::Object(_) | Value::Array(_))) => {
            let is_json = headers
                .get(CONTENT_TYPE)
                .map_or(false, |ct| ct.contains("application/json"));
            if !is_json {
                tracing::debug!("Serializing structured body without a JSON content type");
            }
            WireBody::Text(serde_json::to_string(value)?)
        }
        RequestBody::Json(Value::Null) => return Ok(None),
        RequestBody::Json(Value::String(text)) => WireBody::Text(text.clone()),
        RequestBody::Json(value) => WireBody::Text(value.to_string()),
        RequestBody::Text(text) => WireBody::Text(text.clone()),
        RequestBody::Bytes(bytes) => WireBody::Bytes(bytes.clone()),
    };
    Ok(Some(body))
}
