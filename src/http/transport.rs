// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Transport layer
//!
//! The engine hands a fully prepared [`WireRequest`] to a [`Transport`] and
//! gets a [`RawResponse`] back. [`ReqwestTransport`] is the production
//! implementation; tests plug in scripted transports.

use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL};
use reqwest::redirect::Policy;
use reqwest::{Client, Method};
use url::Url;

use super::body::{FormData, FormValue, WireBody};
use super::cookie::CookieJar;
use super::header::Headers;
use super::headers::{COOKIE, SET_COOKIE};
use super::request::{CacheDirective, CredentialsMode};
use super::response::RawResponse;
use super::DEFAULT_USER_AGENT;
use crate::error::{Error, Result, TransportError};

/// Request as it goes on the wire
#[derive(Debug, Clone)]
pub struct WireRequest {
    /// Final URL including the query string
    pub url: String,
    pub method: Method,
    pub headers: Headers,
    pub body: Option<WireBody>,
    /// Credentials policy derived from `with_credentials`
    pub credentials: CredentialsMode,
    /// Cache hint for read requests
    pub cache: Option<CacheDirective>,
}

/// Something that can put a request on the wire
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and return the response with its body unread.
    ///
    /// Any non-2xx status is still a successful send; status policy is the
    /// engine's concern.
    async fn send(&self, request: WireRequest) -> std::result::Result<RawResponse, TransportError>;
}

/// Transport configuration
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// User agent string
    pub user_agent: String,
    /// TCP connect timeout; the overall request timeout is enforced by the engine
    pub connect_timeout: Option<Duration>,
    /// Maximum redirects to follow
    pub max_redirects: usize,
    /// Accept invalid certificates (dangerous!)
    pub accept_invalid_certs: bool,
    /// Keep a cookie jar for credentialed requests
    pub handle_cookies: bool,
    /// Proxy URL
    pub proxy: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout: Some(Duration::from_secs(10)),
            max_redirects: 10,
            accept_invalid_certs: false,
            handle_cookies: true,
            proxy: None,
        }
    }
}

/// reqwest-backed transport with its own cookie jar
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    config: TransportConfig,
    cookie_jar: CookieJar,
    /// Origin requests are compared against in same-origin mode
    origin: Option<Url>,
}

impl ReqwestTransport {
    /// Create a transport with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(TransportConfig::default())
    }

    /// Create a transport with custom configuration
    pub fn with_config(config: TransportConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(Policy::limited(config.max_redirects))
            .danger_accept_invalid_certs(config.accept_invalid_certs);

        if let Some(connect_timeout) = config.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }

        if let Some(ref proxy_url) = config.proxy {
            builder = builder.proxy(
                reqwest::Proxy::all(proxy_url)
                    .map_err(|e| Error::Config(format!("Invalid proxy URL: {}", e)))?,
            );
        }

        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            cookie_jar: CookieJar::new(),
            origin: None,
        })
    }

    /// Set the origin used for same-origin credential checks
    pub fn with_origin(mut self, base_url: &str) -> Result<Self> {
        self.origin = Some(Url::parse(base_url)?);
        Ok(self)
    }

    /// Get the cookie jar
    pub fn cookie_jar(&self) -> &CookieJar {
        &self.cookie_jar
    }

    /// Get transport configuration
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    fn sends_credentials(&self, mode: CredentialsMode, url: &Url) -> bool {
        match mode {
            CredentialsMode::Include => true,
            CredentialsMode::SameOrigin => self
                .origin
                .as_ref()
                .map_or(false, |origin| origin.origin() == url.origin()),
            CredentialsMode::Omit => false,
        }
    }
}

fn multipart_form(
    form: &FormData,
) -> std::result::Result<reqwest::multipart::Form, TransportError> {
    let mut out = reqwest::multipart::Form::new();
    for part in form.parts() {
        out = match &part.value {
            FormValue::Text(text) => out.text(part.name.clone(), text.clone()),
            FormValue::File {
                bytes,
                filename,
                mime,
            } => {
                let mut file = reqwest::multipart::Part::bytes(bytes.to_vec());
                if let Some(filename) = filename {
                    file = file.file_name(filename.clone());
                }
                if let Some(mime) = mime {
                    file = file.mime_str(mime)?;
                }
                out.part(part.name.clone(), file)
            }
        };
    }
    Ok(out)
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: WireRequest) -> std::result::Result<RawResponse, TransportError> {
        let url = Url::parse(&request.url)?;
        let mut headers: HeaderMap = request.headers.to_header_map();

        let credentialed = self.config.handle_cookies && self.sends_credentials(request.credentials, &url);

        // A Cookie header set by the caller wins over the jar
        if credentialed && !headers.contains_key(COOKIE) {
            if let Some(cookie_header) = self.cookie_jar.get_cookie_header(&url) {
                headers.insert(COOKIE, HeaderValue::from_str(&cookie_header)?);
            }
        }

        if let Some(cache_control) = request.cache.as_ref().and_then(CacheDirective::cache_control) {
            if !headers.contains_key(CACHE_CONTROL) {
                headers.insert(CACHE_CONTROL, HeaderValue::from_str(&cache_control)?);
            }
        }

        let mut builder = self.client.request(request.method.clone(), url).headers(headers);

        builder = match request.body {
            Some(WireBody::Text(text)) => builder.body(text),
            Some(WireBody::Bytes(bytes)) => builder.body(bytes),
            Some(WireBody::Multipart(form)) => builder.multipart(multipart_form(&form)?),
            None => builder,
        };

        tracing::trace!("{} {}", request.method, request.url);
        let response = builder.send().await?;

        let final_url = response.url().clone();
        let status = response.status();
        let headers = response.headers().clone();

        if credentialed {
            for cookie in headers.get_all(SET_COOKIE) {
                if let Ok(cookie_str) = cookie.to_str() {
                    self.cookie_jar.add_from_header(cookie_str, &final_url);
                }
            }
        }

        let body = response
            .bytes_stream()
            .map_err(|e| Box::new(e) as TransportError);

        Ok(RawResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            headers,
            body: Box::pin(body),
        })
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use std::time::Duration;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use reqwest::header::{HeaderMap, HeaderValue};

    use super::{Transport, WireRequest};
    use crate::error::TransportError;
    use crate::http::response::RawResponse;

    /// Scripted transport recording every request it receives
    pub(crate) struct MockTransport {
        sent: Mutex<Vec<WireRequest>>,
        status: u16,
        body: String,
        content_type: Option<&'static str>,
        delay: Option<Duration>,
        failure: Option<&'static str>,
    }

    impl MockTransport {
        pub(crate) fn json(status: u16, body: &str) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                status,
                body: body.to_string(),
                content_type: Some("application/json"),
                delay: None,
                failure: None,
            }
        }

        pub(crate) fn failing(message: &'static str) -> Self {
            Self {
                failure: Some(message),
                ..Self::json(200, "")
            }
        }

        pub(crate) fn delayed(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub(crate) fn calls(&self) -> usize {
            self.sent.lock().len()
        }

        pub(crate) fn last(&self) -> Option<WireRequest> {
            self.sent.lock().last().cloned()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn send(
            &self,
            request: WireRequest,
        ) -> std::result::Result<RawResponse, TransportError> {
            self.sent.lock().push(request);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if let Some(message) = self.failure {
                return Err(message.into());
            }
            let mut headers = HeaderMap::new();
            if let Some(ct) = self.content_type {
                headers.insert("content-type", HeaderValue::from_static(ct));
            }
            Ok(RawResponse::from_bytes(self.status, headers, self.body.clone()))
        }
    }
}
