// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP engine
//!
//! [`HttpEngine`] owns the defaults, the interceptor pipeline and the
//! dispatch routine. Callers and the request builders only depend on the
//! [`HttpInstance`] capability set, so the transport behind it can be
//! swapped at construction time.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Method;

use super::body::{prepare_body, RequestBody};
use super::cancel::{merge_signals, TimeoutSignal};
use super::header::{normalize_headers, Headers};
use super::headers::CONTENT_TYPE;
use super::request::{CredentialsMode, RequestConfig};
use super::response::{read_response_data, HttpResponse};
use super::transport::{ReqwestTransport, Transport, TransportConfig, WireRequest};
use super::url::{append_params, build_url};
use crate::error::{classify, DispatchFailure, ErrorCode, RequestEcho, Result};
use crate::network::{run_stage, Interceptors};

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Engine-wide defaults, fixed at construction
#[derive(Debug, Clone)]
pub struct EngineDefaults {
    pub base_url: Option<String>,
    /// Zero disables the timer
    pub timeout: Duration,
    pub headers: Headers,
    pub with_credentials: bool,
}

impl Default for EngineDefaults {
    fn default() -> Self {
        let mut headers = Headers::new();
        headers.insert(CONTENT_TYPE, "application/json");
        Self {
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            headers,
            with_credentials: true,
        }
    }
}

impl EngineDefaults {
    /// Defaults rooted at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            ..Default::default()
        }
    }

    /// Defaults expressed as a config that request configs merge over
    pub fn to_config(&self) -> RequestConfig {
        RequestConfig {
            base_url: self.base_url.clone(),
            headers: self.headers.clone(),
            timeout: Some(self.timeout),
            with_credentials: Some(self.with_credentials),
            ..Default::default()
        }
    }
}

/// Capability set shared by every engine implementation
#[async_trait]
pub trait HttpInstance: Send + Sync {
    /// Engine defaults
    fn defaults(&self) -> &EngineDefaults;

    /// Interceptor pipeline
    fn interceptors(&self) -> &Interceptors;

    /// Run `config` through the interceptors and dispatch it
    async fn request(&self, config: RequestConfig) -> Result<HttpResponse>;

    /// URL the engine would dispatch `config` to, without sending anything
    fn get_uri(&self, config: &RequestConfig) -> String;

    async fn get(&self, url: &str, config: RequestConfig) -> Result<HttpResponse> {
        self.request(config.method(Method::GET).url(url)).await
    }

    async fn delete(&self, url: &str, config: RequestConfig) -> Result<HttpResponse> {
        self.request(config.method(Method::DELETE).url(url)).await
    }

    async fn head(&self, url: &str, config: RequestConfig) -> Result<HttpResponse> {
        self.request(config.method(Method::HEAD).url(url)).await
    }

    async fn options(&self, url: &str, config: RequestConfig) -> Result<HttpResponse> {
        self.request(config.method(Method::OPTIONS).url(url)).await
    }

    async fn post(
        &self,
        url: &str,
        data: Option<RequestBody>,
        config: RequestConfig,
    ) -> Result<HttpResponse> {
        self.request(with_data(config.method(Method::POST).url(url), data))
            .await
    }

    async fn put(
        &self,
        url: &str,
        data: Option<RequestBody>,
        config: RequestConfig,
    ) -> Result<HttpResponse> {
        self.request(with_data(config.method(Method::PUT).url(url), data))
            .await
    }

    async fn patch(
        &self,
        url: &str,
        data: Option<RequestBody>,
        config: RequestConfig,
    ) -> Result<HttpResponse> {
        self.request(with_data(config.method(Method::PATCH).url(url), data))
            .await
    }
}

fn with_data(mut config: RequestConfig, data: Option<RequestBody>) -> RequestConfig {
    if data.is_some() {
        config.data = data;
    }
    config
}

/// Fetch-style engine dispatching through a [`Transport`]
pub struct HttpEngine {
    defaults: EngineDefaults,
    interceptors: Interceptors,
    transport: Arc<dyn Transport>,
}

impl HttpEngine {
    /// Create an engine over an explicit transport
    pub fn new(defaults: EngineDefaults, transport: Arc<dyn Transport>) -> Self {
        Self {
            defaults,
            interceptors: Interceptors::new(),
            transport,
        }
    }

    /// Create an engine over a reqwest transport whose same-origin policy is
    /// anchored at the base URL
    pub fn with_reqwest(defaults: EngineDefaults, config: TransportConfig) -> Result<Self> {
        let mut transport = ReqwestTransport::with_config(config)?;
        if let Some(base_url) = &defaults.base_url {
            transport = transport.with_origin(base_url)?;
        }
        Ok(Self::new(defaults, Arc::new(transport)))
    }

    /// Transport in use
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    fn resolve_url(&self, config: &RequestConfig) -> String {
        let base_url = config
            .base_url
            .as_deref()
            .or(self.defaults.base_url.as_deref());
        append_params(
            &build_url(base_url, &config.url),
            config.params.as_ref(),
            config.params_serializer.as_deref(),
        )
    }

    /// Send one finalized config and classify the outcome
    async fn dispatch(&self, config: RequestConfig) -> Result<HttpResponse> {
        let started = Instant::now();
        let timeout = config.timeout.unwrap_or(self.defaults.timeout);
        let with_credentials = config
            .with_credentials
            .unwrap_or(self.defaults.with_credentials);
        let config = RequestConfig {
            timeout: Some(timeout),
            with_credentials: Some(with_credentials),
            base_url: config
                .base_url
                .clone()
                .or_else(|| self.defaults.base_url.clone()),
            ..config
        };

        let url = self.resolve_url(&config);
        let mut headers = config.headers.clone();
        let body = prepare_body(&config.method, config.data.as_ref(), &mut headers)?;

        let echo = RequestEcho {
            url: url.clone(),
            method: config.method.clone(),
            headers: headers.clone(),
        };
        let wire = WireRequest {
            url,
            method: config.method.clone(),
            headers,
            body,
            credentials: CredentialsMode::from_with_credentials(with_credentials),
            cache: config.cache.clone(),
        };

        let timer = (!timeout.is_zero()).then(|| TimeoutSignal::start(timeout));
        let signal = merge_signals([timer.as_ref().map(TimeoutSignal::token), config.signal.clone()]);

        let transport = Arc::clone(&self.transport);
        let response_type = config.response_type;
        let exchange = async move {
            let raw = transport
                .send(wire)
                .await
                .map_err(DispatchFailure::Transport)?;
            read_response_data(raw, response_type)
                .await
                .map_err(DispatchFailure::Transport)
        };

        let outcome = match signal.as_deref() {
            Some(signal) => tokio::select! {
                biased;
                _ = signal.cancelled() => Err(DispatchFailure::Aborted),
                result = exchange => result,
            },
            None => exchange.await,
        };

        let timed_out = timer.as_ref().map_or(false, TimeoutSignal::fired);
        drop(signal);
        drop(timer);

        let (head, data) = match outcome {
            Ok(read) => read,
            Err(failure) => {
                let err = classify(failure, &config, &echo, timed_out);
                tracing::warn!(
                    method = %echo.method,
                    url = %echo.url,
                    code = ?err.code().map(ErrorCode::as_str),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Request failed: {}",
                    err
                );
                return Err(err);
            }
        };

        tracing::debug!(
            method = %echo.method,
            url = %echo.url,
            status = head.status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Response"
        );

        let status = head.status;
        let response = HttpResponse {
            data,
            status,
            status_text: head.status_text,
            headers: normalize_headers(head.headers),
            config: config.clone(),
            request: echo.clone(),
        };

        if !config.accepts_status(status) {
            tracing::warn!(url = %echo.url, status, "Rejected by status validation");
            return Err(classify(
                DispatchFailure::Rejected(Box::new(response)),
                &config,
                &echo,
                false,
            ));
        }

        Ok(response)
    }
}

#[async_trait]
impl HttpInstance for HttpEngine {
    fn defaults(&self) -> &EngineDefaults {
        &self.defaults
    }

    fn interceptors(&self) -> &Interceptors {
        &self.interceptors
    }

    async fn request(&self, config: RequestConfig) -> Result<HttpResponse> {
        let config = self.defaults.to_config().merged_with(&config);
        let request_stage = self.interceptors.request.get_all();
        let response_stage = self.interceptors.response.get_all();

        let state = match run_stage(&request_stage, Ok(config)).await {
            Ok(config) => self.dispatch(config).await,
            Err(err) => Err(err),
        };
        run_stage(&response_stage, state).await
    }

    fn get_uri(&self, config: &RequestConfig) -> String {
        self.resolve_url(&self.defaults.to_config().merged_with(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::http::mock::MockTransport;
    use crate::http::url::Params;
    use crate::network::FnInterceptor;
    use serde_json::json;
    use tokio_util::sync::CancellationToken;

    fn engine(transport: Arc<MockTransport>) -> HttpEngine {
        HttpEngine::new(EngineDefaults::new("https://api.example.com"), transport)
    }

    #[tokio::test]
    async fn test_post_serializes_json_body() {
        let transport = Arc::new(MockTransport::json(201, r#"{"id":1}"#));
        let engine = engine(transport.clone());

        let response = engine
            .post("/users", Some(json!({"name": "a"}).into()), RequestConfig::default())
            .await
            .unwrap();
        assert_eq!(response.status, 201);
        assert_eq!(response.data.as_json().unwrap()["id"], 1);

        let sent = transport.last().unwrap();
        assert_eq!(sent.url, "https://api.example.com/users");
        assert_eq!(sent.method, Method::POST);
        assert_eq!(sent.body.as_ref().and_then(|b| b.as_text()), Some(r#"{"name":"a"}"#));
        assert_eq!(sent.headers.get("content-type"), Some("application/json"));
        assert_eq!(sent.credentials, CredentialsMode::Include);
    }

    #[tokio::test]
    async fn test_get_never_sends_body() {
        let transport = Arc::new(MockTransport::json(200, "{}"));
        let engine = engine(transport.clone());

        engine
            .get("/users", RequestConfig::default().data(json!({"x": 1})))
            .await
            .unwrap();
        assert!(transport.last().unwrap().body.is_none());
    }

    #[tokio::test]
    async fn test_timeout_is_conn_aborted() {
        let transport = Arc::new(MockTransport::json(200, "{}").delayed(Duration::from_secs(5)));
        let engine = engine(transport);

        let err = engine
            .get("/slow", RequestConfig::default().timeout(Duration::from_millis(20)))
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "timeout of 20ms exceeded");
    }

    #[tokio::test]
    async fn test_caller_signal_is_canceled() {
        let transport = Arc::new(MockTransport::json(200, "{}").delayed(Duration::from_secs(5)));
        let engine = engine(transport);
        let signal = CancellationToken::new();
        let trigger = signal.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });
        let err = engine
            .get("/slow", RequestConfig::default().signal(signal))
            .await
            .unwrap_err();
        assert!(err.is_canceled());
    }

    #[tokio::test]
    async fn test_zero_timeout_disables_timer() {
        let transport = Arc::new(MockTransport::json(200, "{}").delayed(Duration::from_millis(30)));
        let engine = engine(transport);

        let response = engine
            .get("/slow", RequestConfig::default().timeout(Duration::ZERO))
            .await
            .unwrap();
        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn test_status_validation_yields_bad_response() {
        let transport = Arc::new(MockTransport::json(404, r#"{"error":"missing"}"#));
        let strict = engine(transport);

        let err = strict.get("/users/9", RequestConfig::default()).await.unwrap_err();
        assert_eq!(err.code(), Some(&ErrorCode::BadResponse));
        assert_eq!(err.status_code(), Some(404));
        assert_eq!(err.to_string(), "Request failed with status code 404");

        let lenient = engine(Arc::new(MockTransport::json(404, "{}")));
        let response = lenient
            .get("/users/9", RequestConfig::default().validate_status(|s| s < 500))
            .await
            .unwrap();
        assert_eq!(response.status, 404);
    }

    #[tokio::test]
    async fn test_transport_failure_is_network_error() {
        let engine = engine(Arc::new(MockTransport::failing("connection reset")));

        let err = engine.get("/users", RequestConfig::default()).await.unwrap_err();
        assert!(err.is_network());
        assert_eq!(err.to_string(), "connection reset");
        assert_eq!(err.url(), Some("https://api.example.com/users"));
    }

    #[tokio::test]
    async fn test_interceptors_wrap_dispatch() {
        let transport = Arc::new(MockTransport::json(200, r#"{"ok":true}"#));
        let engine = engine(transport.clone());

        let first = engine.interceptors().request.use_interceptor(
            FnInterceptor::new().fulfilled(|c: RequestConfig| async move { Ok(c.header("x-first", "1")) }),
        );
        engine.interceptors().request.use_interceptor(FnInterceptor::new().fulfilled(
            |c: RequestConfig| async move {
                assert_eq!(c.method_name(), "get");
                Ok(c.header("x-second", "2"))
            },
        ));
        engine.interceptors().request.eject(first);

        engine.interceptors().response.use_interceptor(FnInterceptor::new().fulfilled(
            |mut r: HttpResponse| async move {
                r.status_text = "intercepted".to_string();
                Ok(r)
            },
        ));

        let response = engine.get("/users", RequestConfig::default()).await.unwrap();
        assert_eq!(response.status_text, "intercepted");

        let sent = transport.last().unwrap();
        assert!(!sent.headers.contains("x-first"));
        assert_eq!(sent.headers.get("X-Second"), Some("2"));
    }

    #[tokio::test]
    async fn test_request_stage_rejection_skips_transport() {
        let transport = Arc::new(MockTransport::json(200, "{}"));
        let engine = engine(transport.clone());

        engine.interceptors().request.use_interceptor(
            FnInterceptor::new().fulfilled(|_: RequestConfig| async { Err(Error::other("denied")) }),
        );
        engine.interceptors().response.use_interceptor(
            FnInterceptor::new().rejected(|e: Error| async move { Err(Error::other(format!("seen: {}", e))) }),
        );

        let err = engine.get("/users", RequestConfig::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "seen: denied");
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_response_stage_can_recover_bad_status() {
        let transport = Arc::new(MockTransport::json(500, "{}"));
        let engine = engine(transport);

        engine.interceptors().response.use_interceptor(FnInterceptor::new().rejected(
            |e: Error| async move {
                let status = e.status_code().unwrap_or_default();
                match e {
                    Error::Http(http) if status == 500 => http
                        .response
                        .ok_or_else(|| Error::other("no response")),
                    other => Err(other),
                }
            },
        ));

        let response = engine.get("/flaky", RequestConfig::default()).await.unwrap();
        assert_eq!(response.status, 500);
    }

    #[test]
    fn test_get_uri_matches_dispatch_url() {
        let engine = engine(Arc::new(MockTransport::json(200, "{}")));
        let config = RequestConfig::get("/search?lang=en").params(Params::new().set("q", "rust"));
        assert_eq!(
            engine.get_uri(&config),
            "https://api.example.com/search?lang=en&q=rust"
        );

        let absolute = RequestConfig::get("https://cdn.example.com/a.png");
        assert_eq!(engine.get_uri(&absolute), "https://cdn.example.com/a.png");
    }

    #[tokio::test]
    async fn test_config_wins_over_defaults() {
        let transport = Arc::new(MockTransport::json(200, "{}"));
        let engine = engine(transport.clone());

        let response = engine
            .get(
                "/users",
                RequestConfig::default()
                    .base_url("https://other.example.com/v2/")
                    .header("Content-Type", "text/plain")
                    .with_credentials(false),
            )
            .await
            .unwrap();

        let sent = transport.last().unwrap();
        assert_eq!(sent.url, "https://other.example.com/v2/users");
        assert_eq!(sent.headers.get("content-type"), Some("text/plain"));
        assert_eq!(sent.credentials, CredentialsMode::SameOrigin);
        assert_eq!(response.config.timeout, Some(DEFAULT_TIMEOUT));
    }
}
