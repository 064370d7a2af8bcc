// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Deferred request builders
//!
//! An [`ApiRequest`] describes one pending request. Nothing is sent until it
//! is awaited (or [`ApiRequest::execute`] is called), and every await
//! dispatches again: the builder is a descriptor, not a cached result. Use
//! [`ApiRequest::memoize`] when several consumers must share one dispatch.

use std::future::IntoFuture;
use std::ops::Deref;
use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::Method;
use tokio::sync::OnceCell;

use super::context::{ExecutionContext, ServerCookieConfig};
use crate::error::{Error, Result};
use crate::http::headers::COOKIE;
use crate::http::{CacheDirective, FetchCache, HttpInstance, HttpResponse, RequestConfig, Revalidate};

/// Per-request configuration accepted by the builders
#[derive(Debug, Clone, Default)]
pub struct ApiRequestConfig {
    /// Engine-level settings (headers, params, timeout, cache, ...)
    pub request: RequestConfig,
    use_server_cookies: bool,
}

impl ApiRequestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether cookies are forwarded from the server context's store
    pub fn uses_server_cookies(&self) -> bool {
        self.use_server_cookies
    }
}

impl From<RequestConfig> for ApiRequestConfig {
    fn from(request: RequestConfig) -> Self {
        Self {
            request,
            use_server_cookies: false,
        }
    }
}

/// One pending request
#[derive(Clone)]
pub struct ApiRequest {
    url: String,
    method: Method,
    config: ApiRequestConfig,
    http: Arc<dyn HttpInstance>,
    server_cookies: Option<Arc<ServerCookieConfig>>,
    context: ExecutionContext,
}

impl ApiRequest {
    /// Describe a request in a client context
    pub fn new(
        http: Arc<dyn HttpInstance>,
        method: Method,
        url: impl Into<String>,
        config: impl Into<ApiRequestConfig>,
    ) -> Self {
        Self {
            url: url.into(),
            method,
            config: config.into(),
            http,
            server_cookies: None,
            context: ExecutionContext::Client,
        }
    }

    /// Set the cookie names checked during server-side forwarding
    pub fn server_cookies(mut self, config: Option<Arc<ServerCookieConfig>>) -> Self {
        self.server_cookies = config;
        self
    }

    /// Set the execution context
    pub fn context(mut self, context: ExecutionContext) -> Self {
        self.context = context;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn config(&self) -> &ApiRequestConfig {
        &self.config
    }

    /// Engine this request dispatches through
    pub fn http_instance(&self) -> &Arc<dyn HttpInstance> {
        &self.http
    }

    fn map_config(&self, f: impl FnOnce(&mut ApiRequestConfig)) -> Self {
        let mut next = self.clone();
        f(&mut next.config);
        next
    }

    /// Send cookies with this request.
    ///
    /// In a client context this turns on `with_credentials`; in a server
    /// context the cookies of the incoming request are forwarded as a
    /// `Cookie` header at execution time.
    pub fn with_cookie(&self) -> Self {
        let server = self.context.is_server();
        self.map_config(|config| {
            if server {
                config.use_server_cookies = true;
            } else {
                config.request.with_credentials = Some(true);
            }
        })
    }

    /// Final config handed to the engine
    fn request_config(&self) -> RequestConfig {
        self.config
            .request
            .clone()
            .method(self.method.clone())
            .url(self.url.clone())
    }

    /// Dispatch once.
    ///
    /// With server cookie forwarding on and none of the configured session
    /// cookies present, the redirect hook fires and `Error::Redirect` comes
    /// back without reaching the transport.
    pub async fn execute(&self) -> Result<HttpResponse> {
        let mut config = self.request_config();

        if self.config.use_server_cookies {
            if let Some(store) = self.context.cookie_store() {
                if let Some(server) = &self.server_cookies {
                    let mut has_session = false;
                    for name in &server.cookie_names {
                        if store.get(name).await.is_some() {
                            has_session = true;
                            break;
                        }
                    }
                    if let (false, Some(path)) = (has_session, &server.redirect_path) {
                        if let Some(redirector) = self.context.redirector() {
                            redirector.redirect(path);
                        }
                        tracing::info!(url = %self.url, location = %path, "No session cookie, redirecting");
                        return Err(Error::redirect(path.clone()));
                    }
                }

                let cookie_header = store.header_value().await;
                if !cookie_header.is_empty() {
                    config.headers.insert(COOKIE, cookie_header);
                }
            }

            // Cookie-bearing reads are dynamic; this wins over ISR/SSG hints
            if self.method == Method::GET {
                let tags = config.cache.take().map(|c| c.tags).unwrap_or_default();
                config.cache = Some(CacheDirective {
                    tags,
                    ..CacheDirective::always_revalidate()
                });
            }
        }

        self.http.request(config).await
    }

    /// Wrap into a request that dispatches at most once
    pub fn memoize(self) -> MemoizedRequest {
        MemoizedRequest {
            request: self,
            result: OnceCell::new(),
        }
    }
}

impl IntoFuture for ApiRequest {
    type Output = Result<HttpResponse>;
    type IntoFuture = BoxFuture<'static, Result<HttpResponse>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move { self.execute().await })
    }
}

impl<'a> IntoFuture for &'a ApiRequest {
    type Output = Result<HttpResponse>;
    type IntoFuture = BoxFuture<'a, Result<HttpResponse>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.execute())
    }
}

/// Request whose first execution is shared by every caller
pub struct MemoizedRequest {
    request: ApiRequest,
    result: OnceCell<Result<HttpResponse>>,
}

impl MemoizedRequest {
    /// Dispatch on first call, then hand out the stored outcome
    pub async fn get(&self) -> &Result<HttpResponse> {
        self.result.get_or_init(|| self.request.execute()).await
    }

    /// Check if the request has completed
    pub fn is_done(&self) -> bool {
        self.result.initialized()
    }

    /// Take the outcome, if completed
    pub fn into_result(self) -> Option<Result<HttpResponse>> {
        self.result.into_inner()
    }
}

/// GET request with cache directive helpers
#[derive(Clone)]
pub struct GetApiRequest {
    inner: ApiRequest,
}

impl GetApiRequest {
    pub fn new(inner: ApiRequest) -> Self {
        Self { inner }
    }

    /// Plain builder
    pub fn into_inner(self) -> ApiRequest {
        self.inner
    }

    fn map_cache(&self, f: impl FnOnce(&mut CacheDirective)) -> Self {
        Self {
            inner: self.inner.map_config(|config| {
                let mut cache = config.request.cache.take().unwrap_or_default();
                f(&mut cache);
                config.request.cache = Some(cache);
            }),
        }
    }

    /// See [`ApiRequest::with_cookie`]
    pub fn with_cookie(&self) -> Self {
        Self {
            inner: self.inner.with_cookie(),
        }
    }

    /// Allow reusing the result for up to `seconds`.
    ///
    /// Fails before anything is sent unless `seconds` is finite and not
    /// negative.
    pub fn with_isr(&self, seconds: f64) -> Result<Self> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(Error::invalid_argument(format!(
                "revalidate must be a finite number >= 0, got {}",
                seconds
            )));
        }
        Ok(self.map_cache(|cache| {
            cache.mode = None;
            cache.revalidate = Some(Revalidate::After(seconds));
        }))
    }

    /// Allow reusing the result indefinitely
    pub fn with_ssg(&self) -> Self {
        self.map_cache(|cache| {
            cache.mode = Some(FetchCache::ForceCache);
            cache.revalidate = Some(Revalidate::Never);
        })
    }

    /// Attach cache tags
    pub fn with_tags<I, S>(&self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags: Vec<String> = tags.into_iter().map(Into::into).collect();
        self.map_cache(|cache| cache.tags = tags)
    }
}

impl Deref for GetApiRequest {
    type Target = ApiRequest;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl From<GetApiRequest> for ApiRequest {
    fn from(request: GetApiRequest) -> Self {
        request.inner
    }
}

impl IntoFuture for GetApiRequest {
    type Output = Result<HttpResponse>;
    type IntoFuture = BoxFuture<'static, Result<HttpResponse>>;

    fn into_future(self) -> Self::IntoFuture {
        self.inner.into_future()
    }
}

impl<'a> IntoFuture for &'a GetApiRequest {
    type Output = Result<HttpResponse>;
    type IntoFuture = BoxFuture<'a, Result<HttpResponse>>;

    fn into_future(self) -> Self::IntoFuture {
        (&self.inner).into_future()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::mock::MockTransport;
    use crate::http::{EngineDefaults, HttpEngine, RequestCookies};
    use parking_lot::Mutex;

    fn setup() -> (Arc<MockTransport>, Arc<dyn HttpInstance>) {
        let transport = Arc::new(MockTransport::json(200, r#"{"id":5}"#));
        let engine = HttpEngine::new(EngineDefaults::new("https://api.example.com"), transport.clone());
        (transport, Arc::new(engine))
    }

    fn get(http: &Arc<dyn HttpInstance>, url: &str) -> GetApiRequest {
        GetApiRequest::new(ApiRequest::new(http.clone(), Method::GET, url, RequestConfig::default()))
    }

    #[test]
    fn test_with_isr_rejects_invalid_seconds() {
        let (transport, http) = setup();
        let request = get(&http, "/users/5");

        assert!(matches!(request.with_isr(-1.0), Err(Error::InvalidArgument(_))));
        assert!(request.with_isr(f64::NAN).is_err());
        assert!(request.with_isr(f64::INFINITY).is_err());
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_with_isr_sets_revalidation_window() {
        let (transport, http) = setup();
        get(&http, "/users/5").with_isr(60.0).unwrap().await.unwrap();

        let cache = transport.last().unwrap().cache.unwrap();
        assert_eq!(cache.revalidate, Some(Revalidate::After(60.0)));
        assert_eq!(cache.cache_control().as_deref(), Some("max-age=60"));
    }

    #[tokio::test]
    async fn test_ssg_differs_only_in_cache() {
        let (transport, http) = setup();

        get(&http, "/users").await.unwrap();
        let plain = transport.last().unwrap();
        get(&http, "/users").with_ssg().await.unwrap();
        let ssg = transport.last().unwrap();

        assert_eq!(plain.url, ssg.url);
        assert_eq!(plain.method, ssg.method);
        assert_eq!(plain.headers, ssg.headers);
        assert!(plain.cache.is_none());
        assert_eq!(ssg.cache, Some(CacheDirective::static_generation()));
    }

    #[tokio::test]
    async fn test_ssg_clears_revalidation_window_and_keeps_tags() {
        let (transport, http) = setup();
        get(&http, "/users")
            .with_tags(["users"])
            .with_isr(30.0)
            .unwrap()
            .with_ssg()
            .await
            .unwrap();

        let cache = transport.last().unwrap().cache.unwrap();
        assert_eq!(cache.revalidate, Some(Revalidate::Never));
        assert_eq!(cache.tags, vec!["users".to_string()]);
    }

    #[tokio::test]
    async fn test_each_await_dispatches_again() {
        let (transport, http) = setup();
        let request = get(&http, "/users/5");

        (&request).await.unwrap();
        (&request).await.unwrap();
        request.execute().await.unwrap();
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_memoized_request_dispatches_once() {
        let (transport, http) = setup();
        let request = get(&http, "/users/5").into_inner().memoize();

        let (a, b) = tokio::join!(request.get(), request.get());
        assert_eq!(a.as_ref().unwrap().status, 200);
        assert_eq!(b.as_ref().unwrap().status, 200);
        assert!(request.is_done());
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_client_with_cookie_sets_credentials() {
        let (transport, http) = setup();
        let request = ApiRequest::new(
            http,
            Method::DELETE,
            "/session",
            RequestConfig::default().with_credentials(false),
        );

        let cookied = request.with_cookie();
        assert_eq!(cookied.config().request.with_credentials, Some(true));
        assert!(!cookied.config().uses_server_cookies());
        assert_eq!(request.config().request.with_credentials, Some(false));

        cookied.await.unwrap();
        assert_eq!(transport.last().unwrap().method, Method::DELETE);
    }

    #[tokio::test]
    async fn test_server_redirect_when_session_cookie_missing() {
        let (transport, http) = setup();
        let redirected = Arc::new(Mutex::new(None));
        let sink = redirected.clone();
        let context = ExecutionContext::server(RequestCookies::new())
            .with_redirector(move |path: &str| *sink.lock() = Some(path.to_string()));
        let cookies = ServerCookieConfig::new(["session"]).redirect_path("/login");

        let request = GetApiRequest::new(
            ApiRequest::new(http, Method::GET, "/users/5", RequestConfig::default())
                .server_cookies(Some(Arc::new(cookies)))
                .context(context),
        )
        .with_cookie();

        let err = request.await.unwrap_err();
        assert!(err.is_redirect());
        assert_eq!(err.url(), Some("/login"));
        assert_eq!(redirected.lock().as_deref(), Some("/login"));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_server_forwards_cookies_and_forces_revalidation() {
        let (transport, http) = setup();
        let context = ExecutionContext::server(RequestCookies::parse("session=abc; theme=dark"));
        let cookies = ServerCookieConfig::new(["session"]).redirect_path("/login");

        GetApiRequest::new(
            ApiRequest::new(http, Method::GET, "/me", RequestConfig::default())
                .server_cookies(Some(Arc::new(cookies)))
                .context(context),
        )
        .with_isr(120.0)
        .unwrap()
        .with_cookie()
        .await
        .unwrap();

        let sent = transport.last().unwrap();
        assert_eq!(sent.headers.get("Cookie"), Some("session=abc; theme=dark"));
        assert_eq!(sent.cache, Some(CacheDirective::always_revalidate()));
    }

    #[tokio::test]
    async fn test_forced_revalidation_keeps_cache_tags() {
        let (transport, http) = setup();
        let context = ExecutionContext::server(RequestCookies::parse("session=abc"));

        GetApiRequest::new(
            ApiRequest::new(http, Method::GET, "/feed", RequestConfig::default())
                .server_cookies(Some(Arc::new(ServerCookieConfig::new(["session"]))))
                .context(context),
        )
        .with_tags(["feed", "user:abc"])
        .with_isr(300.0)
        .unwrap()
        .with_cookie()
        .await
        .unwrap();

        let cache = transport.last().unwrap().cache.unwrap();
        assert_eq!(cache.mode, Some(FetchCache::NoStore));
        assert_eq!(cache.revalidate, Some(Revalidate::After(0.0)));
        assert_eq!(cache.tags, vec!["feed".to_string(), "user:abc".to_string()]);
    }

    #[tokio::test]
    async fn test_server_without_cookie_config_just_forwards() {
        let (transport, http) = setup();
        let request = ApiRequest::new(http, Method::POST, "/events", RequestConfig::default())
            .context(ExecutionContext::server(RequestCookies::new()))
            .with_cookie();

        assert!(request.config().uses_server_cookies());
        request.await.unwrap();

        let sent = transport.last().unwrap();
        assert!(!sent.headers.contains("cookie"));
        assert!(sent.cache.is_none());
    }
}
