// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Default interceptors: debug logging and caller callbacks

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use super::interceptor::{
    FnInterceptor, FulfilledFn, Interceptor, InterceptorHandle, Interceptors, RejectedFn,
};
use crate::error::{Error, Result};
use crate::http::{HttpResponse, RequestConfig};

/// Logging pair registered on both stages when no custom setup is supplied.
///
/// With `debug` off it is a pure passthrough.
#[derive(Debug, Clone, Copy)]
pub struct DebugLogger {
    pub debug: bool,
    /// Execution context tag, `client` or `server`
    pub context: &'static str,
}

impl DebugLogger {
    pub fn new(debug: bool, context: &'static str) -> Self {
        Self { debug, context }
    }

    /// Register the request and response pairs
    pub fn register(self, interceptors: &Interceptors) -> (InterceptorHandle, InterceptorHandle) {
        (
            interceptors.request.use_interceptor(self),
            interceptors.response.use_interceptor(self),
        )
    }
}

#[async_trait]
impl Interceptor<RequestConfig> for DebugLogger {
    async fn on_fulfilled(&self, config: RequestConfig) -> Result<RequestConfig> {
        if self.debug {
            let headers: Vec<String> = config
                .headers
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect();
            tracing::info!(
                context = self.context,
                method = %config.method_name(),
                url = %config.url,
                headers = ?headers,
                with_credentials = ?config.with_credentials,
                "Request"
            );
        }
        Ok(config)
    }
}

#[async_trait]
impl Interceptor<HttpResponse> for DebugLogger {
    async fn on_rejected(&self, error: Error) -> Result<HttpResponse> {
        if self.debug {
            match error.as_http().and_then(|e| e.response.as_ref()) {
                Some(response) => tracing::error!(
                    context = self.context,
                    status = response.status,
                    body = %response.text_lossy(),
                    "Response error"
                ),
                None => tracing::error!(context = self.context, error = %error, "Response error"),
            }
        }
        Err(error)
    }
}

/// Additive callbacks layered after the default interceptors
#[derive(Clone, Default)]
pub struct InterceptorCallbacks {
    pub on_request: Option<FulfilledFn<RequestConfig>>,
    pub on_request_error: Option<RejectedFn<RequestConfig>>,
    pub on_response: Option<FulfilledFn<HttpResponse>>,
    pub on_response_error: Option<RejectedFn<HttpResponse>>,
}

impl fmt::Debug for InterceptorCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptorCallbacks")
            .field("on_request", &self.on_request.is_some())
            .field("on_request_error", &self.on_request_error.is_some())
            .field("on_response", &self.on_response.is_some())
            .field("on_response_error", &self.on_response_error.is_some())
            .finish()
    }
}

impl InterceptorCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request-stage success callback
    pub fn on_request<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(RequestConfig) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<RequestConfig>> + Send + 'static,
    {
        self.on_request = Some(Arc::new(move |c| -> BoxFuture<'static, Result<RequestConfig>> {
            Box::pin(f(c))
        }));
        self
    }

    /// Set the request-stage error callback
    pub fn on_request_error<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Error) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<RequestConfig>> + Send + 'static,
    {
        self.on_request_error = Some(Arc::new(
            move |e| -> BoxFuture<'static, Result<RequestConfig>> { Box::pin(f(e)) },
        ));
        self
    }

    /// Set the response-stage success callback
    pub fn on_response<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(HttpResponse) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        self.on_response = Some(Arc::new(move |r| -> BoxFuture<'static, Result<HttpResponse>> {
            Box::pin(f(r))
        }));
        self
    }

    /// Set the response-stage error callback
    pub fn on_response_error<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Error) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        self.on_response_error = Some(Arc::new(
            move |e| -> BoxFuture<'static, Result<HttpResponse>> { Box::pin(f(e)) },
        ));
        self
    }

    /// Register a pair per stage, only where at least one side is set
    pub fn register(&self, interceptors: &Interceptors) {
        if self.on_request.is_some() || self.on_request_error.is_some() {
            interceptors.request.use_interceptor(
                FnInterceptor::new()
                    .with_fulfilled_fn(self.on_request.clone())
                    .with_rejected_fn(self.on_request_error.clone()),
            );
        }
        if self.on_response.is_some() || self.on_response_error.is_some() {
            interceptors.response.use_interceptor(
                FnInterceptor::new()
                    .with_fulfilled_fn(self.on_response.clone())
                    .with_rejected_fn(self.on_response_error.clone()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::run_stage;

    #[tokio::test]
    async fn test_logger_passes_values_through() {
        let interceptors = Interceptors::new();
        DebugLogger::new(true, "client").register(&interceptors);

        let config = run_stage(&interceptors.request.get_all(), Ok(RequestConfig::get("/users")))
            .await
            .unwrap();
        assert_eq!(config.url, "/users");

        let err = run_stage(&interceptors.response.get_all(), Err(Error::other("boom"))).await;
        assert_eq!(err.unwrap_err().to_string(), "boom");
    }

    #[test]
    fn test_callbacks_register_only_populated_stages() {
        let interceptors = Interceptors::new();
        InterceptorCallbacks::new()
            .on_request(|c: RequestConfig| async move { Ok(c) })
            .register(&interceptors);

        assert_eq!(interceptors.request.len(), 1);
        assert!(interceptors.response.is_empty());

        InterceptorCallbacks::new().register(&interceptors);
        assert_eq!(interceptors.request.len(), 1);
    }

    #[tokio::test]
    async fn test_request_callbacks_form_one_pair() {
        let interceptors = Interceptors::new();
        InterceptorCallbacks::new()
            .on_request_error(|e: Error| async move { Err(e) })
            .on_request(|c: RequestConfig| async move { Ok(c.header("x-extra", "1")) })
            .register(&interceptors);

        let config = run_stage(&interceptors.request.get_all(), Ok(RequestConfig::get("/")))
            .await
            .unwrap();
        assert_eq!(config.headers.get("X-Extra"), Some("1"));
    }
}
