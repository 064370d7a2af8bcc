// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Client factory

use std::sync::Arc;

use reqwest::Method;

use super::config::ApiClientConfig;
use super::context::{ExecutionContext, ServerCookieConfig};
use super::request::{ApiRequest, ApiRequestConfig, GetApiRequest};
use crate::error::{Error, Result};
use crate::http::headers::CONTENT_TYPE;
use crate::http::{
    normalize_headers, EngineDefaults, Headers, HttpEngine, HttpInstance, RequestBody,
    TransportConfig,
};
use crate::network::DebugLogger;

/// Build an engine from `config` and register its interceptors.
///
/// Default headers start from `Content-Type: application/json`, overlaid by
/// the caller's. A `setup_interceptors` hook replaces the default logging
/// pair; the additive callbacks are always registered last.
pub fn create_http_instance(config: &ApiClientConfig) -> Result<Arc<HttpEngine>> {
    if config.base_url.is_empty() {
        return Err(Error::Config("base_url is required".to_string()));
    }

    let mut headers = Headers::new();
    headers.insert(CONTENT_TYPE, "application/json");
    headers.extend(&normalize_headers(config.headers.clone()));

    let defaults = EngineDefaults {
        base_url: Some(config.base_url.clone()),
        timeout: config.timeout,
        headers,
        with_credentials: config.with_credentials,
    };

    let engine = match &config.transport {
        Some(transport) => HttpEngine::new(defaults, Arc::clone(transport)),
        None => HttpEngine::with_reqwest(defaults, TransportConfig::default())?,
    };

    match &config.setup_interceptors {
        Some(setup) => setup(&engine as &dyn HttpInstance),
        None => {
            DebugLogger::new(config.debug, config.context.label()).register(engine.interceptors());
        }
    }
    config.interceptors.register(engine.interceptors());

    tracing::debug!(
        base_url = %config.base_url,
        context = config.context.label(),
        "HTTP instance created"
    );
    Ok(Arc::new(engine))
}

/// Verb-keyed facade handing out request builders
#[derive(Clone)]
pub struct ApiClient {
    http: Arc<dyn HttpInstance>,
    server_cookies: Option<Arc<ServerCookieConfig>>,
    context: ExecutionContext,
}

impl ApiClient {
    /// Create a client and its engine
    pub fn new(config: ApiClientConfig) -> Result<Self> {
        let http: Arc<dyn HttpInstance> = create_http_instance(&config)?;
        Ok(Self::from_instance(http, config))
    }

    /// Wrap an existing engine; interceptor settings in `config` are ignored
    pub fn from_instance(http: Arc<dyn HttpInstance>, config: ApiClientConfig) -> Self {
        Self {
            http,
            server_cookies: config.server_cookie_config.map(Arc::new),
            context: config.context,
        }
    }

    fn build(&self, method: Method, url: &str, config: ApiRequestConfig) -> ApiRequest {
        ApiRequest::new(Arc::clone(&self.http), method, url, config)
            .server_cookies(self.server_cookies.clone())
            .context(self.context.clone())
    }

    fn build_with_data(
        &self,
        method: Method,
        url: &str,
        data: RequestBody,
        config: impl Into<ApiRequestConfig>,
    ) -> ApiRequest {
        let mut config = config.into();
        config.request.data = Some(data);
        self.build(method, url, config)
    }

    /// GET with cache directive helpers
    pub fn get(&self, url: &str, config: impl Into<ApiRequestConfig>) -> GetApiRequest {
        GetApiRequest::new(self.build(Method::GET, url, config.into()))
    }

    /// POST `data`; pass `None` to send no body
    pub fn post(
        &self,
        url: &str,
        data: impl Into<RequestBody>,
        config: impl Into<ApiRequestConfig>,
    ) -> ApiRequest {
        self.build_with_data(Method::POST, url, data.into(), config)
    }

    pub fn put(
        &self,
        url: &str,
        data: impl Into<RequestBody>,
        config: impl Into<ApiRequestConfig>,
    ) -> ApiRequest {
        self.build_with_data(Method::PUT, url, data.into(), config)
    }

    pub fn patch(
        &self,
        url: &str,
        data: impl Into<RequestBody>,
        config: impl Into<ApiRequestConfig>,
    ) -> ApiRequest {
        self.build_with_data(Method::PATCH, url, data.into(), config)
    }

    pub fn delete(&self, url: &str, config: impl Into<ApiRequestConfig>) -> ApiRequest {
        self.build(Method::DELETE, url, config.into())
    }

    /// Shared engine
    pub fn http_instance(&self) -> &Arc<dyn HttpInstance> {
        &self.http
    }
}

/// Create an API client
pub fn create_api_client(config: ApiClientConfig) -> Result<ApiClient> {
    ApiClient::new(config)
}
