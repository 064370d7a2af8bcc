// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request configuration types

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::body::RequestBody;
use super::header::{normalize_headers, HeaderInput, Headers};
use super::response::ResponseType;
use super::url::{Params, ParamsSerializer};
use crate::error::{Error, Result};

/// Status predicate deciding which responses count as success
pub type StatusValidator = Arc<dyn Fn(u16) -> bool + Send + Sync>;

/// Default status check: 2xx
pub fn default_validate_status(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Parse a method name case-insensitively.
///
/// Only the verbs the engine dispatches are accepted.
pub fn parse_method(name: &str) -> Result<Method> {
    match name.to_ascii_uppercase().as_str() {
        "GET" => Ok(Method::GET),
        "POST" => Ok(Method::POST),
        "PUT" => Ok(Method::PUT),
        "PATCH" => Ok(Method::PATCH),
        "DELETE" => Ok(Method::DELETE),
        "HEAD" => Ok(Method::HEAD),
        "OPTIONS" => Ok(Method::OPTIONS),
        other => Err(Error::invalid_argument(format!("unsupported method '{}'", other))),
    }
}

/// Credentials mode for requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialsMode {
    /// Send credentials only to same-origin requests
    #[default]
    SameOrigin,
    /// Always send credentials
    Include,
    /// Never send credentials
    Omit,
}

impl CredentialsMode {
    /// Policy derived from the `with_credentials` flag
    pub fn from_with_credentials(with_credentials: bool) -> Self {
        if with_credentials {
            CredentialsMode::Include
        } else {
            CredentialsMode::SameOrigin
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialsMode::SameOrigin => "same-origin",
            CredentialsMode::Include => "include",
            CredentialsMode::Omit => "omit",
        }
    }
}

/// Fetch cache mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchCache {
    Default,
    NoStore,
    Reload,
    NoCache,
    ForceCache,
    OnlyIfCached,
}

impl FetchCache {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchCache::Default => "default",
            FetchCache::NoStore => "no-store",
            FetchCache::Reload => "reload",
            FetchCache::NoCache => "no-cache",
            FetchCache::ForceCache => "force-cache",
            FetchCache::OnlyIfCached => "only-if-cached",
        }
    }
}

impl FromStr for FetchCache {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "default" => Ok(FetchCache::Default),
            "no-store" => Ok(FetchCache::NoStore),
            "reload" => Ok(FetchCache::Reload),
            "no-cache" => Ok(FetchCache::NoCache),
            "force-cache" => Ok(FetchCache::ForceCache),
            "only-if-cached" => Ok(FetchCache::OnlyIfCached),
            other => Err(Error::invalid_argument(format!("unknown cache mode '{}'", other))),
        }
    }
}

/// Revalidation window of a cached result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Revalidate {
    /// Reusable for up to this many seconds
    After(f64),
    /// Reusable indefinitely
    Never,
}

/// Cache hint attached to a read request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheDirective {
    pub mode: Option<FetchCache>,
    pub revalidate: Option<Revalidate>,
    pub tags: Vec<String>,
}

impl CacheDirective {
    /// Reuse for up to `seconds`
    pub fn revalidate_after(seconds: f64) -> Self {
        Self {
            mode: None,
            revalidate: Some(Revalidate::After(seconds)),
            tags: Vec::new(),
        }
    }

    /// Reuse indefinitely
    pub fn static_generation() -> Self {
        Self {
            mode: Some(FetchCache::ForceCache),
            revalidate: Some(Revalidate::Never),
            tags: Vec::new(),
        }
    }

    /// Never reuse; always go to the origin
    pub fn always_revalidate() -> Self {
        Self {
            mode: Some(FetchCache::NoStore),
            revalidate: Some(Revalidate::After(0.0)),
            tags: Vec::new(),
        }
    }

    /// Check if this directive allows reusing a stored result
    pub fn allows_reuse(&self) -> bool {
        match (self.mode, self.revalidate) {
            (Some(FetchCache::NoStore | FetchCache::NoCache | FetchCache::Reload), _) => false,
            (_, Some(Revalidate::After(secs))) => secs > 0.0,
            (_, Some(Revalidate::Never)) => true,
            (Some(FetchCache::ForceCache | FetchCache::OnlyIfCached), None) => true,
            _ => false,
        }
    }

    /// Request `Cache-Control` value expressing this directive
    pub fn cache_control(&self) -> Option<String> {
        match (self.mode, self.revalidate) {
            (Some(FetchCache::NoStore), _) => Some("no-store".to_string()),
            (Some(FetchCache::NoCache | FetchCache::Reload), _) => Some("no-cache".to_string()),
            (Some(FetchCache::OnlyIfCached), _) => Some("only-if-cached".to_string()),
            (_, Some(Revalidate::After(secs))) if secs <= 0.0 => Some("no-cache".to_string()),
            (_, Some(Revalidate::After(secs))) => Some(format!("max-age={}", secs.floor() as u64)),
            (Some(FetchCache::ForceCache), _) => Some("max-stale".to_string()),
            (_, Some(Revalidate::Never)) => Some("max-stale".to_string()),
            _ => None,
        }
    }
}

/// Configuration of a single request.
///
/// `Option` fields left unset inherit the engine defaults at dispatch.
#[derive(Clone)]
pub struct RequestConfig {
    pub method: Method,
    pub url: String,
    pub base_url: Option<String>,
    pub headers: Headers,
    pub params: Option<Params>,
    pub params_serializer: Option<Arc<dyn ParamsSerializer>>,
    pub data: Option<RequestBody>,
    pub timeout: Option<Duration>,
    pub with_credentials: Option<bool>,
    pub response_type: Option<ResponseType>,
    pub validate_status: Option<StatusValidator>,
    pub signal: Option<CancellationToken>,
    pub cache: Option<CacheDirective>,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            method: Method::GET,
            url: String::new(),
            base_url: None,
            headers: Headers::new(),
            params: None,
            params_serializer: None,
            data: None,
            timeout: None,
            with_credentials: None,
            response_type: None,
            validate_status: None,
            signal: None,
            cache: None,
        }
    }
}

impl fmt::Debug for RequestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestConfig")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("base_url", &self.base_url)
            .field("headers", &self.headers)
            .field("params", &self.params)
            .field("custom_serializer", &self.params_serializer.is_some())
            .field("data", &self.data)
            .field("timeout", &self.timeout)
            .field("with_credentials", &self.with_credentials)
            .field("response_type", &self.response_type)
            .field("custom_validate_status", &self.validate_status.is_some())
            .field("signal", &self.signal)
            .field("cache", &self.cache)
            .finish()
    }
}

impl RequestConfig {
    /// Create a config for `method` and `url`
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            ..Default::default()
        }
    }

    /// Create a GET config
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Method name in lower case, as request-stage interceptors see it
    pub fn method_name(&self) -> String {
        self.method.as_str().to_ascii_lowercase()
    }

    /// Set the method
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set the URL
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the base URL
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Overlay headers in any accepted shape
    pub fn headers(mut self, headers: impl Into<HeaderInput>) -> Self {
        self.headers.extend(&normalize_headers(headers));
        self
    }

    /// Set query parameters
    pub fn params(mut self, params: impl Into<Params>) -> Self {
        self.params = Some(params.into());
        self
    }

    /// Set a custom query serializer
    pub fn params_serializer<S: ParamsSerializer + 'static>(mut self, serializer: S) -> Self {
        self.params_serializer = Some(Arc::new(serializer));
        self
    }

    /// Set the payload
    pub fn data(mut self, data: impl Into<RequestBody>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Set timeout; zero disables the timer
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the credentials flag
    pub fn with_credentials(mut self, with_credentials: bool) -> Self {
        self.with_credentials = Some(with_credentials);
        self
    }

    /// Set the declared response type
    pub fn response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = Some(response_type);
        self
    }

    /// Set the status predicate
    pub fn validate_status<F>(mut self, validate: F) -> Self
    where
        F: Fn(u16) -> bool + Send + Sync + 'static,
    {
        self.validate_status = Some(Arc::new(validate));
        self
    }

    /// Set the caller cancellation signal
    pub fn signal(mut self, signal: CancellationToken) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Set the cache directive
    pub fn cache(mut self, cache: CacheDirective) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Check a status against the configured predicate
    pub fn accepts_status(&self, status: u16) -> bool {
        match &self.validate_status {
            Some(validate) => validate(status),
            None => default_validate_status(status),
        }
    }

    /// Shallow merge: every field set on `other` wins, headers merge by name
    pub fn merged_with(&self, other: &RequestConfig) -> RequestConfig {
        let mut headers = self.headers.clone();
        headers.extend(&other.headers);
        RequestConfig {
            method: other.method.clone(),
            url: if other.url.is_empty() {
                self.url.clone()
            } else {
                other.url.clone()
            },
            base_url: other.base_url.clone().or_else(|| self.base_url.clone()),
            headers,
            params: other.params.clone().or_else(|| self.params.clone()),
            params_serializer: other
                .params_serializer
                .clone()
                .or_else(|| self.params_serializer.clone()),
            data: other.data.clone().or_else(|| self.data.clone()),
            timeout: other.timeout.or(self.timeout),
            with_credentials: other.with_credentials.or(self.with_credentials),
            response_type: other.response_type.or(self.response_type),
            validate_status: other
                .validate_status
                .clone()
                .or_else(|| self.validate_status.clone()),
            signal: other.signal.clone().or_else(|| self.signal.clone()),
            cache: other.cache.clone().or_else(|| self.cache.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_method_is_case_insensitive() {
        assert_eq!(parse_method("get").unwrap(), Method::GET);
        assert_eq!(parse_method("Patch").unwrap(), Method::PATCH);
        assert!(matches!(parse_method("TRACE"), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_method_name_is_lower_case() {
        assert_eq!(RequestConfig::new(Method::DELETE, "/x").method_name(), "delete");
    }

    #[test]
    fn test_default_status_validation() {
        let config = RequestConfig::get("/");
        assert!(config.accepts_status(200));
        assert!(config.accepts_status(299));
        assert!(!config.accepts_status(304));
        assert!(!config.accepts_status(199));

        let lenient = config.validate_status(|s| s < 500);
        assert!(lenient.accepts_status(404));
    }

    #[test]
    fn test_merge_prefers_overlay() {
        let base = RequestConfig::get("/a")
            .timeout(Duration::from_secs(1))
            .header("X-A", "1")
            .with_credentials(true);
        let overlay = RequestConfig::get("/b").header("x-a", "2").header("x-b", "3");
        let merged = base.merged_with(&overlay);

        assert_eq!(merged.url, "/b");
        assert_eq!(merged.timeout, Some(Duration::from_secs(1)));
        assert_eq!(merged.with_credentials, Some(true));
        assert_eq!(merged.headers.get("X-A"), Some("2"));
        assert_eq!(merged.headers.len(), 2);
    }

    #[test]
    fn test_cache_control_mapping() {
        assert_eq!(
            CacheDirective::revalidate_after(60.0).cache_control().as_deref(),
            Some("max-age=60")
        );
        assert_eq!(
            CacheDirective::static_generation().cache_control().as_deref(),
            Some("max-stale")
        );
        assert_eq!(
            CacheDirective::always_revalidate().cache_control().as_deref(),
            Some("no-store")
        );
        assert_eq!(CacheDirective::default().cache_control(), None);
    }

    #[test]
    fn test_allows_reuse() {
        assert!(CacheDirective::revalidate_after(60.0).allows_reuse());
        assert!(CacheDirective::static_generation().allows_reuse());
        assert!(!CacheDirective::always_revalidate().allows_reuse());
        assert!(!CacheDirective::revalidate_after(0.0).allows_reuse());
    }

    #[test]
    fn test_fetch_cache_round_trips_names() {
        assert_eq!("force-cache".parse::<FetchCache>().unwrap(), FetchCache::ForceCache);
        assert_eq!(FetchCache::OnlyIfCached.as_str(), "only-if-cached");
        assert!("sometimes".parse::<FetchCache>().is_err());
    }
}
