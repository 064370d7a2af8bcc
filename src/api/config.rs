// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! API client configuration

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::context::{ExecutionContext, ServerCookieConfig};
use crate::error::{Error, Result};
use crate::http::{HttpInstance, Transport, DEFAULT_TIMEOUT};
use crate::network::InterceptorCallbacks;

/// Hook replacing the default interceptors entirely
pub type SetupInterceptors = Arc<dyn Fn(&dyn HttpInstance) + Send + Sync>;

/// Client configuration
#[derive(Clone)]
pub struct ApiClientConfig {
    /// Base URL every relative path is joined to
    pub base_url: String,
    /// Default timeout; zero disables it
    pub timeout: Duration,
    /// Headers merged over `Content-Type: application/json`
    pub headers: Vec<(String, String)>,
    pub with_credentials: bool,
    pub setup_interceptors: Option<SetupInterceptors>,
    /// Callbacks registered after the default interceptors
    pub interceptors: InterceptorCallbacks,
    /// Log requests and failing responses
    pub debug: bool,
    pub server_cookie_config: Option<ServerCookieConfig>,
    pub context: ExecutionContext,
    /// Transport override; reqwest when unset
    pub transport: Option<Arc<dyn Transport>>,
}

impl ApiClientConfig {
    /// Create a config for `base_url` with defaults everywhere else
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            headers: Vec::new(),
            with_credentials: true,
            setup_interceptors: None,
            interceptors: InterceptorCallbacks::default(),
            debug: false,
            server_cookie_config: None,
            context: ExecutionContext::Client,
            transport: None,
        }
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Add default header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the default credentials flag
    pub fn with_credentials(mut self, with_credentials: bool) -> Self {
        self.with_credentials = with_credentials;
        self
    }

    /// Replace the default interceptors with a custom setup
    pub fn setup_interceptors<F>(mut self, setup: F) -> Self
    where
        F: Fn(&dyn HttpInstance) + Send + Sync + 'static,
    {
        self.setup_interceptors = Some(Arc::new(setup));
        self
    }

    /// Set additive interceptor callbacks
    pub fn interceptors(mut self, callbacks: InterceptorCallbacks) -> Self {
        self.interceptors = callbacks;
        self
    }

    /// Enable debug logging
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Set the server-side session cookie config
    pub fn server_cookie_config(mut self, config: ServerCookieConfig) -> Self {
        self.server_cookie_config = Some(config);
        self
    }

    /// Set the execution context
    pub fn context(mut self, context: ExecutionContext) -> Self {
        self.context = context;
        self
    }

    /// Use a custom transport
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }
}

impl fmt::Debug for ApiClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClientConfig")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("headers", &self.headers)
            .field("with_credentials", &self.with_credentials)
            .field("setup_interceptors", &self.setup_interceptors.is_some())
            .field("interceptors", &self.interceptors)
            .field("debug", &self.debug)
            .field("server_cookie_config", &self.server_cookie_config)
            .field("context", &self.context)
            .field("custom_transport", &self.transport.is_some())
            .finish()
    }
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT.as_millis() as u64
}

fn default_true() -> bool {
    true
}

/// Serializable subset of [`ApiClientConfig`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSettings {
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default = "default_true")]
    pub with_credentials: bool,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub server_cookies: Option<ServerCookieConfig>,
}

impl ClientSettings {
    /// Load settings from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }
}

impl From<ClientSettings> for ApiClientConfig {
    fn from(settings: ClientSettings) -> Self {
        let mut config = ApiClientConfig::new(settings.base_url)
            .timeout(Duration::from_millis(settings.timeout_ms))
            .with_credentials(settings.with_credentials)
            .debug(settings.debug);
        config.headers = settings.headers.into_iter().collect();
        config.server_cookie_config = settings.server_cookies;
        config
    }
}
