// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Execution context collaborators
//!
//! A client either runs with direct access to its own cookie jar (the
//! transport attaches cookies when credentials are included) or inside a
//! server context, where cookies of the incoming request live in an
//! external [`CookieStore`] and a missing session may have to redirect.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use crate::http::CookieStore;

/// Hook that aborts the current flow and redirects to `location`
pub trait Redirector: Send + Sync {
    fn redirect(&self, location: &str);
}

impl<F> Redirector for F
where
    F: Fn(&str) + Send + Sync,
{
    fn redirect(&self, location: &str) {
        self(location)
    }
}

/// Where requests are being issued from
#[derive(Clone, Default)]
pub enum ExecutionContext {
    /// Direct cookie-jar access
    #[default]
    Client,
    /// Cookies must be read from an external store and forwarded
    Server {
        cookies: Arc<dyn CookieStore>,
        redirector: Option<Arc<dyn Redirector>>,
    },
}

impl ExecutionContext {
    /// Server context reading from `cookies`
    pub fn server(cookies: impl CookieStore + 'static) -> Self {
        ExecutionContext::Server {
            cookies: Arc::new(cookies),
            redirector: None,
        }
    }

    /// Attach a redirect hook; no effect on a client context
    pub fn with_redirector(self, hook: impl Redirector + 'static) -> Self {
        match self {
            ExecutionContext::Server { cookies, .. } => ExecutionContext::Server {
                cookies,
                redirector: Some(Arc::new(hook)),
            },
            client => client,
        }
    }

    pub fn is_server(&self) -> bool {
        matches!(self, ExecutionContext::Server { .. })
    }

    /// Tag used in log fields
    pub fn label(&self) -> &'static str {
        match self {
            ExecutionContext::Client => "client",
            ExecutionContext::Server { .. } => "server",
        }
    }

    /// Cookie store of a server context
    pub fn cookie_store(&self) -> Option<&Arc<dyn CookieStore>> {
        match self {
            ExecutionContext::Server { cookies, .. } => Some(cookies),
            ExecutionContext::Client => None,
        }
    }

    /// Redirect hook of a server context
    pub fn redirector(&self) -> Option<&Arc<dyn Redirector>> {
        match self {
            ExecutionContext::Server { redirector, .. } => redirector.as_ref(),
            ExecutionContext::Client => None,
        }
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionContext::Client => f.write_str("Client"),
            ExecutionContext::Server { redirector, .. } => f
                .debug_struct("Server")
                .field("redirector", &redirector.is_some())
                .finish_non_exhaustive(),
        }
    }
}

/// Cookies that prove a session, and where to go without one
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerCookieConfig {
    /// Checked in order; any one present is enough
    pub cookie_names: Vec<String>,
    pub redirect_path: Option<String>,
}

impl ServerCookieConfig {
    pub fn new<I, S>(cookie_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cookie_names: cookie_names.into_iter().map(Into::into).collect(),
            redirect_path: None,
        }
    }

    /// Set the redirect path
    pub fn redirect_path(mut self, path: impl Into<String>) -> Self {
        self.redirect_path = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::RequestCookies;
    use parking_lot::Mutex;

    #[test]
    fn test_context_labels() {
        assert_eq!(ExecutionContext::default().label(), "client");
        let server = ExecutionContext::server(RequestCookies::new());
        assert!(server.is_server());
        assert_eq!(server.label(), "server");
        assert!(server.redirector().is_none());
    }

    #[test]
    fn test_redirector_closure() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let context = ExecutionContext::server(RequestCookies::new())
            .with_redirector(move |path: &str| sink.lock().push(path.to_string()));

        context.redirector().unwrap().redirect("/login");
        assert_eq!(*seen.lock(), vec!["/login".to_string()]);
    }

    #[test]
    fn test_client_ignores_redirector() {
        let context = ExecutionContext::Client.with_redirector(|_: &str| {});
        assert!(context.redirector().is_none());
    }

    #[test]
    fn test_server_cookie_config_from_json() {
        let config: ServerCookieConfig =
            serde_json::from_str(r#"{"cookie_names":["session"],"redirect_path":"/login"}"#).unwrap();
        assert_eq!(
            config,
            ServerCookieConfig::new(["session"]).redirect_path("/login")
        );
    }
}
