// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # api-client - Typed HTTP API client
//!
//! A configurable HTTP client with an axios-style engine underneath and
//! deferred request builders on top.
//!
//! ## Features
//!
//! - Engine: base URL joining, query serialization, header normalization
//! - Timeouts and caller cancellation merged into one signal
//! - Ordered request/response interceptor chains with eject
//! - Structured errors carrying the failing request and response
//! - Deferred builders: nothing is sent until the request is awaited
//! - Cache directives for GET: revalidation windows, static generation, tags
//! - Server-side session cookie forwarding with redirect on missing session
//! - Cookie jar for client-side credentialed requests
//!
//! ## Example
//!
//! ```rust,no_run
//! use api_client::{create_api_client, ApiClientConfig, RequestConfig};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> api_client::Result<()> {
//!     let api = create_api_client(ApiClientConfig::new("https://api.example.com"))?;
//!
//!     // Revalidate at most once a minute
//!     let users = api.get("/users", RequestConfig::default()).with_isr(60.0)?.await?;
//!     println!("{}", users.text_lossy());
//!
//!     let created = api
//!         .post("/users", json!({"name": "Ada"}), RequestConfig::default())
//!         .await?;
//!     println!("created: {}", created.status);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod error;
pub mod http;
pub mod network;

// Re-exports for convenience

// Client and builders
pub use api::{create_api_client, create_http_instance, ApiClient, ApiClientConfig, ClientSettings};
pub use api::{ApiRequest, ApiRequestConfig, GetApiRequest, MemoizedRequest};

// Execution context
pub use api::{CookieStore, ExecutionContext, Redirector, ServerCookieConfig};

// Errors
pub use error::{Error, ErrorCode, HttpError, RequestEcho, Result};

// HTTP
pub use http::{EngineDefaults, HttpEngine, HttpInstance};
pub use http::{CacheDirective, FetchCache, RequestConfig, Revalidate};
pub use http::{FormData, RequestBody};
pub use http::{HttpResponse, ResponseData, ResponseType};
pub use http::{Headers, Params, ParamValue};
pub use http::{Cookie, CookieJar, RequestCookies};
pub use http::{ReqwestTransport, Transport, TransportConfig, WireRequest};

// Interceptors
pub use network::{DebugLogger, FnInterceptor, Interceptor, InterceptorCallbacks};
pub use network::{InterceptorHandle, InterceptorManager, Interceptors};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
