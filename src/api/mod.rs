// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request builders and the client factory
//!
//! [`ApiClient`] wraps one engine and hands out deferred builders per call.
//! Builders carry the execution context so cookie forwarding works the same
//! whether requests come from a client or from a server render.

mod client;
mod config;
mod context;
mod request;

pub use client::{create_api_client, create_http_instance, ApiClient};
pub use config::{ApiClientConfig, ClientSettings, SetupInterceptors};
pub use context::{CookieStore, ExecutionContext, Redirector, ServerCookieConfig};
pub use request::{ApiRequest, ApiRequestConfig, GetApiRequest, MemoizedRequest};
