// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP layer
//!
//! Header and body normalization, URL composition, cancellation, response
//! decoding, the transport abstraction and the engine that ties them
//! together.

mod body;
mod cancel;
mod cookie;
mod engine;
mod header;
mod request;
mod response;
mod transport;
mod url;

pub use body::{method_allows_body, prepare_body, FormData, FormPart, FormValue, RequestBody, WireBody};
pub use cancel::{merge_signals, MergedSignal, TimeoutSignal};
pub use cookie::{Cookie, CookieJar, CookieStore, RequestCookies};
pub use engine::{EngineDefaults, HttpEngine, HttpInstance, DEFAULT_TIMEOUT};
pub use header::{normalize_headers, HeaderInput, Headers};
pub use request::{
    default_validate_status, parse_method, CacheDirective, CredentialsMode, FetchCache,
    RequestConfig, Revalidate, StatusValidator,
};
pub use response::{
    is_json_content_type, read_response_data, BodyStream, HttpResponse, RawResponse,
    RawResponseHead, ResponseData, ResponseType,
};
pub use transport::{ReqwestTransport, Transport, TransportConfig, WireRequest};
pub use self::url::{append_params, build_url, is_absolute_url, serialize_params, ParamValue, Params, ParamsSerializer};

#[cfg(test)]
pub(crate) use transport::mock;

/// Default user agent string
pub const DEFAULT_USER_AGENT: &str = concat!("api-client/", env!("CARGO_PKG_VERSION"));

/// Common HTTP headers
pub mod headers {
    pub const ACCEPT: &str = "accept";
    pub const CACHE_CONTROL: &str = "cache-control";
    pub const CONTENT_TYPE: &str = "content-type";
    pub const COOKIE: &str = "cookie";
    pub const SET_COOKIE: &str = "set-cookie";
    pub const USER_AGENT: &str = "user-agent";
}
