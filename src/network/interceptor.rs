// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request/response interceptor pipeline
//!
//! Each engine owns two [`InterceptorManager`]s: one for the request stage
//! (handlers see the outgoing [`RequestConfig`]) and one for the response
//! stage (handlers see the [`HttpResponse`]). A dispatch threads a single
//! `Result` through every live handler in registration order, so a failure
//! skips fulfilled handlers until some rejected handler recovers it.
//!
//! # Example
//!
//! ```rust,no_run
//! use api_client::network::{FnInterceptor, Interceptors};
//! use api_client::RequestConfig;
//!
//! let interceptors = Interceptors::new();
//! let handle = interceptors.request.use_interceptor(
//!     FnInterceptor::new().fulfilled(|config: RequestConfig| async move {
//!         Ok(config.header("x-trace", "1"))
//!     }),
//! );
//! interceptors.request.eject(handle);
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::http::{HttpResponse, RequestConfig};

/// One stage handler pair
///
/// `on_fulfilled` defaults to identity and `on_rejected` to re-raising, so an
/// implementation only overrides the side it cares about.
#[async_trait]
pub trait Interceptor<V: Send + 'static>: Send + Sync {
    /// Called with the value produced by the previous step
    async fn on_fulfilled(&self, value: V) -> Result<V> {
        Ok(value)
    }

    /// Called with the error produced by the previous step; returning `Ok`
    /// recovers the chain
    async fn on_rejected(&self, error: Error) -> Result<V> {
        Err(error)
    }
}

/// Async fulfilled callback
pub type FulfilledFn<V> = Arc<dyn Fn(V) -> BoxFuture<'static, Result<V>> + Send + Sync>;

/// Async rejected callback
pub type RejectedFn<V> = Arc<dyn Fn(Error) -> BoxFuture<'static, Result<V>> + Send + Sync>;

/// Interceptor built from optional closures
pub struct FnInterceptor<V> {
    fulfilled: Option<FulfilledFn<V>>,
    rejected: Option<RejectedFn<V>>,
}

impl<V> Default for FnInterceptor<V> {
    fn default() -> Self {
        Self {
            fulfilled: None,
            rejected: None,
        }
    }
}

impl<V: Send + 'static> FnInterceptor<V> {
    /// Interceptor that passes everything through
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fulfilled callback
    pub fn fulfilled<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(V) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        self.fulfilled = Some(Arc::new(move |value| -> BoxFuture<'static, Result<V>> {
            Box::pin(f(value))
        }));
        self
    }

    /// Set the rejected callback
    pub fn rejected<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Error) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        self.rejected = Some(Arc::new(move |error| -> BoxFuture<'static, Result<V>> {
            Box::pin(f(error))
        }));
        self
    }

    /// Set an already boxed fulfilled callback
    pub fn with_fulfilled_fn(mut self, f: Option<FulfilledFn<V>>) -> Self {
        self.fulfilled = f;
        self
    }

    /// Set an already boxed rejected callback
    pub fn with_rejected_fn(mut self, f: Option<RejectedFn<V>>) -> Self {
        self.rejected = f;
        self
    }
}

#[async_trait]
impl<V: Send + 'static> Interceptor<V> for FnInterceptor<V> {
    async fn on_fulfilled(&self, value: V) -> Result<V> {
        match &self.fulfilled {
            Some(f) => f(value).await,
            None => Ok(value),
        }
    }

    async fn on_rejected(&self, error: Error) -> Result<V> {
        match &self.rejected {
            Some(f) => f(error).await,
            None => Err(error),
        }
    }
}

/// Handle returned by [`InterceptorManager::use_interceptor`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InterceptorHandle(usize);

impl InterceptorHandle {
    /// Registration index
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Ordered, append-only list of handlers for one stage
pub struct InterceptorManager<V: Send + 'static> {
    entries: RwLock<Vec<Option<Arc<dyn Interceptor<V>>>>>,
}

impl<V: Send + 'static> Default for InterceptorManager<V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }
}

impl<V: Send + 'static> InterceptorManager<V> {
    /// Create an empty stage
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler pair
    pub fn use_interceptor<I: Interceptor<V> + 'static>(&self, interceptor: I) -> InterceptorHandle {
        self.use_shared(Arc::new(interceptor))
    }

    /// Register a shared handler pair
    pub fn use_shared(&self, interceptor: Arc<dyn Interceptor<V>>) -> InterceptorHandle {
        let mut entries = self.entries.write();
        entries.push(Some(interceptor));
        InterceptorHandle(entries.len() - 1)
    }

    /// Tombstone the entry behind `handle`; later indices keep their place.
    /// Unknown or already ejected handles are ignored.
    pub fn eject(&self, handle: InterceptorHandle) {
        if let Some(slot) = self.entries.write().get_mut(handle.0) {
            *slot = None;
        }
    }

    /// Snapshot of live entries in registration order
    pub fn get_all(&self) -> Vec<Arc<dyn Interceptor<V>>> {
        self.entries.read().iter().flatten().cloned().collect()
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.entries.read().iter().flatten().count()
    }

    /// Check if no live entries remain
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every entry. Handles issued so far stay invalid.
    pub fn clear(&self) {
        for slot in self.entries.write().iter_mut() {
            *slot = None;
        }
    }
}

/// Thread `state` through `handlers` in order
pub async fn run_stage<V: Send + 'static>(
    handlers: &[Arc<dyn Interceptor<V>>],
    mut state: Result<V>,
) -> Result<V> {
    for handler in handlers {
        state = match state {
            Ok(value) => handler.on_fulfilled(value).await,
            Err(error) => handler.on_rejected(error).await,
        };
    }
    state
}

/// Request and response stages of one engine
#[derive(Default)]
pub struct Interceptors {
    pub request: InterceptorManager<RequestConfig>,
    pub response: InterceptorManager<HttpResponse>,
}

impl Interceptors {
    /// Create empty stages
    pub fn new() -> Self {
        Self::default()
    }
}
