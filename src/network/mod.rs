// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request/response interception
//!
//! Two-stage handler pipeline wrapped around every dispatch, plus the
//! default logging pair and caller callback wiring.

mod interceptor;
mod logger;

pub use interceptor::{
    run_stage, FnInterceptor, FulfilledFn, Interceptor, InterceptorHandle, InterceptorManager,
    Interceptors, RejectedFn,
};
pub use logger::{DebugLogger, InterceptorCallbacks};
