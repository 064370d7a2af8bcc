// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Cancellation signals: timeout timers and signal merging

use std::ops::Deref;
use std::time::Duration;

use futures::future::select_all;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Signal that fires once a timeout elapses.
///
/// The timer is cleared when the value is dropped, so a finished request
/// never leaves a pending callback behind.
#[derive(Debug)]
pub struct TimeoutSignal {
    token: CancellationToken,
    timeout: Duration,
    timer: JoinHandle<()>,
}

impl TimeoutSignal {
    /// Start the timer. Must be called inside a Tokio runtime.
    pub fn start(timeout: Duration) -> Self {
        let token = CancellationToken::new();
        let fire = token.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            fire.cancel();
        });
        Self {
            token,
            timeout,
            timer,
        }
    }

    /// Token cancelled when the timeout elapses
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Configured timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Check if the timeout has fired
    pub fn fired(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Stop the timer without firing
    pub fn clear(self) {}
}

impl Drop for TimeoutSignal {
    fn drop(&mut self) {
        self.timer.abort();
    }
}

/// Result of [`merge_signals`].
///
/// Derefs to the token to wait on. A composite token is released when this
/// value is dropped, which also ends its watcher task; a passthrough token
/// belongs to the caller and is left alone.
#[derive(Debug)]
pub struct MergedSignal {
    token: CancellationToken,
    composite: bool,
}

impl MergedSignal {
    /// Whether this is a new token combining several inputs
    pub fn is_composite(&self) -> bool {
        self.composite
    }
}

impl Deref for MergedSignal {
    type Target = CancellationToken;

    fn deref(&self) -> &Self::Target {
        &self.token
    }
}

impl Drop for MergedSignal {
    fn drop(&mut self) {
        if self.composite {
            self.token.cancel();
        }
    }
}

/// Merge independent cancellation signals into one.
///
/// Absent signals are ignored. No live signal gives `None`, a single one is
/// returned as-is, and several produce a composite that fires as soon as any
/// input fires. Already-fired inputs short-circuit without spawning a watcher.
pub fn merge_signals<I>(signals: I) -> Option<MergedSignal>
where
    I: IntoIterator<Item = Option<CancellationToken>>,
{
    let mut active: Vec<CancellationToken> = signals.into_iter().flatten().collect();
    match active.len() {
        0 => None,
        1 => active.pop().map(|token| MergedSignal {
            token,
            composite: false,
        }),
        _ => {
            let composite = CancellationToken::new();
            if active.iter().any(CancellationToken::is_cancelled) {
                composite.cancel();
            } else {
                let watcher = composite.clone();
                tokio::spawn(async move {
                    let any = select_all(active.iter().map(|s| Box::pin(s.cancelled())));
                    tokio::select! {
                        _ = any => watcher.cancel(),
                        _ = watcher.cancelled() => {}
                    }
                });
            }
            Some(MergedSignal {
                token: composite,
                composite: true,
            })
        }
    }
}
