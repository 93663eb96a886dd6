//! Caller-imposed deadlines and cancellation
//!
//! A resolution either completes against one snapshot or fails. These
//! checks run between chunk queries so an aborted call never hands back a
//! partially filtered set.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{PermtreeError, Result};

/// Shared flag flipped by whoever wants in-flight calls to stop
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Optional expiry instant plus optional cancel token
#[derive(Debug, Clone, Default)]
pub struct Deadline {
    at: Option<Instant>,
    token: Option<CancelToken>,
}

impl Deadline {
    /// No limit
    pub fn none() -> Self {
        Self::default()
    }

    pub fn at(at: Instant) -> Self {
        Deadline { at: Some(at), token: None }
    }

    pub fn after(timeout: Duration) -> Self {
        Self::at(Instant::now() + timeout)
    }

    pub fn with_token(mut self, token: CancelToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn is_unbounded(&self) -> bool {
        self.at.is_none() && self.token.is_none()
    }

    /// Fail if cancelled or expired
    #[inline]
    pub fn check(&self) -> Result<()> {
        if self.token.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Err(PermtreeError::Cancelled);
        }
        if let Some(at) = self.at {
            let now = Instant::now();
            if now >= at {
                return Err(PermtreeError::DeadlineExceeded {
                    overrun_ms: now.duration_since(at).as_millis(),
                });
            }
        }
        Ok(())
    }
}
