//! Testing utilities for tapline.
//!
//! This module provides utilities to make testing hooks and plugins easier.
//!
//! # Features
//!
//! - [`CallLog`]: a shared log plus factories for recording and failing taps
//! - [`RecordingInterceptor`]: an interceptor that records every event it sees

use futures::future::{self, BoxFuture};
use std::sync::{Arc, Mutex, PoisonError};
use tapline_core::{BoxError, Callback, HookError, Interceptor, Tap};

// ============================================================================
// Call Log
// ============================================================================

/// A shared, ordered log of tap runs.
///
/// The tap factories return closures that append their label when they run,
/// so a test can assert on execution order.
///
/// # Example
///
/// ```rust,ignore
/// let log = CallLog::new();
/// hook.tap("a", log.sync("a"))?;
/// hook.tap_async("b", log.callback("b"))?;
/// hook.call_async((), |_| {});
/// assert_eq!(log.entries(), ["a", "b"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&self, entry: impl Into<String>) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.into());
    }

    /// Get a copy of the entries.
    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Get the number of entries.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if nothing was logged.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all entries.
    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// A sync tap that logs `label` and succeeds.
    pub fn sync<A>(
        &self,
        label: &str,
    ) -> impl Fn(&A) -> Result<(), BoxError> + Send + Sync + use<A> {
        let log = self.clone();
        let label = label.to_owned();
        move |_: &A| {
            log.push(label.clone());
            Ok(())
        }
    }

    /// A sync tap that logs `label` and fails with `message`.
    pub fn failing<A>(
        &self,
        label: &str,
        message: &str,
    ) -> impl Fn(&A) -> Result<(), BoxError> + Send + Sync + use<A> {
        let log = self.clone();
        let label = label.to_owned();
        let message = message.to_owned();
        move |_: &A| {
            log.push(label.clone());
            Err(message.clone().into())
        }
    }

    /// A callback-style tap that logs `label` and completes at once.
    pub fn callback<A>(
        &self,
        label: &str,
    ) -> impl Fn(&A, Callback) + Send + Sync + use<A> {
        let log = self.clone();
        let label = label.to_owned();
        move |_: &A, done: Callback| {
            log.push(label.clone());
            done.done();
        }
    }

    /// A future-returning tap that logs `label` when polled and succeeds.
    pub fn promise<A>(
        &self,
        label: &str,
    ) -> impl Fn(&A) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync + use<A> {
        let log = self.clone();
        let label = label.to_owned();
        move |_: &A| -> BoxFuture<'static, Result<(), BoxError>> {
            let log = log.clone();
            let label = label.clone();
            Box::pin(future::lazy(move |_| {
                log.push(label);
                Ok::<(), BoxError>(())
            }))
        }
    }
}

// ============================================================================
// Recording Interceptor
// ============================================================================

/// An interceptor that records dispatch events as strings.
///
/// Events are `"call"`, `"tap:<name>"`, `"error:<tap name>"` (or
/// `"error"` when no tap was involved) and `"done"`. Registrations are left
/// unchanged.
#[derive(Debug, Clone, Default)]
pub struct RecordingInterceptor {
    log: CallLog,
}

impl RecordingInterceptor {
    /// Create a new recording interceptor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the recorded events.
    pub fn events(&self) -> Vec<String> {
        self.log.entries()
    }

    /// Clear all recorded events.
    pub fn clear(&self) {
        self.log.clear();
    }
}

impl<A: 'static> Interceptor<A> for RecordingInterceptor {
    fn call(&self, _args: &A) {
        self.log.push("call");
    }

    fn tap(&self, tap: &Tap<A>) {
        self.log.push(format!("tap:{}", tap.name));
    }

    fn error(&self, error: &HookError) {
        match error.tap_name() {
            Some(name) => self.log.push(format!("error:{name}")),
            None => self.log.push("error"),
        }
    }

    fn done(&self) {
        self.log.push("done");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::AsyncSeriesHook;
    use tapline_core::Tapable;

    #[tokio::test]
    async fn factories_log_in_series_order() {
        let log = CallLog::new();
        let mut hook = AsyncSeriesHook::<()>::new(["unit"]);
        hook.tap("a", log.sync("a")).unwrap();
        hook.tap_async("b", log.callback("b")).unwrap();
        hook.tap_promise("c", log.promise("c")).unwrap();

        hook.promise(()).await.unwrap();
        assert_eq!(log.entries(), ["a", "b", "c"]);
    }

    #[test]
    fn recorder_sees_the_failing_tap() {
        let log = CallLog::new();
        let recorder = RecordingInterceptor::new();
        let mut hook = AsyncSeriesHook::<()>::new(["unit"]);
        hook.tap("ok", log.sync("ok")).unwrap();
        hook.tap("bad", log.failing("bad", "nope")).unwrap();
        hook.tap("skipped", log.sync("skipped")).unwrap();
        hook.intercept(recorder.clone());

        hook.call_async((), |res| assert!(res.is_err()));
        assert_eq!(log.entries(), ["ok", "bad"]);
        assert_eq!(recorder.events(), ["call", "tap:ok", "tap:bad", "error:bad"]);
    }
}
