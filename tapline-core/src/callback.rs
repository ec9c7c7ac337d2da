//! Completion handle for callback-style (async) taps.

use crate::error::{BoxError, TapError};
use std::fmt;

type Completion = Box<dyn FnOnce(Result<(), TapError>) + Send + 'static>;

/// Completion handle passed to every async tap.
///
/// The series does not advance until the handle is completed with
/// [`done`](Callback::done), [`fail`](Callback::fail) or
/// [`call`](Callback::call). The handle is `Send`, so it may be completed
/// later from another task or thread. Dropping it without completing it fails
/// the tap with [`TapError::CallbackDropped`], so a lost handle can never
/// stall a series.
///
/// # Example
///
/// ```rust,ignore
/// hook.tap_async("flush", |args: &Ctx, done: Callback| {
///     let pending = args.writer.clone();
///     std::thread::spawn(move || match pending.flush() {
///         Ok(()) => done.done(),
///         Err(e) => done.fail(e),
///     });
/// })?;
/// ```
#[must_use = "an async tap must complete its callback"]
pub struct Callback {
    complete: Option<Completion>,
}

impl Callback {
    /// Create a handle that forwards its outcome to `complete`.
    pub fn new<F>(complete: F) -> Self
    where
        F: FnOnce(Result<(), TapError>) + Send + 'static,
    {
        Self {
            complete: Some(Box::new(complete)),
        }
    }

    /// Complete the tap with the given outcome.
    pub fn call(mut self, result: Result<(), BoxError>) {
        self.finish(result.map_err(TapError::Failed));
    }

    /// Complete the tap successfully.
    pub fn done(self) {
        self.call(Ok(()));
    }

    /// Complete the tap with an error.
    pub fn fail(self, error: impl Into<BoxError>) {
        self.call(Err(error.into()));
    }

    fn finish(&mut self, result: Result<(), TapError>) {
        if let Some(complete) = self.complete.take() {
            complete(result);
        }
    }
}

impl Drop for Callback {
    fn drop(&mut self) {
        self.finish(Err(TapError::CallbackDropped));
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("pending", &self.complete.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder() -> (Arc<Mutex<Vec<String>>>, Callback) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let callback = Callback::new(move |res| {
            let outcome = match res {
                Ok(()) => "ok".to_string(),
                Err(e) => e.to_string(),
            };
            sink.lock().unwrap().push(outcome);
        });
        (seen, callback)
    }

    #[test]
    fn completes_once() {
        let (seen, callback) = recorder();
        callback.done();
        assert_eq!(*seen.lock().unwrap(), vec!["ok".to_string()]);
    }

    #[test]
    fn fail_forwards_error() {
        let (seen, callback) = recorder();
        callback.fail("no route");
        assert_eq!(*seen.lock().unwrap(), vec!["no route".to_string()]);
    }

    #[test]
    fn dropping_reports_lost_callback() {
        let (seen, callback) = recorder();
        drop(callback);
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["completion callback dropped before it was called".to_string()]
        );
    }
}
