//! Logging interceptor for dispatch observation.

use tapline_core::{HookError, Interceptor, Tap};

/// An interceptor that logs every dispatch of the hook it is attached to.
///
/// Events are emitted with `tracing` when the `tracing` feature is enabled;
/// otherwise the interceptor does nothing.
#[derive(Debug, Clone)]
pub struct LoggingInterceptor {
    hook: String,
}

impl LoggingInterceptor {
    /// Create a logging interceptor labelled with the hook's name.
    pub fn new(hook: impl Into<String>) -> Self {
        Self { hook: hook.into() }
    }

    /// The hook label.
    pub fn hook(&self) -> &str {
        &self.hook
    }
}

impl<A: 'static> Interceptor<A> for LoggingInterceptor {
    fn call(&self, _args: &A) {
        #[cfg(feature = "tracing")]
        tracing::info!(hook = %self.hook, "hook called");
    }

    fn tap(&self, tap: &Tap<A>) {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            hook = %self.hook,
            tap = %tap.name,
            kind = %tap.kind(),
            stage = tap.stage,
            "running tap"
        );
        #[cfg(not(feature = "tracing"))]
        {
            let _ = tap;
        }
    }

    fn error(&self, error: &HookError) {
        #[cfg(feature = "tracing")]
        tracing::warn!(hook = %self.hook, %error, "hook failed");
        #[cfg(not(feature = "tracing"))]
        {
            let _ = error;
        }
    }

    fn done(&self) {
        #[cfg(feature = "tracing")]
        tracing::debug!(hook = %self.hook, "hook finished");
    }
}
