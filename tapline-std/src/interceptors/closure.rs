//! Interceptor assembled from closures.

use std::fmt;
use tapline_core::{HookError, Interceptor, Tap};

type RegisterFn<A> = Box<dyn Fn(&Tap<A>) -> Option<Tap<A>> + Send + Sync>;
type CallFn<A> = Box<dyn Fn(&A) + Send + Sync>;
type TapObserverFn<A> = Box<dyn Fn(&Tap<A>) + Send + Sync>;
type ErrorFn = Box<dyn Fn(&HookError) + Send + Sync>;
type DoneFn = Box<dyn Fn() + Send + Sync>;

/// An [`Interceptor`] built from optional closures, one per event.
///
/// # Example
///
/// ```rust,ignore
/// hook.intercept(
///     FnInterceptor::new()
///         .on_register(|tap| Some(tap.renamed(format!("plugin:{}", tap.name))))
///         .on_error(|e| eprintln!("{e}")),
/// );
/// ```
pub struct FnInterceptor<A> {
    register: Option<RegisterFn<A>>,
    call: Option<CallFn<A>>,
    tap: Option<TapObserverFn<A>>,
    error: Option<ErrorFn>,
    done: Option<DoneFn>,
}

impl<A> FnInterceptor<A> {
    /// Create an interceptor that does nothing.
    pub fn new() -> Self {
        Self {
            register: None,
            call: None,
            tap: None,
            error: None,
            done: None,
        }
    }

    /// Rewrite taps at registration. Returning `None` keeps the tap as is.
    pub fn on_register<F>(mut self, f: F) -> Self
    where
        F: Fn(&Tap<A>) -> Option<Tap<A>> + Send + Sync + 'static,
    {
        self.register = Some(Box::new(f));
        self
    }

    /// Observe the start of each dispatch.
    pub fn on_call<F>(mut self, f: F) -> Self
    where
        F: Fn(&A) + Send + Sync + 'static,
    {
        self.call = Some(Box::new(f));
        self
    }

    /// Observe each tap before it runs.
    pub fn on_tap<F>(mut self, f: F) -> Self
    where
        F: Fn(&Tap<A>) + Send + Sync + 'static,
    {
        self.tap = Some(Box::new(f));
        self
    }

    /// Observe dispatch failures.
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&HookError) + Send + Sync + 'static,
    {
        self.error = Some(Box::new(f));
        self
    }

    /// Observe successful dispatches.
    pub fn on_done<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.done = Some(Box::new(f));
        self
    }
}

impl<A> Default for FnInterceptor<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: 'static> Interceptor<A> for FnInterceptor<A> {
    fn register(&self, tap: &Tap<A>) -> Option<Tap<A>> {
        self.register.as_ref().and_then(|f| f(tap))
    }

    fn call(&self, args: &A) {
        if let Some(f) = &self.call {
            f(args);
        }
    }

    fn tap(&self, tap: &Tap<A>) {
        if let Some(f) = &self.tap {
            f(tap);
        }
    }

    fn error(&self, error: &HookError) {
        if let Some(f) = &self.error {
            f(error);
        }
    }

    fn done(&self) {
        if let Some(f) = &self.done {
            f();
        }
    }
}

impl<A> fmt::Debug for FnInterceptor<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnInterceptor")
            .field("register", &self.register.is_some())
            .field("call", &self.call.is_some())
            .field("tap", &self.tap.is_some())
            .field("error", &self.error.is_some())
            .field("done", &self.done.is_some())
            .finish()
    }
}
