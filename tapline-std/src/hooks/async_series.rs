//! The asynchronous series hook.

use crate::series::SeriesCompiler;
use futures::future::BoxFuture;
use std::{fmt, sync::Arc};
use tapline_core::{
    ArgNames, CallConvention, Hook, HookArgs, HookError, Interceptor, TapFn, TapKinds,
    TapOptions, TapRegistry, Tapable,
};

/// A hook that takes taps of every kind and runs them one after another,
/// each starting only after the previous one completed.
///
/// It has no blocking `call`: a callback-style or future-returning tap cannot
/// be waited on synchronously.
pub struct AsyncSeriesHook<A: HookArgs> {
    inner: Hook<A, SeriesCompiler>,
}

impl<A: HookArgs> AsyncSeriesHook<A> {
    /// Create a hook with the given formal argument names.
    pub fn new(args: impl Into<ArgNames>) -> Self {
        Self {
            inner: Hook::with_compiler(args, SeriesCompiler, TapKinds::all()),
        }
    }

    /// Run the series and report the outcome to `callback`.
    ///
    /// `callback` is called exactly once, on whichever thread completes the
    /// last tap (or the failing one).
    pub fn call_async<F>(&self, args: A, callback: F)
    where
        F: FnOnce(Result<(), HookError>) + Send + 'static,
    {
        self.inner.call_async(args, callback);
    }

    /// Run the series as a future.
    pub fn promise(&self, args: A) -> BoxFuture<'static, Result<(), HookError>> {
        self.inner.promise(args)
    }

    /// The registered taps, in execution order.
    pub fn taps(&self) -> &TapRegistry<A> {
        self.inner.taps()
    }

    /// Whether any tap or interceptor is registered.
    pub fn is_used(&self) -> bool {
        self.inner.is_used()
    }

    /// Number of dispatchers compiled so far.
    pub fn compilations(&self) -> usize {
        self.inner.compilations()
    }

    /// Whether an up-to-date dispatcher is cached for `convention`.
    pub fn is_compiled(&self, convention: CallConvention) -> bool {
        self.inner.is_compiled(convention)
    }

    /// The underlying hook.
    pub fn as_hook(&self) -> &Hook<A, SeriesCompiler> {
        &self.inner
    }
}

impl<A: HookArgs> Tapable<A> for AsyncSeriesHook<A> {
    fn register(&mut self, options: TapOptions, callback: TapFn<A>) -> Result<(), HookError> {
        self.inner.register(options, callback)
    }

    fn add_interceptor(&mut self, interceptor: Arc<dyn Interceptor<A>>) {
        self.inner.add_interceptor(interceptor);
    }
}

impl<A: HookArgs> fmt::Debug for AsyncSeriesHook<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AsyncSeriesHook").field(&self.inner).finish()
    }
}
