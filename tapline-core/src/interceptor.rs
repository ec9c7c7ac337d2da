//! Interceptors: observers that can rewrite taps and watch dispatches.

use crate::{error::HookError, tap::Tap};
use std::{fmt, sync::Arc};

/// An observer attached to a hook with [`Tapable::intercept`].
///
/// Every method is optional. [`register`](Interceptor::register) rewrites taps
/// at registration time (and, once, every tap already registered when the
/// interceptor is added). The remaining methods observe dispatches.
///
/// [`Tapable::intercept`]: crate::Tapable::intercept
pub trait Interceptor<A>: Send + Sync + 'static {
    /// Rewrite a tap. `None` leaves it unchanged.
    fn register(&self, tap: &Tap<A>) -> Option<Tap<A>> {
        let _ = tap;
        None
    }

    /// Called once when a dispatch starts, before the first tap.
    fn call(&self, args: &A) {
        let _ = args;
    }

    /// Called before each tap runs.
    fn tap(&self, tap: &Tap<A>) {
        let _ = tap;
    }

    /// Called when a dispatch is aborted by an error.
    fn error(&self, error: &HookError) {
        let _ = error;
    }

    /// Called when a dispatch finishes without error.
    fn done(&self) {}
}

impl<A, I: Interceptor<A> + ?Sized> Interceptor<A> for Arc<I> {
    fn register(&self, tap: &Tap<A>) -> Option<Tap<A>> {
        (**self).register(tap)
    }

    fn call(&self, args: &A) {
        (**self).call(args)
    }

    fn tap(&self, tap: &Tap<A>) {
        (**self).tap(tap)
    }

    fn error(&self, error: &HookError) {
        (**self).error(error)
    }

    fn done(&self) {
        (**self).done()
    }
}

/// Ordered list of interceptors attached to one hook.
///
/// Cloning shares the interceptors; compiled dispatchers keep such a clone.
pub struct InterceptorChain<A> {
    interceptors: Vec<Arc<dyn Interceptor<A>>>,
}

impl<A: 'static> InterceptorChain<A> {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self {
            interceptors: Vec::new(),
        }
    }

    /// Append an interceptor.
    pub fn push(&mut self, interceptor: Arc<dyn Interceptor<A>>) {
        self.interceptors.push(interceptor);
    }

    /// Run every interceptor's `register` over `tap`, in chain order.
    pub fn run_register(&self, mut tap: Tap<A>) -> Tap<A> {
        for interceptor in &self.interceptors {
            if let Some(rewritten) = interceptor.register(&tap) {
                tap = rewritten;
            }
        }
        tap
    }

    /// Notify every interceptor that a dispatch started.
    pub fn on_call(&self, args: &A) {
        for interceptor in &self.interceptors {
            interceptor.call(args);
        }
    }

    /// Notify every interceptor that a tap is about to run.
    pub fn on_tap(&self, tap: &Tap<A>) {
        for interceptor in &self.interceptors {
            interceptor.tap(tap);
        }
    }

    /// Notify every interceptor that a dispatch failed.
    pub fn on_error(&self, error: &HookError) {
        for interceptor in &self.interceptors {
            interceptor.error(error);
        }
    }

    /// Notify every interceptor that a dispatch completed.
    pub fn on_done(&self) {
        for interceptor in &self.interceptors {
            interceptor.done();
        }
    }

    /// Iterate over the interceptors in chain order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Interceptor<A>>> {
        self.interceptors.iter()
    }

    /// Number of interceptors.
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    /// Check if the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }
}

impl<A: 'static> Default for InterceptorChain<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Clone for InterceptorChain<A> {
    fn clone(&self) -> Self {
        Self {
            interceptors: self.interceptors.clone(),
        }
    }
}

impl<A> fmt::Debug for InterceptorChain<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptorChain")
            .field("len", &self.interceptors.len())
            .finish()
    }
}
