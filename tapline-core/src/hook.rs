//! # Hook
//!
//! A hook is a named extension point. Plugins register taps against it; the
//! host invokes it and every tap runs in registry order under the chosen
//! calling convention.
//!
//! [`Hook`] composes the pieces: a [`TapRegistry`], an [`InterceptorChain`],
//! the formal [`ArgNames`], a [`DispatchCache`] and the family's
//! [`ExecutionCompiler`]. Registration goes through the [`Tapable`] trait so
//! family wrappers and [`WithOptions`] can share it.
//!
//! # Flow
//!
//! - **Registration**: validate, run interceptors' `register`, insert, bump
//!   the cache generation.
//! - **Invocation**: fetch the cached dispatcher for the convention (compiling
//!   it on first use after a mutation) and run it.

use crate::{
    args::{ArgNames, HookArgs},
    cache::DispatchCache,
    callback::Callback,
    compiler::{CallConvention, CompileOptions, Dispatcher, ExecutionCompiler, Unspecialized},
    error::{BoxError, HookError},
    interceptor::{Interceptor, InterceptorChain},
    registry::TapRegistry,
    tap::{Tap, TapFn, TapKinds, TapOptions},
    with_options::WithOptions,
};
use futures::future::{self, BoxFuture};
use std::{fmt, future::Future, sync::Arc};

/// Registration capability shared by hooks and their wrappers.
///
/// Implementors provide [`register`](Tapable::register) and
/// [`add_interceptor`](Tapable::add_interceptor); the typed `tap*` methods
/// wrap the callback and forward to `register`.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not accept taps for `{A}`",
    label = "missing `Tapable` implementation",
    note = "Implement `register` and `add_interceptor` to accept taps."
)]
pub trait Tapable<A: HookArgs> {
    /// Register a normalized callback under `options`.
    fn register(&mut self, options: TapOptions, callback: TapFn<A>) -> Result<(), HookError>;

    /// Attach a shared interceptor.
    fn add_interceptor(&mut self, interceptor: Arc<dyn Interceptor<A>>);

    /// Register a synchronous tap.
    fn tap<O, F>(&mut self, options: O, callback: F) -> Result<(), HookError>
    where
        O: Into<TapOptions>,
        F: Fn(&A) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.register(options.into(), TapFn::from_sync(callback))
    }

    /// Register a callback-style tap.
    fn tap_async<O, F>(&mut self, options: O, callback: F) -> Result<(), HookError>
    where
        O: Into<TapOptions>,
        F: Fn(&A, Callback) + Send + Sync + 'static,
    {
        self.register(options.into(), TapFn::from_async(callback))
    }

    /// Register a future-returning tap.
    fn tap_promise<O, F, Fut>(&mut self, options: O, callback: F) -> Result<(), HookError>
    where
        O: Into<TapOptions>,
        F: Fn(&A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        self.register(options.into(), TapFn::from_promise(callback))
    }

    /// Attach an interceptor.
    fn intercept<I>(&mut self, interceptor: I)
    where
        I: Interceptor<A>,
        Self: Sized,
    {
        self.add_interceptor(Arc::new(interceptor));
    }

    /// Borrow this hook with `options` merged into every registration.
    fn with_options<O>(&mut self, options: O) -> WithOptions<'_, Self, A>
    where
        O: Into<TapOptions>,
        Self: Sized,
    {
        WithOptions::new(self, options.into())
    }
}

/// An extension point.
///
/// `A` is the argument bundle passed to every tap; `C` is the family's
/// compiler. A hook built with [`Hook::new`] has no family and fails every
/// invocation with [`HookError::Unsupported`]; hook families in `tapline-std`
/// supply a compiler.
///
/// Registration needs `&mut self`, invocation only `&self`, so a dispatcher
/// can never run while the tap list is being changed.
pub struct Hook<A: HookArgs, C = Unspecialized> {
    args: ArgNames,
    taps: TapRegistry<A>,
    interceptors: InterceptorChain<A>,
    accepts: TapKinds,
    compiler: C,
    cache: DispatchCache<A>,
}

impl<A: HookArgs> Hook<A> {
    /// Create a hook without a family compiler.
    pub fn new(args: impl Into<ArgNames>) -> Self {
        Self::with_compiler(args, Unspecialized, TapKinds::all())
    }
}

impl<A: HookArgs, C: ExecutionCompiler<A>> Hook<A, C> {
    /// Create a hook that compiles with `compiler` and accepts taps of the
    /// kinds in `accepts`.
    pub fn with_compiler(args: impl Into<ArgNames>, compiler: C, accepts: TapKinds) -> Self {
        Self {
            args: args.into(),
            taps: TapRegistry::new(),
            interceptors: InterceptorChain::new(),
            accepts,
            compiler,
            cache: DispatchCache::new(),
        }
    }

    /// The formal arguments.
    pub fn args(&self) -> &ArgNames {
        &self.args
    }

    /// The registered taps, in execution order.
    pub fn taps(&self) -> &TapRegistry<A> {
        &self.taps
    }

    /// The interceptor chain.
    pub fn interceptors(&self) -> &InterceptorChain<A> {
        &self.interceptors
    }

    /// Tap kinds this hook accepts.
    pub fn accepts(&self) -> TapKinds {
        self.accepts
    }

    /// Whether any tap or interceptor is registered.
    pub fn is_used(&self) -> bool {
        !self.taps.is_empty() || !self.interceptors.is_empty()
    }

    /// Number of dispatchers compiled over this hook's lifetime.
    pub fn compilations(&self) -> usize {
        self.cache.compilations()
    }

    /// Whether an up-to-date dispatcher is cached for `convention`.
    pub fn is_compiled(&self, convention: CallConvention) -> bool {
        self.cache.is_compiled(convention)
    }

    /// Build a dispatcher for `convention` from the current state, bypassing
    /// the cache.
    pub fn compile(&self, convention: CallConvention) -> Result<Dispatcher<A>, HookError> {
        tracing::debug!(
            %convention,
            args = %self.args,
            taps = self.taps.len(),
            interceptors = self.interceptors.len(),
            "compiling dispatcher"
        );
        self.compiler.compile(&CompileOptions {
            taps: &self.taps,
            interceptors: &self.interceptors,
            args: &self.args,
            convention,
        })
    }

    fn dispatcher(&self, convention: CallConvention) -> Result<Dispatcher<A>, HookError> {
        self.cache
            .get_or_compile(convention, || self.compile(convention))
    }

    /// Run every tap, returning when the series finishes.
    pub fn call(&self, args: &A) -> Result<(), HookError> {
        match self.dispatcher(CallConvention::Sync)? {
            Dispatcher::Sync(run) => run(args),
            other => Err(mismatch(CallConvention::Sync, &other)),
        }
    }

    /// Run every tap, reporting the outcome to `callback`.
    ///
    /// `callback` runs on the thread that completes the last tap; with only
    /// synchronous taps that is the calling thread, before this returns.
    pub fn call_async<F>(&self, args: A, callback: F)
    where
        F: FnOnce(Result<(), HookError>) + Send + 'static,
    {
        match self.dispatcher(CallConvention::Async) {
            Ok(Dispatcher::Callback(run)) => run(Arc::new(args), Box::new(callback)),
            Ok(other) => callback(Err(mismatch(CallConvention::Async, &other))),
            Err(e) => callback(Err(e)),
        }
    }

    /// Run every tap as a future.
    ///
    /// The dispatcher is resolved when this is called, so the future keeps
    /// running against the taps registered at that point.
    pub fn promise(&self, args: A) -> BoxFuture<'static, Result<(), HookError>> {
        match self.dispatcher(CallConvention::Promise) {
            Ok(Dispatcher::Promise(run)) => run(Arc::new(args)),
            Ok(other) => Box::pin(future::ready(Err(mismatch(CallConvention::Promise, &other)))),
            Err(e) => Box::pin(future::ready(Err(e))),
        }
    }
}

fn mismatch<A>(wanted: CallConvention, got: &Dispatcher<A>) -> HookError {
    HookError::Unsupported(format!(
        "running a {} dispatcher for the {wanted} convention",
        got.convention()
    ))
}

/// Check a tap against what the hook takes. `method` names the registration
/// call for error messages.
fn admit<A>(accepts: TapKinds, method: &'static str, tap: &Tap<A>) -> Result<(), HookError> {
    let kind = tap.kind();
    if !accepts.contains(kind.flag()) {
        return Err(HookError::Unsupported(format!(
            "{method} on a hook that does not take {kind} taps"
        )));
    }
    if tap.name.is_empty() {
        return Err(HookError::MissingName { method });
    }
    Ok(())
}

impl<A: HookArgs, C: ExecutionCompiler<A>> Tapable<A> for Hook<A, C> {
    fn register(&mut self, options: TapOptions, callback: TapFn<A>) -> Result<(), HookError> {
        let kind = callback.kind();
        let method = kind.method();
        if !self.accepts.contains(kind.flag()) {
            return Err(HookError::Unsupported(format!(
                "{method} on a hook that does not take {kind} taps"
            )));
        }

        let tap = Tap::from_options(options, callback)?;
        let tap = self.interceptors.run_register(tap);
        // Interceptors may have swapped the callback or the name.
        admit(self.accepts, method, &tap)?;
        self.cache.invalidate();
        self.taps.insert(tap);
        Ok(())
    }

    fn add_interceptor(&mut self, interceptor: Arc<dyn Interceptor<A>>) {
        self.cache.invalidate();
        let accepts = self.accepts;
        self.taps.rewrite(|tap| {
            interceptor
                .register(tap)
                .filter(|rewritten| match admit(accepts, "intercept", rewritten) {
                    Ok(()) => true,
                    Err(error) => {
                        tracing::debug!(tap = %tap.name, %error, "rewrite rejected, keeping tap");
                        false
                    }
                })
        });
        self.interceptors.push(interceptor);
        tracing::trace!(
            interceptors = self.interceptors.len(),
            taps = self.taps.len(),
            "interceptor added"
        );
    }
}

impl<A: HookArgs, C> fmt::Debug for Hook<A, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("args", &self.args)
            .field("taps", &self.taps)
            .field("interceptors", &self.interceptors)
            .field("accepts", &self.accepts)
            .field("cache", &self.cache)
            .finish()
    }
}
