//! The execution-compiler contract and compiled dispatchers.
//!
//! A hook never runs its taps directly. On the first invocation after a
//! mutation it asks its family's [`ExecutionCompiler`] for a [`Dispatcher`]
//! for the requested [`CallConvention`], caches it, and runs it until the next
//! mutation. Dispatchers own a snapshot of the taps and interceptors they were
//! built from.

use crate::{
    args::{ArgNames, HookArgs},
    error::HookError,
    interceptor::InterceptorChain,
    registry::TapRegistry,
};
use futures::future::BoxFuture;
use std::{fmt, sync::Arc};

/// How a hook is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallConvention {
    /// `call`: returns when every tap has run.
    Sync,
    /// `call_async`: reports completion through a callback.
    Async,
    /// `promise`: returns a future.
    Promise,
}

impl CallConvention {
    /// All conventions, in cache-slot order.
    pub const ALL: [CallConvention; 3] = [
        CallConvention::Sync,
        CallConvention::Async,
        CallConvention::Promise,
    ];

    pub(crate) const fn slot(self) -> usize {
        match self {
            CallConvention::Sync => 0,
            CallConvention::Async => 1,
            CallConvention::Promise => 2,
        }
    }

    /// The lowercase tag of this convention.
    pub const fn as_str(self) -> &'static str {
        match self {
            CallConvention::Sync => "sync",
            CallConvention::Async => "async",
            CallConvention::Promise => "promise",
        }
    }
}

impl fmt::Display for CallConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Completion callback of the async convention.
pub type Done = Box<dyn FnOnce(Result<(), HookError>) + Send + 'static>;

/// Compiled body of the sync convention.
pub type SyncDispatch<A> = Arc<dyn Fn(&A) -> Result<(), HookError> + Send + Sync + 'static>;

/// Compiled body of the async convention.
pub type CallbackDispatch<A> = Arc<dyn Fn(Arc<A>, Done) + Send + Sync + 'static>;

/// Compiled body of the promise convention.
pub type PromiseDispatch<A> =
    Arc<dyn Fn(Arc<A>) -> BoxFuture<'static, Result<(), HookError>> + Send + Sync + 'static>;

/// A compiled dispatcher for one calling convention.
pub enum Dispatcher<A> {
    /// Runs the series and returns its outcome.
    Sync(SyncDispatch<A>),
    /// Runs the series and reports its outcome to a callback.
    Callback(CallbackDispatch<A>),
    /// Runs the series as a future.
    Promise(PromiseDispatch<A>),
}

impl<A> Dispatcher<A> {
    /// The convention this dispatcher implements.
    pub fn convention(&self) -> CallConvention {
        match self {
            Dispatcher::Sync(_) => CallConvention::Sync,
            Dispatcher::Callback(_) => CallConvention::Async,
            Dispatcher::Promise(_) => CallConvention::Promise,
        }
    }
}

impl<A> Clone for Dispatcher<A> {
    fn clone(&self) -> Self {
        match self {
            Dispatcher::Sync(f) => Dispatcher::Sync(Arc::clone(f)),
            Dispatcher::Callback(f) => Dispatcher::Callback(Arc::clone(f)),
            Dispatcher::Promise(f) => Dispatcher::Promise(Arc::clone(f)),
        }
    }
}

impl<A> fmt::Debug for Dispatcher<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dispatcher::{:?}", self.convention())
    }
}

/// Everything a compiler may read when building a dispatcher.
pub struct CompileOptions<'a, A> {
    /// The taps, in execution order.
    pub taps: &'a TapRegistry<A>,
    /// The interceptor chain.
    pub interceptors: &'a InterceptorChain<A>,
    /// The hook's formal arguments.
    pub args: &'a ArgNames,
    /// The convention being invoked (not the kind of any tap).
    pub convention: CallConvention,
}

/// Builds dispatchers for one hook family.
///
/// [`setup`](ExecutionCompiler::setup) snapshots whatever the family needs
/// from the hook; [`create`](ExecutionCompiler::create) turns that snapshot
/// into a dispatcher for the requested convention.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot compile dispatchers for hooks over `{A}`",
    label = "missing `ExecutionCompiler` implementation",
    note = "Implement `setup` and `create` to give a hook family its dispatch semantics."
)]
pub trait ExecutionCompiler<A: HookArgs>: Send + Sync + 'static {
    /// Compiler state prepared from a hook.
    type Plan;

    /// Prepare compiler state from the hook's current taps and interceptors.
    fn setup(&self, options: &CompileOptions<'_, A>) -> Result<Self::Plan, HookError>;

    /// Build the dispatcher.
    fn create(
        &self,
        plan: Self::Plan,
        convention: CallConvention,
    ) -> Result<Dispatcher<A>, HookError>;

    /// [`setup`](ExecutionCompiler::setup) followed by
    /// [`create`](ExecutionCompiler::create).
    fn compile(&self, options: &CompileOptions<'_, A>) -> Result<Dispatcher<A>, HookError> {
        let plan = self.setup(options)?;
        self.create(plan, options.convention)
    }
}

/// Compiler of a hook with no family: every compilation fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unspecialized;

impl<A: HookArgs> ExecutionCompiler<A> for Unspecialized {
    type Plan = ();

    fn setup(&self, _options: &CompileOptions<'_, A>) -> Result<(), HookError> {
        Err(HookError::Unsupported(
            "compiling a hook without a family compiler".to_string(),
        ))
    }

    fn create(&self, _plan: (), convention: CallConvention) -> Result<Dispatcher<A>, HookError> {
        Err(HookError::Unsupported(format!(
            "creating a {convention} dispatcher without a family compiler"
        )))
    }
}
