//! # tapline-core
//!
//! Core types for the tapline extension-point runtime.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! plugins and hook families that don't need the standard families in
//! `tapline-std`.
//!
//! # Model
//!
//! - [`Tap`]: one plugin's registration (name, stage, `before` names and a
//!   [`TapFn`] tagged sync / async / promise).
//! - [`TapRegistry`]: taps in execution order, placed by constrained
//!   insertion.
//! - [`Interceptor`]: rewrites taps as they are registered and observes
//!   dispatches.
//! - [`ExecutionCompiler`]: turns the current taps into a [`Dispatcher`] for
//!   one [`CallConvention`].
//! - [`DispatchCache`]: keeps one dispatcher per convention until the next
//!   mutation.
//! - [`Hook`]: the extension point composing all of the above.
//!
//! # Error Types
//!
//! - [`HookError`] - Registration and dispatch errors
//! - [`TapError`] - Failures raised by a single tap

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod args;
mod cache;
mod callback;
mod compiler;
mod error;
mod hook;
mod interceptor;
mod registry;
mod settle;
mod tap;
mod with_options;

// Re-exports
pub use args::{ArgNames, HookArgs};
pub use cache::DispatchCache;
pub use callback::Callback;
pub use compiler::{
    CallConvention, CallbackDispatch, CompileOptions, Dispatcher, Done, ExecutionCompiler,
    PromiseDispatch, SyncDispatch, Unspecialized,
};
pub use error::{BoxError, HookError, TapError};
pub use hook::{Hook, Tapable};
pub use interceptor::{Interceptor, InterceptorChain};
pub use registry::TapRegistry;
pub use settle::settle;
pub use tap::{
    AsyncTapFn, Before, PromiseTapFn, SyncTapFn, Tap, TapFn, TapKind, TapKinds, TapOptions,
};
pub use with_options::WithOptions;
