//! # tapline - Extension Points with Ordered Taps
//!
//! A host declares *hooks*; plugins register *taps* against them; invoking a
//! hook runs every tap in a deterministic order under one of three calling
//! conventions (blocking `call`, callback-completed `call_async`, or a
//! `promise` future).
//!
//! Tap order is decided once, at registration, from each tap's `stage` and
//! `before` names. The dispatcher for each calling convention is compiled on
//! first use and reused until the hook changes.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tapline::prelude::*;
//!
//! let mut emit = AsyncSeriesHook::<Assets>::new(["assets"]);
//! emit.tap("write", |assets| write_all(assets))?;
//! emit.tap(TapOptions::named("hash").before("write"), |assets| hash(assets))?;
//! emit.tap_promise("upload", |assets| upload(assets.clone()))?;
//!
//! emit.promise(assets).await?;
//! ```

#![deny(clippy::pub_use, clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use tapline_core::{
    // Arguments
    ArgNames,
    // Taps
    AsyncTapFn,
    Before,
    // Error types
    BoxError,
    Callback,
    // Compilation
    CallConvention,
    CallbackDispatch,
    CompileOptions,
    DispatchCache,
    Dispatcher,
    Done,
    ExecutionCompiler,
    // Hook
    Hook,
    HookArgs,
    HookError,
    // Interceptors
    Interceptor,
    InterceptorChain,
    PromiseDispatch,
    PromiseTapFn,
    SyncDispatch,
    SyncTapFn,
    Tap,
    TapError,
    TapFn,
    TapKind,
    TapKinds,
    TapOptions,
    TapRegistry,
    Tapable,
    Unspecialized,
    WithOptions,
    settle,
};

// Hook families
pub use tapline_std::hooks::{AsyncSeriesHook, SyncHook};

// Series execution
pub use tapline_std::series::{SeriesCompiler, SeriesPlan};

/// Standard interceptors.
pub mod interceptors {
    pub use tapline_std::interceptors::{FnInterceptor, LoggingInterceptor};
}

/// Testing utilities.
pub mod testing {
    pub use tapline_std::testing::{CallLog, RecordingInterceptor};
}

/// Time limits for future-returning taps.
#[cfg(feature = "timeout")]
pub mod timeout {
    pub use tapline_std::timeout::{TimeoutError, with_timeout};
}

/// Prelude module - common imports for tapline.
///
/// # Usage
///
/// ```rust,ignore
/// use tapline::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Hook families
        AsyncSeriesHook,
        // Errors
        BoxError,
        // Taps
        Callback,
        // Invocation
        CallConvention,
        HookError,
        // Interceptors
        Interceptor,
        SyncHook,
        Tap,
        TapError,
        TapKind,
        TapOptions,
        // Registration
        Tapable,
    };
    pub use futures::future::BoxFuture;
}
