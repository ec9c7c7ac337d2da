//! # tapline-std
//!
//! Standard implementations for the tapline extension-point runtime.
//!
//! This crate provides:
//! - **Series execution**: [`SeriesCompiler`](series::SeriesCompiler)
//! - **Hook families**: [`SyncHook`](hooks::SyncHook),
//!   [`AsyncSeriesHook`](hooks::AsyncSeriesHook)
//! - **Interceptors**: Logging, closure-based
//! - **Timeouts** for future-returning taps (`timeout` feature)
//! - **Testing** helpers

#![deny(clippy::pub_use, clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use tapline_core;

// Modules
pub mod hooks;
pub mod interceptors;
pub mod series;
pub mod testing;
#[cfg(feature = "timeout")]
pub mod timeout;
