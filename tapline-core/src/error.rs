//! Error types for tapline.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`HookError`] - Top-level error type for registration and dispatch
//! - [`TapError`] - Failures raised by a single tap during dispatch
//!
//! Registration errors ([`HookError::InvalidArgument`],
//! [`HookError::MissingName`], [`HookError::Unsupported`]) are programmer
//! errors and are returned at the call site. [`HookError::Tap`] is produced
//! by a dispatcher when a tap fails and the series is aborted.

use thiserror::Error;

/// A boxed error type for plugin-supplied failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all tapline operations.
#[derive(Error, Debug)]
pub enum HookError {
    /// The registration input was malformed.
    #[error("invalid arguments to {method}: {reason}")]
    InvalidArgument {
        /// The registration method that rejected the input.
        method: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// The registration record had no name, or an empty one.
    #[error("missing name for {method}")]
    MissingName {
        /// The registration method that rejected the input.
        method: &'static str,
    },

    /// The operation is not available on this hook.
    #[error("{0} is not supported")]
    Unsupported(String),

    /// A tap failed during dispatch; the remaining taps were skipped.
    #[error("tap `{name}` (#{index}) failed: {source}")]
    Tap {
        /// Position of the failing tap in the series.
        index: usize,
        /// Name of the failing tap.
        name: String,
        /// The failure itself.
        #[source]
        source: TapError,
    },
}

impl HookError {
    /// Returns the failing tap's position if this is a tap failure.
    pub fn tap_index(&self) -> Option<usize> {
        match self {
            HookError::Tap { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// Returns the failing tap's name if this is a tap failure.
    pub fn tap_name(&self) -> Option<&str> {
        match self {
            HookError::Tap { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Errors raised by an individual tap.
#[derive(Error, Debug)]
pub enum TapError {
    /// The tap returned an error, failed its callback, or its future resolved
    /// to an error.
    #[error(transparent)]
    Failed(BoxError),

    /// The completion callback handed to an async tap was dropped without
    /// being completed.
    #[error("completion callback dropped before it was called")]
    CallbackDropped,
}

impl From<BoxError> for TapError {
    fn from(err: BoxError) -> Self {
        TapError::Failed(err)
    }
}
