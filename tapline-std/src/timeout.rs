//! Time limits for future-returning taps.

use futures::future::BoxFuture;
use std::{future::Future, time::Duration};
use tapline_core::BoxError;
use tokio::time::timeout;

/// Error returned when a tap exceeds its time limit.
#[derive(Debug, Clone, thiserror::Error)]
#[error("tap timed out after {duration:?}")]
pub struct TimeoutError {
    /// The limit that was exceeded.
    pub duration: Duration,
}

/// Wrap a future-returning tap so it fails with [`TimeoutError`] when it
/// runs longer than `duration`.
///
/// The returned closure is registered with `tap_promise`. It uses the tokio
/// timer, so the hook must be driven inside a tokio runtime with time enabled.
///
/// # Example
///
/// ```rust,ignore
/// hook.tap_promise("fetch", with_timeout(Duration::from_secs(5), fetch))?;
/// ```
pub fn with_timeout<A, F, Fut>(
    duration: Duration,
    tap: F,
) -> impl Fn(&A) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync + 'static
where
    A: 'static,
    F: Fn(&A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    move |args: &A| -> BoxFuture<'static, Result<(), BoxError>> {
        let pending = tap(args);
        Box::pin(async move {
            match timeout(duration, pending).await {
                Ok(result) => result,
                Err(_) => Err(Box::new(TimeoutError { duration }) as BoxError),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::AsyncSeriesHook;
    use tapline_core::{ArgNames, HookError, TapError, Tapable};

    #[tokio::test]
    async fn slow_tap_times_out() {
        let mut hook = AsyncSeriesHook::<()>::new(ArgNames::default());
        hook.tap_promise(
            "slow",
            with_timeout(Duration::from_millis(10), |_: &()| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            }),
        )
        .unwrap();

        match hook.promise(()).await.unwrap_err() {
            HookError::Tap {
                source: TapError::Failed(source),
                ..
            } => assert!(source.downcast_ref::<TimeoutError>().is_some()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn fast_tap_passes_through() {
        let mut hook = AsyncSeriesHook::<()>::new(ArgNames::default());
        hook.tap_promise(
            "fast",
            with_timeout(Duration::from_secs(5), |_: &()| async { Ok(()) }),
        )
        .unwrap();
        assert!(hook.promise(()).await.is_ok());
    }
}
