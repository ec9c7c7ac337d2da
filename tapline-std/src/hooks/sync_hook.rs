//! The synchronous series hook.

use crate::series::SeriesCompiler;
use futures::future::BoxFuture;
use std::{fmt, future::Future, sync::Arc};
use tapline_core::{
    ArgNames, BoxError, CallConvention, Callback, Hook, HookArgs, HookError, Interceptor,
    TapFn, TapKinds, TapOptions, TapRegistry, Tapable,
};

/// A hook whose taps are all synchronous and run in series.
///
/// `tap_async` and `tap_promise` always fail with
/// [`HookError::Unsupported`]; nothing is registered. The hook can still be
/// invoked under every convention: `call_async` and `promise` simply report
/// the synchronous outcome through a callback or a ready future.
///
/// # Example
///
/// ```rust,ignore
/// let mut compile = SyncHook::<Compilation>::new(["compilation"]);
/// compile.tap("minify", |c| c.minify())?;
/// compile.call(&compilation)?;
/// ```
pub struct SyncHook<A: HookArgs> {
    inner: Hook<A, SeriesCompiler>,
}

impl<A: HookArgs> SyncHook<A> {
    /// Create a hook with the given formal argument names.
    pub fn new(args: impl Into<ArgNames>) -> Self {
        Self {
            inner: Hook::with_compiler(args, SeriesCompiler, TapKinds::SYNC),
        }
    }

    /// Run every tap in order, stopping at the first failure.
    pub fn call(&self, args: &A) -> Result<(), HookError> {
        self.inner.call(args)
    }

    /// Run every tap and report the outcome to `callback` before returning.
    pub fn call_async<F>(&self, args: A, callback: F)
    where
        F: FnOnce(Result<(), HookError>) + Send + 'static,
    {
        self.inner.call_async(args, callback);
    }

    /// Run every tap when the returned future is first polled.
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

impl<A: HookArgs> Tapable<A> for SyncHook<A> {
    fn register(&mut self, options: TapOptions, callback: TapFn<A>) -> Result<(), HookError> {
        self.inner.register(options, callback)
    }

    fn add_interceptor(&mut self, interceptor: Arc<dyn Interceptor<A>>) {
        self.inner.add_interceptor(interceptor);
    }

    fn tap_async<O, F>(&mut self, _options: O, _callback: F) -> Result<(), HookError>
    where
        O: Into<TapOptions>,
        F: Fn(&A, Callback) + Send + Sync + 'static,
    {
        Err(HookError::Unsupported("tap_async on a SyncHook".into()))
    }

    fn tap_promise<O, F, Fut>(&mut self, _options: O, _callback: F) -> Result<(), HookError>
    where
        O: Into<TapOptions>,
        F: Fn(&A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        Err(HookError::Unsupported("tap_promise on a SyncHook".into()))
    }
}

impl<A: HookArgs> fmt::Debug for SyncHook<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SyncHook").field(&self.inner).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, mpsc};

    type Seen = Arc<Mutex<Vec<&'static str>>>;

    fn push(name: &'static str) -> impl Fn(&Seen) -> Result<(), BoxError> + Send + Sync {
        move |seen: &Seen| {
            seen.lock().unwrap().push(name);
            Ok(())
        }
    }

    #[test]
    fn rejects_async_and_promise_taps() {
        let mut hook = SyncHook::<Seen>::new(["seen"]);

        let err = hook.tap_async("a", |_, cb| cb.done()).unwrap_err();
        assert_eq!(err.to_string(), "tap_async on a SyncHook is not supported");

        let err = hook
            .tap_promise("p", |_| async { Ok(()) })
            .unwrap_err();
        assert_eq!(err.to_string(), "tap_promise on a SyncHook is not supported");

        assert!(hook.taps().is_empty());
        assert!(!hook.is_used());
    }

    #[test]
    fn rejection_also_applies_through_presets() {
        let mut hook = SyncHook::<Seen>::new(["seen"]);
        let err = hook
            .with_options(TapOptions::new().stage(1))
            .tap_async("a", |_, cb| cb.done())
            .unwrap_err();
        assert!(matches!(err, HookError::Unsupported(_)));
        assert!(hook.taps().is_empty());
    }

    #[test]
    fn call_runs_taps_in_order_and_short_circuits() {
        let mut hook = SyncHook::<Seen>::new(["seen"]);
        hook.tap("a", push("a")).unwrap();
        hook.tap("b", |_: &Seen| Err("broken".into())).unwrap();
        hook.tap("c", push("c")).unwrap();

        let seen = Seen::default();
        let err = hook.call(&seen).unwrap_err();
        assert_eq!(err.tap_name(), Some("b"));
        assert_eq!(err.to_string(), "tap `b` (#1) failed: broken");
        assert_eq!(*seen.lock().unwrap(), ["a"]);
    }

    #[test]
    fn call_async_completes_before_returning() {
        let mut hook = SyncHook::<Seen>::new(["seen"]);
        hook.tap("a", push("a")).unwrap();

        let (tx, rx) = mpsc::channel();
        let seen = Seen::default();
        hook.call_async(seen.clone(), move |res| tx.send(res.is_ok()).unwrap());
        assert_eq!(rx.try_recv(), Ok(true));
        assert_eq!(*seen.lock().unwrap(), ["a"]);
    }

    #[tokio::test]
    async fn promise_resolves_with_the_series_outcome() {
        let mut hook = SyncHook::<Seen>::new(["seen"]);
        hook.tap("a", push("a")).unwrap();
        hook.tap("b", push("b")).unwrap();

        let seen = Seen::default();
        hook.promise(seen.clone()).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), ["a", "b"]);
    }

    #[test]
    fn empty_hook_succeeds_under_every_convention() {
        let hook = SyncHook::<Seen>::new(["seen"]);
        assert!(hook.call(&Seen::default()).is_ok());

        let (tx, rx) = mpsc::channel();
        hook.call_async(Seen::default(), move |res| tx.send(res.is_ok()).unwrap());
        assert_eq!(rx.try_recv(), Ok(true));

        assert!(futures::executor::block_on(hook.promise(Seen::default())).is_ok());
    }

    #[test]
    fn dispatcher_is_reused_until_a_tap_is_added() {
        let mut hook = SyncHook::<Seen>::new(["seen"]);
        hook.tap("a", push("a")).unwrap();

        let seen = Seen::default();
        hook.call(&seen).unwrap();
        hook.call(&seen).unwrap();
        assert_eq!(hook.compilations(), 1);
        assert!(hook.is_compiled(CallConvention::Sync));

        hook.tap("b", push("b")).unwrap();
        assert!(!hook.is_compiled(CallConvention::Sync));
        hook.call(&seen).unwrap();
        assert_eq!(hook.compilations(), 2);
        assert_eq!(*seen.lock().unwrap(), ["a", "a", "a", "b"]);
    }
}
