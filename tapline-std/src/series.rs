//! Series execution: taps run one at a time, in registry order.
//!
//! [`SeriesCompiler`] specializes the heterogeneous tap list once per calling
//! convention:
//!
//! - **sync**: every tap must be synchronous; the dispatcher loops over them.
//! - **async**: a cursor over the taps driven by a loop. Taps that complete
//!   before returning (every sync tap, and async or promise taps that finish
//!   inline) are stepped over in place; at a tap that is still pending the
//!   series parks and resumes on whichever thread completes its
//!   [`Callback`] or settles its future.
//! - **promise**: every tap is adapted to a future up front; the dispatcher
//!   awaits them in turn.
//!
//! The first failing tap aborts the series. Its error is reported as
//! [`HookError::Tap`] through the convention's error channel; later taps do
//! not run. Interceptors see `call` before the first tap, `tap` before each
//! tap, then either `error` or `done`.

use futures::{
    FutureExt,
    channel::oneshot,
    future::{self, BoxFuture},
};
use std::{
    mem,
    sync::{Arc, Mutex, PoisonError},
};
use tapline_core::{
    CallConvention, Callback, CompileOptions, Dispatcher, Done, ExecutionCompiler, HookArgs,
    HookError, InterceptorChain, SyncTapFn, Tap, TapError, TapFn, settle,
};

/// Compiler for the series family.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeriesCompiler;

/// Snapshot of a hook taken by [`SeriesCompiler::setup`].
pub struct SeriesPlan<A> {
    taps: Vec<Arc<Tap<A>>>,
    interceptors: InterceptorChain<A>,
}

impl<A> SeriesPlan<A> {
    /// Number of taps in the series.
    pub fn len(&self) -> usize {
        self.taps.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }
}

impl<A: HookArgs> ExecutionCompiler<A> for SeriesCompiler {
    type Plan = SeriesPlan<A>;

    fn setup(&self, options: &CompileOptions<'_, A>) -> Result<SeriesPlan<A>, HookError> {
        Ok(SeriesPlan {
            taps: options.taps.iter().cloned().map(Arc::new).collect(),
            interceptors: options.interceptors.clone(),
        })
    }

    fn create(
        &self,
        plan: SeriesPlan<A>,
        convention: CallConvention,
    ) -> Result<Dispatcher<A>, HookError> {
        match convention {
            CallConvention::Sync => sync_dispatcher(plan).map(Dispatcher::Sync),
            CallConvention::Async => Ok(Dispatcher::Callback(callback_dispatcher(plan))),
            CallConvention::Promise => Ok(Dispatcher::Promise(promise_dispatcher(plan))),
        }
    }
}

/// Wrap a tap failure with its position; the `on_error(index, error)` edge.
fn fail<A>(index: usize, tap: &Tap<A>, source: TapError) -> HookError {
    #[cfg(feature = "tracing")]
    tracing::debug!(index, tap = %tap.name, error = %source, "tap failed, aborting series");
    HookError::Tap {
        index,
        name: tap.name.clone(),
        source,
    }
}

fn finish<A: 'static>(
    interceptors: &InterceptorChain<A>,
    result: Result<(), HookError>,
) -> Result<(), HookError> {
    match &result {
        Ok(()) => interceptors.on_done(),
        Err(e) => interceptors.on_error(e),
    }
    result
}

// ============================================================================
// sync
// ============================================================================

fn sync_dispatcher<A: HookArgs>(
    plan: SeriesPlan<A>,
) -> Result<tapline_core::SyncDispatch<A>, HookError> {
    let mut steps: Vec<(Arc<Tap<A>>, Arc<SyncTapFn<A>>)> = Vec::with_capacity(plan.taps.len());
    for tap in plan.taps {
        let f = match &tap.callback {
            TapFn::Sync(f) => Arc::clone(f),
            other => {
                return Err(HookError::Unsupported(format!(
                    "running {} tap `{}` under the sync convention",
                    other.kind(),
                    tap.name
                )));
            }
        };
        steps.push((tap, f));
    }

    let interceptors = plan.interceptors;
    Ok(Arc::new(move |args: &A| -> Result<(), HookError> {
        interceptors.on_call(args);
        let result = steps.iter().enumerate().try_for_each(|(index, (tap, f))| {
            interceptors.on_tap(tap);
            f(args).map_err(|e| fail(index, tap, TapError::Failed(e)))
        });
        finish(&interceptors, result)
    }))
}

// ============================================================================
// async (cursor)
// ============================================================================

/// One invocation's progress through the series.
struct Series<A> {
    steps: Arc<[Arc<Tap<A>>]>,
    interceptors: InterceptorChain<A>,
    args: Arc<A>,
    next: usize,
    done: Done,
}

impl<A: HookArgs> Series<A> {
    /// Run taps until the series ends or parks at a tap that has not
    /// completed yet. Taps that complete before returning are handled in
    /// this loop, so the stack does not grow with the number of taps.
    fn run(mut self) {
        while let Some(tap) = self.steps.get(self.next).cloned() {
            let index = self.next;
            self.next += 1;
            self.interceptors.on_tap(&tap);

            let outcome = match &tap.callback {
                TapFn::Sync(f) => f(&self.args).map_err(TapError::Failed),
                TapFn::Async(f) => {
                    let handoff = Handoff::new();
                    let completion = Arc::clone(&handoff);
                    f(
                        &self.args,
                        Callback::new(move |result| completion.complete(result)),
                    );
                    match handoff.park(self) {
                        Some((series, outcome)) => {
                            self = series;
                            outcome
                        }
                        None => return,
                    }
                }
                TapFn::Promise(f) => {
                    let handoff = Handoff::new();
                    let completion = Arc::clone(&handoff);
                    settle(f(&self.args), move |result| {
                        completion.complete(result.map_err(TapError::Failed))
                    });
                    match handoff.park(self) {
                        Some((series, outcome)) => {
                            self = series;
                            outcome
                        }
                        None => return,
                    }
                }
            };

            if let Err(e) = outcome {
                return self.abort(index, e);
            }
        }
        (self.done)(Ok(()))
    }

    /// Continue after the tap the series parked at completed.
    fn resume(self, outcome: Result<(), TapError>) {
        match outcome {
            Ok(()) => self.run(),
            Err(e) => {
                let index = self.next - 1;
                self.abort(index, e);
            }
        }
    }

    fn abort(self, index: usize, source: TapError) {
        let error = fail(index, &self.steps[index], source);
        (self.done)(Err(error))
    }
}

enum Slot<A> {
    Running,
    Completed(Result<(), TapError>),
    Parked(Series<A>),
    Settled,
}

/// Meeting point between the loop driving a series and the completion of
/// the tap it is waiting on. Whichever side arrives second continues the
/// series.
struct Handoff<A> {
    slot: Mutex<Slot<A>>,
}

impl<A: HookArgs> Handoff<A> {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            slot: Mutex::new(Slot::Running),
        })
    }

    /// Called by the tap's completion.
    fn complete(&self, outcome: Result<(), TapError>) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        match mem::replace(&mut *slot, Slot::Settled) {
            Slot::Running => *slot = Slot::Completed(outcome),
            Slot::Parked(series) => {
                drop(slot);
                series.resume(outcome);
            }
            // A `Callback` completes at most once.
            other => *slot = other,
        }
    }

    /// Called by the driving loop once the tap returned. Hands the series
    /// back if the tap already completed, otherwise keeps it for `complete`.
    fn park(&self, series: Series<A>) -> Option<(Series<A>, Result<(), TapError>)> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        match mem::replace(&mut *slot, Slot::Settled) {
            Slot::Completed(outcome) => Some((series, outcome)),
            _ => {
                *slot = Slot::Parked(series);
                None
            }
        }
    }
}

fn callback_dispatcher<A: HookArgs>(plan: SeriesPlan<A>) -> tapline_core::CallbackDispatch<A> {
    let steps: Arc<[Arc<Tap<A>>]> = plan.taps.into();
    let interceptors = plan.interceptors;

    Arc::new(move |args: Arc<A>, done: Done| {
        interceptors.on_call(&args);
        let observers = interceptors.clone();
        Series {
            steps: Arc::clone(&steps),
            interceptors: interceptors.clone(),
            args,
            next: 0,
            done: Box::new(move |result: Result<(), HookError>| {
                done(finish(&observers, result))
            }),
        }
        .run();
    })
}

// ============================================================================
// promise
// ============================================================================

type Run<A> = Arc<dyn Fn(&A) -> BoxFuture<'static, Result<(), TapError>> + Send + Sync + 'static>;

fn promise_dispatcher<A: HookArgs>(plan: SeriesPlan<A>) -> tapline_core::PromiseDispatch<A> {
    let steps: Arc<[(Arc<Tap<A>>, Run<A>)]> = plan
        .taps
        .into_iter()
        .map(|tap| {
            let run = as_future(&tap.callback);
            (tap, run)
        })
        .collect();
    let interceptors = plan.interceptors;

    Arc::new(move |args: Arc<A>| -> BoxFuture<'static, Result<(), HookError>> {
        let steps = Arc::clone(&steps);
        let interceptors = interceptors.clone();
        Box::pin(async move {
            interceptors.on_call(&args);
            let mut result = Ok(());
            for (index, (tap, run)) in steps.iter().enumerate() {
                interceptors.on_tap(tap);
                if let Err(e) = run(&args).await {
                    result = Err(fail(index, tap, e));
                    break;
                }
            }
            finish(&interceptors, result)
        })
    })
}

/// Adapt any tap to a future-returning step.
fn as_future<A: HookArgs>(callback: &TapFn<A>) -> Run<A> {
    match callback.clone() {
        TapFn::Sync(f) => Arc::new(move |args: &A| -> BoxFuture<'static, Result<(), TapError>> {
            Box::pin(future::ready(f(args).map_err(TapError::Failed)))
        }),
        TapFn::Async(f) => Arc::new(move |args: &A| -> BoxFuture<'static, Result<(), TapError>> {
            let (tx, rx) = oneshot::channel();
            f(
                args,
                Callback::new(move |result| {
                    let _ = tx.send(result);
                }),
            );
            Box::pin(rx.map(|received| received.unwrap_or(Err(TapError::CallbackDropped))))
        }),
        TapFn::Promise(f) => Arc::new(move |args: &A| -> BoxFuture<'static, Result<(), TapError>> {
            Box::pin(f(args).map(|result| result.map_err(TapError::Failed)))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tapline_core::{ArgNames, Hook, TapKinds, Tapable};

    type Log = Arc<Mutex<Vec<String>>>;

    fn hook() -> Hook<Log, SeriesCompiler> {
        Hook::with_compiler(ArgNames::from(["log"]), SeriesCompiler, TapKinds::all())
    }

    fn log() -> Log {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[test]
    fn sync_convention_rejects_async_taps() {
        let mut hook = hook();
        hook.tap("a", |_| Ok(())).unwrap();
        hook.tap_async("b", |_, cb| cb.done()).unwrap();

        let err = hook.call(&log()).unwrap_err();
        assert!(matches!(err, HookError::Unsupported(_)));
        assert!(err.to_string().contains("`b`"));
        assert!(!hook.is_compiled(CallConvention::Sync));
    }

    #[test]
    fn callback_convention_runs_mixed_taps_in_order() {
        let mut hook = hook();
        hook.tap("one", |l: &Log| {
            l.lock().unwrap().push("one".into());
            Ok(())
        })
        .unwrap();
        hook.tap_async("two", |l: &Log, cb: Callback| {
            l.lock().unwrap().push("two".into());
            cb.done();
        })
        .unwrap();
        hook.tap_promise("three", |l: &Log| {
            let l = l.clone();
            async move {
                l.lock().unwrap().push("three".into());
                Ok(())
            }
        })
        .unwrap();

        let entries = log();
        let (tx, rx) = std::sync::mpsc::channel();
        hook.call_async(entries.clone(), move |res| tx.send(res.is_ok()).unwrap());

        assert_eq!(rx.try_recv(), Ok(true));
        assert_eq!(*entries.lock().unwrap(), ["one", "two", "three"]);
    }

    #[test]
    fn callback_convention_stops_at_failed_callback() {
        let mut hook = hook();
        hook.tap_async("fails", |_, cb| cb.fail("nope")).unwrap();
        hook.tap("after", |l: &Log| {
            l.lock().unwrap().push("after".into());
            Ok(())
        })
        .unwrap();

        let entries = log();
        let (tx, rx) = std::sync::mpsc::channel();
        hook.call_async(entries.clone(), move |res| tx.send(res).unwrap());

        let err = rx.try_recv().unwrap().unwrap_err();
        assert_eq!(err.tap_index(), Some(0));
        assert_eq!(err.tap_name(), Some("fails"));
        assert!(entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn promise_convention_reports_dropped_callback() {
        let mut hook = hook();
        hook.tap_async("forgetful", |_, cb| drop(cb)).unwrap();

        let err = hook.promise(log()).await.unwrap_err();
        assert!(matches!(
            err,
            HookError::Tap {
                index: 0,
                source: TapError::CallbackDropped,
                ..
            }
        ));
    }

    #[test]
    fn plan_snapshots_taps() {
        let mut hook = hook();
        hook.tap("a", |_| Ok(())).unwrap();
        let plan = SeriesCompiler
            .setup(&CompileOptions {
                taps: hook.taps(),
                interceptors: hook.interceptors(),
                args: hook.args(),
                convention: CallConvention::Promise,
            })
            .unwrap();
        assert_eq!(plan.len(), 1);
        assert!(!plan.is_empty());
    }
}
