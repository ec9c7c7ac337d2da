use std::sync::{Arc, Mutex};
use tapline::{
    Callback, CallConvention, HookError, Interceptor, Tap, TapFn, TapKind, TapOptions, Tapable,
    interceptors::{FnInterceptor, LoggingInterceptor},
    testing::{CallLog, RecordingInterceptor},
};

mod common;
use common::{Compilation, call_async_blocking, noop, series_hook, sync_hook};

struct Uppercase;

impl<A: 'static> Interceptor<A> for Uppercase {
    fn register(&self, tap: &Tap<A>) -> Option<Tap<A>> {
        Some(tap.renamed(tap.name.to_uppercase()))
    }
}

#[test]
fn register_applies_to_existing_and_later_taps() {
    let mut hook = sync_hook();
    hook.tap("x", noop).unwrap();
    hook.intercept(Uppercase);
    hook.tap("y", noop).unwrap();

    assert_eq!(hook.taps().names(), ["X", "Y"]);
}

#[test]
fn retroactive_rewrite_keeps_positions() {
    let mut hook = sync_hook();
    hook.tap(TapOptions::named("late").stage(5), noop).unwrap();
    hook.tap(TapOptions::named("early").stage(-5), noop).unwrap();

    // Moving every tap to stage 0 must not re-sort them.
    hook.intercept(FnInterceptor::new().on_register(|tap: &Tap<Compilation>| {
        let mut tap = tap.clone();
        tap.stage = 0;
        Some(tap)
    }));

    assert_eq!(hook.taps().names(), ["early", "late"]);
    assert!(hook.taps().iter().all(|t| t.stage == 0));
}

#[test]
fn interceptors_run_in_chain_order() {
    let mut hook = sync_hook();
    hook.intercept(FnInterceptor::new().on_register(|tap: &Tap<Compilation>| {
        Some(tap.renamed(format!("{}-first", tap.name)))
    }));
    hook.intercept(FnInterceptor::new().on_register(|tap: &Tap<Compilation>| {
        Some(tap.renamed(format!("{}-second", tap.name)))
    }));
    hook.tap("t", noop).unwrap();

    assert_eq!(hook.taps().names(), ["t-first-second"]);
}

#[test]
fn rewritten_before_is_honored_at_insertion() {
    let mut hook = sync_hook();
    hook.tap("a", noop).unwrap();
    hook.intercept(FnInterceptor::new().on_register(|tap: &Tap<Compilation>| {
        (tap.name == "b").then(|| {
            let mut tap = tap.clone();
            tap.before = vec!["a".to_owned()];
            tap
        })
    }));
    hook.tap("b", noop).unwrap();

    assert_eq!(hook.taps().names(), ["b", "a"]);
}

#[test]
fn dispatch_events_are_observed() {
    let log = CallLog::new();
    let recorder = RecordingInterceptor::new();
    let mut hook = series_hook();
    hook.tap("a", |c: &Compilation| {
        c.log.push("a");
        Ok(())
    })
    .unwrap();
    hook.tap("b", |c: &Compilation| {
        c.log.push("b");
        Ok(())
    })
    .unwrap();
    hook.intercept(recorder.clone());
    hook.intercept(LoggingInterceptor::new("emit"));

    call_async_blocking(&hook, Compilation::default()).unwrap();
    assert_eq!(recorder.events(), ["call", "tap:a", "tap:b", "done"]);

    recorder.clear();
    hook.tap("c", log.failing("c", "bad")).unwrap();
    assert!(call_async_blocking(&hook, Compilation::default()).is_err());
    assert_eq!(
        recorder.events(),
        ["call", "tap:a", "tap:b", "tap:c", "error:c"]
    );
}

#[test]
fn empty_hook_still_reports_call_and_done() {
    let recorder = RecordingInterceptor::new();
    let mut hook = sync_hook();
    hook.intercept(recorder.clone());

    hook.call(&Compilation::default()).unwrap();
    assert_eq!(recorder.events(), ["call", "done"]);
    assert!(hook.is_used());
}

#[test]
fn call_observer_sees_the_arguments() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut hook = sync_hook();
    hook.intercept(FnInterceptor::new().on_call({
        let seen = Arc::clone(&seen);
        move |c: &Compilation| seen.lock().unwrap().push(c.id)
    }));

    hook.call(&Compilation::new(3)).unwrap();
    hook.call(&Compilation::new(4)).unwrap();
    assert_eq!(*seen.lock().unwrap(), [3, 4]);
}

// ============================================================================
// Rewrites that break the hook's rules
// ============================================================================

fn to_callback_style(tap: &Tap<Compilation>) -> Option<Tap<Compilation>> {
    Some(Tap {
        callback: TapFn::from_async(|_: &Compilation, done: Callback| done.done()),
        ..tap.clone()
    })
}

#[test]
fn sync_hook_rejects_rewrites_to_other_kinds() {
    let mut hook = sync_hook();
    hook.tap("existing", noop).unwrap();
    hook.intercept(FnInterceptor::new().on_register(to_callback_style));

    assert_eq!(hook.taps().iter().map(Tap::kind).collect::<Vec<_>>(), [TapKind::Sync]);
    let err = hook.tap("new", noop).unwrap_err();
    assert!(matches!(err, HookError::Unsupported(_)));
    assert_eq!(hook.taps().names(), ["existing"]);

    assert!(hook.call(&Compilation::default()).is_ok());
    assert!(hook.is_compiled(CallConvention::Sync));
}

#[test]
fn rewrites_to_an_empty_name_are_rejected() {
    let mut hook = series_hook();
    hook.tap("existing", noop).unwrap();
    hook.intercept(FnInterceptor::new().on_register(|tap: &Tap<Compilation>| {
        Some(tap.renamed(""))
    }));

    let err = hook.tap("new", noop).unwrap_err();
    assert!(matches!(err, HookError::MissingName { .. }));
    assert_eq!(hook.taps().names(), ["existing"]);
}
