#![allow(dead_code)]

use std::{sync::mpsc, time::Duration};
use tapline::{
    AsyncSeriesHook, BoxError, HookArgs, HookError, SyncHook, Tap, testing::CallLog,
};

// ============================================================================
// Test Argument Types
// ============================================================================

/// Arguments passed to every tap in these tests.
#[derive(Debug, Clone, Default)]
pub struct Compilation {
    pub id: u32,
    pub log: CallLog,
}

impl Compilation {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            log: CallLog::new(),
        }
    }
}

// ============================================================================
// Test Taps
// ============================================================================

pub fn noop<A>(_: &A) -> Result<(), BoxError> {
    Ok(())
}

/// A sync tap that writes `label` into the compilation's own log.
pub fn visit(label: &'static str) -> impl Fn(&Compilation) -> Result<(), BoxError> + Send + Sync {
    move |c: &Compilation| {
        c.log.push(label);
        Ok(())
    }
}

pub fn sync_hook() -> SyncHook<Compilation> {
    SyncHook::new(["compilation"])
}

pub fn series_hook() -> AsyncSeriesHook<Compilation> {
    AsyncSeriesHook::new(["compilation"])
}

pub fn stage_of<A>(tap: &Tap<A>) -> i32 {
    tap.stage
}

// ============================================================================
// Invocation Helpers
// ============================================================================

/// Run `call_async` and wait for its callback.
pub fn call_async_blocking<A: HookArgs>(
    hook: &AsyncSeriesHook<A>,
    args: A,
) -> Result<(), HookError> {
    let (tx, rx) = mpsc::channel();
    hook.call_async(args, move |result| {
        let _ = tx.send(result);
    });
    rx.recv_timeout(Duration::from_secs(5))
        .expect("callback was never called")
}
