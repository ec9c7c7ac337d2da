//! Per-hook cache of compiled dispatchers.

use crate::{
    compiler::{CallConvention, Dispatcher},
    error::HookError,
};
use std::{
    fmt,
    sync::{
        PoisonError, RwLock,
        atomic::{AtomicUsize, Ordering},
    },
};

struct Compiled<A> {
    generation: u64,
    dispatcher: Dispatcher<A>,
}

/// One dispatcher slot per calling convention, tagged with the generation it
/// was compiled at.
///
/// Every mutation of the owning hook bumps the generation. A slot built for
/// an older generation is never handed out; it is recompiled on next use.
/// Between two mutations each convention compiles at most once.
pub struct DispatchCache<A> {
    generation: u64,
    slots: [RwLock<Option<Compiled<A>>>; 3],
    compilations: AtomicUsize,
}

impl<A> DispatchCache<A> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            generation: 0,
            slots: [RwLock::new(None), RwLock::new(None), RwLock::new(None)],
            compilations: AtomicUsize::new(0),
        }
    }

    /// Mark every cached dispatcher stale.
    pub fn invalidate(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        for slot in &mut self.slots {
            *slot.get_mut().unwrap_or_else(PoisonError::into_inner) = None;
        }
        tracing::trace!(generation = self.generation, "dispatch cache invalidated");
    }

    /// The current generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of dispatchers compiled so far.
    pub fn compilations(&self) -> usize {
        self.compilations.load(Ordering::Relaxed)
    }

    /// Whether an up-to-date dispatcher is cached for `convention`.
    pub fn is_compiled(&self, convention: CallConvention) -> bool {
        let slot = self.slots[convention.slot()]
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        matches!(&*slot, Some(c) if c.generation == self.generation)
    }

    /// Return the cached dispatcher for `convention`, compiling it with
    /// `compile` if the slot is empty or stale. Failed compilations are not
    /// cached.
    pub fn get_or_compile<F>(
        &self,
        convention: CallConvention,
        compile: F,
    ) -> Result<Dispatcher<A>, HookError>
    where
        F: FnOnce() -> Result<Dispatcher<A>, HookError>,
    {
        let slot = &self.slots[convention.slot()];
        {
            let cached = slot.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(c) = &*cached {
                if c.generation == self.generation {
                    return Ok(c.dispatcher.clone());
                }
            }
        }

        let mut cached = slot.write().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have compiled while we waited for the lock.
        if let Some(c) = &*cached {
            if c.generation == self.generation {
                return Ok(c.dispatcher.clone());
            }
        }

        let dispatcher = compile()?;
        self.compilations.fetch_add(1, Ordering::Relaxed);
        *cached = Some(Compiled {
            generation: self.generation,
            dispatcher: dispatcher.clone(),
        });
        Ok(dispatcher)
    }
}

impl<A> Default for DispatchCache<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for DispatchCache<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchCache")
            .field("generation", &self.generation)
            .field("compilations", &self.compilations())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn noop() -> Result<Dispatcher<()>, HookError> {
        Ok(Dispatcher::Sync(Arc::new(
            |_: &()| -> Result<(), HookError> { Ok(()) },
        )))
    }

    #[test]
    fn compiles_once_per_generation() {
        let cache = DispatchCache::<()>::new();
        assert!(!cache.is_compiled(CallConvention::Sync));

        cache.get_or_compile(CallConvention::Sync, noop).unwrap();
        cache.get_or_compile(CallConvention::Sync, noop).unwrap();

        assert_eq!(cache.compilations(), 1);
        assert!(cache.is_compiled(CallConvention::Sync));
        assert!(!cache.is_compiled(CallConvention::Promise));
    }

    #[test]
    fn invalidate_forces_recompilation() {
        let mut cache = DispatchCache::<()>::new();
        cache.get_or_compile(CallConvention::Sync, noop).unwrap();

        cache.invalidate();
        assert!(!cache.is_compiled(CallConvention::Sync));
        assert_eq!(cache.generation(), 1);

        cache.get_or_compile(CallConvention::Sync, noop).unwrap();
        assert_eq!(cache.compilations(), 2);
    }

    #[test]
    fn failed_compilation_is_not_cached() {
        let cache = DispatchCache::<()>::new();
        let err = cache
            .get_or_compile(CallConvention::Async, || {
                Err(HookError::Unsupported("test".into()))
            })
            .unwrap_err();

        assert!(matches!(err, HookError::Unsupported(_)));
        assert!(!cache.is_compiled(CallConvention::Async));
        assert_eq!(cache.compilations(), 0);
    }
}
