//! Option currying: register through a hook with preset options.

use crate::{
    args::HookArgs,
    error::HookError,
    hook::Tapable,
    interceptor::Interceptor,
    tap::{TapFn, TapOptions},
};
use std::{marker::PhantomData, sync::Arc};

/// A hook borrowed with preset registration options.
///
/// Every registration made through the wrapper merges the preset under the
/// call-site options (call-site fields win) and lands in the base hook's
/// registry. Created by [`Tapable::with_options`].
///
/// # Example
///
/// ```rust,ignore
/// let mut early = hook.with_options(TapOptions::new().stage(-10));
/// early.tap("lint", lint)?;
/// early.tap(TapOptions::named("typecheck").stage(-5), typecheck)?;
/// ```
pub struct WithOptions<'h, H, A> {
    base: &'h mut H,
    preset: TapOptions,
    _args: PhantomData<fn(&A)>,
}

impl<'h, H, A> WithOptions<'h, H, A>
where
    H: Tapable<A>,
    A: HookArgs,
{
    /// Wrap `base` with `preset`.
    pub fn new(base: &'h mut H, preset: TapOptions) -> Self {
        Self {
            base,
            preset,
            _args: PhantomData,
        }
    }

    /// The options merged into every registration.
    pub fn preset(&self) -> &TapOptions {
        &self.preset
    }

    /// Add more preset options, still registering into the same base hook.
    ///
    /// Fields already preset take precedence over the new ones.
    pub fn with_options<O>(&mut self, options: O) -> WithOptions<'_, H, A>
    where
        O: Into<TapOptions>,
    {
        WithOptions {
            base: &mut *self.base,
            preset: options.into().merge(self.preset.clone()),
            _args: PhantomData,
        }
    }
}

impl<H, A> Tapable<A> for WithOptions<'_, H, A>
where
    H: Tapable<A>,
    A: HookArgs,
{
    fn register(&mut self, options: TapOptions, callback: TapFn<A>) -> Result<(), HookError> {
        self.base
            .register(self.preset.clone().merge(options), callback)
    }

    fn add_interceptor(&mut self, interceptor: Arc<dyn Interceptor<A>>) {
        self.base.add_interceptor(interceptor);
    }
}
