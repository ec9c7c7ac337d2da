//! Tap records: registration options, callbacks and the normalized [`Tap`].

use crate::{
    callback::Callback,
    error::{BoxError, HookError},
};
use bitflags::bitflags;
use futures::future::BoxFuture;
use std::{fmt, future::Future, sync::Arc};

/// How a tap's own callback signals completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TapKind {
    /// Returns when done.
    Sync,
    /// Completes a [`Callback`].
    Async,
    /// Returns a future that settles when done.
    Promise,
}

impl TapKind {
    /// The lowercase tag of this kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            TapKind::Sync => "sync",
            TapKind::Async => "async",
            TapKind::Promise => "promise",
        }
    }

    /// The flag for this kind in a [`TapKinds`] set.
    pub const fn flag(self) -> TapKinds {
        match self {
            TapKind::Sync => TapKinds::SYNC,
            TapKind::Async => TapKinds::ASYNC,
            TapKind::Promise => TapKinds::PROMISE,
        }
    }

    pub(crate) const fn method(self) -> &'static str {
        match self {
            TapKind::Sync => "tap",
            TapKind::Async => "tap_async",
            TapKind::Promise => "tap_promise",
        }
    }
}

impl fmt::Display for TapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// Set of tap kinds a hook family accepts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TapKinds: u8 {
        /// Synchronous taps.
        const SYNC = 1;
        /// Callback-style taps.
        const ASYNC = 1 << 1;
        /// Future-returning taps.
        const PROMISE = 1 << 2;
    }
}

/// Signature of a synchronous tap.
pub type SyncTapFn<A> = dyn Fn(&A) -> Result<(), BoxError> + Send + Sync + 'static;

/// Signature of a callback-style tap.
pub type AsyncTapFn<A> = dyn Fn(&A, Callback) + Send + Sync + 'static;

/// Signature of a future-returning tap.
pub type PromiseTapFn<A> =
    dyn Fn(&A) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync + 'static;

/// A tap's callback, tagged with how it completes.
pub enum TapFn<A> {
    /// A synchronous callback.
    Sync(Arc<SyncTapFn<A>>),
    /// A callback-style asynchronous callback.
    Async(Arc<AsyncTapFn<A>>),
    /// A future-returning asynchronous callback.
    Promise(Arc<PromiseTapFn<A>>),
}

impl<A> TapFn<A> {
    /// Wrap a synchronous callback.
    pub fn from_sync<F>(f: F) -> Self
    where
        F: Fn(&A) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        TapFn::Sync(Arc::new(f))
    }

    /// Wrap a callback-style callback.
    pub fn from_async<F>(f: F) -> Self
    where
        F: Fn(&A, Callback) + Send + Sync + 'static,
    {
        TapFn::Async(Arc::new(f))
    }

    /// Wrap a future-returning callback.
    ///
    /// The future must be `'static`: clone whatever it needs out of the
    /// arguments before moving into it.
    pub fn from_promise<F, Fut>(f: F) -> Self
    where
        A: 'static,
        F: Fn(&A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        TapFn::Promise(Arc::new(move |args: &A| -> BoxFuture<'static, Result<(), BoxError>> {
            Box::pin(f(args))
        }))
    }

    /// How this callback completes.
    pub fn kind(&self) -> TapKind {
        match self {
            TapFn::Sync(_) => TapKind::Sync,
            TapFn::Async(_) => TapKind::Async,
            TapFn::Promise(_) => TapKind::Promise,
        }
    }
}

impl<A> Clone for TapFn<A> {
    fn clone(&self) -> Self {
        match self {
            TapFn::Sync(f) => TapFn::Sync(Arc::clone(f)),
            TapFn::Async(f) => TapFn::Async(Arc::clone(f)),
            TapFn::Promise(f) => TapFn::Promise(Arc::clone(f)),
        }
    }
}

impl<A> fmt::Debug for TapFn<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TapFn::{:?}", self.kind())
    }
}

/// One or more tap names a new tap must run ahead of.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Before(Vec<String>);

impl Before {
    /// The names, in the order given.
    pub fn into_names(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for Before {
    fn from(name: &str) -> Self {
        Before(vec![name.to_string()])
    }
}

impl From<String> for Before {
    fn from(name: String) -> Self {
        Before(vec![name])
    }
}

impl From<Vec<String>> for Before {
    fn from(names: Vec<String>) -> Self {
        Before(names)
    }
}

impl From<Vec<&str>> for Before {
    fn from(names: Vec<&str>) -> Self {
        Before(names.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Before {
    fn from(names: [&str; N]) -> Self {
        Before(names.iter().map(|n| n.to_string()).collect())
    }
}

/// A registration record.
///
/// Every field is optional so records can be merged; a tap still needs a
/// non-empty name to be registered. Bare names convert into a record.
///
/// # Example
///
/// ```rust,ignore
/// let options = TapOptions::named("minify").stage(10).before("emit");
/// hook.tap(options, |assets| minify(assets))?;
/// hook.tap("report", |assets| report(assets))?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TapOptions {
    /// Tap name; required and non-empty at registration.
    pub name: Option<String>,
    /// Expected kind of the supplied callback.
    pub kind: Option<TapKind>,
    /// Ordering stage, lower runs earlier. Defaults to 0.
    pub stage: Option<i32>,
    /// Names of already-registered taps this tap must run ahead of.
    pub before: Option<Vec<String>>,
}

impl TapOptions {
    /// An empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// A record carrying only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Set the name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the expected callback kind.
    pub fn kind(mut self, kind: TapKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Set the stage.
    pub fn stage(mut self, stage: i32) -> Self {
        self.stage = Some(stage);
        self
    }

    /// Set the names this tap must run ahead of.
    pub fn before(mut self, before: impl Into<Before>) -> Self {
        self.before = Some(before.into().into_names());
        self
    }

    /// Field-wise merge; fields present in `over` win.
    pub fn merge(self, over: TapOptions) -> TapOptions {
        TapOptions {
            name: over.name.or(self.name),
            kind: over.kind.or(self.kind),
            stage: over.stage.or(self.stage),
            before: over.before.or(self.before),
        }
    }
}

impl From<&str> for TapOptions {
    fn from(name: &str) -> Self {
        TapOptions::named(name)
    }
}

impl From<String> for TapOptions {
    fn from(name: String) -> Self {
        TapOptions::named(name)
    }
}

impl From<&String> for TapOptions {
    fn from(name: &String) -> Self {
        TapOptions::named(name.as_str())
    }
}

/// A normalized registration held by a hook.
///
/// Cloning is cheap; the callback is shared. Interceptors may return a
/// rewritten copy from [`Interceptor::register`](crate::Interceptor::register).
pub struct Tap<A> {
    /// Tap name. Not required to be unique.
    pub name: String,
    /// Ordering stage, lower runs earlier.
    pub stage: i32,
    /// Precedence names, consulted only when the tap is inserted.
    pub before: Vec<String>,
    /// The plugin's callback.
    pub callback: TapFn<A>,
}

impl<A> Tap<A> {
    /// Normalize a registration record.
    ///
    /// The callback decides the kind; a record that names a different kind is
    /// rejected rather than relabelling the callback.
    pub fn from_options(options: TapOptions, callback: TapFn<A>) -> Result<Self, HookError> {
        let kind = callback.kind();
        let method = kind.method();

        if let Some(declared) = options.kind {
            if declared != kind {
                return Err(HookError::InvalidArgument {
                    method,
                    reason: format!(
                        "record declares a {declared} tap but a {kind} callback was supplied"
                    ),
                });
            }
        }

        let name = match options.name {
            Some(name) if !name.is_empty() => name,
            _ => return Err(HookError::MissingName { method }),
        };

        Ok(Tap {
            name,
            stage: options.stage.unwrap_or(0),
            before: options.before.unwrap_or_default(),
            callback,
        })
    }

    /// How this tap's callback completes.
    pub fn kind(&self) -> TapKind {
        self.callback.kind()
    }

    /// A copy of this tap with another name.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Tap {
            name: name.into(),
            ..self.clone()
        }
    }
}

impl<A> Clone for Tap<A> {
    fn clone(&self) -> Self {
        Tap {
            name: self.name.clone(),
            stage: self.stage,
            before: self.before.clone(),
            callback: self.callback.clone(),
        }
    }
}

impl<A> fmt::Debug for Tap<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tap")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("stage", &self.stage)
            .field("before", &self.before)
            .finish()
    }
}
