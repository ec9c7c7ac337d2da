//! Hook argument bundles and their formal descriptor.

use std::fmt;

/// The argument bundle a hook passes to every tap.
///
/// A hook is generic over a single argument type; hooks with several formal
/// arguments use a tuple or a struct. Arguments must be `Send + Sync + 'static`
/// because asynchronous dispatchers may finish a series on another thread.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be used as hook arguments",
    label = "must be `Send + Sync + 'static`",
    note = "Hook arguments are shared with taps that may complete on other threads."
)]
pub trait HookArgs: Send + Sync + 'static {}

impl<T: Send + Sync + 'static> HookArgs for T {}

/// Names of a hook's formal arguments.
///
/// Fixed when the hook is created. Only used to describe the hook (arity,
/// diagnostics); the argument count is a documentation contract and is not
/// checked at call time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgNames(Vec<&'static str>);

impl ArgNames {
    /// Create a descriptor from a list of argument names.
    pub fn new<I>(names: I) -> Self
    where
        I: IntoIterator<Item = &'static str>,
    {
        Self(names.into_iter().collect())
    }

    /// Number of formal arguments.
    pub fn arity(&self) -> usize {
        self.0.len()
    }

    /// The argument names, in declaration order.
    pub fn names(&self) -> &[&'static str] {
        &self.0
    }
}

impl<const N: usize> From<[&'static str; N]> for ArgNames {
    fn from(names: [&'static str; N]) -> Self {
        Self::new(names)
    }
}

impl From<Vec<&'static str>> for ArgNames {
    fn from(names: Vec<&'static str>) -> Self {
        Self(names)
    }
}

impl From<&[&'static str]> for ArgNames {
    fn from(names: &[&'static str]) -> Self {
        Self::new(names.iter().copied())
    }
}

impl fmt::Display for ArgNames {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.0.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_formal_arguments() {
        let args = ArgNames::from(["compilation", "params"]);
        assert_eq!(args.arity(), 2);
        assert_eq!(args.to_string(), "(compilation, params)");
        assert_eq!(ArgNames::default().arity(), 0);
    }
}
