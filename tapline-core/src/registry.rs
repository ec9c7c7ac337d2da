//! Ordered tap storage and constrained insertion.
//!
//! Taps are kept in execution order. A new tap is placed by scanning the
//! sequence from the end:
//!
//! - it moves ahead of every present tap named in its `before` list,
//! - while such a tap is still ahead of it, it keeps moving regardless of
//!   stage,
//! - otherwise it moves ahead of taps with a strictly greater stage and stops
//!   at the first tap whose stage is less than or equal to its own.
//!
//! This is not a topological sort. `before` only constrains taps present at
//! insertion time and is never re-evaluated afterwards.

use crate::tap::Tap;
use std::{collections::HashMap, fmt};

/// The ordered taps of one hook.
pub struct TapRegistry<A> {
    taps: Vec<Tap<A>>,
}

impl<A> TapRegistry<A> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { taps: Vec::new() }
    }

    /// Insert a tap at its ordering-determined position. Returns the index it
    /// landed at.
    pub fn insert(&mut self, item: Tap<A>) -> usize {
        let index = self.position_for(&item);
        tracing::trace!(
            tap = %item.name,
            stage = item.stage,
            before = ?item.before,
            index,
            "inserting tap"
        );
        self.taps.insert(index, item);
        index
    }

    fn position_for(&self, item: &Tap<A>) -> usize {
        // Occurrences still ahead of the scan. Names with no registered tap
        // are dropped here, so they impose nothing.
        let mut pending: HashMap<&str, usize> = HashMap::new();
        for name in &item.before {
            if pending.contains_key(name.as_str()) {
                continue;
            }
            let count = self.taps.iter().filter(|t| &t.name == name).count();
            if count > 0 {
                pending.insert(name.as_str(), count);
            }
        }

        let mut i = self.taps.len();
        while i > 0 {
            let x = &self.taps[i - 1];
            if let Some(left) = pending.get_mut(x.name.as_str()) {
                *left -= 1;
                if *left == 0 {
                    pending.remove(x.name.as_str());
                }
                i -= 1;
                continue;
            }
            if !pending.is_empty() || x.stage > item.stage {
                i -= 1;
                continue;
            }
            break;
        }
        i
    }

    /// Replace every tap in place with `f`'s result; `None` keeps the tap.
    ///
    /// Positions are not re-derived.
    pub fn rewrite<F>(&mut self, mut f: F)
    where
        F: FnMut(&Tap<A>) -> Option<Tap<A>>,
    {
        for tap in &mut self.taps {
            if let Some(rewritten) = f(tap) {
                *tap = rewritten;
            }
        }
    }

    /// Iterate over taps in execution order.
    pub fn iter(&self) -> std::slice::Iter<'_, Tap<A>> {
        self.taps.iter()
    }

    /// Tap names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.taps.iter().map(|t| t.name.as_str()).collect()
    }

    /// The tap at `index`.
    pub fn get(&self, index: usize) -> Option<&Tap<A>> {
        self.taps.get(index)
    }

    /// The taps as a slice.
    pub fn as_slice(&self) -> &[Tap<A>] {
        &self.taps
    }

    /// Get the number of registered taps.
    pub fn len(&self) -> usize {
        self.taps.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }
}

impl<A> Default for TapRegistry<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for TapRegistry<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.taps.iter()).finish()
    }
}

impl<'a, A> IntoIterator for &'a TapRegistry<A> {
    type Item = &'a Tap<A>;
    type IntoIter = std::slice::Iter<'a, Tap<A>>;

    fn into_iter(self) -> Self::IntoIter {
        self.taps.iter()
    }
}
