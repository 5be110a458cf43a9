//! A single link in the chain.

use crate::Key;

/// One stored value and the link to its successor.
///
/// The node owns its text outright. It is only ever reachable through the
/// chain of the queue whose arena holds it.
#[derive(Debug)]
pub struct Node<K: Key = u32> {
    pub(crate) value: String,
    pub(crate) next: K,
}

impl<K: Key> Node<K> {
    /// Creates an unlinked node owning `value`.
    #[inline]
    pub fn new(value: String) -> Self {
        Self {
            value,
            next: K::NONE,
        }
    }

    /// Returns the stored text.
    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the successor's key, or `K::NONE` for the last node.
    #[inline]
    pub fn next(&self) -> K {
        self.next
    }

    /// Consumes the node, returning its text.
    #[inline]
    pub fn into_value(self) -> String {
        self.value
    }
}
