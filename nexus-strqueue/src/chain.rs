//! Singly linked chain of nodes over external storage.
//!
//! A [`Chain`] is the head/tail/len triple of a run of linked nodes. The
//! nodes themselves live in a [`Storage`]; the chain only coordinates keys.
//! Every method that follows links takes the storage as an argument.
//!
//! # Storage Invariant
//!
//! A chain must always be used with the storage its nodes were inserted into.
//! Passing another storage panics on the first missing node, or silently
//! relinks foreign nodes if the keys happen to be occupied there. This is the
//! caller's responsibility, as with the `slab` crate. [`Queue`](crate::Queue)
//! pairs one chain with one private storage so users never see this.
//!
//! # Sub-chains
//!
//! Sorting works on chains as values: [`Chain::split_at`] detaches a suffix
//! into its own chain, and [`Chain::merge_by`] splices two chains back into
//! one. Both only rewrite `next` links and never touch node contents.
//!
//! # Example
//!
//! ```
//! use nexus_strqueue::{Chain, Node, Slab, Storage};
//!
//! let mut storage: Slab<Node> = Slab::new();
//! let mut chain: Chain = Chain::new();
//!
//! for word in ["pear", "fig", "apple"] {
//!     let key = storage.try_insert(Node::new(word.to_string())).unwrap();
//!     chain.link_back(&mut storage, key);
//! }
//!
//! chain.sort_by(&mut storage, |a, b| a.cmp(b));
//! let words: Vec<_> = chain.iter(&storage).collect();
//! assert_eq!(words, ["apple", "fig", "pear"]);
//! ```

use core::cmp::Ordering;
use core::mem;

use crate::{InvariantViolation, Key, Node, Storage};

#[inline]
fn node<K: Key, S: Storage<Node<K>, Key = K>>(storage: &S, key: K) -> &Node<K> {
    storage.get(key).expect("chain links to a vacant slot")
}

#[inline]
fn node_mut<K: Key, S: Storage<Node<K>, Key = K>>(storage: &mut S, key: K) -> &mut Node<K> {
    storage.get_mut(key).expect("chain links to a vacant slot")
}

/// Head, tail and length of a singly linked run of nodes.
///
/// `head` and every `next` link own their successor in the sense that each
/// node is reachable through exactly one link. `tail` is a shortcut to the
/// last node and owns nothing; it exists so that [`Chain::link_back`] is O(1).
///
/// # Type Parameters
///
/// - `K`: Key type (default `u32`)
#[derive(Debug, PartialEq, Eq)]
pub struct Chain<K: Key = u32> {
    head: K,
    tail: K,
    len: usize,
}

impl<K: Key> Default for Chain<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key> Chain<K> {
    /// Creates an empty chain.
    #[inline]
    pub const fn new() -> Self {
        Self {
            head: K::NONE,
            tail: K::NONE,
            len: 0,
        }
    }

    /// Returns the number of linked nodes.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no nodes are linked.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the first node's key, or `None` if empty.
    #[inline]
    pub fn head(&self) -> Option<K> {
        if self.head.is_none() {
            None
        } else {
            Some(self.head)
        }
    }

    /// Returns the last node's key, or `None` if empty.
    #[inline]
    pub fn tail(&self) -> Option<K> {
        if self.tail.is_none() {
            None
        } else {
            Some(self.tail)
        }
    }

    // ========================================================================
    // Link operations (relink only, storage slots are untouched)
    // ========================================================================

    /// Links an existing node in front of the head.
    ///
    /// The node must already be in storage and not linked into any chain.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not occupied in storage.
    #[inline]
    pub fn link_front<S>(&mut self, storage: &mut S, key: K)
    where
        S: Storage<Node<K>, Key = K>,
    {
        node_mut(storage, key).next = self.head;

        if self.tail.is_none() {
            self.tail = key;
        }

        self.head = key;
        self.len += 1;
    }

    /// Links an existing node after the tail.
    ///
    /// Uses the cached tail: no traversal.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not occupied in storage.
    #[inline]
    pub fn link_back<S>(&mut self, storage: &mut S, key: K)
    where
        S: Storage<Node<K>, Key = K>,
    {
        node_mut(storage, key).next = K::NONE;

        if self.tail.is_some() {
            node_mut(storage, self.tail).next = key;
        } else {
            self.head = key;
        }

        self.tail = key;
        self.len += 1;
    }

    /// Unlinks the head node and returns its key.
    ///
    /// The node stays in storage, terminated, and may be linked elsewhere or
    /// removed by the caller. Returns `None` if the chain is empty.
    #[inline]
    pub fn unlink_front<S>(&mut self, storage: &mut S) -> Option<K>
    where
        S: Storage<Node<K>, Key = K>,
    {
        if self.head.is_none() {
            return None;
        }

        let key = self.head;
        self.head = mem::replace(&mut node_mut(storage, key).next, K::NONE);
        if self.head.is_none() {
            self.tail = K::NONE;
        }
        self.len -= 1;

        Some(key)
    }

    /// Unlinks every node and removes it from storage.
    ///
    /// Walks the chain once, front to back. Each node's text is dropped
    /// together with its node.
    pub fn clear<S>(&mut self, storage: &mut S)
    where
        S: Storage<Node<K>, Key = K>,
    {
        let mut curr = self.head;
        while curr.is_some() {
            curr = storage
                .remove(curr)
                .expect("chain links to a vacant slot")
                .next;
        }

        *self = Self::new();
    }

    // ========================================================================
    // Whole-chain rearrangement
    // ========================================================================

    /// Splits the chain after the first `at` nodes.
    ///
    /// `self` keeps nodes `[0, at)` and the returned chain holds `[at, len)`,
    /// each in original order and terminated. `at == 0` moves everything
    /// out; `at >= len` returns an empty chain.
    ///
    /// This is O(at): the node before the split point is found by walking.
    pub fn split_at<S>(&mut self, storage: &mut S, at: usize) -> Self
    where
        S: Storage<Node<K>, Key = K>,
    {
        if at == 0 {
            return mem::take(self);
        }
        if at >= self.len {
            return Self::new();
        }

        let mut last = self.head;
        for _ in 1..at {
            last = node(&*storage, last).next;
        }
        let rest = mem::replace(&mut node_mut(storage, last).next, K::NONE);

        let other = Self {
            head: rest,
            tail: self.tail,
            len: self.len - at,
        };

        self.tail = last;
        self.len = at;

        other
    }

    /// Merges two chains whose values are each sorted by `cmp`.
    ///
    /// Repeatedly takes the smaller head; on ties the node from `left` goes
    /// first, so merging is stable. The merged tail is whichever input tail
    /// ends up last. No node is allocated, freed or copied.
    pub fn merge_by<S, F>(left: Self, right: Self, storage: &mut S, cmp: &mut F) -> Self
    where
        S: Storage<Node<K>, Key = K>,
        F: FnMut(&str, &str) -> Ordering,
    {
        if left.is_empty() {
            return right;
        }
        if right.is_empty() {
            return left;
        }

        let len = left.len + right.len;
        let mut a = left.head;
        let mut b = right.head;
        let mut head = K::NONE;
        let mut tail = K::NONE;

        while a.is_some() && b.is_some() {
            let ordering = cmp(node(&*storage, a).value(), node(&*storage, b).value());
            let picked = if ordering != Ordering::Greater {
                let key = a;
                a = node(&*storage, a).next;
                key
            } else {
                let key = b;
                b = node(&*storage, b).next;
                key
            };

            if tail.is_some() {
                node_mut(storage, tail).next = picked;
            } else {
                head = picked;
            }
            tail = picked;
        }

        // Exactly one side still has nodes; splice the whole run at once.
        let (rest, rest_tail) = if a.is_some() {
            (a, left.tail)
        } else {
            (b, right.tail)
        };
        node_mut(storage, tail).next = rest;

        Self {
            head,
            tail: rest_tail,
            len,
        }
    }

    /// Sorts the chain in place with a stable merge sort.
    ///
    /// Splits into `ceil(n/2)` and `floor(n/2)` halves, sorts each, then
    /// merges. Only links change; `len` is preserved and head/tail end up on
    /// the new first and last nodes. Recursion depth is `O(log n)`.
    pub fn sort_by<S, F>(&mut self, storage: &mut S, mut cmp: F)
    where
        S: Storage<Node<K>, Key = K>,
        F: FnMut(&str, &str) -> Ordering,
    {
        if self.len < 2 {
            return;
        }

        tracing::trace!(len = self.len, "merge sort");
        let chain = mem::take(self);
        *self = Self::merge_sort(chain, storage, &mut cmp);
    }

    fn merge_sort<S, F>(mut chain: Self, storage: &mut S, cmp: &mut F) -> Self
    where
        S: Storage<Node<K>, Key = K>,
        F: FnMut(&str, &str) -> Ordering,
    {
        if chain.len < 2 {
            return chain;
        }

        let right = chain.split_at(storage, chain.len.div_ceil(2));
        let left = Self::merge_sort(chain, storage, &mut *cmp);
        let right = Self::merge_sort(right, storage, &mut *cmp);

        Self::merge_by(left, right, storage, cmp)
    }

    /// Reverses the chain in place.
    ///
    /// One pass with three cursors (previous, current, next). Head and tail
    /// swap roles; the old head becomes the terminated tail.
    pub fn reverse<S>(&mut self, storage: &mut S)
    where
        S: Storage<Node<K>, Key = K>,
    {
        if self.len < 2 {
            return;
        }

        tracing::trace!(len = self.len, "reverse");
        let mut prev = K::NONE;
        let mut curr = self.head;
        while curr.is_some() {
            let next = mem::replace(&mut node_mut(storage, curr).next, prev);
            prev = curr;
            curr = next;
        }

        mem::swap(&mut self.head, &mut self.tail);
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Returns an iterator over the stored text, head to tail.
    #[inline]
    pub fn iter<'a, S>(&self, storage: &'a S) -> Iter<'a, K, S>
    where
        S: Storage<Node<K>, Key = K>,
    {
        Iter {
            storage,
            curr: self.head,
            remaining: self.len,
        }
    }

    /// Returns an iterator over node keys, head to tail.
    #[inline]
    pub fn keys<'a, S>(&self, storage: &'a S) -> Keys<'a, K, S>
    where
        S: Storage<Node<K>, Key = K>,
    {
        Keys {
            storage,
            curr: self.head,
            remaining: self.len,
        }
    }

    /// Walks the chain and checks every structural invariant.
    ///
    /// - `len == 0`, `head == NONE` and `tail == NONE` agree
    /// - exactly `len` nodes are reachable from `head`, all occupied
    /// - the last reachable node is `tail` (so `tail.next == NONE`)
    /// - no cycle (the walk is cut off after `len` nodes)
    /// - no stored value contains NUL
    ///
    /// O(len).
    pub fn validate<S>(&self, storage: &S) -> Result<(), InvariantViolation>
    where
        S: Storage<Node<K>, Key = K>,
    {
        let head_none = self.head.is_none();
        let tail_none = self.tail.is_none();
        if (self.len == 0) != head_none || head_none != tail_none {
            return Err(InvariantViolation::EmptyState {
                len: self.len,
                head_none,
                tail_none,
            });
        }

        let mut counted = 0;
        let mut last = K::NONE;
        let mut curr = self.head;
        while curr.is_some() {
            if counted == self.len {
                return Err(InvariantViolation::Overrun { len: self.len });
            }
            let node = storage.get(curr).ok_or(InvariantViolation::DanglingLink {
                key: curr.as_usize(),
            })?;
            if node.value.contains('\0') {
                return Err(InvariantViolation::InteriorNul {
                    key: curr.as_usize(),
                });
            }

            counted += 1;
            last = curr;
            curr = node.next;
        }

        if counted != self.len {
            return Err(InvariantViolation::LengthMismatch {
                cached: self.len,
                counted,
            });
        }
        if last != self.tail {
            return Err(InvariantViolation::TailMismatch {
                tail: self.tail.as_usize(),
                last: last.as_usize(),
            });
        }

        Ok(())
    }
}

// =============================================================================
// Iterators
// =============================================================================

/// Iterator over stored text, head to tail.
pub struct Iter<'a, K: Key, S> {
    storage: &'a S,
    curr: K,
    remaining: usize,
}

impl<'a, K: Key + 'a, S> Iterator for Iter<'a, K, S>
where
    S: Storage<Node<K>, Key = K>,
{
    type Item = &'a str;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let node = node(self.storage, self.curr);
        self.curr = node.next;
        self.remaining -= 1;
        Some(node.value())
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K: Key + 'a, S> ExactSizeIterator for Iter<'a, K, S> where S: Storage<Node<K>, Key = K> {}

/// Iterator over node keys, head to tail.
pub struct Keys<'a, K: Key, S> {
    storage: &'a S,
    curr: K,
    remaining: usize,
}

impl<'a, K: Key, S> Iterator for Keys<'a, K, S>
where
    S: Storage<Node<K>, Key = K>,
{
    type Item = K;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let key = self.curr;
        self.curr = node(self.storage, key).next;
        self.remaining -= 1;
        Some(key)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K: Key, S> ExactSizeIterator for Keys<'a, K, S> where S: Storage<Node<K>, Key = K> {}


#[cfg(all(test, feature = "slab"))]
mod tests_slab {
    use super::*;

    #[test]
    fn chain_over_slab_crate() {
        let mut storage: slab::Slab<Node<usize>> = slab::Slab::new();
        let mut chain: Chain<usize> = Chain::new();

        for word in ["delta", "alpha", "charlie", "bravo"] {
            let key = Storage::try_insert(&mut storage, Node::new(word.to_string())).unwrap();
            chain.link_back(&mut storage, key);
        }

        chain.sort_by(&mut storage, |a, b| a.cmp(b));
        let sorted: Vec<_> = chain.iter(&storage).collect();
        assert_eq!(sorted, ["alpha", "bravo", "charlie", "delta"]);

        chain.reverse(&mut storage);
        assert_eq!(chain.iter(&storage).next(), Some("delta"));
        assert!(chain.validate(&storage).is_ok());

        chain.clear(&mut storage);
        assert!(storage.is_empty());
    }
}
