//! Node arena with stable keys.
//!
//! Storage owns every node; chains only hold keys into it. A key stays valid
//! until its slot is removed, and freed slots are reused by later inserts.

use std::collections::TryReserveError;

use crate::Key;

/// Slab-like storage with stable keys.
///
/// # Requirements
///
/// Implementations must provide:
/// - **Stable keys**: a key remains valid until explicitly removed
/// - **O(1)** insert, remove, get operations
/// - **Slot reuse**: removed slots can be reused by future inserts
/// - **Fallible insert**: a slot that cannot be obtained hands the value back
///
/// # Implementations
///
/// - [`Slab<T, K>`] - growable, optional node limit (in this crate)
/// - `slab::Slab<T>` - growable, heap allocated (feature `slab`). Only fails
///   when the next key would be [`Key::NONE`]; allocator failure aborts
pub trait Storage<T> {
    /// Key type handed out by this storage.
    type Key: Key;

    /// Inserts a value, returning its stable key.
    ///
    /// # Errors
    ///
    /// Returns [`Exhausted`] with the value if no slot could be obtained.
    fn try_insert(&mut self, value: T) -> Result<Self::Key, Exhausted<T>>;

    /// Removes and returns the value at `key`, if present.
    fn remove(&mut self, key: Self::Key) -> Option<T>;

    /// Returns a reference to the value at `key`, if present.
    fn get(&self, key: Self::Key) -> Option<&T>;

    /// Returns a mutable reference to the value at `key`, if present.
    fn get_mut(&mut self, key: Self::Key) -> Option<&mut T>;

    /// Returns the number of occupied slots.
    fn len(&self) -> usize;

    /// Returns `true` if no slots are occupied.
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Error returned when storage cannot provide a slot.
///
/// Carries the rejected value so the caller can release or reuse it. When the
/// failure came from the allocator rather than a configured limit, the
/// reservation error is kept as `source`.
#[derive(Debug)]
pub struct Exhausted<T> {
    /// The value that could not be inserted.
    pub value: T,
    /// Allocator failure, or `None` if the node limit was reached.
    pub source: Option<TryReserveError>,
}

impl<T> Exhausted<T> {
    #[inline]
    pub(crate) fn limit(value: T) -> Self {
        Self {
            value,
            source: None,
        }
    }

    /// Returns the value that could not be inserted.
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> core::fmt::Display for Exhausted<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.source {
            Some(err) => write!(f, "storage could not grow: {err}"),
            None => write!(f, "storage node limit reached"),
        }
    }
}

impl<T: core::fmt::Debug> std::error::Error for Exhausted<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|err| err as &(dyn std::error::Error + 'static))
    }
}

// =============================================================================
// Slab - growable arena, free stack threaded through vacant slots
// =============================================================================

#[derive(Debug)]
enum Slot<T, K> {
    Occupied(T),
    Vacant { next_free: K },
}

/// Growable arena storage.
///
/// Slots are kept in a `Vec`. Removed slots form a free stack threaded
/// through the vacant entries, so insert after remove never grows the
/// allocation. Growth goes through [`Vec::try_reserve`]: running out of
/// memory is reported as [`Exhausted`] instead of aborting.
///
/// The number of live nodes can be capped with [`Slab::with_limit`]; the key
/// type caps it anyway at [`Key::SLOTS`].
///
/// # Example
///
/// ```
/// use nexus_strqueue::{Slab, Storage};
///
/// let mut slab: Slab<&str> = Slab::with_limit(2);
/// let a = slab.try_insert("a").unwrap();
/// let _b = slab.try_insert("b").unwrap();
/// assert!(slab.try_insert("c").is_err());
///
/// assert_eq!(slab.remove(a), Some("a"));
/// assert!(slab.try_insert("c").is_ok());
/// ```
#[derive(Debug)]
pub struct Slab<T, K: Key = u32> {
    slots: Vec<Slot<T, K>>,
    free_head: K,
    len: usize,
    limit: usize,
}

impl<T, K: Key> Default for Slab<T, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, K: Key> Slab<T, K> {
    /// Creates an empty slab. Does not allocate.
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: K::NONE,
            len: 0,
            limit: K::SLOTS,
        }
    }

    /// Creates an empty slab with room for `capacity` nodes.
    ///
    /// # Errors
    ///
    /// Returns the allocator error if the reservation fails.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        let mut slab = Self::new();
        slab.try_reserve(capacity)?;
        Ok(slab)
    }

    /// Reserves room for `additional` more nodes, never past the limit.
    ///
    /// # Errors
    ///
    /// Returns the allocator error if the reservation fails; the slab is
    /// unchanged.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        let headroom = self.limit.saturating_sub(self.slots.len());
        self.slots.try_reserve_exact(additional.min(headroom))
    }

    /// Creates an empty slab that holds at most `limit` nodes.
    pub const fn with_limit(limit: usize) -> Self {
        let mut slab = Self::new();
        slab.limit = if limit < K::SLOTS { limit } else { K::SLOTS };
        slab
    }

    /// Returns the maximum number of live nodes.
    #[inline]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Returns the number of slots that can be used without reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Drops every value and forgets every key.
    ///
    /// Any chain still holding keys into this slab is left dangling; clear
    /// the chains first.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_head = K::NONE;
        self.len = 0;
    }

    fn grow(&mut self) -> Result<(), TryReserveError> {
        let before = self.slots.capacity();
        self.slots.try_reserve(1)?;
        tracing::debug!(
            from = before,
            to = self.slots.capacity(),
            "node arena grew"
        );
        Ok(())
    }
}

impl<T, K: Key> Storage<T> for Slab<T, K> {
    type Key = K;

    fn try_insert(&mut self, value: T) -> Result<K, Exhausted<T>> {
        if self.free_head.is_some() {
            let key = self.free_head;
            let slot = &mut self.slots[key.as_usize()];
            self.free_head = match slot {
                Slot::Vacant { next_free } => *next_free,
                Slot::Occupied(_) => unreachable!("free stack points at an occupied slot"),
            };
            *slot = Slot::Occupied(value);
            self.len += 1;
            return Ok(key);
        }

        if self.slots.len() >= self.limit {
            return Err(Exhausted::limit(value));
        }
        if self.slots.len() == self.slots.capacity() {
            if let Err(err) = self.grow() {
                return Err(Exhausted {
                    value,
                    source: Some(err),
                });
            }
        }

        let key = K::from_usize(self.slots.len());
        self.slots.push(Slot::Occupied(value));
        self.len += 1;
        Ok(key)
    }

    fn remove(&mut self, key: K) -> Option<T> {
        let slot = self.slots.get_mut(key.as_usize())?;
        if let Slot::Vacant { .. } = slot {
            return None;
        }

        let taken = core::mem::replace(
            slot,
            Slot::Vacant {
                next_free: self.free_head,
            },
        );
        self.free_head = key;
        self.len -= 1;

        match taken {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant { .. } => None,
        }
    }

    #[inline]
    fn get(&self, key: K) -> Option<&T> {
        match self.slots.get(key.as_usize())? {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant { .. } => None,
        }
    }

    #[inline]
    fn get_mut(&mut self, key: K) -> Option<&mut T> {
        match self.slots.get_mut(key.as_usize())? {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant { .. } => None,
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.len
    }
}

// =============================================================================
// slab::Slab implementation
// =============================================================================

/// Growable storage from the `slab` crate.
///
/// `slab::Slab::insert` aborts the process if it cannot grow, so the only
/// [`Exhausted`] this impl returns is for the key space: the slot whose index
/// equals `usize::NONE` is never handed out. Use [`Slab`] where allocation
/// failure must be reported.
#[cfg(feature = "slab")]
impl<T> Storage<T> for slab::Slab<T> {
    type Key = usize;

    #[inline]
    fn try_insert(&mut self, value: T) -> Result<usize, Exhausted<T>> {
        if self.vacant_key() == usize::NONE {
            return Err(Exhausted::limit(value));
        }
        Ok(self.insert(value))
    }

    #[inline]
    fn remove(&mut self, key: usize) -> Option<T> {
        self.try_remove(key)
    }

    #[inline]
    fn get(&self, key: usize) -> Option<&T> {
        slab::Slab::get(self, key)
    }

    #[inline]
    fn get_mut(&mut self, key: usize) -> Option<&mut T> {
        slab::Slab::get_mut(self, key)
    }

    #[inline]
    fn len(&self) -> usize {
        slab::Slab::len(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_does_not_allocate() {
        let slab: Slab<String> = Slab::new();
        assert_eq!(slab.capacity(), 0);
        assert!(slab.is_empty());
        assert_eq!(slab.limit(), u32::SLOTS);
    }

    #[test]
    fn insert_get_remove() {
        let mut slab: Slab<u64> = Slab::new();

        let a = slab.try_insert(1).unwrap();
        let b = slab.try_insert(2).unwrap();

        assert_eq!(slab.len(), 2);
        assert_eq!(slab.get(a), Some(&1));
        assert_eq!(slab.get(b), Some(&2));

        *slab.get_mut(a).unwrap() = 10;
        assert_eq!(slab.remove(a), Some(10));
        assert_eq!(slab.get(a), None);
        assert_eq!(slab.remove(a), None);
        assert_eq!(slab.len(), 1);
    }

    #[test]
    fn removed_slots_are_reused_lifo() {
        let mut slab: Slab<u64> = Slab::new();

        let a = slab.try_insert(1).unwrap();
        let b = slab.try_insert(2).unwrap();
        let _c = slab.try_insert(3).unwrap();

        slab.remove(a);
        slab.remove(b);

        assert_eq!(slab.try_insert(4).unwrap(), b);
        assert_eq!(slab.try_insert(5).unwrap(), a);
        assert_eq!(slab.len(), 3);
    }

    #[test]
    fn limit_rejects_and_returns_value() {
        let mut slab: Slab<String> = Slab::with_limit(1);

        slab.try_insert("kept".to_string()).unwrap();
        let err = slab.try_insert("rejected".to_string()).unwrap_err();

        assert!(err.source.is_none());
        assert_eq!(err.to_string(), "storage node limit reached");
        assert_eq!(err.into_inner(), "rejected");
        assert_eq!(slab.len(), 1);
    }

    #[test]
    fn limit_is_clamped_to_key_space() {
        let slab: Slab<u8, u16> = Slab::with_limit(usize::MAX);
        assert_eq!(slab.limit(), u16::SLOTS);
    }

    #[test]
    fn try_with_capacity_reserves() {
        let slab: Slab<u64> = Slab::try_with_capacity(64).unwrap();
        assert!(slab.capacity() >= 64);
        assert!(slab.is_empty());
    }

    #[test]
    fn get_out_of_range_is_none() {
        let slab: Slab<u64> = Slab::new();
        assert_eq!(slab.get(5), None);
        assert_eq!(slab.get(u32::NONE), None);
    }

    #[test]
    fn clear_resets() {
        let mut slab: Slab<u64> = Slab::new();
        for i in 0..8 {
            slab.try_insert(i).unwrap();
        }
        slab.clear();

        assert!(slab.is_empty());
        assert_eq!(slab.try_insert(99).unwrap(), 0);
    }
}
