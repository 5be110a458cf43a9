//! Queue - a text chain that owns its node arena.

use core::cmp::Ordering;
use core::fmt;
use core::marker::PhantomData;

use crate::chain::Iter;
use crate::{Chain, InvariantViolation, Key, Node, QueueError, Slab, Storage};

/// Arena type backing a [`Queue`].
pub type NodeSlab<K = u32> = Slab<Node<K>, K>;

/// A singly linked queue of owned strings.
///
/// Combines one [`Chain`] with a private [`Slab`] of nodes. Values can be
/// inserted at either end and removed from the head, so tail inserts give
/// FIFO order and head inserts give LIFO order.
///
/// | Operation | Cost |
/// |-----------|------|
/// | `insert_head` / `insert_tail` | O(1) plus the text copy |
/// | `remove_head` / `pop_head` | O(1) plus the text copy |
/// | `len` | O(1), cached |
/// | `reverse` | O(n), no allocation |
/// | `sort` | O(n log n), stable, no allocation |
///
/// Every insert copies the caller's text into storage the queue owns.
/// Every failed operation leaves the queue untouched.
///
/// # Example
///
/// ```
/// use nexus_strqueue::Queue;
///
/// let mut queue: Queue = Queue::new();
/// queue.insert_tail("banana").unwrap();
/// queue.insert_tail("apple").unwrap();
/// queue.insert_tail("cherry").unwrap();
///
/// queue.sort();
///
/// let mut buf = [0u8; 16];
/// let n = queue.remove_head(&mut buf).unwrap();
/// assert_eq!(&buf[..n], b"apple");
/// assert_eq!(buf[n], 0);
/// assert_eq!(queue.len(), 2);
/// ```
pub struct Queue<K: Key = u32> {
    storage: NodeSlab<K>,
    chain: Chain<K>,
}

impl<K: Key> Default for Queue<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key> Queue<K> {
    /// Creates an empty queue. Does not allocate.
    #[inline]
    pub const fn new() -> Self {
        Self {
            storage: Slab::new(),
            chain: Chain::new(),
        }
    }

    /// Creates an empty queue with room for `capacity` nodes.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::AllocationFailure`] if the node slots cannot be
    /// reserved. No queue is returned in that case.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, QueueError> {
        Self::builder().capacity(capacity).build()
    }

    /// Returns a builder for configuring capacity and node limit.
    #[inline]
    pub fn builder() -> QueueBuilder<K> {
        QueueBuilder::new()
    }

    /// Builds a queue by tail-inserting each value in order.
    ///
    /// # Errors
    ///
    /// Returns the first insertion error; the partially filled queue is
    /// dropped.
    pub fn try_from_iter<I>(values: I) -> Result<Self, QueueError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut queue = Self::new();
        for value in values {
            queue.insert_tail(value.as_ref())?;
        }
        Ok(queue)
    }

    /// Returns the number of stored values. O(1).
    #[inline]
    pub const fn len(&self) -> usize {
        self.chain.len()
    }

    /// Returns `true` if the queue holds no values.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Returns the maximum number of values this queue will hold.
    #[inline]
    pub const fn limit(&self) -> usize {
        self.storage.limit()
    }

    // ========================================================================
    // Insertion
    // ========================================================================

    /// Copies `value` into a new node in front of the head.
    ///
    /// # Errors
    ///
    /// - [`QueueError::InvalidArgument`] if `value` contains a NUL byte
    /// - [`QueueError::AllocationFailure`] if the copy or the node slot could
    ///   not be obtained, including when the node limit is reached
    pub fn insert_head(&mut self, value: &str) -> Result<(), QueueError> {
        let key = self.alloc_node(value)?;
        self.chain.link_front(&mut self.storage, key);
        Ok(())
    }

    /// Copies `value` into a new node after the tail.
    ///
    /// O(1): appends through the cached tail.
    ///
    /// # Errors
    ///
    /// Same as [`Queue::insert_head`].
    pub fn insert_tail(&mut self, value: &str) -> Result<(), QueueError> {
        let key = self.alloc_node(value)?;
        self.chain.link_back(&mut self.storage, key);
        Ok(())
    }

    fn alloc_node(&mut self, value: &str) -> Result<K, QueueError> {
        if value.as_bytes().contains(&0) {
            return Err(QueueError::InvalidArgument("value contains a NUL byte"));
        }

        let mut owned = String::new();
        owned.try_reserve_exact(value.len())?;
        owned.push_str(value);

        // On failure the rejected node, and the copy inside it, drop here.
        Ok(self.storage.try_insert(Node::new(owned))?)
    }

    // ========================================================================
    // Removal
    // ========================================================================

    /// Removes the head value, copying it into `out` as a NUL-terminated
    /// byte string.
    ///
    /// At most `out.len() - 1` bytes of text are copied, followed by a NUL;
    /// longer values are truncated. Nothing is written past `out.len()`.
    /// Returns the number of text bytes copied. Truncation is byte-wise and
    /// may split a multi-byte character.
    ///
    /// # Errors
    ///
    /// - [`QueueError::InvalidArgument`] if `out` is empty
    /// - [`QueueError::Empty`] if there is nothing to remove
    ///
    /// The queue is unchanged on error.
    pub fn remove_head(&mut self, out: &mut [u8]) -> Result<usize, QueueError> {
        if out.is_empty() {
            return Err(QueueError::InvalidArgument("output buffer has zero capacity"));
        }

        let value = self.pop_head().ok_or(QueueError::Empty)?;
        Ok(copy_terminated(&value, out))
    }

    /// Removes the head value and hands back the owned string.
    ///
    /// Returns `None` if the queue is empty.
    #[inline]
    pub fn pop_head(&mut self) -> Option<String> {
        let key = self.chain.unlink_front(&mut self.storage)?;
        self.storage.remove(key).map(Node::into_value)
    }

    /// Removes every value, leaving the queue empty but usable.
    ///
    /// Walks the chain once; the arena's slots are released afterwards.
    pub fn clear(&mut self) {
        self.chain.clear(&mut self.storage);
        self.storage.clear();
    }

    // ========================================================================
    // Rearrangement
    // ========================================================================

    /// Reverses the order of the values in place.
    ///
    /// No node is allocated or freed.
    pub fn reverse(&mut self) {
        self.chain.reverse(&mut self.storage);
        debug_assert!(self.validate().is_ok(), "reverse broke the chain");
    }

    /// Sorts ascending by byte-wise string comparison. Stable.
    ///
    /// No node is allocated or freed.
    pub fn sort(&mut self) {
        self.sort_by(|a, b| a.cmp(b));
    }

    /// Sorts with a caller-supplied comparator. Stable: values comparing
    /// equal keep their relative order.
    pub fn sort_by<F>(&mut self, cmp: F)
    where
        F: FnMut(&str, &str) -> Ordering,
    {
        self.chain.sort_by(&mut self.storage, cmp);
        debug_assert!(self.validate().is_ok(), "sort broke the chain");
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    /// Returns the head value.
    #[inline]
    pub fn front(&self) -> Option<&str> {
        self.storage.get(self.chain.head()?).map(Node::value)
    }

    /// Returns the tail value.
    #[inline]
    pub fn back(&self) -> Option<&str> {
        self.storage.get(self.chain.tail()?).map(Node::value)
    }

    /// Returns an iterator over the values, head to tail.
    #[inline]
    pub fn iter(&self) -> Iter<'_, K, NodeSlab<K>> {
        self.chain.iter(&self.storage)
    }

    /// Checks every structural invariant of the queue.
    ///
    /// In addition to the chain checks, every occupied arena slot must be
    /// linked into the chain. O(len).
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        self.chain.validate(&self.storage)?;
        if self.storage.len() != self.chain.len() {
            return Err(InvariantViolation::OrphanNodes {
                occupied: self.storage.len(),
                linked: self.chain.len(),
            });
        }
        Ok(())
    }
}

/// Copies up to `out.len() - 1` bytes of `value` and terminates with NUL.
///
/// `out` must not be empty.
fn copy_terminated(value: &str, out: &mut [u8]) -> usize {
    let n = value.len().min(out.len() - 1);
    out[..n].copy_from_slice(&value.as_bytes()[..n]);
    out[n] = 0;
    n
}

impl<K: Key> fmt::Debug for Queue<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, K: Key> IntoIterator for &'a Queue<K> {
    type Item = &'a str;
    type IntoIter = Iter<'a, K, NodeSlab<K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Construction-time configuration for a [`Queue`].
///
/// # Example
///
/// ```
/// use nexus_strqueue::Queue;
///
/// let mut queue: Queue = Queue::builder().capacity(64).max_nodes(2).build().unwrap();
/// queue.insert_tail("a").unwrap();
/// queue.insert_tail("b").unwrap();
/// assert!(queue.insert_tail("c").is_err());
/// assert_eq!(queue.len(), 2);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct QueueBuilder<K: Key = u32> {
    capacity: usize,
    max_nodes: Option<usize>,
    _marker: PhantomData<K>,
}

impl<K: Key> Default for QueueBuilder<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key> QueueBuilder<K> {
    /// Starts with no preallocation and no limit beyond the key space.
    pub const fn new() -> Self {
        Self {
            capacity: 0,
            max_nodes: None,
            _marker: PhantomData,
        }
    }

    /// Node slots to reserve up front. Clamped to the node limit.
    pub const fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Maximum number of values the queue will hold. Inserts beyond it fail
    /// with [`QueueError::AllocationFailure`].
    pub const fn max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }

    /// Builds the queue.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::AllocationFailure`] if the reservation fails.
    pub fn build(self) -> Result<Queue<K>, QueueError> {
        let mut storage = match self.max_nodes {
            Some(limit) => Slab::with_limit(limit),
            None => Slab::new(),
        };
        storage.try_reserve(self.capacity)?;

        Ok(Queue {
            storage,
            chain: Chain::new(),
        })
    }
}


#[cfg(test)]
mod bench_queue {
    use super::*;
    use hdrhistogram::Histogram;

    #[inline]
    fn rdtscp() -> u64 {
        #[cfg(target_arch = "x86_64")]
        unsafe {
            core::arch::x86_64::__rdtscp(&mut 0)
        }
        #[cfg(not(target_arch = "x86_64"))]
        {
            std::time::Instant::now().elapsed().as_nanos() as u64
        }
    }

    fn print_histogram(name: &str, hist: &Histogram<u64>) {
        println!(
            "{:24} p50: {:4} cycles | p99: {:4} cycles | p999: {:5} cycles | min: {:4} | max: {:5}",
            name,
            hist.value_at_quantile(0.50),
            hist.value_at_quantile(0.99),
            hist.value_at_quantile(0.999),
            hist.min(),
            hist.max(),
        );
    }

    const WARMUP: usize = 10_000;
    const ITERATIONS: usize = 100_000;
    const VALUE: &str = "order-0000000042";

    #[test]
    #[ignore]
    fn bench_insert_tail() {
        let mut queue: Queue = Queue::try_with_capacity(16).unwrap();
        let mut hist = Histogram::<u64>::new(3).unwrap();

        for _ in 0..WARMUP {
            let _ = queue.insert_tail(VALUE);
            let _ = queue.pop_head();
        }

        for _ in 0..ITERATIONS {
            let start = rdtscp();
            let _ = queue.insert_tail(VALUE);
            let elapsed = rdtscp() - start;
            hist.record(elapsed).unwrap();
            let _ = queue.pop_head();
        }

        print_histogram("insert_tail", &hist);
    }

    #[test]
    #[ignore]
    fn bench_insert_head() {
        let mut queue: Queue = Queue::try_with_capacity(16).unwrap();
        let mut hist = Histogram::<u64>::new(3).unwrap();

        for _ in 0..WARMUP {
            let _ = queue.insert_head(VALUE);
            let _ = queue.pop_head();
        }

        for _ in 0..ITERATIONS {
            let start = rdtscp();
            let _ = queue.insert_head(VALUE);
            let elapsed = rdtscp() - start;
            hist.record(elapsed).unwrap();
            let _ = queue.pop_head();
        }

        print_histogram("insert_head", &hist);
    }

    #[test]
    #[ignore]
    fn bench_remove_head() {
        let mut queue: Queue = Queue::try_with_capacity(16).unwrap();
        let mut hist = Histogram::<u64>::new(3).unwrap();
        let mut buf = [0u8; 64];

        for _ in 0..WARMUP {
            let _ = queue.insert_tail(VALUE);
            let _ = queue.remove_head(&mut buf);
        }

        for _ in 0..ITERATIONS {
            let _ = queue.insert_tail(VALUE);
            let start = rdtscp();
            let _ = queue.remove_head(&mut buf);
            let elapsed = rdtscp() - start;
            hist.record(elapsed).unwrap();
        }

        print_histogram("remove_head", &hist);
    }

    #[test]
    #[ignore]
    fn bench_len() {
        let queue: Queue = Queue::try_from_iter((0..1000).map(|i| i.to_string())).unwrap();
        let mut hist = Histogram::<u64>::new(3).unwrap();

        for _ in 0..ITERATIONS {
            let start = rdtscp();
            let len = std::hint::black_box(&queue).len();
            let elapsed = rdtscp() - start;
            hist.record(elapsed).unwrap();
            assert_eq!(len, 1000);
        }

        print_histogram("len (n=1000)", &hist);
    }

    #[test]
    #[ignore]
    fn bench_all() {
        println!("\nQUEUE LATENCY (cycles)");
        println!("============================================================");
        bench_insert_tail();
        bench_insert_head();
        bench_remove_head();
        bench_len();
    }
}
