//! Boolean-result operations for test drivers.
//!
//! A driver that scripts queue operations deals in possibly-absent queues,
//! values and buffers, and only wants to know whether each call succeeded.
//! These functions take `Option` arguments, never panic on them, and collapse
//! [`QueueError`] into `false`. Every rejection is logged at `debug` level
//! with its reason.
//!
//! ```
//! use nexus_strqueue::{ops, Queue};
//!
//! let mut queue: Option<Queue> = ops::new();
//! assert!(ops::insert_tail(queue.as_mut(), Some("banana")));
//! assert!(!ops::insert_tail(queue.as_mut(), None));
//! assert!(!ops::insert_tail(None::<&mut Queue>, Some("lost")));
//! assert_eq!(ops::size(queue.as_ref()), 1);
//!
//! let mut buf = [0u8; 8];
//! assert!(ops::remove_head(queue.as_mut(), Some(&mut buf[..])));
//! assert_eq!(&buf[..7], b"banana\0");
//! ops::destroy(queue);
//! ```

use crate::{Key, Queue, QueueError};

fn report(op: &'static str, result: Result<(), QueueError>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            tracing::debug!(op, error = %err, "queue operation rejected");
            false
        }
    }
}

/// Creates an empty queue.
///
/// Returns `None` if the queue could not be allocated.
pub fn new<K: Key>() -> Option<Queue<K>> {
    match Queue::builder().build() {
        Ok(queue) => Some(queue),
        Err(err) => {
            tracing::debug!(op = "new", error = %err, "queue operation rejected");
            None
        }
    }
}

/// Releases every value and node of `queue`, then the queue itself.
///
/// `None` is a no-op.
pub fn destroy<K: Key>(queue: Option<Queue<K>>) {
    if let Some(mut queue) = queue {
        queue.clear();
    }
}

/// Inserts a copy of `value` at the head.
///
/// Returns `false`, leaving the queue unchanged, if either argument is absent
/// or the value could not be stored.
pub fn insert_head<K: Key>(queue: Option<&mut Queue<K>>, value: Option<&str>) -> bool {
    let result = match (queue, value) {
        (Some(queue), Some(value)) => queue.insert_head(value),
        (None, _) => Err(QueueError::InvalidArgument("queue is absent")),
        (_, None) => Err(QueueError::InvalidArgument("value is absent")),
    };
    report("insert_head", result)
}

/// Inserts a copy of `value` at the tail.
///
/// Returns `false`, leaving the queue unchanged, if either argument is absent
/// or the value could not be stored.
pub fn insert_tail<K: Key>(queue: Option<&mut Queue<K>>, value: Option<&str>) -> bool {
    let result = match (queue, value) {
        (Some(queue), Some(value)) => queue.insert_tail(value),
        (None, _) => Err(QueueError::InvalidArgument("queue is absent")),
        (_, None) => Err(QueueError::InvalidArgument("value is absent")),
    };
    report("insert_tail", result)
}

/// Removes the head value into `out` as a NUL-terminated byte string.
///
/// The buffer's length is its capacity: at most `len - 1` bytes of text are
/// copied. Returns `false` with no change if the queue is absent or empty, or
/// the buffer is absent or empty.
pub fn remove_head<K: Key>(queue: Option<&mut Queue<K>>, out: Option<&mut [u8]>) -> bool {
    let result = match (queue, out) {
        (Some(queue), Some(out)) => queue.remove_head(out).map(drop),
        (None, _) => Err(QueueError::InvalidArgument("queue is absent")),
        (_, None) => Err(QueueError::InvalidArgument("output buffer is absent")),
    };
    report("remove_head", result)
}

/// Returns the number of values, or 0 for an absent queue. O(1).
#[inline]
pub fn size<K: Key>(queue: Option<&Queue<K>>) -> usize {
    queue.map_or(0, Queue::len)
}

/// Reverses the queue in place. No effect on an absent queue.
pub fn reverse<K: Key>(queue: Option<&mut Queue<K>>) {
    if let Some(queue) = queue {
        queue.reverse();
    }
}

/// Sorts the queue ascending, stably. No effect on an absent queue.
pub fn sort<K: Key>(queue: Option<&mut Queue<K>>) {
    if let Some(queue) = queue {
        queue.sort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(queue: &Queue) -> Vec<&str> {
        queue.iter().collect()
    }

    #[test]
    fn absent_queue_is_inert() {
        let mut buf = [0xffu8; 4];

        assert!(!insert_head(None::<&mut Queue>, Some("a")));
        assert!(!insert_tail(None::<&mut Queue>, Some("a")));
        assert!(!remove_head(None::<&mut Queue>, Some(&mut buf[..])));
        assert_eq!(size(None::<&Queue>), 0);
        reverse(None::<&mut Queue>);
        sort(None::<&mut Queue>);
        destroy(None::<Queue>);

        assert_eq!(buf, [0xff; 4]);
    }

    #[test]
    fn absent_value_is_rejected() {
        let mut queue: Queue = Queue::new();

        assert!(!insert_head(Some(&mut queue), None));
        assert!(!insert_tail(Some(&mut queue), None));
        assert!(queue.is_empty());
    }

    #[test]
    fn absent_or_empty_buffer_does_not_consume() {
        let mut queue: Queue = Queue::try_from_iter(["a"]).unwrap();

        assert!(!remove_head(Some(&mut queue), None));
        assert!(!remove_head(Some(&mut queue), Some(&mut [0u8; 0][..])));
        assert_eq!(values(&queue), ["a"]);
    }

    #[test]
    fn remove_from_empty_fails() {
        let mut queue: Queue = Queue::new();
        let mut buf = [0u8; 4];

        assert!(!remove_head(Some(&mut queue), Some(&mut buf[..])));
        assert_eq!(size(Some(&queue)), 0);
    }

    #[test]
    fn insert_and_remove_round_trip() {
        let mut queue: Option<Queue> = new();
        let mut buf = [0u8; 8];

        assert!(insert_tail(queue.as_mut(), Some("b")));
        assert!(insert_head(queue.as_mut(), Some("a")));
        assert_eq!(size(queue.as_ref()), 2);

        assert!(remove_head(queue.as_mut(), Some(&mut buf[..])));
        assert_eq!(&buf[..2], b"a\0");
        assert!(remove_head(queue.as_mut(), Some(&mut buf[..])));
        assert_eq!(&buf[..2], b"b\0");
        assert_eq!(size(queue.as_ref()), 0);

        destroy(queue);
    }

    #[test]
    fn full_queue_rejects_insert() {
        let mut queue: Queue = Queue::builder().max_nodes(1).build().unwrap();

        assert!(insert_tail(Some(&mut queue), Some("a")));
        assert!(!insert_tail(Some(&mut queue), Some("b")));
        assert!(!insert_head(Some(&mut queue), Some("c")));
        assert_eq!(values(&queue), ["a"]);
    }

    #[test]
    fn reverse_and_sort_forward() {
        let mut queue: Queue = Queue::try_from_iter(["b", "c", "a"]).unwrap();

        reverse(Some(&mut queue));
        assert_eq!(values(&queue), ["a", "c", "b"]);

        sort(Some(&mut queue));
        assert_eq!(values(&queue), ["a", "b", "c"]);
    }
}
