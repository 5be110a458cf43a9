//! Singly linked text queue over an index arena.
//!
//! A [`Queue`] stores owned strings in a singly linked chain. It supports
//! insertion at both ends, removal from the head, an O(1) length, in-place
//! reversal and a stable in-place merge sort.
//!
//! # Design
//!
//! Nodes are not individually boxed. They live in an arena ([`Slab`]) and
//! link to each other by integer key:
//!
//! ```text
//! Slab<Node>   - owns every node and its text, hands out stable keys
//! Chain        - head / tail / len over those keys, owns nothing
//! Queue        - one Slab + one Chain, the public container
//! ```
//!
//! This gives the ownership rules a linked list needs without `unsafe`:
//! - **One owner**: the arena owns all nodes; a key cannot be reached from
//!   two queues because each queue has its own arena
//! - **Non-owning tail**: `tail` is just a key, so O(1) tail insertion does
//!   not create a second owner
//! - **Checkable**: [`Queue::validate`] walks the chain and reports any broken
//!   invariant as an [`InvariantViolation`]
//!
//! Sorting splits the chain into two [`Chain`] values, sorts each, and merges
//! them back by relinking. Node contents are never copied or moved.
//!
//! # Quick Start
//!
//! ```
//! use nexus_strqueue::Queue;
//!
//! let mut queue: Queue = Queue::new();
//! queue.insert_tail("banana").unwrap();
//! queue.insert_tail("apple").unwrap();
//! queue.insert_tail("cherry").unwrap();
//! assert_eq!(queue.len(), 3);
//!
//! queue.sort();
//! assert_eq!(queue.iter().collect::<Vec<_>>(), ["apple", "banana", "cherry"]);
//!
//! assert_eq!(queue.pop_head().as_deref(), Some("apple"));
//! assert_eq!(queue.len(), 2);
//! ```
//!
//! # Errors
//!
//! Typed methods return [`QueueError`]. A failed call never changes the
//! queue. The [`ops`] module wraps the same operations in the
//! absent-argument, boolean-result form a scripted test driver expects.
//!
//! # Threading
//!
//! A queue has no internal synchronization. It is `Send`, and mutation
//! requires `&mut`, so sharing one across threads needs an external lock.
//!
//! # Feature Flags
//!
//! - `slab` - Enable [`Storage`] impl for `slab::Slab`, so a [`Chain`] can run
//!   over it directly

#![warn(missing_docs)]

pub mod chain;
pub mod error;
pub mod key;
pub mod node;
pub mod ops;
pub mod queue;
pub mod storage;

pub use chain::Chain;
pub use error::{InvariantViolation, QueueError};
pub use key::Key;
pub use node::Node;
pub use queue::{NodeSlab, Queue, QueueBuilder};
pub use storage::{Exhausted, Slab, Storage};
