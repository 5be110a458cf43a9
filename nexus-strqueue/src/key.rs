//! Node handles.
//!
//! Nodes live in an arena and link to each other by integer key rather than
//! by pointer. [`Key::NONE`] plays the role of a null link: it terminates the
//! chain and marks an empty queue's head and tail.

/// Integer handle of a node slot.
///
/// The width of the key bounds how many nodes a queue can hold: every value
/// except [`Key::NONE`] is a usable slot index. A `u16` queue holds at most
/// `u16::MAX` nodes, which keeps links small when queues are known to stay
/// short.
///
/// # Example
///
/// ```
/// use nexus_strqueue::Key;
///
/// let key: u32 = 7;
/// assert!(key.is_some());
/// assert!(u32::NONE.is_none());
/// assert_eq!(u16::SLOTS, u16::MAX as usize);
/// ```
pub trait Key: Copy + Eq + core::fmt::Debug {
    /// The null link.
    const NONE: Self;

    /// Number of addressable slots (every index below `NONE`).
    const SLOTS: usize;

    /// Creates a key from a slot index.
    ///
    /// `val` must be less than [`Key::SLOTS`].
    fn from_usize(val: usize) -> Self;

    /// Returns the slot index.
    fn as_usize(&self) -> usize;

    /// Returns `true` if this is the null link.
    #[inline]
    fn is_none(&self) -> bool {
        *self == Self::NONE
    }

    /// Returns `true` if this refers to a slot.
    #[inline]
    fn is_some(&self) -> bool {
        !self.is_none()
    }
}

macro_rules! impl_key {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Key for $ty {
                const NONE: Self = <$ty>::MAX;

                // Saturates at usize::MAX where the key is wider than usize.
                const SLOTS: usize = if (<$ty>::MAX as u128) < (usize::MAX as u128) {
                    <$ty>::MAX as usize
                } else {
                    usize::MAX
                };

                #[inline]
                fn from_usize(val: usize) -> Self {
                    debug_assert!(val < Self::SLOTS, "slot index {val} out of key range");
                    val as $ty
                }

                #[inline]
                fn as_usize(&self) -> usize {
                    *self as usize
                }
            }
        )*
    };
}

impl_key!(u16, u32, u64, usize);
