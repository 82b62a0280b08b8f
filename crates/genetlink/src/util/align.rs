//! Alignment helpers shared by the message and attribute codecs.
//!
//! Netlink requires every message and every attribute to start on a 4-byte
//! boundary. Both codecs round lengths up with the same helper.
//!
//! # Example
//!
//! ```
//! use genetlink::util::align;
//!
//! assert_eq!(align::align_up(5, 4), 8);
//! assert_eq!(align::align_up(8, 4), 8);
//! ```

/// Round `n` up to the next multiple of `boundary`.
///
/// `boundary` must be a power of two.
///
/// # Example
///
/// ```
/// use genetlink::util::align::align_up;
///
/// assert_eq!(align_up(0, 4), 0);
/// assert_eq!(align_up(1, 4), 4);
/// assert_eq!(align_up(17, 4), 20);
/// ```
#[inline]
pub const fn align_up(n: usize, boundary: usize) -> usize {
    (n + boundary - 1) & !(boundary - 1)
}
