//! Shared utilities for genetlink.

pub mod align;

pub use align::align_up;
