//! # ripcord-cache
//!
//! In-process keyed object store used to track gateway-delivered objects
//! (primarily guild availability). Bounded stores evict least-recently-used
//! entries; capacity 0 means unbounded.

mod store;

pub use store::Store;
