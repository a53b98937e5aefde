#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! A registry of object pools, one per item type, for reusing objects that are expensive to
//! create.
//!
//! The central type is [`PoolRegistry`]. Callers ask it for an object of some type `T` and
//! supply a factory. If the pool for `T` holds a previously recycled object, that object is
//! handed out, otherwise the factory is called. Objects given back via
//! [`PoolRegistry::recycle()`] are reset and become available to the next caller.
//!
//! # Features
//!
//! - **One pool per type**: Pools are created on first use and keyed by [`TypeId`][1].
//!   Concurrent first use from many threads always resolves to a single pool.
//! - **Reset on return**: Types implementing [`Recyclable`] reset themselves, and each pool may
//!   additionally carry a reset action that runs after the self-reset.
//! - **Capacity limit**: A registry-wide maximum capacity caps how many objects each pool keeps.
//!   Objects recycled into a full pool are dropped.
//! - **Explicit sizing**: Pools can be resized to an exact population or prepopulated ahead of
//!   demand.
//! - **Thread-safe**: All operations take `&self` and can be called from any thread.
//!
//! # Example
//!
//! ```rust
//! use type_pool::PoolRegistry;
//!
//! let registry = PoolRegistry::builder().max_capacity(16).build();
//!
//! // The first request creates the pool for Vec<u8> and calls the factory.
//! let mut buffer = registry.create(|| Vec::<u8>::with_capacity(4096));
//! registry.set_pool_reset_action(|buffer: &mut Vec<u8>| buffer.clear());
//!
//! buffer.extend_from_slice(b"request payload");
//! registry.recycle(buffer);
//!
//! // Later requests reuse the recycled buffer.
//! let buffer = registry.create(|| Vec::<u8>::with_capacity(4096));
//! assert!(buffer.is_empty());
//! assert!(buffer.capacity() >= 4096);
//!
//! // Keep eight buffers ready for the next burst.
//! registry.set_pool_size(8, || Vec::<u8>::with_capacity(4096)).unwrap();
//! assert_eq!(registry.pool_count::<Vec<u8>>(), 8);
//! ```
//!
//! # Ownership
//!
//! A resident object is owned by its pool. Handing it out moves it to the caller and recycling
//! moves it back, so the type system prevents using an object after returning it.
//!
//! [1]: std::any::TypeId

mod builder;
mod constants;
mod error;
mod recyclable;
mod registry;
mod stats;
mod typed_pool;

pub use builder::*;
pub use error::*;
pub use recyclable::*;
pub use registry::*;
pub use stats::*;
