/// A pooled type that knows how to reset itself to its initial condition.
///
/// Implementing this trait is optional. Return objects of such types with
/// [`PoolRegistry::recycle_recyclable()`][crate::PoolRegistry::recycle_recyclable] and
/// [`reset_state()`][Self::reset_state] is called on them before any pool-level reset action
/// configured via
/// [`PoolRegistry::set_pool_reset_action()`][crate::PoolRegistry::set_pool_reset_action].
///
/// Either of [`recycle_recyclable()`][crate::PoolRegistry::recycle_recyclable] or
/// [`PoolRegistry::create_recyclable()`][crate::PoolRegistry::create_recyclable] also enables the
/// self-reset for every later return to the pool of that type, including plain
/// [`recycle()`][crate::PoolRegistry::recycle].
///
/// # Example
///
/// ```rust
/// use type_pool::{PoolRegistry, Recyclable};
///
/// #[derive(Default)]
/// struct Scratch {
///     bytes: Vec<u8>,
/// }
///
/// impl Recyclable for Scratch {
///     fn reset_state(&mut self) {
///         self.bytes.clear();
///     }
/// }
///
/// let registry = PoolRegistry::new();
///
/// let mut scratch = registry.create(Scratch::default);
/// scratch.bytes.extend_from_slice(b"hello");
/// registry.recycle_recyclable(scratch);
///
/// let scratch = registry.create(Scratch::default);
/// assert!(scratch.bytes.is_empty());
/// ```
pub trait Recyclable {
    /// Resets the internal state of the object so it can be handed out again.
    fn reset_state(&mut self);
}
