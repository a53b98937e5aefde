use crate::PoolRegistry;

/// Builder for creating an instance of [`PoolRegistry`].
///
/// # Examples
///
/// ```
/// use type_pool::PoolRegistry;
///
/// // Default registry, no capacity limit.
/// let registry = PoolRegistry::builder().build();
/// assert_eq!(registry.max_capacity(), 0);
///
/// // At most 32 resident objects per pool.
/// let registry = PoolRegistry::builder().max_capacity(32).build();
/// assert_eq!(registry.max_capacity(), 32);
/// ```
#[derive(Debug)]
#[must_use]
pub struct PoolRegistryBuilder {
    max_capacity: usize,
}

impl PoolRegistryBuilder {
    pub(crate) fn new() -> Self {
        Self { max_capacity: 0 }
    }

    /// Sets the maximum number of resident objects per pool. 0 means unlimited.
    ///
    /// The limit can be changed later via
    /// [`PoolRegistry::set_max_capacity()`][PoolRegistry::set_max_capacity].
    pub fn max_capacity(mut self, max_capacity: usize) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    /// Builds the registry with the specified configuration.
    #[must_use]
    pub fn build(self) -> PoolRegistry {
        PoolRegistry::new_inner(self.max_capacity)
    }
}
