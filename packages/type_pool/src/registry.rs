use std::any::{Any, TypeId, type_name};
use std::collections::hash_map;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock, RwLock};

use hash_hasher::HashedMap;
use tracing::{debug, trace};

use crate::constants::ERR_POISONED_LOCK;
use crate::typed_pool::TypedPool;
use crate::{Error, PoolRegistryBuilder, PoolStats, Recyclable, Result};

// We use HashedMap which takes the raw value from Hash::hash() and uses it directly as the key.
// TypeId is already a hash, so hashing it again would be wasted work.
// Values are type-occluded `TypedPool<T>` where T is the type identified by the key.
type PoolMap = HashedMap<TypeId, Arc<dyn Any + Send + Sync>>;

static GLOBAL_REGISTRY: LazyLock<PoolRegistry> = LazyLock::new(PoolRegistry::new);

/// A registry of object pools, holding at most one pool per item type.
///
/// A pool for type `T` is created the first time an object of type `T` is requested via
/// [`create()`][Self::create] or [`create_recyclable()`][Self::create_recyclable] and lives as
/// long as the registry. Recycled objects go back into the pool of their type and are handed
/// out again by later requests, instead of calling the factory.
///
/// # Capacity
///
/// A single maximum capacity applies to every pool in the registry. A value of 0 (the default)
/// means there is no limit. When a pool already holds at least the maximum capacity, recycled
/// objects of that type are dropped instead of being kept. Changing the capacity never shrinks
/// an existing pool, use [`set_pool_size()`][Self::set_pool_size] for that.
///
/// # Missing pools
///
/// Only [`create()`][Self::create] and [`create_recyclable()`][Self::create_recyclable] create
/// pools. All other operations silently do nothing for a type that has no pool yet. In
/// particular, objects recycled before the first `create()` for their type are dropped, and
/// reset actions set before the first `create()` are forgotten.
///
/// # Thread safety
///
/// This type is thread-safe. Share it by reference or wrap it in an [`Arc`].
///
/// # Example
///
/// ```rust
/// use type_pool::PoolRegistry;
///
/// let registry = PoolRegistry::new();
///
/// let mut names = registry.create(Vec::<String>::new);
/// registry.set_pool_reset_action(|names: &mut Vec<String>| names.clear());
///
/// names.push("Ferris".to_string());
/// registry.recycle(names);
///
/// assert_eq!(registry.pool_count::<Vec<String>>(), 1);
///
/// // The recycled (and reset) vector is handed out again.
/// let names = registry.create(Vec::<String>::new);
/// assert!(names.is_empty());
/// assert!(names.capacity() > 0);
/// ```
pub struct PoolRegistry {
    pools: RwLock<PoolMap>,

    /// 0 means unlimited.
    max_capacity: AtomicUsize,
}

impl PoolRegistry {
    /// Creates an empty registry with no capacity limit.
    ///
    /// For custom configuration, use [`PoolRegistry::builder()`][Self::builder].
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a builder for configuring and constructing a [`PoolRegistry`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use type_pool::PoolRegistry;
    ///
    /// let registry = PoolRegistry::builder().max_capacity(64).build();
    ///
    /// assert_eq!(registry.max_capacity(), 64);
    /// ```
    pub fn builder() -> PoolRegistryBuilder {
        PoolRegistryBuilder::new()
    }

    pub(crate) fn new_inner(max_capacity: usize) -> Self {
        Self {
            pools: RwLock::new(PoolMap::default()),
            max_capacity: AtomicUsize::new(max_capacity),
        }
    }

    /// Returns the process-wide registry.
    ///
    /// Prefer passing an explicitly constructed registry to the code that needs it. The global
    /// instance exists for code that has no convenient way to receive one.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL_REGISTRY
    }

    /// Returns an object of type `T`, reusing a recycled one if the pool for `T` has any.
    ///
    /// If no pool exists for `T` yet, one is created. If the pool is empty, `factory` is called
    /// and its result returned directly. The new object does not become part of the pool until
    /// it is [recycled][Self::recycle].
    ///
    /// # Example
    ///
    /// ```rust
    /// use type_pool::PoolRegistry;
    ///
    /// let registry = PoolRegistry::new();
    ///
    /// let buffer = registry.create(|| Vec::<u8>::with_capacity(1024));
    /// assert!(buffer.capacity() >= 1024);
    /// ```
    pub fn create<T, F>(&self, factory: F) -> T
    where
        T: Send + 'static,
        F: FnOnce() -> T,
    {
        self.pool_or_create::<T>().get_object(factory)
    }

    /// Returns an object of type `T` like [`create()`][Self::create] and ensures that the pool
    /// for `T` calls [`Recyclable::reset_state()`] on every object returned to it.
    ///
    /// The self-reset runs before any pool-level reset action.
    pub fn create_recyclable<T, F>(&self, factory: F) -> T
    where
        T: Recyclable + Send + 'static,
        F: FnOnce() -> T,
    {
        let pool = self.pool_or_create::<T>();
        pool.enable_self_reset(T::reset_state);
        pool.get_object(factory)
    }

    /// Returns an object to the pool for its type so it can be handed out again.
    ///
    /// The object is reset first (self-reset if enabled for the pool, then the pool-level reset
    /// action). It is dropped instead of being kept if there is no pool for `T` or if the pool
    /// already holds the maximum capacity.
    ///
    /// For types implementing [`Recyclable`], use
    /// [`recycle_recyclable()`][Self::recycle_recyclable] so the self-reset runs regardless of
    /// how the object was obtained.
    ///
    /// The capacity check and the insertion are not atomic as a pair. Under concurrent recycling
    /// a pool may briefly exceed the maximum capacity by the number of racing callers.
    pub fn recycle<T>(&self, item: T)
    where
        T: Send + 'static,
    {
        let Some(pool) = self.existing_pool::<T>() else {
            trace!(
                item_type = type_name::<T>(),
                "no pool for recycled object, dropping it"
            );
            return;
        };

        self.return_or_drop(&pool, item);
    }

    /// Returns an object to the pool for its type like [`recycle()`][Self::recycle], calling
    /// [`Recyclable::reset_state()`] on it before any pool-level reset action.
    ///
    /// This also enables the self-reset for every later return to the pool for `T`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use type_pool::{PoolRegistry, Recyclable};
    ///
    /// #[derive(Default)]
    /// struct Connection {
    ///     dirty: bool,
    /// }
    ///
    /// impl Recyclable for Connection {
    ///     fn reset_state(&mut self) {
    ///         self.dirty = false;
    ///     }
    /// }
    ///
    /// let registry = PoolRegistry::new();
    ///
    /// let mut connection = registry.create(Connection::default);
    /// connection.dirty = true;
    /// registry.recycle_recyclable(connection);
    ///
    /// let connection = registry.create(Connection::default);
    /// assert!(!connection.dirty);
    /// ```
    pub fn recycle_recyclable<T>(&self, item: T)
    where
        T: Recyclable + Send + 'static,
    {
        let Some(pool) = self.existing_pool::<T>() else {
            trace!(
                item_type = type_name::<T>(),
                "no pool for recycled object, dropping it"
            );
            return;
        };

        pool.enable_self_reset(T::reset_state);
        self.return_or_drop(&pool, item);
    }

    /// Sets the maximum number of resident objects for every pool in the registry.
    ///
    /// 0 means unlimited. The new limit applies to future operations only, existing pools
    /// larger than the limit keep their objects.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `capacity` is negative. The previous limit stays
    /// in effect.
    ///
    /// # Example
    ///
    /// ```rust
    /// use type_pool::PoolRegistry;
    ///
    /// let registry = PoolRegistry::new();
    ///
    /// registry.set_max_capacity(10).unwrap();
    /// assert_eq!(registry.max_capacity(), 10);
    ///
    /// assert!(registry.set_max_capacity(-1).is_err());
    /// assert_eq!(registry.max_capacity(), 10);
    /// ```
    pub fn set_max_capacity(&self, capacity: isize) -> Result<()> {
        if capacity < 0 {
            return Err(Error::InvalidArgument {
                argument: "capacity",
                problem: format!("must not be negative, got {capacity}"),
            });
        }

        let capacity = capacity.unsigned_abs();
        self.max_capacity.store(capacity, Ordering::Relaxed);

        debug!(max_capacity = capacity, "pool maximum capacity changed");

        Ok(())
    }

    /// Returns the maximum number of resident objects per pool. 0 means unlimited.
    #[must_use]
    pub fn max_capacity(&self) -> usize {
        self.max_capacity.load(Ordering::Relaxed)
    }

    /// Sets the action invoked on every object returned to the pool for `T`, replacing any
    /// previous action.
    ///
    /// Does nothing if there is no pool for `T` yet, the action is not remembered for a pool
    /// created later.
    pub fn set_pool_reset_action<T, A>(&self, action: A)
    where
        T: Send + 'static,
        A: Fn(&mut T) + Send + Sync + 'static,
    {
        let Some(pool) = self.existing_pool::<T>() else {
            trace!(
                item_type = type_name::<T>(),
                "no pool for reset action, ignoring it"
            );
            return;
        };

        pool.set_reset_action(Arc::new(action));
    }

    /// Drops all resident objects in the pool for `T`.
    ///
    /// Objects that are currently checked out are not affected and may still be recycled.
    pub fn clear_pool<T>(&self)
    where
        T: Send + 'static,
    {
        if let Some(pool) = self.existing_pool::<T>() {
            pool.clear();
            debug!(item_type = type_name::<T>(), "pool cleared");
        }
    }

    /// Returns the number of resident objects in the pool for `T`, or 0 if there is no pool.
    #[must_use]
    pub fn pool_count<T>(&self) -> usize
    where
        T: Send + 'static,
    {
        self.existing_pool::<T>()
            .map_or(0, |pool| pool.count())
    }

    /// Returns whether a pool has been created for `T`.
    #[must_use]
    pub fn has_pool<T>(&self) -> bool
    where
        T: Send + 'static,
    {
        self.existing_pool::<T>().is_some()
    }

    /// Returns a snapshot of the activity counters of the pool for `T`, or `None` if there is
    /// no pool.
    #[must_use]
    pub fn pool_stats<T>(&self) -> Option<PoolStats>
    where
        T: Send + 'static,
    {
        self.existing_pool::<T>().map(|pool| pool.stats())
    }

    /// Adjusts the pool for `T` to hold exactly `size` resident objects.
    ///
    /// Excess objects are dropped without being reset, missing objects are created by calling
    /// `factory`. Which objects are dropped when shrinking is unspecified. Does nothing if there
    /// is no pool for `T` yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if a maximum capacity is set and `size` exceeds it.
    /// The pool is not modified in that case.
    ///
    /// # Example
    ///
    /// ```rust
    /// use type_pool::PoolRegistry;
    ///
    /// let registry = PoolRegistry::new();
    /// let _first = registry.create(String::new);
    ///
    /// registry.set_pool_size(5, String::new).unwrap();
    /// assert_eq!(registry.pool_count::<String>(), 5);
    ///
    /// registry.set_pool_size(2, String::new).unwrap();
    /// assert_eq!(registry.pool_count::<String>(), 2);
    /// ```
    pub fn set_pool_size<T, F>(&self, size: usize, factory: F) -> Result<()>
    where
        T: Send + 'static,
        F: FnMut() -> T,
    {
        self.ensure_within_max_capacity("size", size)?;

        let Some(pool) = self.existing_pool::<T>() else {
            trace!(
                item_type = type_name::<T>(),
                size,
                "no pool to resize, ignoring request"
            );
            return Ok(());
        };

        pool.set_size(size, factory);

        debug!(item_type = type_name::<T>(), size, "pool resized");

        Ok(())
    }

    /// Adds `count` newly created objects to the pool for `T`, on top of any already resident.
    ///
    /// Does nothing if there is no pool for `T` yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if a maximum capacity is set and `count` exceeds it.
    /// The pool is not modified in that case. Only `count` itself is checked, so repeated calls
    /// may fill a pool beyond the maximum capacity.
    pub fn prepopulate_pool<T, F>(&self, count: usize, factory: F) -> Result<()>
    where
        T: Send + 'static,
        F: FnMut() -> T,
    {
        self.ensure_within_max_capacity("count", count)?;

        let Some(pool) = self.existing_pool::<T>() else {
            trace!(
                item_type = type_name::<T>(),
                count,
                "no pool to prepopulate, ignoring request"
            );
            return Ok(());
        };

        pool.prepopulate(count, factory);

        debug!(item_type = type_name::<T>(), count, "pool prepopulated");

        Ok(())
    }

    fn return_or_drop<T>(&self, pool: &TypedPool<T>, item: T)
    where
        T: Send + 'static,
    {
        let max_capacity = self.max_capacity.load(Ordering::Relaxed);

        if max_capacity == 0 || pool.count() < max_capacity {
            pool.return_object(item);
        } else {
            pool.record_drop();

            trace!(
                item_type = type_name::<T>(),
                max_capacity,
                "pool at maximum capacity, dropping recycled object"
            );

            drop(item);
        }
    }

    fn ensure_within_max_capacity(&self, argument: &'static str, requested: usize) -> Result<()> {
        let max_capacity = self.max_capacity.load(Ordering::Relaxed);

        if max_capacity > 0 && requested > max_capacity {
            return Err(Error::InvalidArgument {
                argument,
                problem: format!("{requested} exceeds the maximum capacity of {max_capacity}"),
            });
        }

        Ok(())
    }

    fn existing_pool<T>(&self) -> Option<Arc<TypedPool<T>>>
    where
        T: Send + 'static,
    {
        let pool = Arc::clone(
            self.pools
                .read()
                .expect(ERR_POISONED_LOCK)
                .get(&TypeId::of::<T>())?,
        );

        pool.downcast::<TypedPool<T>>().ok()
    }

    /// Returns the pool for `T`, registering a new one if there is none.
    ///
    /// Concurrent first calls for the same `T` all receive the same pool. The candidate pool is
    /// created before taking the write lock, so a caller that loses the race simply drops its
    /// empty candidate.
    fn pool_or_create<T>(&self) -> Arc<TypedPool<T>>
    where
        T: Send + 'static,
    {
        if let Some(pool) = self.existing_pool::<T>() {
            return pool;
        }

        let candidate: Arc<dyn Any + Send + Sync> = Arc::new(TypedPool::<T>::new());

        let registered = {
            let mut pools = self.pools.write().expect(ERR_POISONED_LOCK);

            match pools.entry(TypeId::of::<T>()) {
                hash_map::Entry::Occupied(entry) => Arc::clone(entry.get()),
                hash_map::Entry::Vacant(entry) => {
                    debug!(item_type = type_name::<T>(), "created object pool");
                    Arc::clone(entry.insert(candidate))
                }
            }
        };

        registered
            .downcast::<TypedPool<T>>()
            .expect("pools are keyed by the TypeId of their item type")
    }
}

impl Default for PoolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PoolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolRegistry")
            .field("pools", &self.pools.read().expect(ERR_POISONED_LOCK).len())
            .field("max_capacity", &self.max_capacity())
            .finish()
    }
}
