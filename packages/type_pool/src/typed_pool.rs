use std::iter;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, RwLock};
use std::{fmt, mem};

use crate::PoolStats;
use crate::constants::ERR_POISONED_LOCK;

/// Pool-level reset action, shared so it can be invoked without holding the lock that guards it.
pub(crate) type ResetAction<T> = Arc<dyn Fn(&mut T) + Send + Sync>;

/// A pool of ready-to-use objects of a single type `T`.
///
/// Resident objects are kept in an unordered bag. Which resident is handed out next, or evicted
/// when shrinking, is unspecified.
///
/// The pool itself does not know about any capacity limit. Capacity is enforced by the
/// [`PoolRegistry`][crate::PoolRegistry] before objects are returned.
pub(crate) struct TypedPool<T> {
    residents: Mutex<Vec<T>>,

    /// Installed once the type is known to implement [`Recyclable`][crate::Recyclable].
    self_reset: OnceLock<fn(&mut T)>,

    reset_action: RwLock<Option<ResetAction<T>>>,

    hits: AtomicU64,
    misses: AtomicU64,
    returns: AtomicU64,
    drops: AtomicU64,
}

impl<T> TypedPool<T> {
    pub(crate) fn new() -> Self {
        Self {
            residents: Mutex::new(Vec::new()),
            self_reset: OnceLock::new(),
            reset_action: RwLock::new(None),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            returns: AtomicU64::new(0),
            drops: AtomicU64::new(0),
        }
    }

    /// Takes an arbitrary resident object, or calls `factory` if there are none.
    ///
    /// An object created by the factory is not added to the pool. It only becomes resident
    /// once it is returned.
    pub(crate) fn get_object<F>(&self, factory: F) -> T
    where
        F: FnOnce() -> T,
    {
        // Pop in its own statement so the lock is released before the factory runs.
        let resident = self.lock_residents().pop();

        if let Some(item) = resident {
            self.hits.fetch_add(1, Ordering::Relaxed);
            item
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            factory()
        }
    }

    /// Resets `item` and makes it resident.
    ///
    /// The self-reset hook (if installed) runs first, followed by the pool-level reset action
    /// (if set). The item is always added, capacity checks happen in the registry.
    pub(crate) fn return_object(&self, mut item: T) {
        if let Some(self_reset) = self.self_reset.get() {
            self_reset(&mut item);
        }

        if let Some(reset_action) = self.current_reset_action() {
            reset_action(&mut item);
        }

        self.lock_residents().push(item);
        self.returns.fetch_add(1, Ordering::Relaxed);
    }

    /// Records that a returned object was discarded instead of being made resident.
    pub(crate) fn record_drop(&self) {
        self.drops.fetch_add(1, Ordering::Relaxed);
    }

    /// Removes all resident objects. Checked-out objects are unaffected.
    pub(crate) fn clear(&self) {
        let removed = mem::take(&mut *self.lock_residents());

        // Dropped outside the lock, the items may run arbitrary drop logic.
        drop(removed);
    }

    pub(crate) fn count(&self) -> usize {
        self.lock_residents().len()
    }

    /// Adjusts the number of residents to exactly `size`.
    ///
    /// Excess residents are discarded without being reset. Missing residents are created by
    /// `factory` outside the lock and then added. If other callers modify the pool while the
    /// factory runs, surplus new objects are discarded so the pool never grows beyond `size`
    /// through this call.
    pub(crate) fn set_size<F>(&self, size: usize, factory: F)
    where
        F: FnMut() -> T,
    {
        let (evicted, missing) = {
            let mut residents = self.lock_residents();

            let evicted = if residents.len() > size {
                residents.split_off(size)
            } else {
                Vec::new()
            };

            (evicted, size.saturating_sub(residents.len()))
        };

        drop(evicted);

        if missing == 0 {
            return;
        }

        let mut created: Vec<T> = iter::repeat_with(factory).take(missing).collect();

        let surplus = {
            let mut residents = self.lock_residents();
            let room = size.saturating_sub(residents.len()).min(created.len());
            let surplus = created.split_off(room);
            residents.append(&mut created);
            surplus
        };

        drop(surplus);
    }

    /// Adds exactly `count` newly created residents, regardless of how many are already there.
    pub(crate) fn prepopulate<F>(&self, count: usize, factory: F)
    where
        F: FnMut() -> T,
    {
        let mut created: Vec<T> = iter::repeat_with(factory).take(count).collect();

        self.lock_residents().append(&mut created);
    }

    /// Replaces the pool-level reset action. Only affects future returns.
    pub(crate) fn set_reset_action(&self, action: ResetAction<T>) {
        *self.reset_action.write().expect(ERR_POISONED_LOCK) = Some(action);
    }

    /// Installs the self-reset hook. Later calls keep the first hook, which is the same
    /// function for any given `T`.
    pub(crate) fn enable_self_reset(&self, hook: fn(&mut T)) {
        self.self_reset.get_or_init(|| hook);
    }

    pub(crate) fn stats(&self) -> PoolStats {
        PoolStats::new(
            self.count(),
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
            self.returns.load(Ordering::Relaxed),
            self.drops.load(Ordering::Relaxed),
        )
    }

    fn current_reset_action(&self) -> Option<ResetAction<T>> {
        self.reset_action
            .read()
            .expect(ERR_POISONED_LOCK)
            .as_ref()
            .map(Arc::clone)
    }

    fn lock_residents(&self) -> MutexGuard<'_, Vec<T>> {
        self.residents.lock().expect(ERR_POISONED_LOCK)
    }
}

impl<T> fmt::Debug for TypedPool<T> {
    #[cfg_attr(test, mutants::skip)] // Diagnostic output only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedPool")
            .field("residents", &self.count())
            .field("self_reset", &self.self_reset.get().is_some())
            .field("reset_action", &self.current_reset_action().is_some())
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::panic::{self, AssertUnwindSafe};
    use std::rc::Rc;

    use static_assertions::{assert_impl_all, assert_not_impl_any};

    use super::*;

    assert_impl_all!(TypedPool<Vec<u8>>: Send, Sync);
    assert_not_impl_any!(TypedPool<Rc<u8>>: Sync);

    #[test]
    fn get_from_empty_pool_calls_factory_and_keeps_pool_empty() {
        let pool = TypedPool::<u32>::new();

        assert_eq!(pool.get_object(|| 7), 7);
        assert_eq!(pool.count(), 0);
        assert_eq!(pool.stats().misses(), 1);
    }

    #[test]
    fn returned_object_is_reused() {
        let pool = TypedPool::<String>::new();

        pool.return_object("kept".to_string());
        assert_eq!(pool.count(), 1);

        let item = pool.get_object(|| panic!("factory must not be called for a resident"));
        assert_eq!(item, "kept");
        assert_eq!(pool.count(), 0);
        assert_eq!(pool.stats().hits(), 1);
    }

    #[test]
    fn self_reset_runs_before_reset_action() {
        let pool = TypedPool::<Vec<&'static str>>::new();

        pool.enable_self_reset(|item| item.push("self"));
        pool.set_reset_action(Arc::new(|item: &mut Vec<&'static str>| item.push("action")));

        pool.return_object(Vec::new());

        let item = pool.get_object(Vec::new);
        assert_eq!(item, ["self", "action"]);
    }

    #[test]
    fn reset_action_is_replaced() {
        let pool = TypedPool::<u32>::new();

        pool.set_reset_action(Arc::new(|item: &mut u32| *item = 1));
        pool.set_reset_action(Arc::new(|item: &mut u32| *item = 2));

        pool.return_object(100);
        assert_eq!(pool.get_object(|| 0), 2);
    }

    #[test]
    fn reset_action_may_replace_itself() {
        let pool = Arc::new(TypedPool::<u32>::new());

        let inner_pool = Arc::clone(&pool);
        pool.set_reset_action(Arc::new(move |item: &mut u32| {
            *item = 1;
            inner_pool.set_reset_action(Arc::new(|item: &mut u32| *item = 2));
        }));

        pool.return_object(0);
        pool.return_object(0);

        let first = pool.get_object(|| 0);
        let second = pool.get_object(|| 0);
        assert_eq!(first + second, 3);
    }

    #[test]
    fn self_reset_keeps_first_hook() {
        let pool = TypedPool::<u32>::new();

        pool.enable_self_reset(|item| *item = 10);
        pool.enable_self_reset(|item| *item = 20);

        pool.return_object(0);
        assert_eq!(pool.get_object(|| 0), 10);
    }

    #[test]
    fn clear_removes_all_residents() {
        let pool = TypedPool::<u32>::new();
        pool.prepopulate(4, || 1);

        pool.clear();

        assert_eq!(pool.count(), 0);
    }

    #[test]
    fn set_size_grows_to_target() {
        let pool = TypedPool::<u32>::new();
        pool.return_object(1);

        let created = Mutex::new(0_usize);
        pool.set_size(5, || {
            *created.lock().unwrap() += 1;
            2
        });

        assert_eq!(pool.count(), 5);
        assert_eq!(*created.lock().unwrap(), 4);
    }

    #[test]
    fn set_size_shrinks_to_target_without_reset() {
        let pool = TypedPool::<u32>::new();
        pool.prepopulate(8, || 1);
        pool.set_reset_action(Arc::new(|_: &mut u32| panic!("reset must not run on shrink")));

        pool.set_size(3, || panic!("factory must not run on shrink"));

        assert_eq!(pool.count(), 3);
    }

    #[test]
    fn set_size_to_current_size_is_noop() {
        let pool = TypedPool::<u32>::new();
        pool.prepopulate(2, || 1);

        pool.set_size(2, || panic!("factory must not run when already at size"));

        assert_eq!(pool.count(), 2);
    }

    #[test]
    fn prepopulate_is_cumulative() {
        let pool = TypedPool::<u32>::new();
        pool.return_object(0);

        pool.prepopulate(3, || 1);
        pool.prepopulate(2, || 1);

        assert_eq!(pool.count(), 6);
    }

    #[test]
    fn prepopulated_objects_are_not_reset() {
        let pool = TypedPool::<u32>::new();
        pool.set_reset_action(Arc::new(|item: &mut u32| *item = 0));

        pool.prepopulate(1, || 42);

        assert_eq!(pool.get_object(|| 0), 42);
    }

    #[test]
    fn record_drop_counts_discards() {
        let pool = TypedPool::<u32>::new();

        pool.record_drop();
        pool.record_drop();

        assert_eq!(pool.stats().drops(), 2);
        assert_eq!(pool.stats().returns(), 0);
    }

    #[test]
    fn panicking_user_code_does_not_poison_pool() {
        let pool = TypedPool::<u32>::new();

        let factory_panic =
            panic::catch_unwind(AssertUnwindSafe(|| pool.get_object(|| panic!("factory failed"))));
        assert!(factory_panic.is_err());

        pool.set_reset_action(Arc::new(|_: &mut u32| panic!("reset failed")));
        let reset_panic = panic::catch_unwind(AssertUnwindSafe(|| pool.return_object(1)));
        assert!(reset_panic.is_err());

        let size_panic = panic::catch_unwind(AssertUnwindSafe(|| {
            pool.set_size(2, || panic!("factory failed"));
        }));
        assert!(size_panic.is_err());

        // All locks are still usable.
        pool.set_reset_action(Arc::new(|item: &mut u32| *item = 0));
        pool.return_object(5);
        pool.prepopulate(1, || 0);
        assert_eq!(pool.count(), 2);
        pool.clear();
        assert_eq!(pool.count(), 0);
    }

    #[test]
    fn debug_does_not_require_debug_items() {
        struct Opaque;

        let pool = TypedPool::<Opaque>::new();
        pool.return_object(Opaque);

        let text = format!("{pool:?}");
        assert!(text.contains("residents: 1"));
    }
}
