/// A point-in-time snapshot of the activity of a single typed pool.
///
/// Obtained via [`PoolRegistry::pool_stats()`][crate::PoolRegistry::pool_stats]. The counters
/// are cumulative since the pool was created and are not affected by clearing the pool.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PoolStats {
    resident: usize,
    hits: u64,
    misses: u64,
    returns: u64,
    drops: u64,
}

impl PoolStats {
    pub(crate) fn new(resident: usize, hits: u64, misses: u64, returns: u64, drops: u64) -> Self {
        Self {
            resident,
            hits,
            misses,
            returns,
            drops,
        }
    }

    /// Number of objects resident in the pool when the snapshot was taken.
    #[must_use]
    pub fn resident(&self) -> usize {
        self.resident
    }

    /// Number of requests served by handing out a resident object.
    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Number of requests served by calling the factory because the pool was empty.
    #[must_use]
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Number of recycled objects accepted back into the pool.
    #[must_use]
    pub fn returns(&self) -> u64 {
        self.returns
    }

    /// Number of recycled objects discarded because the pool was at maximum capacity.
    #[must_use]
    pub fn drops(&self) -> u64 {
        self.drops
    }

    /// Fraction of requests served from resident objects, from 0.0 to 1.0.
    ///
    /// Returns 0.0 if the pool has not served any requests yet.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "a hit rate does not need more than 52 bits of precision"
    )]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits.saturating_add(self.misses);

        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
