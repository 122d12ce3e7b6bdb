use crate::cache::{block_tag, AccessResult, AddressError, Cache, CacheStats, Counters, Slot};

/// Direct-mapped cache: every tag maps to exactly one slot, `tag % num_blocks`,
/// so a miss overwrites the resident block with no replacement choice.
#[derive(Debug)]
pub struct DirectMapped {
    slots: Vec<Slot>,
    num_blocks: usize,
    block_size: usize,
    counters: Counters,
}

impl DirectMapped {
    /// Callers validate the documented bounds first; `num_blocks` and
    /// `block_size` must both be at least 1.
    pub fn new(num_blocks: usize, block_size: usize) -> Self {
        DirectMapped {
            slots: vec![Slot::default(); num_blocks],
            num_blocks,
            block_size,
            counters: Counters::default(),
        }
    }
}

impl Cache for DirectMapped {
    fn access(&mut self, addr: &str) -> Result<AccessResult, AddressError> {
        let tag = block_tag(addr, self.block_size)?;
        let index = tag % self.num_blocks;

        if self.slots[index].valid && self.slots[index].tag == tag {
            self.counters.hit();
            Ok(AccessResult::Hit)
        } else {
            self.counters.miss();
            self.slots[index] = Slot {
                valid: true,
                tag,
                stamp: 0,
            };
            Ok(AccessResult::Miss)
        }
    }

    fn report(&self) -> CacheStats {
        self.counters.report()
    }

    fn set_num_blocks(&mut self, num_blocks: usize) {
        self.num_blocks = num_blocks;
        self.slots = vec![Slot::default(); num_blocks];
    }

    fn set_block_size(&mut self, block_size: usize) {
        self.block_size = block_size;
        self.slots = vec![Slot::default(); self.num_blocks];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_access_always_hits() {
        let mut cache = DirectMapped::new(8, 2);
        assert_eq!(cache.access("1101"), Ok(AccessResult::Miss));
        assert_eq!(cache.access("1101"), Ok(AccessResult::Hit));
        // Different word, same block.
        assert_eq!(cache.access("1100"), Ok(AccessResult::Hit));
    }

    #[test]
    fn conflicting_tags_evict_each_other() {
        // Tags 0 and 4 both map to index 0 with four blocks.
        let mut cache = DirectMapped::new(4, 1);
        assert_eq!(cache.access("0"), Ok(AccessResult::Miss));
        assert_eq!(cache.access("100"), Ok(AccessResult::Miss));
        assert_eq!(cache.access("0"), Ok(AccessResult::Miss));

        let stats = cache.report();
        assert_eq!(stats.accesses, 3);
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 3);
    }

    #[test]
    fn failed_decode_leaves_counters_unchanged() {
        let mut cache = DirectMapped::new(4, 1);
        cache.access("11").unwrap();
        assert!(cache.access("1x1").is_err());

        let stats = cache.report();
        assert_eq!(stats.accesses, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn resize_empties_slots_but_keeps_counters() {
        let mut cache = DirectMapped::new(4, 1);
        cache.access("10").unwrap();
        assert_eq!(cache.access("10"), Ok(AccessResult::Hit));

        cache.set_num_blocks(8);
        assert_eq!(cache.access("10"), Ok(AccessResult::Miss));
        assert_eq!(cache.report().accesses, 3);

        cache.access("10").unwrap();
        cache.set_block_size(2);
        assert_eq!(cache.access("10"), Ok(AccessResult::Miss));
    }

    #[test]
    fn counters_always_reconcile() {
        let mut cache = DirectMapped::new(16, 4);
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..1000 {
            let addr: String = (0..rng.usize(1..12))
                .map(|_| if rng.bool() { '1' } else { '0' })
                .collect();
            cache.access(&addr).unwrap();

            let stats = cache.report();
            assert_eq!(stats.hits + stats.misses, stats.accesses);
        }
    }
}
