use std::ops::Range;

use crate::cache::{block_tag, AccessResult, AddressError, Cache, CacheStats, Counters, Slot};

/// N-way set-associative cache with LRU replacement. Slots live in one arena
/// indexed `set * num_ways + way`, each carrying the access ordinal of its
/// last touch. Empty slots keep stamp 0, so a cold set fills from way 0
/// upward before true LRU eviction takes over.
#[derive(Debug)]
pub struct SetAssociative {
    slots: Vec<Slot>,
    num_ways: usize,
    num_blocks: usize,
    num_sets: usize,
    block_size: usize,
    counters: Counters,
}

impl SetAssociative {
    /// Callers validate the documented bounds first; `num_ways` must not
    /// exceed `num_blocks` and is assumed to divide it evenly.
    pub fn new(num_ways: usize, num_blocks: usize, block_size: usize) -> Self {
        let mut cache = SetAssociative {
            slots: Vec::new(),
            num_ways,
            num_blocks,
            num_sets: 0,
            block_size,
            counters: Counters::default(),
        };
        cache.rebuild();
        cache
    }

    pub fn set_num_ways(&mut self, num_ways: usize) {
        self.num_ways = num_ways;
        self.rebuild();
    }

    // Recomputes the set count and discards all resident blocks.
    fn rebuild(&mut self) {
        self.num_sets = self.num_blocks / self.num_ways;
        self.slots = vec![Slot::default(); self.num_sets * self.num_ways];
    }

    fn set_range(&self, set: usize) -> Range<usize> {
        set * self.num_ways..(set + 1) * self.num_ways
    }
}

impl Cache for SetAssociative {
    fn access(&mut self, addr: &str) -> Result<AccessResult, AddressError> {
        let tag = block_tag(addr, self.block_size)?;
        let set = tag % self.num_sets;
        let range = self.set_range(set);
        let set_slice = &mut self.slots[range];

        // At most one way can hold a given tag, so the first match is the
        // only one.
        let hit = set_slice.iter_mut().find(|s| s.valid && s.tag == tag);

        if let Some(slot) = hit {
            self.counters.hit();
            slot.stamp = self.counters.accesses;
            Ok(AccessResult::Hit)
        } else {
            self.counters.miss();
            // Victim is the minimum-stamp way, scanning from way 0 with a
            // strict compare so the first minimum wins. Empty slots hold
            // stamp 0 and are claimed before anything resident.
            let mut victim = 0;
            for way in 1..self.num_ways {
                if set_slice[way].stamp < set_slice[victim].stamp {
                    victim = way;
                }
            }
            set_slice[victim] = Slot {
                valid: true,
                tag,
                stamp: self.counters.accesses,
            };
            Ok(AccessResult::Miss)
        }
    }

    fn report(&self) -> CacheStats {
        self.counters.report()
    }

    fn set_num_blocks(&mut self, num_blocks: usize) {
        self.num_blocks = num_blocks;
        self.rebuild();
    }

    fn set_block_size(&mut self, block_size: usize) {
        self.block_size = block_size;
        self.rebuild();
    }
}
