use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("empty address")]
    Empty,
    #[error("invalid binary digit {digit:?} in address")]
    NotBinary { digit: char },
    #[error("address does not fit in a machine word")]
    Overflow,
}

/// Block tag of a binary address string: the address value divided by the
/// block size. Distinct addresses within one block share a tag.
pub fn block_tag(addr: &str, block_size: usize) -> Result<usize, AddressError> {
    if addr.is_empty() {
        return Err(AddressError::Empty);
    }
    let mut value: usize = 0;
    for digit in addr.chars() {
        let bit = match digit {
            '0' => 0,
            '1' => 1,
            _ => return Err(AddressError::NotBinary { digit }),
        };
        value = value
            .checked_mul(2)
            .and_then(|v| v.checked_add(bit))
            .ok_or(AddressError::Overflow)?;
    }
    Ok(value / block_size)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessResult {
    Hit,
    Miss,
}

/// One storage unit: at most one resident tag, plus the recency stamp the
/// set-associative policy keys eviction on (0 = never touched).
#[derive(Debug, Default, Clone)]
pub struct Slot {
    pub valid: bool,
    pub tag: usize,
    pub stamp: u64,
}

#[derive(Debug, Default)]
pub struct Counters {
    pub accesses: u64,
    pub hits: u64,
    pub misses: u64,
}

impl Counters {
    pub fn hit(&mut self) {
        self.accesses += 1;
        self.hits += 1;
    }

    pub fn miss(&mut self) {
        self.accesses += 1;
        self.misses += 1;
    }

    pub fn report(&self) -> CacheStats {
        let rate = |n: u64| {
            if self.accesses == 0 {
                0.0
            } else {
                100.0 * n as f64 / self.accesses as f64
            }
        };
        CacheStats {
            accesses: self.accesses,
            hits: self.hits,
            misses: self.misses,
            hit_rate: rate(self.hits),
            miss_rate: rate(self.misses),
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct CacheStats {
    pub accesses: u64,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub miss_rate: f64,
}

pub trait Cache {
    /// Runs one trace entry through the cache, updating counters and
    /// resident state. A decode failure leaves both untouched.
    fn access(&mut self, addr: &str) -> Result<AccessResult, AddressError>;

    fn report(&self) -> CacheStats;

    /// Resizes the cache to `num_blocks` total slots, emptying every slot.
    /// Counters belong to the instance, not the layout, and persist.
    fn set_num_blocks(&mut self, num_blocks: usize);

    /// Changes the block size, emptying every slot since resident tags are
    /// derived from it.
    fn set_block_size(&mut self, block_size: usize);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_is_address_value_over_block_size() {
        assert_eq!(block_tag("1010", 1), Ok(10));
        assert_eq!(block_tag("1010", 4), Ok(2));
        assert_eq!(block_tag("0", 8), Ok(0));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert_eq!(block_tag("", 1), Err(AddressError::Empty));
        assert_eq!(block_tag("10201", 1), Err(AddressError::NotBinary { digit: '2' }));
        assert_eq!(block_tag("+101", 1), Err(AddressError::NotBinary { digit: '+' }));
    }

    #[test]
    fn rejects_addresses_wider_than_a_word() {
        let wide = "1".repeat(usize::BITS as usize + 1);
        assert_eq!(block_tag(&wide, 1), Err(AddressError::Overflow));
    }

    #[test]
    fn rates_are_zero_before_any_access() {
        let stats = Counters::default().report();
        assert_eq!(stats.accesses, 0);
        assert_eq!(stats.hit_rate, 0.0);
        assert_eq!(stats.miss_rate, 0.0);
    }
}
