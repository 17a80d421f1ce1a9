//! Set-associative cache with LRU, random, static- and dynamic-way-partitioning
//! replacement policies.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Fixed seed for the RANDOM replacement policy's process-wide pseudorandom
/// source (owned by the memory system, not by any individual cache), so that
/// two runs over the same trace produce identical eviction decisions.
pub const RNG_SEED: u64 = 0xC0FF_EE15_5EED_0001;

/// Compile-time bound on associativity, matching [`CacheSet::ways_per_core`]'s
/// fixed-size backing array.
pub const MAX_WAYS: usize = 16;

/// Fixed at two by this design; see the module docs in `memory/mod.rs`.
pub const NUM_CORES: usize = 2;

pub fn get_log_2(value: usize) -> usize {
    assert!(value > 0);
    usize::BITS as usize - 1 - value.leading_zeros() as usize
}

pub fn is_pow_2(value: usize) -> bool {
    value != 0 && value & (value - 1) == 0
}

pub fn get_mask(bits: usize) -> u32 {
    if bits >= 32 {
        u32::MAX
    } else {
        (1u32 << bits) - 1
    }
}

/// One tagged cache slot.
#[derive(Clone, Copy, Default)]
pub struct CacheLine {
    pub valid: bool,
    pub dirty: bool,
    pub tag: u32,
    pub core_id: u8,
    pub last_access_time: u64,
}

/// Per-set utility monitor driving dynamic way partitioning.
#[derive(Clone, Copy)]
pub struct Umon {
    pub total_hits: [u32; MAX_WAYS],
    pub total_misses: u32,
}

impl Default for Umon {
    fn default() -> Self {
        Self { total_hits: [0; MAX_WAYS], total_misses: 0 }
    }
}

/// A group of `ways` cache lines selected by the same index bits.
#[derive(Clone)]
pub struct CacheSet {
    pub lines: Vec<CacheLine>,
    pub ways_per_core: [usize; NUM_CORES],
    pub umon: Umon,
}

impl CacheSet {
    fn make(ways: usize) -> Self {
        Self {
            lines: vec![CacheLine::default(); ways],
            ways_per_core: [0; NUM_CORES],
            umon: Umon::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplacementPolicy {
    Lru,
    Random,
    Swp,
    Dwp,
}

#[derive(Clone, Copy)]
pub struct CachePolicy {
    pub cache_size: usize,
    pub line_size: usize,
    pub sets: usize,
    pub ways: usize,
    pub replacement: ReplacementPolicy,
    pub hit_latency: u32,
}

impl CachePolicy {
    /// Build a policy from size/line-size/associativity, deriving `sets`.
    pub fn make(
        cache_size: usize,
        line_size: usize,
        ways: usize,
        replacement: ReplacementPolicy,
        hit_latency: u32,
    ) -> Self {
        let block_num = cache_size / line_size;
        Self {
            cache_size,
            line_size,
            sets: block_num / ways.max(1),
            ways,
            replacement,
            hit_latency,
        }
    }

    pub fn is_valid(&self) -> bool {
        if self.ways == 0 || self.ways > MAX_WAYS {
            return false;
        }
        if !is_pow_2(self.line_size) {
            return false;
        }
        if self.cache_size % self.line_size != 0 {
            return false;
        }
        let block_num = self.cache_size / self.line_size;
        if block_num % self.ways != 0 {
            return false;
        }
        is_pow_2(self.sets)
    }
}

/// Outcome of a cache `access`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessOutcome {
    Hit,
    Miss,
}

/// Process-wide (but explicitly owned, not a `static`) way-partition state.
/// Threaded by mutable reference into `find_victim` so SWP/DWP decisions are
/// visible across every cache that consults them, exactly as described for
/// `SWP_CORE0_WAYS` / `DWP_CORE0_WAYS`.
#[derive(Clone, Copy, Debug)]
pub struct PartitionState {
    pub swp_core0_ways: usize,
    pub dwp_core0_ways: usize,
}

impl PartitionState {
    pub fn new(swp_core0_ways: usize) -> Self {
        Self { swp_core0_ways, dwp_core0_ways: swp_core0_ways }
    }
}

/// One set-associative cache instance.
pub struct Cache {
    pub policy: CachePolicy,
    pub sets: Vec<CacheSet>,

    index_bits: usize,
    pub index_mask: u32,

    /// Snapshot of the line displaced by the most recent `install`. Valid
    /// only until the next `install` on this cache.
    pub last_evicted_line: Option<CacheLine>,

    pub stat_read_access: u64,
    pub stat_read_miss: u64,
    pub stat_write_access: u64,
    pub stat_write_miss: u64,
    pub stat_dirty_evicts: u64,
}

impl Cache {
    pub fn make(policy: CachePolicy) -> Self {
        assert!(policy.is_valid(), "invalid cache policy");

        let index_bits = get_log_2(policy.sets);
        let index_mask = get_mask(index_bits);
        // index_mask == sets - 1 here since sets is a power of two, so
        // `line_addr & index_mask` already is `line_addr % sets` — no
        // separate modulo is ever needed in set_index.
        debug_assert_eq!(index_mask as usize, policy.sets - 1);

        Self {
            policy,
            sets: vec![CacheSet::make(policy.ways); policy.sets],
            index_bits,
            index_mask,
            last_evicted_line: None,
            stat_read_access: 0,
            stat_read_miss: 0,
            stat_write_access: 0,
            stat_write_miss: 0,
            stat_dirty_evicts: 0,
        }
    }

    pub fn set_index(&self, line_addr: u32) -> usize {
        (line_addr & self.index_mask) as usize
    }

    pub fn tag_of(&self, line_addr: u32) -> u32 {
        line_addr >> self.index_bits
    }

    /// Recompose the line address a given tag/set-index pair decomposed from.
    pub fn address_of(&self, tag: u32, set_index: usize) -> u32 {
        (tag << self.index_bits) | (set_index as u32 & self.index_mask)
    }

    pub fn get_miss_rate(&self) -> f64 {
        let access = self.stat_read_access + self.stat_write_access;
        if access == 0 {
            0.0
        } else {
            (self.stat_read_miss + self.stat_write_miss) as f64 / access as f64
        }
    }

    /// Search for a hit in the set addressed by `line_addr`, for the given
    /// core. Does not install anything on a miss.
    pub fn access(
        &mut self,
        line_addr: u32,
        is_write: bool,
        core_id: u8,
        current_cycle: u64,
    ) -> AccessOutcome {
        let set_index = self.set_index(line_addr);
        let tag = self.tag_of(line_addr);
        let set = &mut self.sets[set_index];

        let found = set.lines.iter().position(|line| {
            line.valid && line.core_id == core_id && line.tag == tag
        });

        if let Some(w) = found {
            let line = &mut set.lines[w];
            line.dirty |= is_write;
            line.last_access_time = current_cycle;
            set.umon.total_hits[w] += 1;

            if is_write {
                self.stat_write_access += 1;
            } else {
                self.stat_read_access += 1;
            }
            AccessOutcome::Hit
        } else {
            if is_write {
                self.stat_write_access += 1;
                self.stat_write_miss += 1;
            } else {
                self.stat_read_access += 1;
                self.stat_read_miss += 1;
            }
            set.umon.total_misses += 1;
            AccessOutcome::Miss
        }
    }

    /// Choose a victim way, insert the new line, and return the line that was
    /// displaced (if it was valid). Also records the eviction in
    /// `last_evicted_line` for callers that prefer to inspect it there.
    pub fn install(
        &mut self,
        line_addr: u32,
        is_write: bool,
        core_id: u8,
        current_cycle: u64,
        partition: &mut PartitionState,
        rng: &mut StdRng,
    ) -> Option<CacheLine> {
        let set_index = self.set_index(line_addr);
        let tag = self.tag_of(line_addr);
        let victim = self.find_victim(set_index, core_id, partition, rng);

        let set = &mut self.sets[set_index];
        let evicted = set.lines[victim];

        if evicted.valid {
            if evicted.dirty {
                self.stat_dirty_evicts += 1;
            }
            set.ways_per_core[evicted.core_id as usize] -= 1;
        }

        set.lines[victim] = CacheLine {
            valid: true,
            dirty: is_write,
            tag,
            core_id,
            last_access_time: current_cycle,
        };
        set.ways_per_core[core_id as usize] += 1;

        let result = if evicted.valid { Some(evicted) } else { None };
        self.last_evicted_line = result;
        result
    }

    /// First-invalid-way-wins, then policy-specific selection.
    fn find_victim(
        &self,
        set_index: usize,
        core_id: u8,
        partition: &mut PartitionState,
        rng: &mut StdRng,
    ) -> usize {
        let ways = self.policy.ways;
        {
            let set = &self.sets[set_index];
            if let Some(w) = (0..ways).find(|&w| !set.lines[w].valid) {
                return w;
            }
        }

        match self.policy.replacement {
            ReplacementPolicy::Lru => self.find_lru_victim(set_index, None),
            ReplacementPolicy::Random => rng.gen_range(0..ways),
            ReplacementPolicy::Swp => {
                self.find_swp_victim(set_index, core_id, partition.swp_core0_ways)
            }
            ReplacementPolicy::Dwp => {
                let q = self.compute_dwp_quota(set_index);
                partition.dwp_core0_ways = q;
                self.find_swp_victim(set_index, core_id, q)
            }
        }
    }

    /// Smallest `last_access_time` among ways matching `target_core` (or all
    /// ways, if `target_core` is `None`); lowest index breaks ties. Falls
    /// back to scanning all ways if no way of `target_core` is present, per
    /// the open question in the design notes.
    fn find_lru_victim(&self, set_index: usize, target_core: Option<u8>) -> usize {
        let set = &self.sets[set_index];
        let candidates: Vec<usize> = match target_core {
            Some(core) => {
                let matching: Vec<usize> = (0..set.lines.len())
                    .filter(|&w| set.lines[w].valid && set.lines[w].core_id == core)
                    .collect();
                if matching.is_empty() {
                    (0..set.lines.len()).collect()
                } else {
                    matching
                }
            }
            None => (0..set.lines.len()).collect(),
        };

        *candidates
            .iter()
            .min_by_key(|&&w| (set.lines[w].last_access_time, w))
            .expect("set has at least one way")
    }

    fn find_swp_victim(&self, set_index: usize, core_id: u8, core0_ways: usize) -> usize {
        let set = &self.sets[set_index];
        let target_core = if set.ways_per_core[0] < core0_ways { 1u8 } else { core_id };
        self.find_lru_victim(set_index, Some(target_core))
    }

    /// `utility[c] = floor(0.7 * hits[c] + 0.3 * misses[c])`, reduced to a
    /// core-0 way quota in `[0, ways]`.
    fn compute_dwp_quota(&self, set_index: usize) -> usize {
        let set = &self.sets[set_index];
        let mut hits = [0u64; NUM_CORES];
        for (w, line) in set.lines.iter().enumerate() {
            if line.valid {
                hits[line.core_id as usize] += set.umon.total_hits[w] as u64;
            }
        }
        let misses = set.umon.total_misses as u64;

        let utility: Vec<u64> = hits
            .iter()
            .map(|&h| (7 * h + 3 * misses) / 10)
            .collect();
        let sum = (utility[0] + utility[1]).max(1);

        ((utility[0] * self.policy.ways as u64) / sum) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(ways: usize, sets: usize, repl: ReplacementPolicy) -> CachePolicy {
        CachePolicy::make(ways * sets * 64, 64, ways, repl, 1)
    }

    #[test]
    fn test_get_log_2() {
        assert_eq!(get_log_2(1), 0);
        assert_eq!(get_log_2(2), 1);
        assert_eq!(get_log_2(1024), 10);
    }

    #[test]
    fn address_decomposition_is_invertible() {
        let cache = Cache::make(policy(4, 64, ReplacementPolicy::Lru));
        for a in [0u32, 1, 63, 64, 12345, 0xABCD] {
            let tag = cache.tag_of(a);
            let idx = cache.set_index(a);
            assert_eq!(cache.address_of(tag, idx), a);
        }
    }

    #[test]
    fn direct_mapped_hit_then_miss_then_evict() {
        // 1-set direct-mapped 64B-line cache: second access to a new tag in
        // the same set must evict the first.
        let mut cache = Cache::make(policy(1, 1, ReplacementPolicy::Lru));
        let mut part = PartitionState::new(0);
        let mut rng = StdRng::seed_from_u64(RNG_SEED);

        // LOAD 0x0 -> miss, install
        assert_eq!(cache.access(0, false, 0, 1), AccessOutcome::Miss);
        cache.install(0, false, 0, 1, &mut part, &mut rng);
        // LOAD 0x0 -> hit
        assert_eq!(cache.access(0, false, 0, 2), AccessOutcome::Hit);
        // STORE 0x40 (line 1) -> miss, install, evicts clean line 0
        assert_eq!(cache.access(1, true, 0, 3), AccessOutcome::Miss);
        let evicted = cache.install(1, true, 0, 3, &mut part, &mut rng).unwrap();
        assert!(!evicted.dirty);
        // LOAD 0x0 -> miss again
        assert_eq!(cache.access(0, false, 0, 4), AccessOutcome::Miss);

        assert_eq!(cache.stat_read_access, 3);
        assert_eq!(cache.stat_write_access, 1);
        assert_eq!(cache.stat_read_miss, 2);
        assert_eq!(cache.stat_write_miss, 1);
        assert_eq!(cache.stat_dirty_evicts, 0);
    }

    #[test]
    fn lru_victim_is_the_oldest() {
        // Fill an 8-way set T0..T7, touch T0, install T8 ->
        // the evicted way must be the one holding T1.
        let mut cache = Cache::make(policy(8, 1, ReplacementPolicy::Lru));
        let mut part = PartitionState::new(0);
        let mut rng = StdRng::seed_from_u64(RNG_SEED);

        for t in 0u32..8 {
            cache.access(t, false, 0, t as u64);
            cache.install(t, false, 0, t as u64, &mut part, &mut rng);
        }
        cache.access(0, false, 0, 100);
        cache.sets[0]
            .lines
            .iter_mut()
            .find(|l| l.tag == 0)
            .unwrap()
            .last_access_time = 100;

        cache.access(8, false, 0, 101);
        let evicted = cache.install(8, false, 0, 101, &mut part, &mut rng).unwrap();
        assert_eq!(evicted.tag, 1);
    }

    #[test]
    fn swp_evicts_requester_when_core0_at_or_above_quota() {
        let mut cache = Cache::make(policy(4, 1, ReplacementPolicy::Swp));
        let mut part = PartitionState::new(2);
        let mut rng = StdRng::seed_from_u64(RNG_SEED);

        // Fill with 2 core-0 lines and 2 core-1 lines.
        for (t, core) in [(0u32, 0u8), (1, 0), (2, 1), (3, 1)] {
            cache.access(t, false, core, t as u64);
            cache.install(t, false, core, t as u64, &mut part, &mut rng);
        }
        assert_eq!(cache.sets[0].ways_per_core, [2, 2]);

        // core 0 requests again; core0 is at quota (>=2), so we evict from
        // the requester (core 0).
        cache.access(4, false, 0, 10);
        let evicted = cache.install(4, false, 0, 10, &mut part, &mut rng).unwrap();
        assert_eq!(evicted.core_id, 0);
    }

    #[test]
    fn swp_steals_from_core1_when_core0_under_quota() {
        let mut cache = Cache::make(policy(4, 1, ReplacementPolicy::Swp));
        let mut part = PartitionState::new(3);
        let mut rng = StdRng::seed_from_u64(RNG_SEED);

        for (t, core) in [(0u32, 0u8), (1, 1), (2, 1), (3, 1)] {
            cache.access(t, false, core, t as u64);
            cache.install(t, false, core, t as u64, &mut part, &mut rng);
        }
        assert_eq!(cache.sets[0].ways_per_core, [1, 3]);

        // core 1 requests; core0 ways (1) < quota (3), steal from core 1.
        cache.access(4, false, 1, 10);
        let evicted = cache.install(4, false, 1, 10, &mut part, &mut rng).unwrap();
        assert_eq!(evicted.core_id, 1);
    }

    #[test]
    fn swp_falls_back_to_lru_when_target_core_has_no_lines() {
        // Quota (5) exceeds the set's associativity (4), so core0_ways (4)
        // is always < quota and the steal target is always core 1 -- but
        // the set holds only core-0 lines, so there's nothing to steal.
        // `find_lru_victim` must fall back to scanning all ways instead of
        // finding no candidates.
        let mut cache = Cache::make(policy(4, 1, ReplacementPolicy::Swp));
        let mut part = PartitionState::new(5);
        let mut rng = StdRng::seed_from_u64(RNG_SEED);

        for t in 0u32..4 {
            cache.access(t, false, 0, t as u64);
            cache.install(t, false, 0, t as u64, &mut part, &mut rng);
        }
        assert_eq!(cache.sets[0].ways_per_core, [4, 0]);

        cache.access(4, false, 0, 10);
        let evicted = cache.install(4, false, 0, 10, &mut part, &mut rng).unwrap();
        // Falls back to plain LRU over all ways: the oldest line (tag 0).
        assert_eq!(evicted.tag, 0);
    }

    #[test]
    fn swp_respects_partition_under_sustained_single_core_streaming() {
        // Core 0 streaming alone against an 8-way set, Q=2.
        let mut cache = Cache::make(policy(8, 1, ReplacementPolicy::Swp));
        let mut part = PartitionState::new(2);
        let mut rng = StdRng::seed_from_u64(RNG_SEED);

        for t in 0u32..64 {
            cache.access(t, false, 0, t as u64);
            cache.install(t, false, 0, t as u64, &mut part, &mut rng);
            let set = &cache.sets[0];
            assert!(set.ways_per_core[0] <= 8);
            assert!(set.ways_per_core[0] + set.ways_per_core[1] <= 8);
        }
    }

    #[test]
    fn dwp_quota_is_process_wide_and_sticky() {
        let mut cache = Cache::make(policy(4, 2, ReplacementPolicy::Dwp));
        let mut part = PartitionState::new(0);
        let mut rng = StdRng::seed_from_u64(RNG_SEED);

        for t in 0u32..4 {
            cache.access(t * 2, false, 0, t as u64);
            cache.install(t * 2, false, 0, t as u64, &mut part, &mut rng);
        }
        for _ in 0..5 {
            cache.access(0, false, 0, 10);
        }
        cache.access(8, false, 0, 11);
        cache.install(8, false, 0, 11, &mut part, &mut rng);
        assert!(part.dwp_core0_ways >= 1);
    }

    #[test]
    fn writeback_exposure_is_overwritten_by_next_install() {
        let mut cache = Cache::make(policy(1, 1, ReplacementPolicy::Lru));
        let mut part = PartitionState::new(0);
        let mut rng = StdRng::seed_from_u64(RNG_SEED);

        cache.access(0, true, 0, 1);
        cache.install(0, true, 0, 1, &mut part, &mut rng);
        cache.access(1, false, 0, 2);
        let first_evicted = cache.install(1, false, 0, 2, &mut part, &mut rng).unwrap();
        assert!(first_evicted.dirty);
        assert_eq!(cache.last_evicted_line.unwrap().tag, first_evicted.tag);

        cache.access(2, false, 0, 3);
        cache.install(2, false, 0, 3, &mut part, &mut rng);
        assert_ne!(cache.last_evicted_line.unwrap().tag, first_evicted.tag);
    }
}
