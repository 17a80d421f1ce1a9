//! Memory-system orchestrator: wires per-core/split L1 caches to a shared L2
//! and a banked DRAM, dispatching on the configured mode.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{Mode, SimConfig};
use crate::memory::cache::{self, AccessOutcome, Cache, CacheLine, CachePolicy, PartitionState};
use crate::memory::dram::{self, Dram};
use crate::memory::translate;
use crate::trace::RefKind;

const ICACHE_HIT_LATENCY: u32 = 1;
const DCACHE_HIT_LATENCY: u32 = 1;
const L2_HIT_LATENCY: u32 = 10;

pub struct MemorySystem {
    mode: Mode,
    line_size: usize,
    current_cycle: u64,

    dcache: Option<Cache>,
    icache: Option<Cache>,
    dcache_coreid: Option<Vec<Cache>>,
    icache_coreid: Option<Vec<Cache>>,
    l2cache: Option<Cache>,
    dram: Option<Dram>,

    /// Single process-wide `SWP_CORE0_WAYS`/`DWP_CORE0_WAYS` pair, shared by
    /// every cache's victim search (L1 and L2 alike).
    partition: PartitionState,
    /// Single process-wide pseudorandom source for the RANDOM policy, shared
    /// by every cache's victim search.
    rng: StdRng,

    pub stat_ifetch_access: u64,
    pub stat_load_access: u64,
    pub stat_store_access: u64,
    pub stat_ifetch_delay: u64,
    pub stat_load_delay: u64,
    pub stat_store_delay: u64,
}

impl MemorySystem {
    pub fn make(config: &SimConfig) -> Self {
        let dcache_policy = CachePolicy::make(
            config.dsize_kb * 1024,
            config.line_size,
            config.dassoc,
            config.repl.into(),
            DCACHE_HIT_LATENCY,
        );
        let icache_policy = CachePolicy::make(
            config.isize_kb * 1024,
            config.line_size,
            config.iassoc,
            config.repl.into(),
            ICACHE_HIT_LATENCY,
        );
        let l2_policy = CachePolicy::make(
            config.l2size_kb * 1024,
            config.line_size,
            config.l2assoc,
            config.l2repl.into(),
            L2_HIT_LATENCY,
        );

        let (dcache, icache, dcache_coreid, icache_coreid) = match config.mode {
            Mode::A => (Some(Cache::make(dcache_policy)), None, None, None),
            Mode::B | Mode::C => (
                Some(Cache::make(dcache_policy)),
                Some(Cache::make(icache_policy)),
                None,
                None,
            ),
            Mode::D | Mode::E | Mode::F => (
                None,
                None,
                Some(vec![Cache::make(dcache_policy), Cache::make(dcache_policy)]),
                Some(vec![Cache::make(icache_policy), Cache::make(icache_policy)]),
            ),
        };

        let l2cache = config.mode.has_dram().then(|| Cache::make(l2_policy));
        let dram = config.mode.has_dram().then(|| Dram::make(config.dram_policy));

        Self {
            mode: config.mode,
            line_size: config.line_size,
            current_cycle: 0,
            dcache,
            icache,
            dcache_coreid,
            icache_coreid,
            l2cache,
            dram,
            partition: PartitionState::new(config.swp_core0_ways),
            rng: StdRng::seed_from_u64(cache::RNG_SEED),
            stat_ifetch_access: 0,
            stat_load_access: 0,
            stat_store_access: 0,
            stat_ifetch_delay: 0,
            stat_load_delay: 0,
            stat_store_delay: 0,
        }
    }

    pub fn dcache(&self) -> Option<&Cache> {
        self.dcache.as_ref()
    }
    pub fn icache(&self) -> Option<&Cache> {
        self.icache.as_ref()
    }
    pub fn dcache_coreid(&self) -> Option<&[Cache]> {
        self.dcache_coreid.as_deref()
    }
    pub fn icache_coreid(&self) -> Option<&[Cache]> {
        self.icache_coreid.as_deref()
    }
    pub fn l2cache(&self) -> Option<&Cache> {
        self.l2cache.as_ref()
    }
    pub fn dram(&self) -> Option<&Dram> {
        self.dram.as_ref()
    }

    /// Dispatches one reference and returns its accumulated delay.
    pub fn access(&mut self, kind: RefKind, byte_addr: u32, core_id: u8) -> u32 {
        self.current_cycle += 1;
        let cycle = self.current_cycle;

        let delay = match self.mode {
            Mode::A => self.access_mode_a(kind, byte_addr, core_id, cycle),
            Mode::B | Mode::C => self.access_mode_bc(kind, byte_addr, core_id, cycle),
            Mode::D | Mode::E | Mode::F => self.access_mode_def(kind, byte_addr, core_id, cycle),
        };

        match kind {
            RefKind::IFetch => {
                self.stat_ifetch_access += 1;
                self.stat_ifetch_delay += delay as u64;
            }
            RefKind::Load => {
                self.stat_load_access += 1;
                self.stat_load_delay += delay as u64;
            }
            RefKind::Store => {
                self.stat_store_access += 1;
                self.stat_store_delay += delay as u64;
            }
        }
        delay
    }

    fn access_mode_a(&mut self, kind: RefKind, byte_addr: u32, core_id: u8, cycle: u64) -> u32 {
        if matches!(kind, RefKind::IFetch) {
            return 0;
        }
        let is_write = matches!(kind, RefKind::Store);
        let line_addr = byte_addr / self.line_size as u32;

        let dcache = self.dcache.as_mut().unwrap();
        if dcache.access(line_addr, is_write, core_id, cycle) == AccessOutcome::Miss {
            dcache.install(line_addr, is_write, core_id, cycle, &mut self.partition, &mut self.rng);
        }
        0
    }

    fn access_mode_bc(&mut self, kind: RefKind, byte_addr: u32, core_id: u8, cycle: u64) -> u32 {
        let is_write = matches!(kind, RefKind::Store);
        let is_ifetch = matches!(kind, RefKind::IFetch);
        let line_addr = byte_addr / self.line_size as u32;

        let hit_latency = if is_ifetch {
            self.icache.as_ref().unwrap().policy.hit_latency
        } else {
            self.dcache.as_ref().unwrap().policy.hit_latency
        };
        let outcome = if is_ifetch {
            self.icache.as_mut().unwrap().access(line_addr, is_write, core_id, cycle)
        } else {
            self.dcache.as_mut().unwrap().access(line_addr, is_write, core_id, cycle)
        };

        let mut delay = hit_latency;
        if outcome == AccessOutcome::Miss {
            delay += self.l2_access(line_addr, false, core_id, cycle);

            let evicted = if is_ifetch {
                self.icache.as_mut().unwrap().install(
                    line_addr,
                    is_write,
                    core_id,
                    cycle,
                    &mut self.partition,
                    &mut self.rng,
                )
            } else {
                self.dcache.as_mut().unwrap().install(
                    line_addr,
                    is_write,
                    core_id,
                    cycle,
                    &mut self.partition,
                    &mut self.rng,
                )
            };

            if !is_ifetch {
                self.writeback_if_dirty(evicted, line_addr, core_id, cycle, false);
            }
        }
        delay
    }

    fn access_mode_def(&mut self, kind: RefKind, byte_addr: u32, core_id: u8, cycle: u64) -> u32 {
        let is_write = matches!(kind, RefKind::Store);
        let is_ifetch = matches!(kind, RefKind::IFetch);
        let v_line_addr = byte_addr / self.line_size as u32;
        let p_line_addr = translate::translate(v_line_addr, core_id, self.line_size);
        let core_idx = core_id as usize;

        let hit_latency = if is_ifetch {
            self.icache_coreid.as_ref().unwrap()[core_idx].policy.hit_latency
        } else {
            self.dcache_coreid.as_ref().unwrap()[core_idx].policy.hit_latency
        };
        let outcome = if is_ifetch {
            self.icache_coreid.as_mut().unwrap()[core_idx].access(p_line_addr, is_write, core_id, cycle)
        } else {
            self.dcache_coreid.as_mut().unwrap()[core_idx].access(p_line_addr, is_write, core_id, cycle)
        };

        let mut delay = hit_latency;
        if outcome == AccessOutcome::Miss {
            delay += self.l2_access(p_line_addr, false, core_id, cycle);

            let evicted = if is_ifetch {
                self.icache_coreid.as_mut().unwrap()[core_idx].install(
                    p_line_addr,
                    is_write,
                    core_id,
                    cycle,
                    &mut self.partition,
                    &mut self.rng,
                )
            } else {
                self.dcache_coreid.as_mut().unwrap()[core_idx].install(
                    p_line_addr,
                    is_write,
                    core_id,
                    cycle,
                    &mut self.partition,
                    &mut self.rng,
                )
            };

            if !is_ifetch {
                self.writeback_if_dirty(evicted, p_line_addr, core_id, cycle, true);
            }
        }
        delay
    }

    /// If `evicted` was dirty, synthesizes the L2 writeback it induces. The
    /// writeback's own delay is never charged to the requesting reference.
    fn writeback_if_dirty(
        &mut self,
        evicted: Option<CacheLine>,
        line_addr: u32,
        core_id: u8,
        cycle: u64,
        per_core: bool,
    ) {
        let Some(evicted_line) = evicted else { return };
        if !evicted_line.dirty {
            return;
        }

        let evicted_addr = if per_core {
            let l1 = &self.dcache_coreid.as_ref().unwrap()[core_id as usize];
            l1.address_of(evicted_line.tag, l1.set_index(line_addr))
        } else {
            let l1 = self.dcache.as_ref().unwrap();
            l1.address_of(evicted_line.tag, l1.set_index(line_addr))
        };
        let _ = self.l2_access(evicted_addr, true, core_id, cycle);
    }

    /// Accesses L2, falling through to DRAM on a miss. Returns the
    /// accumulated delay of this L2 (and possibly DRAM) access.
    fn l2_access(&mut self, line_addr: u32, is_writeback: bool, core_id: u8, cycle: u64) -> u32 {
        let l2 = self.l2cache.as_mut().unwrap();
        let mut delay = l2.policy.hit_latency;
        let outcome = l2.access(line_addr, is_writeback, core_id, cycle);

        if outcome == AccessOutcome::Miss {
            delay += self.dram_access(line_addr, false);

            let evicted = self.l2cache.as_mut().unwrap().install(
                line_addr,
                is_writeback,
                core_id,
                cycle,
                &mut self.partition,
                &mut self.rng,
            );

            if let Some(evicted_line) = evicted {
                if evicted_line.dirty {
                    let evicted_addr = {
                        let l2 = self.l2cache.as_ref().unwrap();
                        l2.address_of(evicted_line.tag, l2.set_index(line_addr))
                    };
                    let _ = self.dram_access(evicted_addr, true);
                }
            }
        }
        delay
    }

    fn dram_access(&mut self, line_addr: u32, is_write: bool) -> u32 {
        let flat = self.mode.uses_flat_dram_delay();
        let dram = self.dram.as_mut().unwrap();
        if flat {
            dram.access_flat(is_write, dram::MODE_B_FIXED_DELAY)
        } else {
            dram.access(line_addr, is_write)
        }
    }
}
