use std::path::PathBuf;
use std::str::FromStr;

use crate::config::{Mode, ReplKind};
use crate::memory::dram::DramPolicy;

xflags::xflags! {
    /// Trace-driven chip-multiprocessor memory hierarchy simulator.
    cmd MemSimArgs {
        /// Path to the trace file to simulate.
        required trace_file: PathBuf

        /// Simulation mode: A, B, C, D, E, or F.
        optional -m, --mode mode: ModeArg

        /// Cache line size in bytes.
        optional --linesize size: usize

        /// L1 data cache size in KB.
        optional --dsize size_kb: usize
        /// L1 data cache associativity.
        optional --dassoc ways: usize

        /// L1 instruction cache size in KB.
        optional --isize size_kb: usize
        /// L1 instruction cache associativity.
        optional --iassoc ways: usize

        /// Shared L2 cache size in KB.
        optional --l2size size_kb: usize
        /// Shared L2 cache associativity.
        optional --l2assoc ways: usize

        /// L1 replacement policy: LRU, RANDOM, SWP, or DWP.
        optional --repl policy: ReplArg
        /// L2 replacement policy: LRU, RANDOM, SWP, or DWP.
        optional --l2repl policy: ReplArg

        /// Core 0's static/dynamic way-partition quota.
        optional --swp-core0-ways q: usize

        /// DRAM row-buffer policy: open or close.
        optional --dram-policy policy: DramPolicyArg

        /// Number of cores driving the trace (1 for A/B/C, 2 for D/E/F).
        optional --num-cores n: usize

        /// Enables verbose mode, printing per-reference trace lines during simulation.
        optional -v, --verbose
    }
}

#[derive(Debug, Clone, Copy)]
pub enum ModeArg {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl FromStr for ModeArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "A" => Ok(ModeArg::A),
            "B" => Ok(ModeArg::B),
            "C" => Ok(ModeArg::C),
            "D" => Ok(ModeArg::D),
            "E" => Ok(ModeArg::E),
            "F" => Ok(ModeArg::F),
            _ => Err(format!("Invalid mode: '{}'. Expected one of A, B, C, D, E, F.", s)),
        }
    }
}

impl From<ModeArg> for Mode {
    fn from(val: ModeArg) -> Self {
        match val {
            ModeArg::A => Mode::A,
            ModeArg::B => Mode::B,
            ModeArg::C => Mode::C,
            ModeArg::D => Mode::D,
            ModeArg::E => Mode::E,
            ModeArg::F => Mode::F,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum ReplArg {
    Lru,
    Random,
    Swp,
    Dwp,
}

impl FromStr for ReplArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LRU" => Ok(ReplArg::Lru),
            "RANDOM" => Ok(ReplArg::Random),
            "SWP" => Ok(ReplArg::Swp),
            "DWP" => Ok(ReplArg::Dwp),
            _ => Err(format!(
                "Invalid replacement policy: '{}'. Expected LRU, RANDOM, SWP, or DWP.",
                s
            )),
        }
    }
}

impl From<ReplArg> for ReplKind {
    fn from(val: ReplArg) -> Self {
        match val {
            ReplArg::Lru => ReplKind::Lru,
            ReplArg::Random => ReplKind::Random,
            ReplArg::Swp => ReplKind::Swp,
            ReplArg::Dwp => ReplKind::Dwp,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum DramPolicyArg {
    Open,
    Close,
}

impl FromStr for DramPolicyArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(DramPolicyArg::Open),
            "close" => Ok(DramPolicyArg::Close),
            _ => Err(format!("Invalid DRAM policy: '{}'. Expected 'open' or 'close'.", s)),
        }
    }
}

impl From<DramPolicyArg> for DramPolicy {
    fn from(val: DramPolicyArg) -> Self {
        match val {
            DramPolicyArg::Open => DramPolicy::Open,
            DramPolicyArg::Close => DramPolicy::Close,
        }
    }
}
