//! Resolved run configuration, independently constructible from CLI flags or
//! from tests and the evaluation binaries.

use crate::error::ConfigError;
use crate::memory::cache::{is_pow_2, ReplacementPolicy, MAX_WAYS};
use crate::memory::dram::DramPolicy;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplKind {
    Lru,
    Random,
    Swp,
    Dwp,
}

impl From<ReplKind> for ReplacementPolicy {
    fn from(kind: ReplKind) -> Self {
        match kind {
            ReplKind::Lru => ReplacementPolicy::Lru,
            ReplKind::Random => ReplacementPolicy::Random,
            ReplKind::Swp => ReplacementPolicy::Swp,
            ReplKind::Dwp => ReplacementPolicy::Dwp,
        }
    }
}

/// Top-level simulation mode, selecting memory topology and addressing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Single data cache, no DRAM or L2.
    A,
    /// Split L1 + shared L2 + DRAM, single-core physical addressing, flat
    /// DRAM delay.
    B,
    /// Same topology as B, but DRAM consults the row-buffer model.
    C,
    /// Per-core split L1 + shared L2 + DRAM, virtual addressing.
    D,
    E,
    F,
}

impl Mode {
    pub fn num_cores(self) -> usize {
        match self {
            Mode::A | Mode::B | Mode::C => 1,
            Mode::D | Mode::E | Mode::F => 2,
        }
    }

    pub fn is_multicore(self) -> bool {
        self.num_cores() == 2
    }

    /// Whether this mode ever consults DRAM (mode A has none).
    pub fn has_dram(self) -> bool {
        !matches!(self, Mode::A)
    }

    /// Whether DRAM delay is the mode-B flat constant rather than the
    /// row-buffer model.
    pub fn uses_flat_dram_delay(self) -> bool {
        matches!(self, Mode::B)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SimConfig {
    pub mode: Mode,
    pub line_size: usize,

    pub dsize_kb: usize,
    pub dassoc: usize,
    pub isize_kb: usize,
    pub iassoc: usize,
    pub l2size_kb: usize,
    pub l2assoc: usize,

    pub repl: ReplKind,
    pub l2repl: ReplKind,
    pub swp_core0_ways: usize,

    pub dram_policy: DramPolicy,
    pub num_cores: usize,
}

impl SimConfig {
    /// Builds and validates a configuration. Sizes are in KB; `num_cores` is
    /// whatever the caller intends to run with and is checked against what
    /// `mode` requires.
    #[allow(clippy::too_many_arguments)]
    pub fn make(
        mode: Mode,
        line_size: usize,
        dsize_kb: usize,
        dassoc: usize,
        isize_kb: usize,
        iassoc: usize,
        l2size_kb: usize,
        l2assoc: usize,
        repl: ReplKind,
        l2repl: ReplKind,
        swp_core0_ways: usize,
        dram_policy: DramPolicy,
        num_cores: usize,
    ) -> Result<Self, ConfigError> {
        let cfg = Self {
            mode,
            line_size,
            dsize_kb,
            dassoc,
            isize_kb,
            iassoc,
            l2size_kb,
            l2assoc,
            repl,
            l2repl,
            swp_core0_ways,
            dram_policy,
            num_cores,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !is_pow_2(self.line_size) {
            return Err(ConfigError::NotPowerOfTwo(self.line_size));
        }

        for (size_kb, assoc) in [
            (self.dsize_kb, self.dassoc),
            (self.isize_kb, self.iassoc),
            (self.l2size_kb, self.l2assoc),
        ] {
            self.validate_geometry(size_kb, assoc)?;
        }

        if self.l2assoc > MAX_WAYS {
            return Err(ConfigError::TooManyWays { assoc: self.l2assoc, max: MAX_WAYS });
        }
        if self.swp_core0_ways > self.l2assoc {
            return Err(ConfigError::QuotaOutOfRange {
                q: self.swp_core0_ways,
                max_ways: self.l2assoc,
            });
        }

        if self.num_cores != self.mode.num_cores() {
            return Err(ConfigError::WrongCoreCount(self.mode, self.num_cores));
        }

        Ok(())
    }

    fn validate_geometry(&self, size_kb: usize, assoc: usize) -> Result<(), ConfigError> {
        let size = size_kb * 1024;
        if assoc == 0 || assoc > MAX_WAYS {
            return Err(ConfigError::TooManyWays { assoc, max: MAX_WAYS });
        }
        if size % self.line_size != 0 {
            return Err(ConfigError::SizeNotMultipleOfLine { size, line_size: self.line_size });
        }
        let block_num = size / self.line_size;
        if block_num % assoc != 0 {
            return Err(ConfigError::SetsNotDivisible { block_num, assoc });
        }
        let sets = block_num / assoc;
        if !is_pow_2(sets) {
            return Err(ConfigError::SetsNotPowerOfTwo { block_num, assoc, sets });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> (usize, usize, usize, usize, usize, usize) {
        // (line_size, dsize_kb, dassoc, isize_kb, iassoc, l2size_kb)
        (64, 32, 8, 32, 8, 512)
    }

    #[test]
    fn mode_a_accepts_single_core() {
        let (line_size, dsize_kb, dassoc, isize_kb, iassoc, l2size_kb) = base();
        let cfg = SimConfig::make(
            Mode::A,
            line_size,
            dsize_kb,
            dassoc,
            isize_kb,
            iassoc,
            l2size_kb,
            16,
            ReplKind::Lru,
            ReplKind::Lru,
            0,
            DramPolicy::Open,
            1,
        );
        assert!(cfg.is_ok());
    }

    #[test]
    fn mode_d_rejects_single_core() {
        let (line_size, dsize_kb, dassoc, isize_kb, iassoc, l2size_kb) = base();
        let err = SimConfig::make(
            Mode::D,
            line_size,
            dsize_kb,
            dassoc,
            isize_kb,
            iassoc,
            l2size_kb,
            16,
            ReplKind::Lru,
            ReplKind::Lru,
            0,
            DramPolicy::Open,
            1,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::WrongCoreCount(Mode::D, 1)));
    }

    #[test]
    fn rejects_quota_above_l2_associativity() {
        let (line_size, dsize_kb, dassoc, isize_kb, iassoc, l2size_kb) = base();
        let err = SimConfig::make(
            Mode::B,
            line_size,
            dsize_kb,
            dassoc,
            isize_kb,
            iassoc,
            l2size_kb,
            8,
            ReplKind::Swp,
            ReplKind::Swp,
            9,
            DramPolicy::Open,
            1,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::QuotaOutOfRange { q: 9, max_ways: 8 }));
    }

    #[test]
    fn rejects_non_power_of_two_line_size() {
        let (_, dsize_kb, dassoc, isize_kb, iassoc, l2size_kb) = base();
        let err = SimConfig::make(
            Mode::A,
            48,
            dsize_kb,
            dassoc,
            isize_kb,
            iassoc,
            l2size_kb,
            16,
            ReplKind::Lru,
            ReplKind::Lru,
            0,
            DramPolicy::Open,
            1,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::NotPowerOfTwo(48)));
    }

    #[test]
    fn rejects_non_power_of_two_set_count() {
        let (line_size, _, _, isize_kb, iassoc, l2size_kb) = base();
        // 3 KB / 64 B line / 1 way = 48 blocks, divisible by assoc (48 % 1 ==
        // 0) but 48 sets is not a power of two.
        let err = SimConfig::make(
            Mode::A,
            line_size,
            3,
            1,
            isize_kb,
            iassoc,
            l2size_kb,
            16,
            ReplKind::Lru,
            ReplKind::Lru,
            0,
            DramPolicy::Open,
            1,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::SetsNotPowerOfTwo { block_num: 48, assoc: 1, sets: 48 }
        ));
    }
}
