//! Wires a parsed trace and a resolved configuration through a
//! [`MemorySystem`], mirroring the host crate's own trace-driven run mode.

use std::path::Path;

use crate::config::SimConfig;
use crate::error::SimResult;
use crate::memsys::MemorySystem;
use crate::trace;

/// Runs every reference in `trace_path` through a fresh [`MemorySystem`]
/// built from `config`, in order, and returns the populated system for the
/// caller to report on. When `verbose` is set, logs each reference as it's
/// dispatched.
pub fn run(config: &SimConfig, trace_path: &Path, verbose: bool) -> SimResult<MemorySystem> {
    let operations = trace::fetch_operations(trace_path)?;
    let mut sys = MemorySystem::make(config);

    for entry in &operations {
        if verbose {
            eprintln!(
                "[VERBOSE] core={} kind={:?} addr=0x{:x}",
                entry.core_id, entry.kind, entry.address
            );
        }
        sys.access(entry.kind, entry.address, entry.core_id);
    }

    Ok(sys)
}

/// Same as [`run`], but also returns the overall average delay across every
/// reference, for tooling that wants a single scalar (e.g. the evaluation
/// binaries).
pub fn run_amat(config: &SimConfig, trace_path: &Path) -> SimResult<(MemorySystem, f64)> {
    let sys = run(config, trace_path, false)?;
    let total_access = sys.stat_ifetch_access + sys.stat_load_access + sys.stat_store_access;
    let total_delay = sys.stat_ifetch_delay + sys.stat_load_delay + sys.stat_store_delay;
    let amat = if total_access == 0 {
        0.0
    } else {
        total_delay as f64 / total_access as f64
    };
    Ok((sys, amat))
}
