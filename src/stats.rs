//! Statistics reporting: formats the counters owned by `Cache`, `Dram`, and
//! `MemorySystem` into the labeled report named by the configuration's mode.
//! No core component formats its own output.

use crate::config::Mode;
use crate::memory::cache::Cache;
use crate::memory::dram::Dram;
use crate::memsys::MemorySystem;

fn miss_perc(miss: u64, access: u64) -> f64 {
    if access == 0 {
        0.0
    } else {
        100.0 * miss as f64 / access as f64
    }
}

fn print_cache(label: &str, cache: &Cache) {
    println!("{label}_READ_ACCESS {}", cache.stat_read_access);
    println!("{label}_WRITE_ACCESS {}", cache.stat_write_access);
    println!("{label}_READ_MISS {}", cache.stat_read_miss);
    println!("{label}_WRITE_MISS {}", cache.stat_write_miss);
    println!(
        "{label}_READ_MISS_PERC {:.2}",
        miss_perc(cache.stat_read_miss, cache.stat_read_access)
    );
    println!(
        "{label}_WRITE_MISS_PERC {:.2}",
        miss_perc(cache.stat_write_miss, cache.stat_write_access)
    );
    println!("{label}_DIRTY_EVICTS {}", cache.stat_dirty_evicts);
}

fn print_dram(dram: &Dram) {
    println!("DRAM_READ_ACCESS {}", dram.stat_read_access);
    println!("DRAM_WRITE_ACCESS {}", dram.stat_write_access);
    println!("DRAM_READ_DELAY_AVG {:.2}", dram.read_delay_avg());
    println!("DRAM_WRITE_DELAY_AVG {:.2}", dram.write_delay_avg());
}

fn avg_delay(delay: u64, access: u64) -> f64 {
    if access == 0 {
        0.0
    } else {
        delay as f64 / access as f64
    }
}

/// Prints the full end-of-run report to stdout, with cache labels chosen
/// according to the mode's topology: `DCACHE` for mode A; `ICACHE`,
/// `DCACHE`, `L2CACHE` for B/C; per-core variants plus `L2CACHE` for D/E/F.
pub fn print_report(mode: Mode, sys: &MemorySystem) {
    match mode {
        Mode::A => {
            print_cache("DCACHE", sys.dcache().expect("mode A always has a dcache"));
        }
        Mode::B | Mode::C => {
            print_cache("ICACHE", sys.icache().expect("modes B/C always have an icache"));
            print_cache("DCACHE", sys.dcache().expect("modes B/C always have a dcache"));
            print_cache("L2CACHE", sys.l2cache().expect("modes B/C always have an l2cache"));
            print_dram(sys.dram().expect("modes B/C always have dram"));
        }
        Mode::D | Mode::E | Mode::F => {
            let icaches = sys.icache_coreid().expect("modes D/E/F have per-core icaches");
            let dcaches = sys.dcache_coreid().expect("modes D/E/F have per-core dcaches");
            for (core_id, cache) in icaches.iter().enumerate() {
                print_cache(&format!("ICACHE_{core_id}"), cache);
            }
            for (core_id, cache) in dcaches.iter().enumerate() {
                print_cache(&format!("DCACHE_{core_id}"), cache);
            }
            print_cache("L2CACHE", sys.l2cache().expect("modes D/E/F always have an l2cache"));
            print_dram(sys.dram().expect("modes D/E/F always have dram"));
        }
    }

    println!("MEMSYS_IFETCH_ACCESS {}", sys.stat_ifetch_access);
    println!("MEMSYS_LOAD_ACCESS {}", sys.stat_load_access);
    println!("MEMSYS_STORE_ACCESS {}", sys.stat_store_access);
    println!(
        "MEMSYS_IFETCH_AVGDELAY {:.2}",
        avg_delay(sys.stat_ifetch_delay, sys.stat_ifetch_access)
    );
    println!(
        "MEMSYS_LOAD_AVGDELAY {:.2}",
        avg_delay(sys.stat_load_delay, sys.stat_load_access)
    );
    println!(
        "MEMSYS_STORE_AVGDELAY {:.2}",
        avg_delay(sys.stat_store_delay, sys.stat_store_access)
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miss_perc_is_zero_on_no_accesses() {
        assert_eq!(miss_perc(0, 0), 0.0);
    }

    #[test]
    fn miss_perc_is_a_percentage() {
        assert_eq!(miss_perc(1, 4), 25.0);
    }

    #[test]
    fn avg_delay_is_zero_on_no_accesses() {
        assert_eq!(avg_delay(0, 0), 0.0);
    }
}
