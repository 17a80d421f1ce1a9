use memsim::config::{Mode, ReplKind, SimConfig};
use memsim::error::SimResult;
use memsim::flags::MemSimArgs;
use memsim::memory::dram::DramPolicy;
use memsim::{runner, stats};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> SimResult<()> {
    let args = MemSimArgs::from_env_or_exit();

    let mode: Mode = args.mode.map(Into::into).unwrap_or(Mode::A);
    let num_cores = args.num_cores.unwrap_or_else(|| mode.num_cores());

    let config = SimConfig::make(
        mode,
        args.linesize.unwrap_or(64),
        args.dsize.unwrap_or(32),
        args.dassoc.unwrap_or(8),
        args.isize.unwrap_or(32),
        args.iassoc.unwrap_or(8),
        args.l2size.unwrap_or(512),
        args.l2assoc.unwrap_or(16),
        args.repl.map(Into::into).unwrap_or(ReplKind::Lru),
        args.l2repl.map(Into::into).unwrap_or(ReplKind::Lru),
        args.swp_core0_ways.unwrap_or(0),
        args.dram_policy.map(Into::into).unwrap_or(DramPolicy::Open),
        num_cores,
    )?;

    if args.verbose {
        eprintln!("[VERBOSE] mode={:?} config={:?}", mode, config);
    }

    let sys = runner::run(&config, &args.trace_file, args.verbose)?;
    stats::print_report(mode, &sys);

    Ok(())
}
