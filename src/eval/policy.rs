use memsim::config::{Mode, ReplKind, SimConfig};
use memsim::memory::dram::DramPolicy;
use memsim::runner::run_amat;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_path = "eval/policy_eval.csv".to_string();
    let mut writer = csv::Writer::from_path(output_path)?;
    writer.write_record(["Trace", "Policy", "AMAT"])?;

    let traces = std::env::args().skip(1).collect::<Vec<_>>();
    if traces.is_empty() {
        return Err("You should specify at least one trace file".into());
    }

    let policies = [
        ("LRU", ReplKind::Lru),
        ("RANDOM", ReplKind::Random),
        ("SWP", ReplKind::Swp),
        ("DWP", ReplKind::Dwp),
    ];

    for trace in &traces {
        let trace_path = std::path::PathBuf::from(trace);
        for (name, repl) in policies {
            let config = SimConfig::make(
                Mode::D,
                64,
                32,
                8,
                32,
                8,
                512,
                16,
                repl,
                repl,
                8,
                DramPolicy::Open,
                2,
            )?;
            eprintln!("Running {} with policy {}", trace, name);
            let (_, amat) = run_amat(&config, &trace_path)?;
            let amat_str = format!("{:.3}", amat);
            writer.write_record([trace.as_str(), name, amat_str.as_str()])?;
        }
    }

    Ok(())
}
