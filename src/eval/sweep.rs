use memsim::config::{Mode, ReplKind, SimConfig};
use memsim::memory::dram::DramPolicy;
use memsim::runner::run_amat;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let trace_path = std::env::args()
        .nth(1)
        .ok_or("You should specify exactly one trace file")?;
    let trace_path = std::path::PathBuf::from(trace_path);

    // Plot line series for each L2 size, sweeping SWP's core-0 way quota.
    let l2_sizes_kb = vec![128usize, 256, 512];
    let l2assoc = 16;
    let quotas: Vec<usize> = (0..=l2assoc).collect();

    let mut data: Vec<Vec<(usize, f64)>> = vec![vec![]; l2_sizes_kb.len()];
    let mut y_max: f64 = 0.0;
    for (i, l2size_kb) in l2_sizes_kb.iter().enumerate() {
        for &q in &quotas {
            let config = SimConfig::make(
                Mode::D,
                64,
                32,
                8,
                32,
                8,
                *l2size_kb,
                l2assoc,
                ReplKind::Lru,
                ReplKind::Swp,
                q,
                DramPolicy::Open,
                2,
            )?;
            let (_, amat) = run_amat(&config, &trace_path)?;
            data[i].push((q, amat));
            y_max = y_max.max(amat);
        }
    }

    use plotters::prelude::*;

    let trace_base_name = trace_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("trace")
        .to_string();
    let plot_title = format!("SWP quota sweep (AMAT): {}", trace_base_name);
    let output_path = format!("eval/sweep_eval_{}.svg", trace_base_name);

    let root = SVGBackend::new(output_path.as_str(), (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut ctx = ChartBuilder::on(&root)
        .caption(plot_title.as_str(), ("sans-serif", 40).into_font())
        .margin(5)
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d(0..l2assoc as i32, 0.0..y_max * 1.1)?;
    ctx.configure_mesh().x_desc("swp_core0_ways").y_desc("AMAT").draw()?;

    for (i, l2size_kb) in l2_sizes_kb.iter().enumerate() {
        let series = data[i].iter().map(|(x, y)| (*x as i32, *y));
        let label = format!("L2 size = {}KB", l2size_kb);
        let color = Palette99::pick(i).to_rgba();
        ctx.draw_series(LineSeries::new(series, color))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    ctx.configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    Ok(())
}
