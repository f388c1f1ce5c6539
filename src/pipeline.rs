use crate::config::EvalConfig;
use crate::error::{EvalError, Result};
use crate::finder::MotifFinder;
use crate::report::{print_results, render_charts, write_manifest, write_summary_csv};
use crate::sweep::Sweep;
use crate::types::AggregatedResult;
use std::fs;
use std::path::Path;

const SUMMARY_FILE: &str = "summary.csv";

/// Output roots may already exist from an earlier run
fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| EvalError::io_at(dir, e))
}

/// Runs a full benchmark evaluation.
///
/// Writes the parameter manifest, runs the sweep, prints the per-configuration means and
/// writes them as a CSV table under the results directory. When `render_plots` is set, the
/// four metric charts and a copy of the manifest go into the plots directory.
///
/// # Arguments
/// * `config` - Dataset locations and parameter grid
/// * `make_finder` - Builds the motif finder for each trial
/// * `render_plots` - Whether to draw the charts
///
/// # Returns
/// * `Result<Vec<AggregatedResult>>` - One entry per configuration, in grid order
pub fn run_evaluation<F, M>(
    config: &EvalConfig,
    make_finder: M,
    render_plots: bool,
) -> Result<Vec<AggregatedResult>>
where
    F: MotifFinder,
    M: FnMut() -> F,
{
    config.validate()?;
    let results_dir = config.results_dir();
    ensure_dir(&results_dir)?;

    let sweep = Sweep::new(config);
    let manifest = config.manifest_path();
    write_manifest(&manifest, sweep.configurations())?;

    let results = sweep.run(make_finder)?;
    print_results(&results);
    write_summary_csv(&results_dir.join(SUMMARY_FILE), &results)?;

    if render_plots {
        let plots_dir = config.plots_dir();
        ensure_dir(&plots_dir)?;
        render_charts(&plots_dir, &results)?;

        let copied = plots_dir.join("params_set.txt");
        fs::copy(&manifest, &copied).map_err(|e| EvalError::io_at(&copied, e))?;
    }

    Ok(results)
}
