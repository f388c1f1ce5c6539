use clap::{Parser, ValueEnum};
use log::LevelFilter;
use motif_eval::{run_evaluation, CommandFinder, EvalConfig, EvalError, MotifFinder, OracleFinder};
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum RunnerError {
    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error("--finder command requires --finder-cmd")]
    MissingFinderCommand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FinderKind {
    /// Echo each dataset's ground truth back (checks fixtures and the harness)
    Oracle,
    /// Run an external program as the motif finder
    Command,
}

#[derive(Parser)]
#[command(
    name = "eval-runner",
    about = "Benchmarks a motif finder over a sweep of synthetic datasets",
    long_about = "Runs a motif finder on every dataset of the benchmark parameter grid, scores its \
                  predicted sites and motif against ground truth (relative entropy, overlapping \
                  positions, overlapping sites), averages the scores per parameter set and plots them.",
    version,
    after_help = "Example usage:\n    \
                  eval-runner --finder command --finder-cmd ./motif_finder -v\n    \
                  eval-runner --config sweep.json --prefix run2 --no-plots",
    color = clap::ColorChoice::Always
)]
#[derive(Debug)]
struct Args {
    /// JSON configuration file; flags below override its values
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Directory fixtures and outputs are resolved against
    #[arg(long, value_name = "DIR")]
    base_dir: Option<PathBuf>,

    /// Directory holding the dataset{i} fixture directories
    #[arg(long, value_name = "DIR")]
    fixtures: Option<PathBuf>,

    /// Prefix of the results and performance_plots directories
    #[arg(long)]
    prefix: Option<String>,

    /// Number of trials (datasets) per parameter set
    #[arg(long)]
    trials: Option<usize>,

    /// Motif finder to evaluate
    #[arg(long, value_enum, default_value = "oracle")]
    finder: FinderKind,

    /// Program invoked as `<program> [args..] <motif_length> <sequences.fa>`
    #[arg(long, value_name = "PROGRAM")]
    finder_cmd: Option<PathBuf>,

    /// Extra argument passed to the finder program (repeatable)
    #[arg(long, value_name = "ARG", allow_hyphen_values = true)]
    finder_arg: Vec<String>,

    /// Skip rendering the metric charts
    #[arg(long)]
    no_plots: bool,

    /// Increase logging verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_verbose(verbosity: u8) {
    let filter_level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::from_default_env()
        .format_target(false)
        .filter_level(filter_level)
        .init();
}

fn build_config(args: &Args) -> Result<EvalConfig, RunnerError> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading config from {}", path.display());
            EvalConfig::from_json_file(path)?
        }
        None => EvalConfig::default(),
    };

    if let Some(dir) = &args.base_dir {
        config.base_dir = dir.clone();
    }
    if let Some(fixtures) = &args.fixtures {
        config.fixture_root = fixtures.clone();
    }
    if let Some(prefix) = &args.prefix {
        config.output_prefix = prefix.clone();
    }
    if let Some(trials) = args.trials {
        config.grid.trials_per_configuration = trials;
    }
    Ok(config)
}

fn run(args: Args) -> Result<(), RunnerError> {
    let config = build_config(&args)?;
    log::info!("Results directory: {}", config.results_dir().display());
    log::info!("Fixture store: {}", config.fixture_dir(0).display());

    let make_finder: Box<dyn FnMut() -> Box<dyn MotifFinder>> = match args.finder {
        FinderKind::Oracle => Box::new(|| Box::new(OracleFinder::new()) as Box<dyn MotifFinder>),
        FinderKind::Command => {
            let program = args
                .finder_cmd
                .clone()
                .ok_or(RunnerError::MissingFinderCommand)?;
            let extra = args.finder_arg.clone();
            Box::new(move || {
                Box::new(CommandFinder::new(program.clone(), extra.clone())) as Box<dyn MotifFinder>
            })
        }
    };

    let results = run_evaluation(&config, make_finder, !args.no_plots)?;
    log::info!("Evaluated {} parameter sets", results.len());
    Ok(())
}

fn main() {
    let start_time = std::time::Instant::now();
    let args = Args::parse();
    init_verbose(args.verbose);

    if let Err(e) = run(args) {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    log::info!(
        "Total execution time: {:.4} minutes",
        start_time.elapsed().as_secs_f64() / 60.0
    );
}
