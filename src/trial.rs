use crate::config::EvalConfig;
use crate::dataset::{provision, read_motif_length, write_motif, write_sites};
use crate::error::Result;
use crate::finder::MotifFinder;
use crate::metrics::{divergence, positional_overlap, site_overlap};
use crate::types::TrialResult;
use cpu_time::ThreadTime;
use std::time::Duration;

/// Runtimes are reported with this many decimal places
const RUNTIME_DECIMALS: i32 = 8;

fn round_runtime(secs: f64) -> f64 {
    let scale = 10f64.powi(RUNTIME_DECIMALS);
    (secs * scale).round() / scale
}

/// CPU time used by terminated and waited-for child processes, user plus system
#[cfg(unix)]
fn children_cpu_time() -> Result<Duration> {
    // SAFETY: getrusage only writes into the zero-initialized struct we own
    let usage = unsafe {
        let mut usage: libc::rusage = std::mem::zeroed();
        if libc::getrusage(libc::RUSAGE_CHILDREN, &mut usage) != 0 {
            return Err(std::io::Error::last_os_error().into());
        }
        usage
    };
    let to_duration = |tv: libc::timeval| {
        Duration::from_secs(tv.tv_sec as u64) + Duration::from_micros(tv.tv_usec as u64)
    };
    Ok(to_duration(usage.ru_utime) + to_duration(usage.ru_stime))
}

#[cfg(not(unix))]
fn children_cpu_time() -> Result<Duration> {
    Ok(Duration::ZERO)
}

/// CPU time stopwatch for the calling thread, which is where the finder runs, plus any
/// finder subprocesses reaped in the meantime
struct CpuStopwatch {
    thread: ThreadTime,
    children: Duration,
}

impl CpuStopwatch {
    fn start() -> Result<Self> {
        Ok(CpuStopwatch {
            thread: ThreadTime::try_now()?,
            children: children_cpu_time()?,
        })
    }

    fn elapsed_secs(&self) -> Result<f64> {
        let thread = self.thread.try_elapsed()?;
        let children = children_cpu_time()?.saturating_sub(self.children);
        Ok((thread + children).as_secs_f64())
    }
}

/// Runs the motif finder on single datasets and scores its predictions.
pub struct TrialRunner<'a> {
    config: &'a EvalConfig,
}

impl<'a> TrialRunner<'a> {
    pub fn new(config: &'a EvalConfig) -> Self {
        TrialRunner { config }
    }

    /// Evaluates `finder` on one dataset.
    ///
    /// The dataset is provisioned from its fixture if needed, the finder is configured with
    /// the dataset's motif length and sequences and run once, its predictions are written
    /// next to the ground truth, and the three metrics are computed from those files.
    ///
    /// # Arguments
    /// * `dataset` - Index of the dataset to evaluate
    /// * `finder` - A freshly constructed motif finder
    ///
    /// # Errors
    /// * Any error of the finder is returned unchanged; there is no retry
    /// * Returns `EvalError::IoAt` or `EvalError::Parse` for missing or malformed artifacts
    pub fn run_trial<F>(&self, dataset: usize, finder: &mut F) -> Result<TrialResult>
    where
        F: MotifFinder + ?Sized,
    {
        let paths = self.config.dataset_paths(dataset);
        provision(&self.config.fixture_dir(dataset), paths.dir())?;

        let motif_length = read_motif_length(&paths.motif_length())?;
        finder.configure(motif_length)?;
        finder.load_sequences(&paths.sequences())?;

        let stopwatch = CpuStopwatch::start()?;
        let prediction = finder.run()?;
        let runtime_secs = round_runtime(stopwatch.elapsed_secs()?);

        write_sites(&paths.predicted_sites(), &prediction.sites)?;
        write_motif(
            &paths.predicted_motif(),
            &prediction.motif,
            dataset,
            motif_length,
        )?;

        let result = TrialResult {
            dataset,
            divergence: divergence(&paths)?,
            overlap_positions: positional_overlap(&paths)?,
            overlap_sites: site_overlap(&paths)?,
            runtime_secs,
        };

        log::info!("Algorithm finished running dataset {}", dataset);
        log::debug!("Dataset {} scores: {:?}", dataset, result);
        Ok(result)
    }
}
