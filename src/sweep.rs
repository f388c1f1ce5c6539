use crate::config::{EvalConfig, GridSpec};
use crate::error::Result;
use crate::finder::MotifFinder;
use crate::trial::TrialRunner;
use crate::types::{AggregatedResult, Configuration, TrialResult, CHANNELS};
use statrs::statistics::Statistics;

/// Lays the grid's parameter sets out over consecutive blocks of dataset indices.
///
/// Configuration `k` owns datasets `[k * t, k * t + t)` where `t` is
/// `grid.trials_per_configuration`.
pub fn build_configurations(grid: &GridSpec) -> Vec<Configuration> {
    let per = grid.trials_per_configuration;
    grid.parameter_sets()
        .into_iter()
        .enumerate()
        .map(|(index, params)| Configuration {
            index,
            params,
            datasets: index * per..(index + 1) * per,
        })
        .collect()
}

/// Arithmetic mean of `values`, `NaN` when empty.
///
/// Non-finite samples are summed directly so that a single infinite trial yields an
/// infinite mean instead of being absorbed by the incremental update.
pub fn mean(values: &[f64]) -> f64 {
    if values.iter().all(|v| v.is_finite()) {
        values.iter().mean()
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn mean_of<F>(trials: &[TrialResult], field: F) -> f64
where
    F: Fn(&TrialResult) -> f64,
{
    mean(&trials.iter().map(field).collect::<Vec<_>>())
}

/// Reduces the trials of one configuration to their means
pub fn aggregate(configuration: &Configuration, trials: &[TrialResult]) -> AggregatedResult {
    let mut divergence_by_channel = [0.0; CHANNELS];
    for (c, slot) in divergence_by_channel.iter_mut().enumerate() {
        *slot = mean_of(trials, |t| t.divergence[c]);
    }
    let all_channels: Vec<f64> = trials.iter().flat_map(|t| t.divergence).collect();

    AggregatedResult {
        configuration: configuration.clone(),
        divergence: mean(&all_channels),
        divergence_by_channel,
        overlap_positions: mean_of(trials, |t| t.overlap_positions as f64),
        overlap_sites: mean_of(trials, |t| t.overlap_sites as f64),
        runtime_secs: mean_of(trials, |t| t.runtime_secs),
    }
}

/// Runs every trial of every configuration, one after the other.
pub struct Sweep<'a> {
    config: &'a EvalConfig,
    configurations: Vec<Configuration>,
}

impl<'a> Sweep<'a> {
    pub fn new(config: &'a EvalConfig) -> Self {
        Sweep {
            config,
            configurations: build_configurations(&config.grid),
        }
    }

    pub fn configurations(&self) -> &[Configuration] {
        &self.configurations
    }

    /// Runs the sweep, constructing a fresh finder for every trial.
    ///
    /// # Returns
    /// * One `AggregatedResult` per configuration, in grid order
    ///
    /// # Errors
    /// * The first trial error aborts the whole sweep
    pub fn run<F, M>(&self, mut make_finder: M) -> Result<Vec<AggregatedResult>>
    where
        F: MotifFinder,
        M: FnMut() -> F,
    {
        let runner = TrialRunner::new(self.config);
        let mut results = Vec::with_capacity(self.configurations.len());

        for configuration in &self.configurations {
            log::info!(
                "Configuration {} {}: datasets {}..{}",
                configuration.index,
                configuration.params,
                configuration.datasets.start,
                configuration.datasets.end
            );

            let trials = configuration
                .datasets
                .clone()
                .map(|dataset| runner.run_trial(dataset, &mut make_finder()))
                .collect::<Result<Vec<_>>>()?;

            let aggregated = aggregate(configuration, &trials);
            if !aggregated.divergence.is_finite() {
                log::warn!(
                    "Configuration {} has non-finite mean divergence {}",
                    configuration.index,
                    aggregated.divergence
                );
            }
            results.push(aggregated);
        }

        Ok(results)
    }
}
