use crate::dataset::DatasetPaths;
use crate::error::{EvalError, Result};
use crate::types::ParameterSet;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_PREFIX: &str = "gk100iterb005";
const DEFAULT_FIXTURE_ROOT: &str = "benchmarks";

/// Parameter grid of the benchmark sweep.
///
/// Each varied axis is swept while the other axes stay at their defaults, so the grid is
/// the concatenation of the ICPC, motif length and sequence count sweeps in that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSpec {
    pub icpc_values: Vec<f64>,
    pub motif_lengths: Vec<usize>,
    pub sequence_counts: Vec<usize>,
    pub default_icpc: f64,
    pub default_motif_length: usize,
    pub sequence_length: usize,
    pub default_sequence_count: usize,
    /// Datasets (and therefore trials) owned by each configuration
    pub trials_per_configuration: usize,
}

impl Default for GridSpec {
    fn default() -> Self {
        GridSpec {
            icpc_values: vec![1.0, 1.5, 2.0],
            motif_lengths: vec![6, 8],
            sequence_counts: vec![5, 20],
            default_icpc: 1.5,
            default_motif_length: 7,
            sequence_length: 500,
            default_sequence_count: 10,
            trials_per_configuration: 10,
        }
    }
}

impl GridSpec {
    /// Parameter sets in sweep order
    pub fn parameter_sets(&self) -> Vec<ParameterSet> {
        let at = |icpc, motif_length, sequence_count| ParameterSet {
            icpc,
            motif_length,
            sequence_length: self.sequence_length,
            sequence_count,
        };

        let by_icpc = self
            .icpc_values
            .iter()
            .map(|&icpc| at(icpc, self.default_motif_length, self.default_sequence_count));
        let by_motif_length = self
            .motif_lengths
            .iter()
            .map(|&ml| at(self.default_icpc, ml, self.default_sequence_count));
        let by_sequence_count = self
            .sequence_counts
            .iter()
            .map(|&sc| at(self.default_icpc, self.default_motif_length, sc));

        by_icpc
            .chain(by_motif_length)
            .chain(by_sequence_count)
            .collect()
    }
}

/// Everything a sweep needs to know about where datasets live and what to run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Directory all relative locations are resolved against
    pub base_dir: PathBuf,
    /// Read-only store holding `dataset{i}` fixture directories
    pub fixture_root: PathBuf,
    /// Prefix of the results and plots directories
    pub output_prefix: String,
    pub grid: GridSpec,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            base_dir: PathBuf::from("."),
            fixture_root: PathBuf::from(DEFAULT_FIXTURE_ROOT),
            output_prefix: DEFAULT_PREFIX.to_string(),
            grid: GridSpec::default(),
        }
    }
}

impl EvalConfig {
    /// Loads a configuration from a JSON file; missing fields take their defaults.
    ///
    /// # Errors
    /// * Returns `EvalError::IoAt` if the file cannot be read
    /// * Returns `EvalError::Config` if the JSON is malformed
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| EvalError::io_at(path, e))?;
        let config: EvalConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.grid.trials_per_configuration == 0 {
            return Err(EvalError::invalid_parameter(
                "trials_per_configuration",
                0,
                "at least one trial per configuration is required",
            ));
        }
        let mut lengths = self
            .grid
            .motif_lengths
            .iter()
            .chain(std::iter::once(&self.grid.default_motif_length));
        if let Some(ml) = lengths.find(|&&ml| ml == 0) {
            return Err(EvalError::invalid_parameter(
                "motif_length",
                ml,
                "motif length must be positive",
            ));
        }
        Ok(())
    }

    pub fn results_dir(&self) -> PathBuf {
        self.base_dir.join(format!("{}results", self.output_prefix))
    }

    pub fn plots_dir(&self) -> PathBuf {
        self.base_dir
            .join(format!("{}performance_plots", self.output_prefix))
    }

    /// Location of the `params_set.txt` manifest
    pub fn manifest_path(&self) -> PathBuf {
        self.results_dir().join("params_set.txt")
    }

    pub fn fixture_dir(&self, dataset: usize) -> PathBuf {
        self.base_dir
            .join(&self.fixture_root)
            .join(format!("dataset{}", dataset))
    }

    /// Working copy of a dataset, where predictions are written
    pub fn dataset_paths(&self, dataset: usize) -> DatasetPaths {
        DatasetPaths::new(self.results_dir().join(format!("dataset{}", dataset)))
    }
}
