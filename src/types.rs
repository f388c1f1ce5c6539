use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Nucleotide channel order of every motif column, as laid out on disk
pub const NUCLEOTIDES: [char; 4] = ['A', 'C', 'G', 'T'];

/// Number of channels per motif column
pub const CHANNELS: usize = NUCLEOTIDES.len();

/// Represents a motif model (position frequency matrix)
/// Stored as a matrix with one row per motif column and one column per nucleotide
#[derive(Debug, Clone, PartialEq)]
pub struct MotifModel(Array2<f64>);

impl MotifModel {
    pub fn from_columns(columns: &[[f64; CHANNELS]]) -> Self {
        MotifModel(Array2::from_shape_fn((columns.len(), CHANNELS), |(i, c)| {
            columns[i][c]
        }))
    }

    /// Number of motif columns (positions)
    pub fn len(&self) -> usize {
        self.0.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.0.nrows() == 0
    }

    /// The distribution over `NUCLEOTIDES` at motif position `i`
    pub fn column(&self, i: usize) -> ArrayView1<'_, f64> {
        self.0.row(i)
    }

    pub fn columns(&self) -> impl Iterator<Item = ArrayView1<'_, f64>> {
        self.0.rows().into_iter()
    }

    pub fn as_array(&self) -> &Array2<f64> {
        &self.0
    }
}

/// Motif start offsets, one per sequence, in sequence order
pub type SiteList = Vec<i64>;

/// One point of the benchmark parameter grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    /// Information content per motif column
    pub icpc: f64,
    pub motif_length: usize,
    pub sequence_length: usize,
    pub sequence_count: usize,
}

impl ParameterSet {
    /// List form used by the manifest, e.g. `[1.5, 7, 500, 10]`
    pub fn as_list(&self) -> String {
        format!(
            "[{:?}, {}, {}, {}]",
            self.icpc, self.motif_length, self.sequence_length, self.sequence_count
        )
    }
}

impl fmt::Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:?}, {}, {}, {})",
            self.icpc, self.motif_length, self.sequence_length, self.sequence_count
        )
    }
}

/// A parameter set together with the contiguous block of datasets it owns
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub index: usize,
    pub params: ParameterSet,
    pub datasets: Range<usize>,
}

/// Scores of a single trial (one dataset, one run of the motif finder)
#[derive(Debug, Clone, PartialEq)]
pub struct TrialResult {
    pub dataset: usize,
    /// Relative entropy per nucleotide channel, summed over scored columns
    pub divergence: [f64; CHANNELS],
    pub overlap_positions: i64,
    pub overlap_sites: i64,
    pub runtime_secs: f64,
}

/// Per-configuration means over its trials
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedResult {
    pub configuration: Configuration,
    /// Mean over every channel of every trial
    pub divergence: f64,
    pub divergence_by_channel: [f64; CHANNELS],
    pub overlap_positions: f64,
    pub overlap_sites: f64,
    pub runtime_secs: f64,
}
