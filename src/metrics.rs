//! Scoring of predicted motifs and sites against ground truth.
//!
//! The pure functions work on in-memory artifacts; `divergence`, `positional_overlap` and
//! `site_overlap` resolve both artifacts of one dataset through its `DatasetPaths`.

use crate::dataset::{read_motif, read_motif_length, read_sites, DatasetPaths};
use crate::error::{EvalError, Result};
use crate::types::{MotifModel, CHANNELS};
use ndarray::{Array1, Zip};

/// Element-wise relative entropy `t * ln(t / p)`.
///
/// Zero truth contributes nothing; positive truth against zero prediction is `+inf`.
fn rel_entr(t: f64, p: f64) -> f64 {
    if t.is_nan() || p.is_nan() {
        f64::NAN
    } else if t > 0.0 && p > 0.0 {
        t * (t / p).ln()
    } else if t == 0.0 && p >= 0.0 {
        0.0
    } else {
        f64::INFINITY
    }
}

/// Relative entropy D(truth || predicted), accumulated per nucleotide channel.
///
/// Only interior columns are scored: the first and last columns of the ground truth are
/// skipped. The result is not scalarized; callers reduce it across trials.
///
/// # Errors
/// * Returns `EvalError::ShapeMismatch` if the models have different column counts
pub fn relative_entropy(truth: &MotifModel, predicted: &MotifModel) -> Result<[f64; CHANNELS]> {
    if truth.len() != predicted.len() {
        return Err(EvalError::ShapeMismatch(format!(
            "ground truth has {} motif columns, prediction has {}",
            truth.len(),
            predicted.len()
        )));
    }

    let mut total = Array1::<f64>::zeros(CHANNELS);
    for i in 1..truth.len().saturating_sub(1) {
        let column = Zip::from(truth.column(i))
            .and(predicted.column(i))
            .map_collect(|&t, &p| rel_entr(t, p));
        total += &column;
    }

    let mut out = [0.0; CHANNELS];
    for (slot, value) in out.iter_mut().zip(total.iter()) {
        *slot = *value;
    }
    Ok(out)
}

fn check_site_counts(truth: &[i64], predicted: &[i64]) -> Result<()> {
    if truth.len() != predicted.len() {
        return Err(EvalError::ShapeMismatch(format!(
            "ground truth has {} sites, prediction has {}",
            truth.len(),
            predicted.len()
        )));
    }
    Ok(())
}

/// Number of overlapping positions between true and predicted sites.
///
/// Each sequence contributes `motif_length - gap` when the offsets are at most
/// `motif_length` apart, and nothing otherwise.
pub fn overlapping_positions(truth: &[i64], predicted: &[i64], motif_length: usize) -> Result<i64> {
    check_site_counts(truth, predicted)?;
    let ml = motif_length as i64;

    Ok(truth
        .iter()
        .zip(predicted)
        .map(|(t, p)| (t - p).abs())
        .filter(|&gap| gap <= ml)
        .map(|gap| ml - gap)
        .sum())
}

/// Number of overlapping sites: sequences whose offsets are at most
/// `motif_length / 2` (floor) apart.
pub fn overlapping_sites(truth: &[i64], predicted: &[i64], motif_length: usize) -> Result<i64> {
    check_site_counts(truth, predicted)?;
    let half = (motif_length / 2) as i64;

    Ok(truth
        .iter()
        .zip(predicted)
        .filter(|(t, p)| (*t - *p).abs() <= half)
        .count() as i64)
}

/// Relative entropy between `motif.txt` and `predictedmotif.txt` of one dataset
pub fn divergence(paths: &DatasetPaths) -> Result<[f64; CHANNELS]> {
    let truth = read_motif(&paths.motif())?;
    let predicted = read_motif(&paths.predicted_motif())?;
    relative_entropy(&truth, &predicted)
}

/// Overlapping positions between `sites.txt` and `predictedsites.txt` of one dataset
pub fn positional_overlap(paths: &DatasetPaths) -> Result<i64> {
    let truth = read_sites(&paths.sites())?;
    let predicted = read_sites(&paths.predicted_sites())?;
    let motif_length = read_motif_length(&paths.motif_length())?;
    overlapping_positions(&truth, &predicted, motif_length)
}

/// Overlapping sites between `sites.txt` and `predictedsites.txt` of one dataset
pub fn site_overlap(paths: &DatasetPaths) -> Result<i64> {
    let truth = read_sites(&paths.sites())?;
    let predicted = read_sites(&paths.predicted_sites())?;
    let motif_length = read_motif_length(&paths.motif_length())?;
    overlapping_sites(&truth, &predicted, motif_length)
}
