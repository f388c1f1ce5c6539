//! The motif finder under evaluation, seen as a black box.

use crate::dataset::{parse_motif, parse_sites, read_motif, read_sites, DatasetPaths};
use crate::error::{EvalError, Result};
use crate::types::{MotifModel, SiteList};
use std::path::{Path, PathBuf};
use std::process::Command;

/// What a motif finder returns from a single run
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Predicted start offset per sequence, in sequence order
    pub sites: SiteList,
    /// Predicted motif columns
    pub motif: MotifModel,
}

/// A motif discovery procedure that can be scored by the harness.
///
/// A fresh finder is used for every trial: `configure` and `load_sequences` are called once
/// each, then `run` exactly once.
pub trait MotifFinder {
    fn configure(&mut self, motif_length: usize) -> Result<()>;

    fn load_sequences(&mut self, path: &Path) -> Result<()>;

    fn run(&mut self) -> Result<Prediction>;
}

impl<T: MotifFinder + ?Sized> MotifFinder for Box<T> {
    fn configure(&mut self, motif_length: usize) -> Result<()> {
        (**self).configure(motif_length)
    }

    fn load_sequences(&mut self, path: &Path) -> Result<()> {
        (**self).load_sequences(path)
    }

    fn run(&mut self) -> Result<Prediction> {
        (**self).run()
    }
}

/// Predicts the ground truth of the dataset the sequences were loaded from.
///
/// Scores produced with it are the ideal ones, which makes it useful for checking a
/// fixture store and the harness itself.
#[derive(Debug, Default)]
pub struct OracleFinder {
    dataset: Option<DatasetPaths>,
}

impl OracleFinder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MotifFinder for OracleFinder {
    fn configure(&mut self, _motif_length: usize) -> Result<()> {
        Ok(())
    }

    fn load_sequences(&mut self, path: &Path) -> Result<()> {
        let dir = path.parent().ok_or_else(|| {
            EvalError::Finder(format!("{} has no dataset directory", path.display()))
        })?;
        self.dataset = Some(DatasetPaths::new(dir));
        Ok(())
    }

    fn run(&mut self) -> Result<Prediction> {
        let paths = self
            .dataset
            .as_ref()
            .ok_or_else(|| EvalError::Finder("no sequences loaded".into()))?;

        let to_finder_error = |e: EvalError| EvalError::Finder(e.to_string());
        Ok(Prediction {
            sites: read_sites(&paths.sites()).map_err(to_finder_error)?,
            motif: read_motif(&paths.motif()).map_err(to_finder_error)?,
        })
    }
}

/// Runs an external program as the motif finder.
///
/// The program is invoked as `<program> [args..] <motif_length> <sequences>` and must print
/// the predicted sites (one per line) followed by the predicted motif in the motif file
/// layout: a `>` header line, one line per column and a closing `<` line.
#[derive(Debug, Clone)]
pub struct CommandFinder {
    program: PathBuf,
    args: Vec<String>,
    motif_length: Option<usize>,
    sequences: Option<PathBuf>,
}

impl CommandFinder {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        CommandFinder {
            program: program.into(),
            args,
            motif_length: None,
            sequences: None,
        }
    }

    fn parse_output(&self, stdout: &str) -> Result<Prediction> {
        let source = PathBuf::from(format!("<stdout of {}>", self.program.display()));
        let motif_start = stdout
            .match_indices('\n')
            .map(|(i, _)| i + 1)
            .chain(std::iter::once(0))
            .filter(|&i| stdout[i..].starts_with('>'))
            .min()
            .ok_or_else(|| EvalError::Finder("output has no motif header line".into()))?;

        let (sites, motif) = stdout.split_at(motif_start);
        let to_finder_error = |e: EvalError| EvalError::Finder(e.to_string());

        Ok(Prediction {
            sites: parse_sites(&source, sites.trim_end()).map_err(to_finder_error)?,
            motif: parse_motif(&source, motif).map_err(to_finder_error)?,
        })
    }
}

impl MotifFinder for CommandFinder {
    fn configure(&mut self, motif_length: usize) -> Result<()> {
        self.motif_length = Some(motif_length);
        Ok(())
    }

    fn load_sequences(&mut self, path: &Path) -> Result<()> {
        self.sequences = Some(path.to_path_buf());
        Ok(())
    }

    fn run(&mut self) -> Result<Prediction> {
        let (motif_length, sequences) = match (self.motif_length, self.sequences.as_ref()) {
            (Some(ml), Some(seqs)) => (ml, seqs),
            _ => {
                return Err(EvalError::Finder(
                    "finder must be configured and loaded before running".into(),
                ))
            }
        };

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(motif_length.to_string())
            .arg(sequences)
            .output()
            .map_err(|e| {
                EvalError::Finder(format!("failed to start {}: {}", self.program.display(), e))
            })?;

        if !output.status.success() {
            return Err(EvalError::Finder(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| EvalError::Finder(format!("output is not UTF-8: {}", e)))?;
        self.parse_output(&stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_output() {
        let finder = CommandFinder::new("finder", vec![]);
        let out = "12\n40\n7\n>MOTIF0\t3\n0.7 0.1 0.1 0.1\n0.25 0.25 0.25 0.25\n0.1 0.1 0.1 0.7\n<";
        let prediction = finder.parse_output(out).unwrap();
        assert_eq!(prediction.sites, vec![12, 40, 7]);
        assert_eq!(prediction.motif.len(), 3);
        assert_eq!(prediction.motif.column(2)[3], 0.7);
    }

    #[test]
    fn test_parse_command_output_without_motif() {
        let finder = CommandFinder::new("finder", vec![]);
        let result = finder.parse_output("1\n2\n");
        assert!(matches!(result, Err(EvalError::Finder(_))));
    }
}
