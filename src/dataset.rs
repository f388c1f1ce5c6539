use crate::error::{EvalError, Result};
use crate::types::{MotifModel, SiteList, CHANNELS};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const MOTIF_LENGTH_FILE: &str = "motiflength.txt";
const SITES_FILE: &str = "sites.txt";
const PREDICTED_SITES_FILE: &str = "predictedsites.txt";
const MOTIF_FILE: &str = "motif.txt";
const PREDICTED_MOTIF_FILE: &str = "predictedmotif.txt";
const SEQUENCES_FILE: &str = "sequences.fa";

/// Closing sentinel written after the last motif column
const MOTIF_TERMINATOR: &str = "<";

/// Artifact locations of one dataset directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    dir: PathBuf,
}

impl DatasetPaths {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DatasetPaths { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn motif_length(&self) -> PathBuf {
        self.dir.join(MOTIF_LENGTH_FILE)
    }

    pub fn sites(&self) -> PathBuf {
        self.dir.join(SITES_FILE)
    }

    pub fn predicted_sites(&self) -> PathBuf {
        self.dir.join(PREDICTED_SITES_FILE)
    }

    pub fn motif(&self) -> PathBuf {
        self.dir.join(MOTIF_FILE)
    }

    pub fn predicted_motif(&self) -> PathBuf {
        self.dir.join(PREDICTED_MOTIF_FILE)
    }

    pub fn sequences(&self) -> PathBuf {
        self.dir.join(SEQUENCES_FILE)
    }
}

fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| EvalError::io_at(path, e))
}

/// Parses a single motif column line into its four channel values
fn parse_column(path: &Path, line_no: usize, line: &str) -> Result<[f64; CHANNELS]> {
    let values: Vec<f64> = line
        .split_whitespace()
        .map(|s| s.parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| EvalError::parse(path, line_no, format!("Invalid motif value: {}", e)))?;

    <[f64; CHANNELS]>::try_from(values.as_slice()).map_err(|_| {
        EvalError::parse(
            path,
            line_no,
            format!("Expected {} values per column, found {}", CHANNELS, values.len()),
        )
    })
}

/// Parses motif text: a header line, one line per column, and a closing sentinel line.
///
/// The first and last lines are discarded without inspection. `path` is only used for
/// error reporting.
pub fn parse_motif(path: &Path, content: &str) -> Result<MotifModel> {
    let lines: Vec<&str> = content.lines().collect();
    let body = if lines.len() > 2 {
        &lines[1..lines.len() - 1]
    } else {
        &[][..]
    };

    let columns = body
        .iter()
        .enumerate()
        .map(|(i, line)| parse_column(path, i + 2, line))
        .collect::<Result<Vec<_>>>()?;

    Ok(MotifModel::from_columns(&columns))
}

/// Parses site text: one integer start offset per line, in sequence order
pub fn parse_sites(path: &Path, content: &str) -> Result<SiteList> {
    content
        .lines()
        .enumerate()
        .map(|(i, line)| {
            line.trim().parse::<i64>().map_err(|e| {
                EvalError::parse(path, i + 1, format!("Invalid site '{}': {}", line.trim(), e))
            })
        })
        .collect()
}

/// Reads a motif model file.
///
/// # Arguments
/// * `path` - Path to a `motif.txt` or `predictedmotif.txt` file
///
/// # Returns
/// * `Result<MotifModel>` - The motif columns in file order
///
/// # Errors
/// * Returns `EvalError::IoAt` if the file cannot be read
/// * Returns `EvalError::Parse` if a column line does not hold exactly four numbers
pub fn read_motif(path: &Path) -> Result<MotifModel> {
    parse_motif(path, &read_to_string(path)?)
}

/// Reads a site list file.
///
/// # Errors
/// * Returns `EvalError::IoAt` if the file cannot be read
/// * Returns `EvalError::Parse` on any line that is not an integer
pub fn read_sites(path: &Path) -> Result<SiteList> {
    parse_sites(path, &read_to_string(path)?)
}

/// Reads the motif length from the first line of `path`.
pub fn read_motif_length(path: &Path) -> Result<usize> {
    let content = read_to_string(path)?;
    let first = content
        .lines()
        .next()
        .ok_or_else(|| EvalError::parse(path, 1, "Missing motif length"))?
        .trim();

    match first.parse::<usize>() {
        Ok(0) => Err(EvalError::parse(path, 1, "Motif length must be positive")),
        Ok(n) => Ok(n),
        Err(e) => Err(EvalError::parse(
            path,
            1,
            format!("Invalid motif length '{}': {}", first, e),
        )),
    }
}

/// Writes sites one per line, in the given order
pub fn write_sites(path: &Path, sites: &[i64]) -> Result<()> {
    let file = File::create(path).map_err(|e| EvalError::io_at(path, e))?;
    let mut writer = BufWriter::new(file);
    for site in sites {
        writeln!(writer, "{}", site)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes a motif model in the same layout `read_motif` expects.
///
/// The header line is `>MOTIF{dataset}\t{motif_length}`, followed by one line per column
/// of space-separated values and the closing `<` sentinel.
pub fn write_motif(
    path: &Path,
    motif: &MotifModel,
    dataset: usize,
    motif_length: usize,
) -> Result<()> {
    let file = File::create(path).map_err(|e| EvalError::io_at(path, e))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, ">MOTIF{}\t{}", dataset, motif_length)?;
    for column in motif.columns() {
        let line = column
            .iter()
            .map(|v| format!("{:?}", v))
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(writer, "{}", line)?;
    }
    write!(writer, "{}", MOTIF_TERMINATOR)?;
    writer.flush()?;
    Ok(())
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    let entries = fs::read_dir(src).map_err(|e| EvalError::io_at(src, e))?;
    fs::create_dir_all(dst).map_err(|e| EvalError::io_at(dst, e))?;
    for entry in entries {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| EvalError::io_at(&target, e))?;
        }
    }
    Ok(())
}

/// Materializes a dataset's working copy from its fixture directory.
///
/// # Returns
/// * `Ok(true)` if the fixture was copied. The copy is assembled in a `.partial` sibling
///   and renamed into place, so an interrupted copy is never mistaken for a dataset
/// * `Ok(false)` if `working_dir` already existed; nothing is touched in that case
///
/// # Errors
/// * Returns `EvalError::IoAt` if the fixture cannot be read or the copy fails
pub fn provision(fixture_dir: &Path, working_dir: &Path) -> Result<bool> {
    if working_dir.exists() {
        log::debug!(
            "Dataset {} already materialized, skipping copy",
            working_dir.display()
        );
        return Ok(false);
    }

    log::debug!(
        "Copying fixture {} to {}",
        fixture_dir.display(),
        working_dir.display()
    );
    let staging = staging_dir(working_dir);
    if staging.exists() {
        fs::remove_dir_all(&staging).map_err(|e| EvalError::io_at(&staging, e))?;
    }
    if let Err(e) = copy_dir_recursive(fixture_dir, &staging) {
        let _ = fs::remove_dir_all(&staging);
        return Err(e);
    }
    fs::rename(&staging, working_dir).map_err(|e| EvalError::io_at(working_dir, e))?;
    Ok(true)
}

/// Sibling directory a working copy is assembled in before being renamed into place
fn staging_dir(working_dir: &Path) -> PathBuf {
    let mut name = working_dir
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    working_dir.with_file_name(name)
}
