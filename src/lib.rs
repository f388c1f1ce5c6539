//! Benchmark evaluation of motif discovery on synthetic datasets with known motif sites

pub mod config;
pub mod dataset;
pub mod error;
pub mod finder;
pub mod metrics;
pub mod pipeline;
pub mod report;
pub mod sweep;
pub mod trial;
pub mod types;

pub use config::{EvalConfig, GridSpec};
pub use error::{EvalError, Result};
pub use finder::{CommandFinder, MotifFinder, OracleFinder, Prediction};
pub use pipeline::run_evaluation;
