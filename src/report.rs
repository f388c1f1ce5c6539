use crate::error::{EvalError, Result};
use crate::types::{AggregatedResult, Configuration, NUCLEOTIDES};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use polars::prelude::{Column, CsvWriter, DataFrame, SerWriter};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};

const MANIFEST_HEADER: &str = "ICPC, ML, SL, SC";
const CHART_SIZE: (u32, u32) = (1280, 960);

/// The four aggregated quantities that get charted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    RelativeEntropy,
    OverlappingPositions,
    OverlappingSites,
    Runtime,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::RelativeEntropy,
        Metric::OverlappingPositions,
        Metric::OverlappingSites,
        Metric::Runtime,
    ];

    /// Axis label, also used as the chart file stem
    pub fn label(&self) -> &'static str {
        match self {
            Metric::RelativeEntropy => "Relative Entropy",
            Metric::OverlappingPositions => "Overlapping Positions",
            Metric::OverlappingSites => "Overlapping Sites",
            Metric::Runtime => "Runtime",
        }
    }

    pub fn value(&self, result: &AggregatedResult) -> f64 {
        match self {
            Metric::RelativeEntropy => result.divergence,
            Metric::OverlappingPositions => result.overlap_positions,
            Metric::OverlappingSites => result.overlap_sites,
            Metric::Runtime => result.runtime_secs,
        }
    }

    pub fn chart_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.png", self.label()))
    }
}

/// Writes the parameter grid manifest: a header line, then one line per configuration
/// with its parameter list and the datasets it owns.
pub fn write_manifest(path: &Path, configurations: &[Configuration]) -> Result<()> {
    let file = File::create(path).map_err(|e| EvalError::io_at(path, e))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "{}", MANIFEST_HEADER)?;
    for configuration in configurations {
        let datasets = configuration
            .datasets
            .clone()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(
            writer,
            "{} :Datasets [{}]",
            configuration.params.as_list(),
            datasets
        )?;
    }
    writer.flush()?;
    log::info!("Wrote parameter manifest to {}", path.display());
    Ok(())
}

/// Prints the per-configuration means of every metric, one list per metric
pub fn print_results(results: &[AggregatedResult]) {
    let values = |metric: Metric| results.iter().map(|r| metric.value(r)).collect::<Vec<_>>();

    println!("KL_Divergence: {:?}", values(Metric::RelativeEntropy));
    println!("Overlapping Positions: {:?}", values(Metric::OverlappingPositions));
    println!("Overlapping Sites: {:?}", values(Metric::OverlappingSites));
    println!("Runtimes: {:?}", values(Metric::Runtime));
}

/// Writes one row per configuration with its parameters and all means.
///
/// # Errors
/// * Returns `EvalError::Data` if the table cannot be built or serialized
/// * Returns `EvalError::IoAt` if the file cannot be created
pub fn write_summary_csv(path: &Path, results: &[AggregatedResult]) -> Result<()> {
    let params = |f: fn(&Configuration) -> i64| {
        results
            .iter()
            .map(|r| f(&r.configuration))
            .collect::<Vec<i64>>()
    };

    let mut columns = vec![
        Column::new("configuration".into(), params(|c| c.index as i64)),
        Column::new(
            "icpc".into(),
            results
                .iter()
                .map(|r| r.configuration.params.icpc)
                .collect::<Vec<f64>>(),
        ),
        Column::new(
            "motif_length".into(),
            params(|c| c.params.motif_length as i64),
        ),
        Column::new(
            "sequence_length".into(),
            params(|c| c.params.sequence_length as i64),
        ),
        Column::new(
            "sequence_count".into(),
            params(|c| c.params.sequence_count as i64),
        ),
        Column::new("first_dataset".into(), params(|c| c.datasets.start as i64)),
        Column::new("last_dataset".into(), params(|c| c.datasets.end as i64 - 1)),
    ];

    for metric in Metric::ALL {
        let name = metric.label().to_lowercase().replace(' ', "_");
        columns.push(Column::new(
            name.into(),
            results.iter().map(|r| metric.value(r)).collect::<Vec<f64>>(),
        ));
    }
    for (c, base) in NUCLEOTIDES.iter().enumerate() {
        columns.push(Column::new(
            format!("relative_entropy_{}", base).into(),
            results
                .iter()
                .map(|r| r.divergence_by_channel[c])
                .collect::<Vec<f64>>(),
        ));
    }

    let mut df = DataFrame::new(columns)?;
    let mut file = File::create(path).map_err(|e| EvalError::io_at(path, e))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)?;

    log::info!("Wrote summary table to {}", path.display());
    Ok(())
}

fn plot_error<E: std::fmt::Display>(e: E) -> EvalError {
    EvalError::Plot(e.to_string())
}

/// Vertical range covering every finite value with some headroom for annotations
fn value_range(values: &[f64]) -> Range<f64> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return 0.0..1.0;
    }

    let lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let pad = if hi > lo {
        (hi - lo) * 0.15
    } else {
        lo.abs().max(1.0) * 0.15
    };
    (lo - pad)..(hi + pad)
}

/// Labels in the right half of the chart extend leftwards so they stay inside the plot
fn label_alignment(index: usize, count: usize) -> HPos {
    if 2 * index + 1 > count {
        HPos::Right
    } else {
        HPos::Left
    }
}

fn draw_chart(path: &Path, metric: Metric, results: &[AggregatedResult]) -> Result<()> {
    let values: Vec<f64> = results.iter().map(|r| metric.value(r)).collect();
    let y_range = value_range(&values);
    let x_range = -0.5..(results.len().max(1) as f64 - 0.5);

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;
    let root = root.margin(10, 10, 10, 10);

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("{} vs Parameter Set", metric.label()),
            ("sans-serif", 30),
        )
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(x_range, y_range.clone())
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .x_desc("Parameter Set")
        .y_desc(metric.label())
        .x_labels(results.len().max(1))
        .x_label_formatter(&|x| format!("{:.0}", x))
        .disable_mesh()
        .draw()
        .map_err(plot_error)?;

    let points: Vec<(f64, f64)> = values
        .iter()
        .enumerate()
        .map(|(i, &y)| (i as f64, y))
        .collect();

    for run in points.split(|(_, y)| !y.is_finite()) {
        chart
            .draw_series(LineSeries::new(run.iter().copied(), BLUE.stroke_width(2)))
            .map_err(plot_error)?;
        chart
            .draw_series(run.iter().map(|&p| Circle::new(p, 4, BLUE.filled())))
            .map_err(plot_error)?;
    }

    for (i, (result, &(x, y))) in results.iter().zip(points.iter()).enumerate() {
        let label = result.configuration.params.to_string();
        let (text, anchor, v_pos) = if y.is_finite() {
            (label, (x, y), VPos::Bottom)
        } else {
            (format!("{} {}", label, y), (x, y_range.end), VPos::Top)
        };
        let style = TextStyle::from(("sans-serif", 16).into_font())
            .pos(Pos::new(label_alignment(i, results.len()), v_pos));
        chart
            .draw_series(std::iter::once(Text::new(text, anchor, style)))
            .map_err(plot_error)?;
    }

    root.present().map_err(plot_error)?;
    Ok(())
}

/// Draws one metric over the configuration index, annotating each point with its
/// parameter set. Non-finite means break the line and are annotated at the top edge.
///
/// # Returns
/// * `Result<PathBuf>` - The written image, named after the metric
pub fn render_chart(dir: &Path, metric: Metric, results: &[AggregatedResult]) -> Result<PathBuf> {
    let path = metric.chart_path(dir);
    draw_chart(&path, metric, results)?;
    log::info!("Saved {} chart to {}", metric.label(), path.display());
    Ok(path)
}

/// Renders one chart per metric into `dir`
pub fn render_charts(dir: &Path, results: &[AggregatedResult]) -> Result<Vec<PathBuf>> {
    Metric::ALL
        .iter()
        .map(|&metric| render_chart(dir, metric, results))
        .collect()
}
