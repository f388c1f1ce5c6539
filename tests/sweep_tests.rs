mod common;

use motif_eval::dataset::{read_motif, read_sites};
use motif_eval::report::Metric;
use motif_eval::sweep::{aggregate, build_configurations, mean, Sweep};
use motif_eval::trial::TrialRunner;
use motif_eval::types::{MotifModel, TrialResult};
use motif_eval::{
    run_evaluation, EvalConfig, EvalError, GridSpec, MotifFinder, OracleFinder, Prediction,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Predicts every site a fixed distance away and a motif with a zero where truth is certain
struct SkewedFinder {
    shift: i64,
    dataset: Option<PathBuf>,
}

impl SkewedFinder {
    fn new(shift: i64) -> Self {
        SkewedFinder {
            shift,
            dataset: None,
        }
    }
}

impl MotifFinder for SkewedFinder {
    fn configure(&mut self, _motif_length: usize) -> motif_eval::Result<()> {
        Ok(())
    }

    fn load_sequences(&mut self, path: &Path) -> motif_eval::Result<()> {
        self.dataset = path.parent().map(Path::to_path_buf);
        Ok(())
    }

    fn run(&mut self) -> motif_eval::Result<Prediction> {
        let dir = self.dataset.as_ref().unwrap();
        let sites = read_sites(&dir.join("sites.txt"))?
            .into_iter()
            .map(|s| s + self.shift)
            .collect();
        let truth = read_motif(&dir.join("motif.txt"))?;
        let columns: Vec<[f64; 4]> = (0..truth.len())
            .map(|i| if i == 2 { [0.5, 0.5, 0.0, 0.0] } else { [0.25; 4] })
            .collect();
        Ok(Prediction {
            sites,
            motif: MotifModel::from_columns(&columns),
        })
    }
}

/// Answers correctly but idles before doing so
struct SleepingFinder(OracleFinder);

impl MotifFinder for SleepingFinder {
    fn configure(&mut self, motif_length: usize) -> motif_eval::Result<()> {
        self.0.configure(motif_length)
    }

    fn load_sequences(&mut self, path: &Path) -> motif_eval::Result<()> {
        self.0.load_sequences(path)
    }

    fn run(&mut self) -> motif_eval::Result<Prediction> {
        std::thread::sleep(Duration::from_millis(300));
        self.0.run()
    }
}

struct FailingFinder;

impl MotifFinder for FailingFinder {
    fn configure(&mut self, _motif_length: usize) -> motif_eval::Result<()> {
        Ok(())
    }

    fn load_sequences(&mut self, _path: &Path) -> motif_eval::Result<()> {
        Ok(())
    }

    fn run(&mut self) -> motif_eval::Result<Prediction> {
        Err(EvalError::Finder("did not converge".into()))
    }
}

fn test_config(base: &Path, trials: usize) -> EvalConfig {
    let mut config = EvalConfig {
        base_dir: base.to_path_buf(),
        ..EvalConfig::default()
    };
    config.grid.trials_per_configuration = trials;
    common::write_fixture_store(&config.base_dir.join(&config.fixture_root), 7 * trials);
    config
}

#[test]
fn test_default_grid() {
    let configurations = build_configurations(&GridSpec::default());
    assert_eq!(configurations.len(), 7);

    let mut expected_start = 0;
    for (k, configuration) in configurations.iter().enumerate() {
        assert_eq!(configuration.index, k);
        assert_eq!(configuration.datasets, expected_start..expected_start + 10);
        expected_start += 10;
    }
    assert_eq!(expected_start, 70);

    let params: Vec<String> = configurations
        .iter()
        .map(|c| c.params.to_string())
        .collect();
    assert_eq!(
        params,
        vec![
            "(1.0, 7, 500, 10)",
            "(1.5, 7, 500, 10)",
            "(2.0, 7, 500, 10)",
            "(1.5, 6, 500, 10)",
            "(1.5, 8, 500, 10)",
            "(1.5, 7, 500, 5)",
            "(1.5, 7, 500, 20)",
        ]
    );
}

#[test]
fn test_aggregate_identical_trials() {
    let configuration = build_configurations(&GridSpec::default()).remove(4);
    let trials: Vec<TrialResult> = configuration
        .datasets
        .clone()
        .map(|dataset| TrialResult {
            dataset,
            divergence: [0.1, 0.2, 0.3, 0.4],
            overlap_positions: 37,
            overlap_sites: 9,
            runtime_secs: 0.01234567,
        })
        .collect();

    let result = aggregate(&configuration, &trials);
    assert_eq!(result.divergence_by_channel, [0.1, 0.2, 0.3, 0.4]);
    assert!((result.divergence - 0.25).abs() < 1e-12);
    assert_eq!(result.overlap_positions, 37.0);
    assert_eq!(result.overlap_sites, 9.0);
    assert_eq!(result.runtime_secs, 0.01234567);
    assert_eq!(mean(&[0.3; 10]), 0.3);
}

#[test]
fn test_oracle_evaluation_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 2);

    let results = run_evaluation(&config, OracleFinder::new, false).unwrap();
    assert_eq!(results.len(), 7);
    for result in &results {
        assert_eq!(result.divergence, 0.0);
        assert_eq!(result.divergence_by_channel, [0.0; 4]);
        assert_eq!(
            result.overlap_positions,
            (common::MOTIF_LENGTH * common::SITES.len()) as f64
        );
        assert_eq!(result.overlap_sites, common::SITES.len() as f64);
        assert!(result.runtime_secs >= 0.0);
    }

    let manifest = fs::read_to_string(config.manifest_path()).unwrap();
    let lines: Vec<&str> = manifest.lines().collect();
    assert_eq!(lines.len(), 8);
    assert_eq!(lines[0], "ICPC, ML, SL, SC");
    assert_eq!(lines[1], "[1.0, 7, 500, 10] :Datasets [0, 1]");
    assert_eq!(lines[7], "[1.5, 7, 500, 20] :Datasets [12, 13]");

    let predicted = config.dataset_paths(13);
    assert_eq!(
        read_sites(&predicted.predicted_sites()).unwrap(),
        common::SITES.to_vec()
    );
    assert!(config.results_dir().join("summary.csv").exists());
    assert!(!config.plots_dir().exists());
}

#[test]
fn test_infinite_trial_makes_mean_infinite() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 2);
    let runner = TrialRunner::new(&config);

    let trial = runner.run_trial(0, &mut SkewedFinder::new(3)).unwrap();
    // column 2 of the fixture is certain G, predicted with probability zero
    assert_eq!(trial.divergence[2], f64::INFINITY);
    assert_eq!(
        trial.overlap_positions,
        ((common::MOTIF_LENGTH - 3) * common::SITES.len()) as i64
    );
    assert_eq!(trial.overlap_sites, 0);

    let finite = runner.run_trial(1, &mut OracleFinder::new()).unwrap();
    let configuration = Sweep::new(&config).configurations()[0].clone();
    let result = aggregate(&configuration, &[trial, finite]);
    assert_eq!(result.divergence, f64::INFINITY);
    assert_eq!(result.divergence_by_channel[2], f64::INFINITY);
    assert!(result.divergence_by_channel[0].is_finite());
}

#[test]
fn test_finder_failure_aborts_sweep() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 1);

    let result = Sweep::new(&config).run(|| FailingFinder);
    assert!(matches!(result, Err(EvalError::Finder(_))));
}

#[test]
fn test_rerun_reuses_materialized_datasets() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 1);

    run_evaluation(&config, OracleFinder::new, false).unwrap();
    // a second run over existing working copies and output roots succeeds
    let results = run_evaluation(&config, || SkewedFinder::new(100), false).unwrap();
    assert!(results.iter().all(|r| r.overlap_positions == 0.0));
}

#[test]
fn test_config_from_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sweep.json");
    fs::write(
        &path,
        r#"{ "output_prefix": "run2", "grid": { "trials_per_configuration": 3 } }"#,
    )
    .unwrap();

    let config = EvalConfig::from_json_file(&path).unwrap();
    assert_eq!(config.output_prefix, "run2");
    assert_eq!(config.grid.trials_per_configuration, 3);
    assert_eq!(config.grid.icpc_values, vec![1.0, 1.5, 2.0]);
    assert!(config.results_dir().ends_with("run2results"));

    fs::write(&path, r#"{ "grid": { "trials_per_configuration": 0 } }"#).unwrap();
    assert!(matches!(
        EvalConfig::from_json_file(&path),
        Err(EvalError::InvalidParameter { .. })
    ));

    fs::write(&path, r#"{ "grid": { "motif_lengths": [6, 0] } }"#).unwrap();
    match EvalConfig::from_json_file(&path) {
        Err(EvalError::InvalidParameter { name, .. }) => assert_eq!(name, "motif_length"),
        other => panic!("expected invalid motif length, got {:?}", other),
    }
}

#[test]
fn test_runtime_counts_cpu_time_only() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 1);

    let trial = TrialRunner::new(&config)
        .run_trial(0, &mut SleepingFinder(OracleFinder::new()))
        .unwrap();
    assert_eq!(trial.overlap_sites, common::SITES.len() as i64);
    assert!(trial.runtime_secs >= 0.0);
    assert!(trial.runtime_secs < 0.1, "runtime {}", trial.runtime_secs);
}

#[test]
fn test_oracle_errors_surface_as_finder_errors() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 1);
    let paths = config.dataset_paths(0);
    motif_eval::dataset::provision(&config.fixture_dir(0), paths.dir()).unwrap();
    fs::write(paths.motif(), ">MOTIF0\t4\n0.5 0.5\n<").unwrap();

    let mut finder = OracleFinder::new();
    finder.load_sequences(&paths.sequences()).unwrap();
    assert!(matches!(finder.run(), Err(EvalError::Finder(_))));
}

#[test]
fn test_evaluation_renders_charts() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 1);

    run_evaluation(&config, OracleFinder::new, true).unwrap();

    for metric in Metric::ALL {
        let chart = metric.chart_path(&config.plots_dir());
        let size = fs::metadata(&chart).unwrap().len();
        assert!(size > 0, "{} is empty", chart.display());
    }
    assert_eq!(
        fs::read_to_string(config.plots_dir().join("params_set.txt")).unwrap(),
        fs::read_to_string(config.manifest_path()).unwrap()
    );
}
