//! Batch evaluation against an in-process fake engine.
//!
//! Run with:
//!     cargo test --test batch_eval

use std::cell::RefCell;
use std::collections::HashSet;
use std::path::Path;
use std::rc::Rc;

use cyclic_eval::engine::batch::{mean, run_batch};
use cyclic_eval::engine::config::AnalysisSettings;
use cyclic_eval::engine::katago::{EngineLauncher, EngineSession};
use cyclic_eval::engine::models::{AnalysisQuery, Model, Position};
use cyclic_eval::engine::plot::render_charts;
use cyclic_eval::error::{EvalError, Result};

type Responder = fn(&AnalysisQuery) -> String;

/// Answers `m-p` with score `10 * m + p` and win rate `0.1 * p`.
fn scored(query: &AnalysisQuery) -> String {
    let (m, p) = query.id.split_once('-').unwrap();
    let (m, p): (f64, f64) = (m.parse().unwrap(), p.parse().unwrap());
    format!(
        r#"{{"id":"{}","rootInfo":{{"winrate":{},"scoreLead":{},"visits":5}}}}"#,
        query.id,
        0.1 * p,
        10.0 * m + p
    )
}

/// Like `scored`, but garbles every answer for position 1.
fn garbled_second_position(query: &AnalysisQuery) -> String {
    if query.id.ends_with("-1") {
        "Segmentation fault".to_string()
    } else {
        scored(query)
    }
}

#[derive(Default)]
struct Log {
    launches: Vec<String>,
    queries: Vec<(String, String)>,
    shutdowns: usize,
}

struct FakeLauncher {
    log: Rc<RefCell<Log>>,
    respond: Responder,
    broken_model: Option<&'static str>,
}

impl FakeLauncher {
    fn new(respond: Responder) -> Self {
        Self {
            log: Rc::new(RefCell::new(Log::default())),
            respond,
            broken_model: None,
        }
    }
}

impl EngineLauncher for FakeLauncher {
    fn launch(&self, model: &Model) -> Result<Box<dyn EngineSession>> {
        self.log.borrow_mut().launches.push(model.name.clone());
        if self.broken_model == Some(model.name.as_str()) {
            return Err(EvalError::EngineExited("<startup>".into()));
        }
        Ok(Box::new(FakeSession {
            model: model.name.clone(),
            log: self.log.clone(),
            respond: self.respond,
        }))
    }
}

struct FakeSession {
    model: String,
    log: Rc<RefCell<Log>>,
    respond: Responder,
}

impl EngineSession for FakeSession {
    fn query(&mut self, query: &AnalysisQuery) -> Result<String> {
        self.log.borrow_mut().queries.push((self.model.clone(), query.id.clone()));
        Ok((self.respond)(query))
    }

    fn shutdown(self: Box<Self>) -> Result<()> {
        self.log.borrow_mut().shutdowns += 1;
        Ok(())
    }
}

fn models(n: usize) -> Vec<Model> {
    (0..n)
        .map(|i| Model::from_path(Path::new(&format!("models/net{}-s{}000.bin.gz", i, i + 1))))
        .collect()
}

fn positions(n: usize) -> Vec<Position> {
    (0..n)
        .map(|i| {
            let sgf = format!("(;SZ[9]KM[7];B[{}{}])", (b'a' + i as u8) as char, 'c');
            Position::from_sgf(&format!("cyc{}", i), &sgf, None).unwrap()
        })
        .collect()
}

#[test]
fn every_pair_is_queried_exactly_once() {
    let launcher = FakeLauncher::new(scored);
    let models = models(3);
    let positions = positions(4);

    let result = run_batch(&launcher, &models, &positions, &AnalysisSettings::default(), None);

    let log = launcher.log.borrow();
    assert_eq!(log.launches.len(), 3);
    assert_eq!(log.shutdowns, 3);
    assert_eq!(log.queries.len(), 12);
    let unique: HashSet<_> = log.queries.iter().collect();
    assert_eq!(unique.len(), 12);

    assert_eq!(result.attempts, 12);
    assert_eq!(result.skipped, 0);
    assert_eq!(result.records.len(), 12);
    assert_eq!(result.model_durations_ms.len(), 3);
}

#[test]
fn aggregate_is_arithmetic_mean() {
    let launcher = FakeLauncher::new(scored);
    let models = models(2);
    let result = run_batch(&launcher, &models, &positions(3), &AnalysisSettings::default(), None);

    let summaries = result.summaries();
    assert_eq!(summaries.len(), 2);
    for (m, summary) in summaries.iter().enumerate() {
        assert_eq!(summary.name, models[m].name);
        assert_eq!(summary.label, models[m].label);
        let expected: Vec<f64> = (0..3).map(|p| 10.0 * m as f64 + p as f64).collect();
        assert_eq!(result.scores(&summary.name), expected);
        assert!((summary.mean_score - mean(&expected)).abs() < 1e-12);
        assert!((summary.mean_winrate - 0.1).abs() < 1e-12);
        assert_eq!(summary.num_recorded, 3);
    }
}

#[test]
fn malformed_output_is_skipped_and_run_continues() {
    let launcher = FakeLauncher::new(garbled_second_position);
    let models = models(2);
    let result = run_batch(&launcher, &models, &positions(3), &AnalysisSettings::default(), None);

    assert_eq!(result.attempts, 6);
    assert_eq!(result.skipped, 2);
    assert_eq!(result.records.len(), 4);
    assert!(result.records.iter().all(|r| r.position != "cyc1"));
    assert_eq!(launcher.log.borrow().queries.len(), 6);
}

#[test]
fn launch_failure_skips_that_model_only() {
    let mut launcher = FakeLauncher::new(scored);
    launcher.broken_model = Some("net0-s1000.bin.gz");
    let models = models(2);

    let progress = RefCell::new(Vec::new());
    let cb = |done: usize, total: usize| progress.borrow_mut().push((done, total));
    let result = run_batch(&launcher, &models, &positions(2), &AnalysisSettings::default(), Some(&cb));

    assert_eq!(result.attempts, 4);
    assert_eq!(result.skipped, 2);
    assert!(result.records.iter().all(|r| r.model == models[1].name));
    assert_eq!(result.summaries().len(), 1);
    assert_eq!(*progress.borrow(), vec![(1, 2), (2, 2)]);
    assert_eq!(launcher.log.borrow().shutdowns, 1);
}

#[test]
fn models_sharing_a_label_keep_separate_statistics() {
    let launcher = FakeLauncher::new(scored);
    let models = vec![
        Model::from_path(Path::new("models/cp505.bin.gz")),
        Model::from_path(Path::new("models/x-cp505.bin.gz")),
    ];
    assert_eq!(models[0].label, models[1].label);

    let result = run_batch(&launcher, &models, &positions(2), &AnalysisSettings::default(), None);

    let summaries = result.summaries();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].name, "cp505.bin.gz");
    assert_eq!(summaries[1].name, "x-cp505.bin.gz");
    assert_eq!(summaries[0].num_recorded, 2);
    assert_eq!(summaries[1].num_recorded, 2);
    assert!((summaries[0].mean_score - 0.5).abs() < 1e-12);
    assert!((summaries[1].mean_score - 10.5).abs() < 1e-12);
}

#[test]
fn empty_inputs_produce_empty_results_and_no_chart() {
    let dir = tempfile::tempdir().unwrap();
    let plots = dir.path().join("plots");

    let launcher = FakeLauncher::new(scored);
    let no_models = run_batch(&launcher, &[], &positions(2), &AnalysisSettings::default(), None);
    assert!(no_models.records.is_empty());
    assert_eq!(no_models.attempts, 0);
    assert!(render_charts(&no_models.summaries(), &plots).unwrap().is_empty());

    let no_positions = run_batch(&launcher, &models(2), &[], &AnalysisSettings::default(), None);
    assert!(no_positions.records.is_empty());
    assert!(no_positions.summaries().is_empty());
    assert!(launcher.log.borrow().launches.is_empty());
    assert!(render_charts(&no_positions.summaries(), &plots).unwrap().is_empty());
    assert!(!plots.exists());

    println!("{}", no_positions.summary());
}
