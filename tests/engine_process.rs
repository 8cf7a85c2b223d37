//! Drives a real child process speaking the analysis protocol.
//!
//! Run with:
//!     cargo test --test engine_process

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use cyclic_eval::engine::batch::run_batch;
use cyclic_eval::engine::config::AnalysisSettings;
use cyclic_eval::engine::katago::{EngineLauncher, KataGoLauncher};
use cyclic_eval::engine::models::{Model, Position};
use cyclic_eval::sgf::Color;

// Answers every query with the same evaluation, except position 1 which
// gets garbage. Each answer is preceded by a warning line.
const FAKE_ENGINE: &str = r##"#!/bin/sh
while IFS= read -r line; do
  id=$(printf '%s\n' "$line" | sed 's/^{"id":"\([^"]*\)".*/\1/')
  case "$id" in
    *-1) echo "not json" ;;
    *)
      echo '{"warning":"Unused field","field":"foo"}'
      printf '{"id":"%s","rootInfo":{"winrate":0.25,"scoreLead":-2.5,"visits":10,"currentPlayer":"W"}}\n' "$id"
      ;;
  esac
done
"##;

// Answers every query, but prints an extra line after the first answer.
const CHATTY_ENGINE: &str = r##"#!/bin/sh
while IFS= read -r line; do
  id=$(printf '%s\n' "$line" | sed 's/^{"id":"\([^"]*\)".*/\1/')
  printf '{"id":"%s","rootInfo":{"winrate":0.6,"scoreLead":1.5,"visits":10}}\n' "$id"
  if [ "$id" = "0-0" ]; then echo "stray diagnostic line"; fi
done
"##;

// Writing an executable while another test forks can leave it busy, so
// tests that spawn engines run one at a time.
static SPAWN_LOCK: Mutex<()> = Mutex::new(());

fn spawn_lock() -> MutexGuard<'static, ()> {
    SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

fn write_engine(dir: &Path, name: &str, script: &str) -> PathBuf {
    let engine = dir.join(name);
    fs::write(&engine, script).unwrap();
    fs::set_permissions(&engine, fs::Permissions::from_mode(0o755)).unwrap();
    engine
}

fn launcher(engine: PathBuf) -> KataGoLauncher {
    KataGoLauncher {
        engine,
        config: None,
        extra_args: Vec::new(),
        show_stderr: false,
    }
}

#[test]
fn batch_against_script_engine() {
    let _guard = spawn_lock();
    let dir = tempfile::tempdir().unwrap();
    let engine = write_engine(dir.path(), "fake-katago", FAKE_ENGINE);

    let launcher = launcher(engine);
    let models: Vec<Model> = ["cp127.bin.gz", "cp505.bin.gz"]
        .iter()
        .map(|n| Model::from_path(&dir.path().join(n)))
        .collect();
    let positions: Vec<Position> = (0..3)
        .map(|i| {
            Position::from_sgf(&format!("p{}", i), "(;SZ[9]PB[adv]PW[victim];B[ee])", None).unwrap()
        })
        .collect();
    assert_eq!(positions[0].victim, Some(Color::White));

    let settings = AnalysisSettings {
        max_visits: Some(10),
        ..Default::default()
    };
    let result = run_batch(&launcher, &models, &positions, &settings, None);

    assert_eq!(result.attempts, 6);
    assert_eq!(result.skipped, 2);
    assert_eq!(result.records.len(), 4);

    // Reported for Black by default, so flipped to the White victim.
    let summaries = result.summaries();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].label, "cp127");
    assert!((summaries[0].mean_winrate - 0.75).abs() < 1e-12);
    assert!((summaries[0].mean_score - 2.5).abs() < 1e-12);
    assert_eq!(summaries[1].victim_wins, 2);
}

#[test]
fn engine_that_exits_early_fails_the_query() {
    let _guard = spawn_lock();
    let launcher = launcher(PathBuf::from("false"));
    let model = Model::from_path(Path::new("cp1.bin.gz"));
    let position = Position::from_sgf("p0", "(;SZ[9])", None).unwrap();

    let mut session = launcher.launch(&model).unwrap();
    let query = position.to_query("0-0", &AnalysisSettings::default());
    assert!(session.query(&query).is_err());
    session.shutdown().unwrap();
}

#[test]
fn extra_output_line_costs_only_one_pair() {
    let _guard = spawn_lock();
    let dir = tempfile::tempdir().unwrap();
    let launcher = launcher(write_engine(dir.path(), "chatty-katago", CHATTY_ENGINE));

    let models = vec![Model::from_path(&dir.path().join("cp505.bin.gz"))];
    let positions: Vec<Position> = (0..5)
        .map(|i| Position::from_sgf(&format!("p{}", i), "(;SZ[9];B[ee])", None).unwrap())
        .collect();

    let result = run_batch(&launcher, &models, &positions, &AnalysisSettings::default(), None);

    // The stray line is taken as the answer to 0-1; 0-1's real answer is
    // then discarded while waiting for 0-2.
    assert_eq!(result.attempts, 5);
    assert_eq!(result.skipped, 1);
    let recorded: Vec<&str> = result.records.iter().map(|r| r.position.as_str()).collect();
    assert_eq!(recorded, vec!["p0", "p2", "p3", "p4"]);
    assert!(result.records.iter().all(|r| (r.outcome.score_lead - 1.5).abs() < 1e-12));
}
