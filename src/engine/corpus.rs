//! Discovery of model checkpoints and test positions on disk.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::engine::models::{Model, Position};
use crate::error::{EvalError, Result};
use crate::sgf::{find_sgf_files, read_games, Color, DEFAULT_MAX_SCAN};

/// Model files directly inside `dir` whose names end in one of
/// `extensions`, sorted by file name.
///
/// Labels that would collide fall back to the file name so per-model
/// statistics never merge.
pub fn discover_models<S: AsRef<str>>(dir: &Path, extensions: &[S]) -> Result<Vec<Model>> {
    let entries = fs::read_dir(dir).map_err(|e| EvalError::io(dir, e))?;

    let mut models = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| EvalError::io(dir, e))?.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('.') || !extensions.iter().any(|ext| name.ends_with(ext.as_ref())) {
            continue;
        }
        models.push(Model::from_path(&path));
    }
    models.sort_by(|a, b| a.name.cmp(&b.name));

    let mut label_counts: HashMap<String, usize> = HashMap::new();
    for m in &models {
        *label_counts.entry(m.label.clone()).or_insert(0) += 1;
    }
    for m in &mut models {
        if label_counts[&m.label] > 1 {
            m.label = m.name.clone();
        }
    }

    Ok(models)
}

/// Every position in the game files under `dir`, in path order.
///
/// A `.sgfs` file contributes one position per line, named
/// `<stem>:<line>`. Records that fail to parse are logged and skipped.
pub fn load_positions(dir: &Path, default_victim: Option<Color>) -> Result<Vec<Position>> {
    if !dir.is_dir() {
        return Err(EvalError::io(
            dir,
            std::io::Error::new(std::io::ErrorKind::NotFound, "positions directory not found"),
        ));
    }

    let mut positions = Vec::new();
    for path in find_sgf_files(dir, DEFAULT_MAX_SCAN) {
        let games = match read_games(&path) {
            Ok(games) => games,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read position file");
                continue;
            }
        };
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let multi = games.len() > 1 || path.extension().is_some_and(|e| e == "sgfs");

        for (line, text) in games {
            let name = if multi { format!("{}:{}", stem, line) } else { stem.clone() };
            match Position::from_sgf(&name, &text, default_victim) {
                Ok(pos) => positions.push(pos),
                Err(e) => {
                    tracing::warn!(path = %path.display(), line, error = %e, "skipping unparseable position");
                }
            }
        }
    }
    Ok(positions)
}
