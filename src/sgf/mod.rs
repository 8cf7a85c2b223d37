//! Game-record handling: reading positions, game-info extraction and
//! publication helpers for SGF files.

pub mod coords;
pub mod game_info;
pub mod parse;
pub mod props;
pub mod viewer;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use game_info::{parse_game_str, GameInfo, ParseOptions};

pub const DEFAULT_MAX_SCAN: usize = 10_000;

/// Stone colour. Serialised as `b` / `w`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    #[serde(rename = "b", alias = "B", alias = "black")]
    Black,
    #[serde(rename = "w", alias = "W", alias = "white")]
    White,
}

impl Color {
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Upper-case letter used by SGF move properties and the engine protocol.
    pub fn letter(self) -> &'static str {
        match self {
            Color::Black => "B",
            Color::White => "W",
        }
    }

    pub fn from_letter(c: char) -> Option<Color> {
        match c.to_ascii_lowercase() {
            'b' => Some(Color::Black),
            'w' => Some(Color::White),
            _ => None,
        }
    }
}

fn is_game_file(name: &str) -> bool {
    name.ends_with(".sgf") || name.ends_with(".sgfs")
}

/// All `.sgf` / `.sgfs` files under `root`, recursively, sorted by path.
///
/// Stops after scanning `max_scan` directories and returns what was found
/// so far.
pub fn find_sgf_files(root: &Path, max_scan: usize) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    let mut scanned = 0usize;

    while let Some(dir) = pending.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "cannot read directory");
                continue;
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.file_name().and_then(|n| n.to_str()).is_some_and(is_game_file) {
                found.push(path);
            }
        }
        scanned += 1;
        if scanned >= max_scan {
            tracing::warn!(
                root = %root.display(),
                max_scan,
                "reached max_scan while scanning subdirectories, returning files found so far"
            );
            break;
        }
    }

    found.sort();
    found
}

/// Game records in a file with their 1-based line numbers.
///
/// A `.sgfs` file holds one game per line; any other file is a single game.
pub fn read_games(path: &Path) -> io::Result<Vec<(usize, String)>> {
    let text = fs::read_to_string(path)?;
    if path.extension().is_some_and(|e| e == "sgfs") {
        Ok(text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| (i + 1, line.trim().to_string()))
            .collect())
    } else if text.trim().is_empty() {
        Ok(Vec::new())
    } else {
        Ok(vec![(1, text)])
    }
}

/// Game info for every record in `path`. Records that fail to parse are
/// logged and skipped.
pub fn read_and_parse_file(path: &Path, opts: &ParseOptions) -> io::Result<Vec<GameInfo>> {
    let path_str = path.to_string_lossy();
    let mut infos = Vec::new();
    for (line, game) in read_games(path)? {
        match parse_game_str(&path_str, line, &game, opts) {
            Ok(info) => infos.push(info),
            Err(e) => tracing::warn!(error = %e, "skipping game"),
        }
    }
    Ok(infos)
}

/// Concatenated game info of all `paths`, parsed in parallel and returned
/// in input order. Unreadable files are logged and skipped.
pub fn read_and_parse_all_files(paths: &[PathBuf], opts: &ParseOptions) -> Vec<GameInfo> {
    paths
        .par_iter()
        .map(|path| match read_and_parse_file(path, opts) {
            Ok(infos) => infos,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read game file");
                Vec::new()
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect()
}
