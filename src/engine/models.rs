//! Core evaluation data types: models, positions, engine queries and
//! outcomes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::config::AnalysisSettings;
use crate::error::SgfError;
use crate::labels;
use crate::sgf::coords::{expand_points, sgf_to_gtp};
use crate::sgf::game_info::{detect_victim, DEFAULT_ADVERSARY_SUBSTRINGS, DEFAULT_VICTIM_SUBSTRINGS};
use crate::sgf::parse::main_line;
use crate::sgf::Color;

/// A network checkpoint passed to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub path: PathBuf,
    /// File name; identifies the model.
    pub name: String,
    pub label: String,
}

impl Model {
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            path: path.to_path_buf(),
            label: labels::model_label(&name),
            name,
        }
    }
}

/// A fixed board state loaded from a game record.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub komi: Option<f64>,
    pub rules: Option<String>,
    /// Setup stones as (colour, GTP vertex).
    pub initial_stones: Vec<(Color, String)>,
    /// Main-line moves as (colour, GTP vertex or `pass`).
    pub moves: Vec<(Color, String)>,
    pub initial_player: Option<Color>,
    /// Side whose perspective results are reported from.
    pub victim: Option<Color>,
}

fn parse_size(value: &str) -> Result<(u32, u32), SgfError> {
    let bad = || SgfError::BoardSize(value.to_string());
    let (w, h) = match value.split_once(':') {
        Some((w, h)) => (w.trim(), h.trim()),
        None => (value.trim(), value.trim()),
    };
    let w = w.parse::<u32>().map_err(|_| bad())?;
    let h = h.parse::<u32>().map_err(|_| bad())?;
    if w == 0 || h == 0 {
        return Err(bad());
    }
    Ok((w, h))
}

impl Position {
    /// Build a position from an SGF record. The victim is detected from the
    /// player names and falls back to `default_victim`.
    pub fn from_sgf(name: &str, text: &str, default_victim: Option<Color>) -> Result<Self, SgfError> {
        let nodes = main_line(text)?;
        let root = nodes.first().cloned().unwrap_or_default();

        let (width, height) = match root.get("SZ") {
            Some(sz) => parse_size(sz)?,
            None => (19, 19),
        };

        let mut initial_stones = Vec::new();
        for (ident, color) in [("AB", Color::Black), ("AW", Color::White)] {
            for value in root.values(ident) {
                for point in expand_points(value)? {
                    initial_stones.push((color, sgf_to_gtp(&point, width, height)?));
                }
            }
        }

        let mut moves = Vec::new();
        for node in &nodes {
            for color in [Color::Black, Color::White] {
                if let Some(point) = node.get(color.letter()) {
                    moves.push((color, sgf_to_gtp(point, width, height)?));
                }
            }
        }

        let victim = detect_victim(
            root.get("PB").unwrap_or(""),
            root.get("PW").unwrap_or(""),
            &DEFAULT_ADVERSARY_SUBSTRINGS,
            &DEFAULT_VICTIM_SUBSTRINGS,
        )
        .or(default_victim);

        Ok(Self {
            name: name.to_string(),
            width,
            height,
            komi: root.get("KM").and_then(|k| k.trim().parse().ok()),
            rules: root.get("RU").filter(|r| !r.is_empty()).map(str::to_string),
            initial_stones,
            moves,
            initial_player: root
                .get("PL")
                .and_then(|p| p.chars().next())
                .and_then(Color::from_letter),
            victim,
        })
    }

    /// Analysis query for this position. Configured komi overrides the
    /// record's; the record's rules override the configured default.
    pub fn to_query(&self, id: &str, settings: &AnalysisSettings) -> AnalysisQuery {
        let vertex = |(c, v): &(Color, String)| (c.letter().to_string(), v.clone());
        AnalysisQuery {
            id: id.to_string(),
            moves: self.moves.iter().map(vertex).collect(),
            initial_stones: self.initial_stones.iter().map(vertex).collect(),
            rules: self.rules.clone().unwrap_or_else(|| settings.rules.clone()),
            komi: settings.komi.or(self.komi),
            board_x_size: self.width,
            board_y_size: self.height,
            initial_player: self.initial_player.map(|c| c.letter().to_string()),
            max_visits: settings.max_visits,
        }
    }
}

/// One line of input for the engine's JSON analysis protocol.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisQuery {
    pub id: String,
    pub moves: Vec<(String, String)>,
    pub initial_stones: Vec<(String, String)>,
    pub rules: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub komi: Option<f64>,
    pub board_x_size: u32,
    pub board_y_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_player: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_visits: Option<u32>,
}

/// Engine verdict on one position, from the victim's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineOutcome {
    pub winrate: f64,
    pub score_lead: f64,
    pub visits: u64,
}

/// Outcome for one (model, position) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Model file name.
    pub model: String,
    pub position: String,
    pub outcome: EngineOutcome,
}
