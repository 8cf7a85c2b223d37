//! Evaluation config: engine and corpus paths plus analysis settings.
//! Loaded from TOML; every path can be overridden on the command line.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{EvalError, Result};
use crate::sgf::Color;

pub const DEFAULT_RULES: &str = "tromp-taylor";
pub const DEFAULT_MODEL_EXTENSIONS: [&str; 3] = [".bin.gz", ".txt.gz", ".bin"];

/// Side the engine reports win rates and score leads for.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Perspective {
    #[default]
    Black,
    White,
    SideToMove,
}

/// Locations of the engine and the corpus. All optional in the file.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct PathsConfig {
    pub engine: Option<PathBuf>,
    pub engine_config: Option<PathBuf>,
    pub models_dir: Option<PathBuf>,
    pub positions_dir: Option<PathBuf>,
    pub plots_dir: Option<PathBuf>,
}

/// How the engine process is started.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngineConfig {
    /// Appended after `analysis -model <path> -config <cfg>`.
    pub extra_args: Vec<String>,
    /// File name suffixes that mark checkpoints in the models directory.
    pub model_extensions: Vec<String>,
    /// Pass the engine's stderr through instead of discarding it.
    pub show_stderr: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            extra_args: Vec::new(),
            model_extensions: DEFAULT_MODEL_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            show_stderr: false,
        }
    }
}

/// Per-query analysis settings.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AnalysisSettings {
    pub max_visits: Option<u32>,
    /// Rules for records without an `RU` property.
    pub rules: String,
    /// Overrides the records' komi when set.
    pub komi: Option<f64>,
    pub winrate_perspective: Perspective,
    /// Victim for records whose player names don't identify one.
    pub victim_color: Option<Color>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            max_visits: None,
            rules: DEFAULT_RULES.to_string(),
            komi: None,
            winrate_perspective: Perspective::default(),
            victim_color: None,
        }
    }
}

/// Top-level TOML file structure.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct EvalConfig {
    pub paths: PathsConfig,
    pub engine: EngineConfig,
    pub analysis: AnalysisSettings,
}

/// Load the config file at `path`.
pub fn load_config(path: &Path) -> Result<EvalConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| EvalError::io(path, e))?;
    toml::from_str(&content).map_err(|source| EvalError::Config {
        path: path.to_path_buf(),
        source,
    })
}

/// Try well-known locations, returning defaults if no file is found.
pub fn load_default_config() -> EvalConfig {
    let candidates = ["eval_config.toml", "../eval_config.toml"];
    for path in &candidates {
        let p = Path::new(path);
        if p.exists() {
            match load_config(p) {
                Ok(config) => {
                    tracing::info!(path = %p.display(), "loaded eval config");
                    return config;
                }
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "failed to load eval config");
                }
            }
        }
    }
    tracing::info!("no eval_config.toml found, using built-in defaults");
    EvalConfig::default()
}
