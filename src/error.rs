use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvalError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to start engine {engine}: {source}")]
    Spawn {
        engine: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Engine pipe error: {0}")]
    Pipe(#[from] std::io::Error),

    #[error("Engine exited before answering query {0}")]
    EngineExited(String),

    #[error("Failed to encode query: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Plot error: {0}")]
    Plot(String),
}

impl EvalError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EvalError::Io {
            path: path.into(),
            source,
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum SgfError {
    #[error("SGF record must start with '(;'")]
    MissingRoot,

    #[error("Unterminated property value at byte {0}")]
    UnterminatedValue(usize),

    #[error("Unexpected character {ch:?} at byte {offset}")]
    Unexpected { ch: char, offset: usize },

    #[error("Invalid board size {0:?}")]
    BoardSize(String),

    #[error("Invalid point {0:?}")]
    Point(String),
}

#[derive(Error, Debug, PartialEq)]
pub enum GameInfoError {
    #[error("Game doesn't have victim: path={path}, line_number={line}")]
    NoVictim { path: String, line: usize },

    #[error("Unparseable result score {0:?}")]
    ResultScore(String),
}

pub type Result<T> = std::result::Result<T, EvalError>;
