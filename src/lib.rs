pub mod content;
pub mod engine;
pub mod error;
pub mod labels;
pub mod sgf;
