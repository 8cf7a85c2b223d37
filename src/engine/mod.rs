pub mod batch;
pub mod config;
pub mod corpus;
pub mod evaluator;
pub mod katago;
pub mod models;
pub mod plot;
