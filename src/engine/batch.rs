//! Batch evaluation: every model against every position.

use std::time::Instant;

use crate::engine::config::AnalysisSettings;
use crate::engine::evaluator::{parse_response, response_error};
use crate::engine::katago::EngineLauncher;
use crate::engine::models::*;

/// Per-model aggregate used for reporting and plotting.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSummary {
    /// Model file name.
    pub name: String,
    pub label: String,
    pub num_recorded: usize,
    pub mean_score: f64,
    pub mean_winrate: f64,
    /// Positions where the victim's win rate is above one half.
    pub victim_wins: usize,
}

/// Aggregated results from a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchResults {
    /// Models in evaluation order.
    pub models: Vec<Model>,
    pub num_positions: usize,
    pub attempts: usize,
    pub skipped: usize,
    pub records: Vec<Evaluation>,
    pub model_durations_ms: Vec<f64>,
}

impl BatchResults {
    /// Outcomes recorded for the model with file name `model`.
    fn outcomes<'a>(&'a self, model: &'a str) -> impl Iterator<Item = &'a EngineOutcome> + 'a {
        self.records
            .iter()
            .filter(move |r| r.model == model)
            .map(|r| &r.outcome)
    }

    pub fn scores(&self, model: &str) -> Vec<f64> {
        self.outcomes(model).map(|o| o.score_lead).collect()
    }

    pub fn winrates(&self, model: &str) -> Vec<f64> {
        self.outcomes(model).map(|o| o.winrate).collect()
    }

    pub fn mean_score(&self, model: &str) -> f64 {
        mean(&self.scores(model))
    }

    pub fn mean_winrate(&self, model: &str) -> f64 {
        mean(&self.winrates(model))
    }

    pub fn score_stddev(&self, model: &str) -> f64 {
        let scores = self.scores(model);
        match scores.len() {
            0 | 1 => 0.0,
            n => {
                let avg = mean(&scores);
                let sum_sq: f64 = scores.iter().map(|s| (s - avg) * (s - avg)).sum();
                (sum_sq / (n - 1) as f64).sqrt()
            }
        }
    }

    pub fn victim_wins(&self, model: &str) -> usize {
        self.outcomes(model).filter(|o| o.winrate > 0.5).count()
    }

    /// Fraction of recorded positions the victim is judged to win.
    pub fn win_rate(&self, model: &str) -> f64 {
        let n = self.outcomes(model).count();
        self.victim_wins(model) as f64 / n.max(1) as f64
    }

    /// Wilson score 95% interval on [`Self::win_rate`], each recorded
    /// position counted as one independent trial. Bounds are clamped to
    /// [0, 1]; no records gives (0, 0).
    pub fn confidence_interval_95(&self, model: &str) -> (f64, f64) {
        let n = self.outcomes(model).count();
        if n == 0 {
            return (0.0, 0.0);
        }
        let (n, p) = (n as f64, self.win_rate(model));
        let z2 = 1.96_f64.powi(2);
        let denom = 1.0 + z2 / n;
        let center = (p + z2 / (2.0 * n)) / denom;
        let half_width = (z2 * (p * (1.0 - p) / n + z2 / (4.0 * n * n))).sqrt() / denom;
        ((center - half_width).max(0.0), (center + half_width).min(1.0))
    }

    /// One summary per model with at least one recorded outcome, in
    /// evaluation order.
    pub fn summaries(&self) -> Vec<ModelSummary> {
        self.models
            .iter()
            .filter_map(|model| {
                let name = model.name.as_str();
                let num_recorded = self.outcomes(name).count();
                (num_recorded > 0).then(|| ModelSummary {
                    name: model.name.clone(),
                    label: model.label.clone(),
                    num_recorded,
                    mean_score: self.mean_score(name),
                    mean_winrate: self.mean_winrate(name),
                    victim_wins: self.victim_wins(name),
                })
            })
            .collect()
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![format!(
            "Batch Results ({} models x {} positions, {} skipped of {})",
            self.models.len(),
            self.num_positions,
            self.skipped,
            self.attempts
        )];
        lines.push("=".repeat(78));
        for model in &self.models {
            let (name, label) = (model.name.as_str(), &model.label);
            let n = self.outcomes(name).count();
            if n == 0 {
                lines.push(format!("  {:>20}: no results", label));
                continue;
            }
            let (ci_lo, ci_hi) = self.confidence_interval_95(name);
            lines.push(format!(
                "  {:>20}: winrate={:5.3}  score={:6.1} +/- {:4.1}  wins={:3}/{:<3} [95% CI: {:.1}%-{:.1}%]",
                label,
                self.mean_winrate(name),
                self.mean_score(name),
                self.score_stddev(name),
                self.victim_wins(name),
                n,
                ci_lo * 100.0,
                ci_hi * 100.0,
            ));
        }
        if !self.model_durations_ms.is_empty() {
            let total_s = self.model_durations_ms.iter().sum::<f64>() / 1000.0;
            let avg_s = total_s / self.model_durations_ms.len() as f64;
            lines.push(format!("  Avg model: {:.1}s  |  Total: {:.1}s", avg_s, total_s));
        }
        lines.join("\n")
    }
}

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Evaluate every model against every position, one engine process per
/// model and one query per pair. Failures skip the affected pairs.
pub fn run_batch(
    launcher: &dyn EngineLauncher,
    models: &[Model],
    positions: &[Position],
    settings: &AnalysisSettings,
    progress_callback: Option<&dyn Fn(usize, usize)>,
) -> BatchResults {
    let mut result = BatchResults {
        models: models.to_vec(),
        num_positions: positions.len(),
        ..Default::default()
    };

    if positions.is_empty() {
        tracing::info!("no positions to evaluate");
        return result;
    }

    for (model_idx, model) in models.iter().enumerate() {
        let t0 = Instant::now();
        tracing::info!(model = %model.label, file = %model.name, "evaluating model");

        let mut session = match launcher.launch(model) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(model = %model.label, error = %e, "failed to launch engine, skipping model");
                result.attempts += positions.len();
                result.skipped += positions.len();
                result.model_durations_ms.push(t0.elapsed().as_secs_f64() * 1000.0);
                if let Some(cb) = progress_callback {
                    cb(model_idx + 1, models.len());
                }
                continue;
            }
        };

        for (pos_idx, position) in positions.iter().enumerate() {
            let id = format!("{}-{}", model_idx, pos_idx);
            let query = position.to_query(&id, settings);
            result.attempts += 1;

            let line = match session.query(&query) {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!(model = %model.label, position = %position.name, error = %e, "query failed");
                    result.skipped += 1;
                    continue;
                }
            };

            match parse_response(&line, &id, settings.winrate_perspective, position.victim) {
                Some(outcome) => {
                    tracing::debug!(
                        model = %model.label,
                        position = %position.name,
                        winrate = outcome.winrate,
                        score_lead = outcome.score_lead,
                        "recorded outcome"
                    );
                    result.records.push(Evaluation {
                        model: model.name.clone(),
                        position: position.name.clone(),
                        outcome,
                    });
                }
                None => {
                    tracing::warn!(
                        model = %model.label,
                        position = %position.name,
                        engine_error = ?response_error(&line),
                        "malformed engine response, skipping"
                    );
                    result.skipped += 1;
                }
            }
        }

        if let Err(e) = session.shutdown() {
            tracing::warn!(model = %model.label, error = %e, "engine shutdown failed");
        }

        let elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0;
        result.model_durations_ms.push(elapsed_ms);
        tracing::info!(
            model = %model.label,
            recorded = result.scores(&model.name).len(),
            mean_score = result.mean_score(&model.name),
            elapsed_ms,
            "model done"
        );

        if let Some(cb) = progress_callback {
            cb(model_idx + 1, models.len());
        }
    }

    result
}
