//! Comparison charts of per-model summaries.

use std::fs;
use std::path::{Path, PathBuf};

use plotters::prelude::*;

use crate::engine::batch::ModelSummary;
use crate::error::{EvalError, Result};

pub const WINRATE_CHART: &str = "winrate.svg";
pub const SCORE_CHART: &str = "score_lead.svg";

const CHART_SIZE: (u32, u32) = (1024, 576);

fn plot_err<E: std::fmt::Display>(e: E) -> EvalError {
    EvalError::Plot(e.to_string())
}

/// Y range covering zero and every value, padded by a tenth of its span.
pub fn value_range(values: &[f64]) -> (f64, f64) {
    let lo = values.iter().cloned().fold(0.0_f64, f64::min);
    let hi = values.iter().cloned().fold(0.0_f64, f64::max);
    if hi - lo < f64::EPSILON {
        return (lo - 1.0, hi + 1.0);
    }
    let pad = (hi - lo) * 0.1;
    (if lo < 0.0 { lo - pad } else { lo }, if hi > 0.0 { hi + pad } else { hi })
}

/// Render the win-rate and score-lead charts into `plots_dir`.
///
/// Writes nothing and returns an empty list when there are no summaries.
pub fn render_charts(summaries: &[ModelSummary], plots_dir: &Path) -> Result<Vec<PathBuf>> {
    if summaries.is_empty() {
        tracing::info!("no results to plot");
        return Ok(Vec::new());
    }
    fs::create_dir_all(plots_dir).map_err(|e| EvalError::io(plots_dir, e))?;

    let labels: Vec<String> = summaries.iter().map(|s| s.label.clone()).collect();
    let winrates: Vec<f64> = summaries.iter().map(|s| s.mean_winrate).collect();
    let scores: Vec<f64> = summaries.iter().map(|s| s.mean_score).collect();

    let winrate_path = plots_dir.join(WINRATE_CHART);
    bar_chart(
        &winrate_path,
        "Mean victim win rate on cyclic positions",
        "win rate",
        &labels,
        &winrates,
        (0.0, 1.0),
    )?;

    let score_path = plots_dir.join(SCORE_CHART);
    bar_chart(
        &score_path,
        "Mean victim score lead on cyclic positions",
        "score lead (points)",
        &labels,
        &scores,
        value_range(&scores),
    )?;

    for path in [&winrate_path, &score_path] {
        tracing::info!(path = %path.display(), "wrote chart");
    }
    Ok(vec![winrate_path, score_path])
}

/// One bar per label.
pub fn bar_chart(
    path: &Path,
    title: &str,
    y_desc: &str,
    labels: &[String],
    values: &[f64],
    (y_min, y_max): (f64, f64),
) -> Result<()> {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(16)
        .x_label_area_size(48)
        .y_label_area_size(64)
        .build_cartesian_2d((0..labels.len()).into_segmented(), y_min..y_max)
        .map_err(plot_err)?;

    let label_of = |v: &SegmentValue<usize>| match v {
        SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
        _ => String::new(),
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len() + 1)
        .x_label_formatter(&label_of)
        .y_desc(y_desc)
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(values.iter().enumerate().map(|(i, v)| {
            let mut bar = Rectangle::new(
                [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), *v)],
                BLUE.mix(0.6).filled(),
            );
            bar.set_margin(0, 0, 12, 12);
            bar
        }))
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(label: &str, mean_winrate: f64, mean_score: f64) -> ModelSummary {
        ModelSummary {
            name: format!("{}.bin.gz", label),
            label: label.into(),
            num_recorded: 2,
            mean_score,
            mean_winrate,
            victim_wins: 1,
        }
    }

    #[test]
    fn test_value_range() {
        assert_eq!(value_range(&[]), (-1.0, 1.0));
        assert_eq!(value_range(&[0.0, 0.0]), (-1.0, 1.0));
        assert_eq!(value_range(&[10.0]), (0.0, 11.0));
        assert_eq!(value_range(&[-10.0, 10.0]), (-12.0, 12.0));
        assert_eq!(value_range(&[-5.0]), (-5.5, 0.0));
    }

    #[test]
    fn test_render_charts_writes_svg() {
        let dir = tempfile::tempdir().unwrap();
        let plots = dir.path().join("plots");
        let paths = render_charts(
            &[summary("cp127", 0.8, 12.0), summary("b40c256 11.8B", 0.3, -7.5)],
            &plots,
        )
        .unwrap();
        assert_eq!(paths, vec![plots.join(WINRATE_CHART), plots.join(SCORE_CHART)]);
        let svg = fs::read_to_string(&paths[0]).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Mean victim win rate"));
    }

    #[test]
    fn test_render_charts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let plots = dir.path().join("plots");
        assert!(render_charts(&[], &plots).unwrap().is_empty());
        assert!(!plots.exists());
    }
}
