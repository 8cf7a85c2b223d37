use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cyclic_eval::engine::batch::run_batch;
use cyclic_eval::engine::config::{load_config, load_default_config, Perspective};
use cyclic_eval::engine::corpus::{discover_models, load_positions};
use cyclic_eval::engine::katago::KataGoLauncher;
use cyclic_eval::engine::plot::render_charts;
use cyclic_eval::sgf::Color;

#[derive(Parser)]
#[command(
    name = "cyclic-eval",
    about = "Evaluate engine checkpoints on cyclic positions and plot the results"
)]
struct Cli {
    /// Path to eval_config.toml (default: auto-discover)
    #[arg(long, env = "CYCLIC_EVAL_CONFIG")]
    config: Option<PathBuf>,

    /// Engine executable
    #[arg(long, env = "CYCLIC_EVAL_ENGINE")]
    engine: Option<PathBuf>,

    /// Engine analysis config file
    #[arg(long, env = "CYCLIC_EVAL_ENGINE_CONFIG")]
    engine_config: Option<PathBuf>,

    /// Directory of model checkpoints
    #[arg(long, env = "CYCLIC_EVAL_MODELS_DIR")]
    models_dir: Option<PathBuf>,

    /// Directory of position files (.sgf / .sgfs)
    #[arg(long, env = "CYCLIC_EVAL_POSITIONS_DIR")]
    positions_dir: Option<PathBuf>,

    /// Output directory for charts
    #[arg(long, env = "CYCLIC_EVAL_PLOTS_DIR")]
    plots_dir: Option<PathBuf>,

    /// Visits per query
    #[arg(long)]
    max_visits: Option<u32>,

    /// Victim colour for positions whose player names don't identify it: b or w
    #[arg(long)]
    victim_color: Option<String>,

    /// Perspective the engine reports results from: black, white or side_to_move
    #[arg(long)]
    perspective: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => load_default_config(),
    };

    // CLI overrides on top of the config file
    if let Some(v) = cli.max_visits { config.analysis.max_visits = Some(v); }
    if let Some(v) = &cli.victim_color {
        let color = v
            .chars()
            .next()
            .and_then(Color::from_letter)
            .ok_or_else(|| format!("invalid victim colour '{}', expected b or w", v))?;
        config.analysis.victim_color = Some(color);
    }
    if let Some(v) = &cli.perspective {
        config.analysis.winrate_perspective = match v.as_str() {
            "black" => Perspective::Black,
            "white" => Perspective::White,
            "side_to_move" => Perspective::SideToMove,
            other => return Err(format!("invalid perspective '{}'", other).into()),
        };
    }

    let paths = config.paths.clone();
    let engine = cli.engine.or(paths.engine).ok_or("no engine given (--engine or [paths] engine)")?;
    let models_dir = cli
        .models_dir
        .or(paths.models_dir)
        .ok_or("no models directory given (--models-dir or [paths] models_dir)")?;
    let positions_dir = cli
        .positions_dir
        .or(paths.positions_dir)
        .ok_or("no positions directory given (--positions-dir or [paths] positions_dir)")?;
    let plots_dir = cli.plots_dir.or(paths.plots_dir).unwrap_or_else(|| PathBuf::from("plots"));

    let models = discover_models(&models_dir, &config.engine.model_extensions)?;
    let positions = load_positions(&positions_dir, config.analysis.victim_color)?;
    tracing::info!(
        models = models.len(),
        positions = positions.len(),
        engine = %engine.display(),
        "starting batch evaluation"
    );

    let launcher = KataGoLauncher {
        engine,
        config: cli.engine_config.or(paths.engine_config),
        extra_args: config.engine.extra_args.clone(),
        show_stderr: config.engine.show_stderr,
    };

    let total = models.len();
    let progress_cb = move |done: usize, _total: usize| {
        eprint!("\r  [{}/{}] models evaluated", done, total);
    };

    let result = run_batch(&launcher, &models, &positions, &config.analysis, Some(&progress_cb));

    eprintln!("\r                                    "); // clear progress line
    println!("{}", result.summary());

    let written = render_charts(&result.summaries(), &plots_dir)?;
    for path in written {
        println!("  chart: {}", path.display());
    }

    Ok(())
}
