//! Game-record tools: game-info export, anonymisation and viewer links.
//!
//! Usage:
//!   cargo run --release --bin sgf_tools -- infos games/ --fast
//!   cargo run --release --bin sgf_tools -- infos games/ --anonymize
//!   cargo run --release --bin sgf_tools -- link games/eval/run.sgfs 12

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cyclic_eval::sgf::game_info::{ParseOptions, DEFAULT_ADVERSARY_SUBSTRINGS, DEFAULT_VICTIM_SUBSTRINGS};
use cyclic_eval::sgf::viewer::{anonymize_file, get_game_str, viz_link};
use cyclic_eval::sgf::{find_sgf_files, read_and_parse_all_files, Color, DEFAULT_MAX_SCAN};

#[derive(Parser)]
#[command(name = "sgf_tools", about = "Extract, anonymise and link adversary game records")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse every game under a directory and write game_infos.csv
    Infos {
        /// Directory to scan recursively
        root: PathBuf,

        /// Output CSV (default: <root>/game_infos.csv)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Skip the slower pass counts
        #[arg(long)]
        fast: bool,

        /// Keep games without an identifiable victim
        #[arg(long)]
        no_victim_okay: bool,

        /// Victim colour when player names don't identify it: b or w
        #[arg(long)]
        victim_color: Option<String>,

        /// Substring marking the adversary's name (repeatable)
        #[arg(long = "adversary-substring")]
        adversary_substrings: Vec<String>,

        /// Substring marking the victim's name (repeatable)
        #[arg(long = "victim-substring")]
        victim_substrings: Vec<String>,

        /// Maximum number of directories to scan
        #[arg(long, default_value_t = DEFAULT_MAX_SCAN)]
        max_scan: usize,

        /// Rewrite the records in place with engine metadata, comments and
        /// player names removed
        #[arg(long)]
        anonymize: bool,
    },

    /// Print a viewer link for one game
    Link {
        path: PathBuf,

        /// 1-based line number of the game in the file
        line: usize,

        /// Keep comments in the linked record
        #[arg(long)]
        keep_comments: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Infos {
            root,
            out,
            fast,
            no_victim_okay,
            victim_color,
            adversary_substrings,
            victim_substrings,
            max_scan,
            anonymize,
        } => {
            let victim_color = match victim_color {
                Some(v) => Some(
                    v.chars()
                        .next()
                        .and_then(Color::from_letter)
                        .ok_or_else(|| format!("invalid victim colour '{}', expected b or w", v))?,
                ),
                None => None,
            };
            let opts = ParseOptions {
                fast_parse: fast,
                victim_color,
                no_victim_okay,
                adversary_substrings: if adversary_substrings.is_empty() {
                    DEFAULT_ADVERSARY_SUBSTRINGS.iter().map(|s| s.to_string()).collect()
                } else {
                    adversary_substrings
                },
                victim_substrings: if victim_substrings.is_empty() {
                    DEFAULT_VICTIM_SUBSTRINGS.iter().map(|s| s.to_string()).collect()
                } else {
                    victim_substrings
                },
            };

            let paths = find_sgf_files(&root, max_scan);
            let infos = read_and_parse_all_files(&paths, &opts);
            tracing::info!(files = paths.len(), games = infos.len(), "parsed game records");

            if !infos.is_empty() {
                let out = out.unwrap_or_else(|| root.join("game_infos.csv"));
                let mut writer = csv::Writer::from_path(&out)?;
                for info in &infos {
                    writer.serialize(info)?;
                }
                writer.flush()?;
                println!("wrote {} rows to {}", infos.len(), out.display());
            }

            if anonymize {
                let mut total = 0;
                for path in &paths {
                    total += anonymize_file(path, &opts)?;
                }
                println!("anonymized {} games in {} files", total, paths.len());
            }
        }
        Command::Link { path, line, keep_comments } => {
            let game = get_game_str(&path, line)?
                .ok_or_else(|| format!("could not find game at {}:{}", path.display(), line))?;
            println!("{}", viz_link(&game, !keep_comments));
        }
    }

    Ok(())
}
