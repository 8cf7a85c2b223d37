//! Helpers for publishing game records in the web viewer.

use std::fs;
use std::io;
use std::path::Path;

use crate::sgf::game_info::{parse_game_str, ParseOptions};
use crate::sgf::Color;

pub const VIEWER_URL: &str = "https://humancompatibleai.github.io/sgf-viewer/#sgf=";

/// Byte ranges of every `NAME[...]` property in `text`, values included.
/// Adjacent extra values (`AB[aa][bb]`) belong to the same property.
fn prop_spans(text: &str, name: &str) -> Vec<(usize, usize)> {
    let needle = format!("{}[", name);
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut from = 0;

    while let Some(rel) = text[from..].find(&needle) {
        let start = from + rel;
        if start > 0 && bytes[start - 1].is_ascii_uppercase() {
            from = start + 1;
            continue;
        }
        let mut end = start + name.len();
        while end < bytes.len() && bytes[end] == b'[' {
            end += 1;
            while end < bytes.len() && bytes[end] != b']' {
                if bytes[end] == b'\\' {
                    end += 1;
                }
                end += 1;
            }
            end = (end + 1).min(bytes.len());
        }
        spans.push((start, end));
        from = end;
    }
    spans
}

/// `text` with every `name` property removed.
pub fn strip_prop(text: &str, name: &str) -> String {
    replace_prop(text, name, None)
}

/// `text` with every `name` property replaced by `name[value]`, or removed
/// when `value` is `None`.
pub fn replace_prop(text: &str, name: &str, value: Option<&str>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (start, end) in prop_spans(text, name) {
        out.push_str(&text[last..start]);
        if let Some(v) = value {
            out.push_str(&format!("{}[{}]", name, v));
        }
        last = end;
    }
    out.push_str(&text[last..]);
    out
}

/// Drop all comments, which make viewer links needlessly long.
pub fn minimize_game_str(game: &str) -> String {
    strip_prop(game, "C")
}

/// Viewer link for a game record.
pub fn viz_link(game: &str, minimize: bool) -> String {
    let game = if minimize {
        minimize_game_str(game)
    } else {
        game.to_string()
    };
    format!("{}{}", VIEWER_URL, game.trim())
}

/// The record on 1-based `line_num` of `path`, if the file is that long.
pub fn get_game_str(path: &Path, line_num: usize) -> io::Result<Option<String>> {
    let text = fs::read_to_string(path)?;
    Ok(line_num
        .checked_sub(1)
        .and_then(|i| text.lines().nth(i))
        .map(str::to_string))
}

/// Strip engine metadata and comments and rename the players to `Victim`
/// and `Adversary`.
pub fn anonymize(game: &str, victim: Color) -> String {
    let (b_name, w_name) = match victim {
        Color::Black => ("Victim", "Adversary"),
        Color::White => ("Adversary", "Victim"),
    };
    let mut text = strip_prop(game, "BR");
    text = strip_prop(&text, "WR");
    text = strip_prop(&text, "C");
    text = replace_prop(&text, "PB", Some(b_name));
    replace_prop(&text, "PW", Some(w_name))
}

/// Anonymise every game in `path` that has an identifiable victim,
/// rewriting the file in place. Returns the number of games rewritten.
///
/// A `.sgfs` file keeps its line layout, blank lines included, so line
/// numbers recorded in `game_infos.csv` stay valid.
pub fn anonymize_file(path: &Path, opts: &ParseOptions) -> io::Result<usize> {
    let text = fs::read_to_string(path)?;
    let path_str = path.to_string_lossy();
    let mut rewritten = 0;
    let mut rewrite = |line: usize, game: &str| match parse_game_str(&path_str, line, game.trim(), opts) {
        Ok(info) => match info.victim_color {
            Some(victim) => {
                rewritten += 1;
                anonymize(game, victim)
            }
            None => game.to_string(),
        },
        Err(_) => game.to_string(),
    };

    let mut out = if path.extension().is_some_and(|e| e == "sgfs") {
        text.lines()
            .enumerate()
            .map(|(i, line)| if line.trim().is_empty() { line.to_string() } else { rewrite(i + 1, line) })
            .collect::<Vec<_>>()
            .join("\n")
    } else if text.trim().is_empty() {
        text.clone()
    } else {
        rewrite(1, text.trim_end())
    };
    if text.ends_with('\n') && !out.ends_with('\n') {
        out.push('\n');
    }

    fs::write(path, out)?;
    Ok(rewritten)
}
