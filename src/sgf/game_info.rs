//! Metadata extraction from adversary-vs-victim game records.

use std::path::Path;

use serde::Serialize;

use crate::error::GameInfoError;
use crate::labels::parse_steps;
use crate::sgf::props::{count, digits_after, digits_between, extract_param, extract_prop, run_after};
use crate::sgf::Color;

pub const DEFAULT_ADVERSARY_SUBSTRINGS: [&str; 1] = ["adv"];
pub const DEFAULT_VICTIM_SUBSTRINGS: [&str; 2] = ["victim", "bot"];

/// How to parse a game record.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Skip the pass counts, which need full scans of the record.
    pub fast_parse: bool,
    /// Victim colour for records whose player names don't identify it.
    pub victim_color: Option<Color>,
    /// Accept records without an identifiable victim.
    pub no_victim_okay: bool,
    pub adversary_substrings: Vec<String>,
    pub victim_substrings: Vec<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            fast_parse: false,
            victim_color: None,
            no_victim_okay: false,
            adversary_substrings: DEFAULT_ADVERSARY_SUBSTRINGS.iter().map(|s| s.to_string()).collect(),
            victim_substrings: DEFAULT_VICTIM_SUBSTRINGS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// One row of `game_infos.csv`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GameInfo {
    pub b_name: Option<String>,
    pub w_name: Option<String>,
    pub b_visits: Option<i64>,
    pub w_visits: Option<i64>,

    pub victim_color: Option<Color>,
    pub victim_name: Option<String>,
    pub victim_visits: i64,
    pub victim_steps: Option<u64>,
    pub victim_rsym: Option<String>,
    pub victim_algo: Option<String>,

    pub adv_color: Option<Color>,
    pub adv_name: Option<String>,
    pub adv_visits: Option<i64>,
    pub adv_steps: Option<u64>,
    pub adv_samples: Option<u64>,
    pub adv_rsym: Option<String>,
    pub adv_algo: Option<String>,

    pub win_color: Option<Color>,
    pub win_name: Option<String>,
    pub lose_name: Option<String>,
    pub adv_win: bool,
    pub komi: Option<f64>,
    pub adv_komi: Option<f64>,
    pub adv_minus_victim_score: Option<f64>,
    pub adv_minus_victim_score_wo_komi: Option<f64>,

    pub train_status: Option<&'static str>,
    pub board_size: Option<String>,
    pub start_turn_idx: Option<i64>,
    pub handicap: Option<u32>,
    pub num_moves: usize,
    pub ko_rule: Option<String>,
    pub score_rule: Option<String>,
    pub tax_rule: Option<String>,
    pub sui_legal: bool,
    pub has_button: bool,
    pub whb: Option<String>,
    pub fpok: bool,
    pub init_turn_num: Option<i64>,
    pub used_initial_position: bool,
    pub gtype: Option<String>,
    pub is_continuation: bool,
    pub is_resignation: bool,

    pub sgf_path: String,
    pub sgf_line: usize,

    pub num_b_pass: Option<usize>,
    pub num_w_pass: Option<usize>,
    pub num_adv_pass: Option<usize>,
    pub num_victim_pass: Option<usize>,
}

/// Victim colour from player names: a side is the victim if its own name
/// contains a victim substring or its opponent's name an adversary one.
/// Ambiguous or unmatched names give `None`.
pub fn detect_victim<S: AsRef<str>>(
    b_name: &str,
    w_name: &str,
    adversary_substrings: &[S],
    victim_substrings: &[S],
) -> Option<Color> {
    let b = b_name.to_lowercase();
    let w = w_name.to_lowercase();
    let has = |name: &str, subs: &[S]| subs.iter().any(|s| name.contains(s.as_ref()));

    let victim_is_black = has(&b, victim_substrings) || has(&w, adversary_substrings);
    let victim_is_white = has(&w, victim_substrings) || has(&b, adversary_substrings);
    match (victim_is_black, victim_is_white) {
        (true, false) => Some(Color::Black),
        (false, true) => Some(Color::White),
        _ => None,
    }
}

/// Outcome encoded in an `RE` value: winner and score, or resignation.
fn parse_result(result: &str) -> Result<(Option<Color>, Option<f64>, bool), GameInfoError> {
    let Some(win_color) = result.chars().next().and_then(Color::from_letter) else {
        return Ok((None, None, false));
    };
    // Manually recorded games can use a space instead of '+'.
    let score_str = match result.rsplit_once('+') {
        Some((_, s)) => s,
        None => result.rsplit(' ').next().unwrap_or(result),
    };
    if score_str == "R" || score_str == "Resign" {
        return Ok((Some(win_color), None, true));
    }
    let score = score_str
        .parse::<f64>()
        .map_err(|_| GameInfoError::ResultScore(result.to_string()))?;
    Ok((Some(win_color), Some(score), false))
}

/// Visits from a `BR`/`WR` value such as `v600` or `v=600,algo=MCTS`;
/// `-1` when the value carries no visit count.
fn visits(meta: Option<&str>) -> Option<i64> {
    let meta = meta?;
    let digits = digits_after("v", meta).or_else(|| digits_after("v=", meta));
    Some(digits.and_then(|d| d.parse().ok()).unwrap_or(-1))
}

/// Step count in a run directory name, e.g. `katago-s123-...` in
/// `models/katago-s123-x/log.sgfs`.
fn kata_dir_steps(path_tail: &str) -> Option<u64> {
    let mut from = 0;
    while let Some(rel) = path_tail[from..].find("kata") {
        let start = from + rel + 4;
        from = start;
        let segment = path_tail[start..].split('_').next().unwrap_or("");
        // At least one character must sit between "kata" and "-s".
        let Some((skip, _)) = segment.char_indices().nth(1) else {
            continue;
        };
        if let Some(steps) = digits_between("-s", &segment[skip..]) {
            return steps.parse().ok();
        }
    }
    None
}

fn train_status(parts: &[String]) -> Option<&'static str> {
    if parts.iter().any(|p| p == "eval") {
        Some("eval")
    } else if parts.iter().any(|p| p == "selfplay") {
        Some("train")
    } else if parts.iter().any(|p| p == "gatekeepersgf") {
        Some("gating")
    } else {
        None
    }
}

/// Parse one game record into a [`GameInfo`].
///
/// `path` and `line` locate the record so the original text can be found
/// again later.
pub fn parse_game_str(
    path: &str,
    line: usize,
    sgf: &str,
    opts: &ParseOptions,
) -> Result<GameInfo, GameInfoError> {
    let rule_str = extract_prop("RU", sgf);
    let comment_str = extract_prop("C", sgf);
    let board_size = extract_prop("SZ", sgf);
    let b_name = extract_prop("PB", sgf);
    let w_name = extract_prop("PW", sgf);
    let komi = extract_prop("KM", sgf).and_then(|k| k.parse::<f64>().ok());

    let (win_color, win_score, is_resignation) = match extract_prop("RE", sgf) {
        Some(result) => parse_result(result)?,
        None => (None, None, false),
    };

    let b_meta = extract_prop("BR", sgf);
    let w_meta = extract_prop("WR", sgf);
    let b_visits = visits(b_meta);
    let w_visits = visits(w_meta);

    let parts: Vec<String> = Path::new(path)
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    let path_tail = parts[parts.len().saturating_sub(3)..].join("/");

    let victim_color = opts.victim_color.or_else(|| {
        detect_victim(
            b_name.unwrap_or(""),
            w_name.unwrap_or(""),
            &opts.adversary_substrings,
            &opts.victim_substrings,
        )
    });
    if victim_color.is_none() && !opts.no_victim_okay {
        return Err(GameInfoError::NoVictim {
            path: path.to_string(),
            line,
        });
    }

    let name_of = |c: Color| match c {
        Color::Black => b_name,
        Color::White => w_name,
    };
    let meta_of = |c: Color| match c {
        Color::Black => b_meta,
        Color::White => w_meta,
    };
    let visits_of = |c: Color| match c {
        Color::Black => b_visits,
        Color::White => w_visits,
    };

    let adv_color = victim_color.map(Color::opponent);
    let victim_name = victim_color.and_then(name_of);
    let adv_name = adv_color.and_then(name_of);
    let victim_rank = victim_color.and_then(meta_of);
    let adv_rank = adv_color.and_then(meta_of);

    let victim_steps = victim_color.map(|_| {
        victim_name
            .and_then(parse_steps)
            .or_else(|| kata_dir_steps(&path_tail))
            .unwrap_or(0)
    });
    let adv_steps = adv_color.map(|_| {
        adv_name
            .and_then(|n| digits_between("-s", n))
            .or_else(|| digits_between("t0-s", &path_tail))
            .and_then(|s| s.parse().ok())
            .unwrap_or(0)
    });
    let adv_samples = adv_color.map(|_| {
        adv_name
            .and_then(|n| digits_after("-d", n))
            .and_then(|s| s.parse().ok())
            .unwrap_or(0)
    });

    let victim_visits = victim_color
        .and_then(visits_of)
        .filter(|v| *v != 0)
        .or_else(|| victim_rank.and_then(|r| r.trim_start_matches('v').parse().ok()))
        .unwrap_or(1);

    let adv_komi = match (adv_color, komi) {
        (Some(Color::White), Some(k)) => Some(k),
        (Some(Color::Black), Some(k)) => Some(-k),
        _ => None,
    };
    let adv_minus_victim_score = match (adv_color, win_score) {
        (Some(adv), Some(score)) => Some(if Some(adv) == win_color { score } else { -score }),
        _ => None,
    };
    let adv_minus_victim_score_wo_komi = adv_minus_victim_score
        .zip(adv_komi)
        .map(|(score, k)| score - k);

    let rule = rule_str.unwrap_or("");
    let upper = |c: char| c.is_ascii_uppercase();
    let whb = if rule.contains("whb") {
        run_after("whb", rule, |c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-')
            .map(str::to_string)
    } else {
        Some("0".to_string())
    };

    let comment = comment_str.unwrap_or("");
    let int_param = |name: &str| extract_param(name, comment).and_then(|v| v.parse::<i64>().ok());

    let mut info = GameInfo {
        b_name: b_name.map(str::to_string),
        w_name: w_name.map(str::to_string),
        b_visits,
        w_visits,

        victim_color,
        victim_name: victim_name.map(str::to_string),
        victim_visits,
        victim_steps,
        victim_rsym: victim_rank.and_then(|r| extract_param("rsym", r)).map(str::to_string),
        victim_algo: victim_rank.and_then(|r| extract_param("algo", r)).map(str::to_string),

        adv_color,
        adv_name: adv_name.map(str::to_string),
        adv_visits: adv_color.and_then(visits_of),
        adv_steps,
        adv_samples,
        adv_rsym: adv_rank.and_then(|r| extract_param("rsym", r)).map(str::to_string),
        adv_algo: adv_rank.and_then(|r| extract_param("algo", r)).map(str::to_string),

        win_color,
        win_name: win_color.and_then(name_of).map(str::to_string),
        lose_name: win_color.map(Color::opponent).and_then(name_of).map(str::to_string),
        adv_win: adv_color.is_some() && adv_color == win_color,
        komi,
        adv_komi,
        adv_minus_victim_score,
        adv_minus_victim_score_wo_komi,

        train_status: train_status(&parts),
        board_size: board_size.map(str::to_string),
        start_turn_idx: int_param("startTurnIdx"),
        handicap: extract_prop("HA", sgf).and_then(|h| h.parse().ok()),
        num_moves: count(";", sgf).saturating_sub(1),
        ko_rule: run_after("ko", rule, upper).map(str::to_string),
        score_rule: run_after("score", rule, upper).map(str::to_string),
        tax_rule: run_after("tax", rule, upper).map(str::to_string),
        sui_legal: digits_after("sui", rule).is_some_and(|d| d.starts_with('1')),
        has_button: rule.contains("button1"),
        whb,
        fpok: rule.contains("fpok"),
        init_turn_num: int_param("initTurnNum"),
        used_initial_position: int_param("usedInitialPosition") == Some(1),
        gtype: extract_param("gtype", comment).map(str::to_string),
        is_continuation: false,
        is_resignation,

        sgf_path: path.to_string(),
        sgf_line: line,

        num_b_pass: None,
        num_w_pass: None,
        num_adv_pass: None,
        num_victim_pass: None,
    };

    if !opts.fast_parse {
        let small_board = board_size
            .and_then(|s| s.parse::<u32>().ok())
            .is_some_and(|s| s <= 19);
        let passes = |c: Color| {
            let empty = count(&format!("{}[]", c.letter()), sgf);
            let tt = if small_board { count(&format!("{}[tt]", c.letter()), sgf) } else { 0 };
            empty + tt
        };
        let num_b_pass = passes(Color::Black);
        let num_w_pass = passes(Color::White);
        let adv_is_black = adv_color == Some(Color::Black);
        info.num_b_pass = Some(num_b_pass);
        info.num_w_pass = Some(num_w_pass);
        info.num_adv_pass = Some(if adv_is_black { num_b_pass } else { num_w_pass });
        info.num_victim_pass = Some(if adv_is_black { num_w_pass } else { num_b_pass });
    }

    Ok(info)
}
