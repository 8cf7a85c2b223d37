//! Property and parameter lookups on raw SGF text.
//!
//! These scan the record string directly instead of building a tree, which
//! is all the game-info export needs and keeps it fast on large `.sgfs`
//! dumps.

/// First non-empty value of property `name`, e.g. `KM` in `;KM[7.5]`.
///
/// The character before the property name must not be an uppercase letter,
/// so `C` does not match inside `PC[...]`.
pub fn extract_prop<'a>(name: &str, sgf: &'a str) -> Option<&'a str> {
    let needle = format!("{}[", name);
    let mut from = 0;
    while let Some(rel) = sgf[from..].find(&needle) {
        let start = from + rel;
        let value_start = start + needle.len();
        from = value_start;

        let bounded = sgf[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_ascii_uppercase());
        if !bounded {
            continue;
        }
        let value_len = sgf[value_start..].find(']').unwrap_or(sgf.len() - value_start);
        if value_len > 0 {
            return Some(&sgf[value_start..value_start + value_len]);
        }
    }
    None
}

/// Value of a `name=value` parameter embedded in a property such as
/// `C[startTurnIdx=12,gtype=normal]` or `BR[v=600,algo=MCTS]`.
pub fn extract_param<'a>(name: &str, text: &'a str) -> Option<&'a str> {
    let needle = format!("{}=", name);
    run_after(&needle, text, |c| c != ',' && c != ']')
}

/// First non-empty run of characters accepted by `accept` that directly
/// follows an occurrence of `prefix`.
pub fn run_after<'a>(prefix: &str, text: &'a str, accept: impl Fn(char) -> bool) -> Option<&'a str> {
    let mut from = 0;
    while let Some(rel) = text[from..].find(prefix) {
        let start = from + rel + prefix.len();
        let len: usize = text[start..]
            .chars()
            .take_while(|c| accept(*c))
            .map(char::len_utf8)
            .sum();
        if len > 0 {
            return Some(&text[start..start + len]);
        }
        from = from + rel + prefix.len().max(1);
    }
    None
}

/// Digits directly following `prefix`.
pub fn digits_after<'a>(prefix: &str, text: &'a str) -> Option<&'a str> {
    run_after(prefix, text, |c| c.is_ascii_digit())
}

/// Digits following `prefix` that are themselves followed by a `-`,
/// as in `adv-s545065216-d136760487`.
pub fn digits_between<'a>(prefix: &str, text: &'a str) -> Option<&'a str> {
    let mut from = 0;
    while let Some(rel) = text[from..].find(prefix) {
        let start = from + rel + prefix.len();
        let digits = text[start..].bytes().take_while(u8::is_ascii_digit).count();
        if digits > 0 && text[start + digits..].starts_with('-') {
            return Some(&text[start..start + digits]);
        }
        from = from + rel + 1;
    }
    None
}

/// Number of non-overlapping occurrences of `needle` in `text`.
pub fn count(needle: &str, text: &str) -> usize {
    text.matches(needle).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    const GAME: &str = "(;FF[4]GM[1]SZ[19]PB[adv-s545065216-d136760487]PW[bot-cp505-v1]\
        HA[0]KM[6.5]RU[koPOSITIONALscoreAREAtaxNONEsui1button1]RE[B+R]\
        BR[v600]WR[v=4096,rsym=8,algo=MCTS]C[startTurnIdx=12,initTurnNum=3,gtype=normal];B[pd];W[]C[x])";

    #[test]
    fn test_extract_prop() {
        assert_eq!(extract_prop("SZ", GAME), Some("19"));
        assert_eq!(extract_prop("PW", GAME), Some("bot-cp505-v1"));
        assert_eq!(extract_prop("KM", GAME), Some("6.5"));
        assert_eq!(extract_prop("C", GAME), Some("startTurnIdx=12,initTurnNum=3,gtype=normal"));
        assert_eq!(extract_prop("DT", GAME), None);
    }

    #[test]
    fn test_extract_prop_skips_empty_and_embedded() {
        // W[] is empty and the W inside PW must not match.
        assert_eq!(extract_prop("W", "(;PW[x];W[];W[dd])"), Some("dd"));
        assert_eq!(extract_prop("C", "(;PC[home];C[note])"), Some("note"));
    }

    #[test]
    fn test_extract_param() {
        let wr = extract_prop("WR", GAME).unwrap();
        assert_eq!(extract_param("rsym", wr), Some("8"));
        assert_eq!(extract_param("algo", wr), Some("MCTS"));
        assert_eq!(extract_param("v", wr), Some("4096"));
        let c = extract_prop("C", GAME).unwrap();
        assert_eq!(extract_param("gtype", c), Some("normal"));
        assert_eq!(extract_param("usedInitialPosition", c), None);
    }

    #[test]
    fn test_digit_helpers() {
        assert_eq!(digits_after("v", "v600"), Some("600"));
        assert_eq!(digits_after("-d", "adv-s5-d1367"), Some("1367"));
        assert_eq!(digits_between("-s", "adv-s545065216-d136760487"), Some("545065216"));
        assert_eq!(digits_between("-s", "adv-s545065216"), None);
        assert_eq!(run_after("ko", "koPOSITIONALscoreAREA", |c| c.is_ascii_uppercase()), Some("POSITIONAL"));
    }

    #[test]
    fn test_count() {
        assert_eq!(count("B[]", "(;B[];W[aa];B[])"), 2);
        assert_eq!(count(";", "(;B[];W[aa];B[])"), 3);
    }
}
