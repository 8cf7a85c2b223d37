//! Display labels and training-step counts parsed out of model and player
//! names such as `kata1-b40c256-s11840935168-d2898845681.bin.gz`.

/// Checkpoints published under a short name instead of a step count.
const NAMED_CHECKPOINTS: [(&str, u64); 3] = [
    ("bot-cp127-v1", 5_303_129_600),
    ("bot-cp505-v2", 11_840_935_168),
    ("bot-cp505-v1", 11_840_935_168),
];

const MODEL_SUFFIXES: [&str; 4] = [".bin.gz", ".txt.gz", ".bin", ".gz"];

/// Training steps encoded in a name.
///
/// Looks for `-s<digits>` optionally followed by `m` (millions), and then by
/// `-`, `.`, or the end of the name. Named checkpoints map to their known
/// step counts.
pub fn parse_steps(name: &str) -> Option<u64> {
    if let Some((_, steps)) = NAMED_CHECKPOINTS.iter().find(|(n, _)| *n == name) {
        return Some(*steps);
    }

    let mut from = 0;
    while let Some(rel) = name[from..].find("-s") {
        let start = from + rel + 2;
        from = from + rel + 1;

        let rest = &name[start..];
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            continue;
        }
        let mut end = digits;
        let millions = rest[end..].starts_with('m');
        if millions {
            end += 1;
        }
        if !matches!(rest[end..].chars().next(), None | Some('-') | Some('.')) {
            continue;
        }
        let Ok(value) = rest[..digits].parse::<u64>() else {
            continue;
        };
        return Some(if millions { value.saturating_mul(1_000_000) } else { value });
    }
    None
}

/// Human-readable step count: `11840935168` -> `11.8B`.
pub fn format_steps(steps: u64) -> String {
    const UNITS: [(u64, &str); 3] = [(1_000_000_000, "B"), (1_000_000, "M"), (1_000, "K")];
    for (scale, unit) in UNITS {
        if steps >= scale {
            let scaled = steps as f64 / scale as f64;
            return if scaled >= 100.0 {
                format!("{:.0}{}", scaled, unit)
            } else {
                format!("{:.1}{}", scaled, unit)
            };
        }
    }
    steps.to_string()
}

/// File name with the checkpoint suffix removed.
pub fn model_stem(file_name: &str) -> &str {
    MODEL_SUFFIXES
        .iter()
        .find_map(|suffix| file_name.strip_suffix(suffix))
        .unwrap_or(file_name)
}

/// Display label for a model file name.
///
/// `kata1-b40c256-s11840935168-d2898845681.bin.gz` -> `b40c256 11.8B`,
/// `cp505.bin.gz` -> `cp505`. Names without recognisable parts keep their
/// stem.
pub fn model_label(file_name: &str) -> String {
    let stem = model_stem(file_name);

    if let Some(cp) = stem
        .split(['-', '_', '.'])
        .find(|t| t.starts_with("cp") && t.len() > 2 && t[2..].bytes().all(|b| b.is_ascii_digit()))
    {
        return cp.to_string();
    }

    let arch = stem.split(['-', '_']).find(|t| is_arch_token(t));
    match (arch, parse_steps(stem)) {
        (Some(arch), Some(steps)) => format!("{} {}", arch, format_steps(steps)),
        (None, Some(steps)) => format_steps(steps),
        _ => stem.to_string(),
    }
}

/// `b<digits>c<digits>`, e.g. `b18c384`.
fn is_arch_token(token: &str) -> bool {
    let Some(rest) = token.strip_prefix('b') else {
        return false;
    };
    let Some((blocks, channels)) = rest.split_once('c') else {
        return false;
    };
    !blocks.is_empty()
        && !channels.is_empty()
        && blocks.bytes().all(|b| b.is_ascii_digit())
        && channels.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_steps() {
        assert_eq!(parse_steps("victim-s1m.bin.gz"), Some(1_000_000));
        assert_eq!(parse_steps("t0-s0-d0"), Some(0));
        assert_eq!(parse_steps("adv-s545065216-d136760487"), Some(545_065_216));
        assert_eq!(parse_steps("kata1-b40c256-s11840935168"), Some(11_840_935_168));
        assert_eq!(parse_steps("bot-cp127-v1"), Some(5_303_129_600));
        assert_eq!(parse_steps("adv-s12x"), None);
        assert_eq!(parse_steps("plain"), None);
    }

    #[test]
    fn test_format_steps() {
        assert_eq!(format_steps(11_840_935_168), "11.8B");
        assert_eq!(format_steps(545_065_216), "545M");
        assert_eq!(format_steps(1_500), "1.5K");
        assert_eq!(format_steps(42), "42");
    }

    #[test]
    fn test_model_label() {
        assert_eq!(
            model_label("kata1-b40c256-s11840935168-d2898845681.bin.gz"),
            "b40c256 11.8B"
        );
        assert_eq!(model_label("cp505.bin.gz"), "cp505");
        assert_eq!(model_label("victim-s1m.bin.gz"), "1.0M");
        assert_eq!(model_label("latest.txt.gz"), "latest");
    }
}
