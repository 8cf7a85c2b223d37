//! Parsing engine responses into outcomes.

use crate::engine::config::Perspective;
use crate::engine::models::EngineOutcome;
use crate::sgf::Color;

/// Whether a response line is a `{"warning": ...}` notice rather than an
/// answer to a query.
pub fn is_warning(line: &str) -> bool {
    match serde_json::from_str::<serde_json::Value>(line) {
        Ok(v) => v.get("warning").is_some() && v.get("rootInfo").is_none(),
        Err(_) => false,
    }
}

/// The `error` message of a response, if it carries one.
pub fn response_error(line: &str) -> Option<String> {
    let v: serde_json::Value = serde_json::from_str(line).ok()?;
    v.get("error").map(|e| match e.as_str() {
        Some(s) => s.to_string(),
        None => e.to_string(),
    })
}

/// The `id` a response line answers, if it is JSON and carries one.
pub fn response_id(line: &str) -> Option<String> {
    let v: serde_json::Value = serde_json::from_str(line).ok()?;
    v.get("id")?.as_str().map(str::to_string)
}

/// Parse the answer to query `id`.
///
/// Returns `None` unless the line is a JSON object with a matching `id` and
/// numeric `rootInfo.winrate` / `rootInfo.scoreLead`. Values are converted
/// from the engine's reporting `perspective` to the victim's (Black when
/// the victim is unknown).
pub fn parse_response(
    line: &str,
    id: &str,
    perspective: Perspective,
    victim: Option<Color>,
) -> Option<EngineOutcome> {
    let v: serde_json::Value = serde_json::from_str(line).ok()?;
    if v.get("error").is_some() || v["id"].as_str() != Some(id) {
        return None;
    }

    let root = &v["rootInfo"];
    let winrate = root["winrate"].as_f64()?;
    let score_lead = root["scoreLead"].as_f64()?;
    let visits = root["visits"].as_u64().unwrap_or(0);

    let reported_for = match perspective {
        Perspective::Black => Color::Black,
        Perspective::White => Color::White,
        Perspective::SideToMove => root["currentPlayer"]
            .as_str()
            .and_then(|p| p.chars().next())
            .and_then(Color::from_letter)?,
    };
    let target = victim.unwrap_or(Color::Black);

    let (winrate, score_lead) = if reported_for == target {
        (winrate, score_lead)
    } else {
        (1.0 - winrate, -score_lead)
    };

    Some(EngineOutcome {
        winrate,
        score_lead,
        visits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"{"id":"0-1","isDuringSearch":false,"turnNumber":42,"moveInfos":[],"rootInfo":{"currentPlayer":"W","scoreLead":-3.5,"visits":800,"winrate":0.25}}"#;

    #[test]
    fn test_parse_black_perspective() {
        let outcome = parse_response(RESPONSE, "0-1", Perspective::Black, Some(Color::Black)).unwrap();
        assert_eq!(outcome, EngineOutcome { winrate: 0.25, score_lead: -3.5, visits: 800 });

        // Victim is White: flip.
        let outcome = parse_response(RESPONSE, "0-1", Perspective::Black, Some(Color::White)).unwrap();
        assert_eq!(outcome.winrate, 0.75);
        assert_eq!(outcome.score_lead, 3.5);
    }

    #[test]
    fn test_parse_side_to_move_perspective() {
        // Reported for White (to move); victim White keeps the values.
        let outcome = parse_response(RESPONSE, "0-1", Perspective::SideToMove, Some(Color::White)).unwrap();
        assert_eq!(outcome.winrate, 0.25);
        let outcome = parse_response(RESPONSE, "0-1", Perspective::SideToMove, None).unwrap();
        assert_eq!(outcome.score_lead, 3.5);
    }

    #[test]
    fn test_malformed_responses() {
        assert_eq!(parse_response("garbage", "0-1", Perspective::Black, None), None);
        assert_eq!(parse_response(RESPONSE, "0-2", Perspective::Black, None), None);
        assert_eq!(
            parse_response(r#"{"id":"0-1","rootInfo":{"winrate":"high"}}"#, "0-1", Perspective::Black, None),
            None
        );
        let err = r#"{"id":"0-1","error":"Could not parse rules","field":"rules"}"#;
        assert_eq!(parse_response(err, "0-1", Perspective::Black, None), None);
        assert_eq!(response_error(err).as_deref(), Some("Could not parse rules"));
    }

    #[test]
    fn test_response_id() {
        assert_eq!(response_id(RESPONSE).as_deref(), Some("0-1"));
        assert_eq!(response_id(r#"{"id":7}"#), None);
        assert_eq!(response_id("stray diagnostic line"), None);
    }

    #[test]
    fn test_is_warning() {
        assert!(is_warning(r#"{"id":"0-1","warning":"Unexpected field","field":"foo"}"#));
        assert!(!is_warning(RESPONSE));
        assert!(!is_warning("not json"));
    }
}
