//! SGF point notation to GTP vertices.

use crate::error::SgfError;

/// GTP column letters; `I` is skipped.
const GTP_COLUMNS: &[u8] = b"ABCDEFGHJKLMNOPQRSTUVWXYZ";

pub const PASS: &str = "pass";

/// Convert an SGF point (`pd`) into a GTP vertex (`Q16`) for a board of
/// `width` x `height`. An empty point, or `tt` on boards up to 19x19, is a
/// pass.
pub fn sgf_to_gtp(point: &str, width: u32, height: u32) -> Result<String, SgfError> {
    if point.is_empty() || (point == "tt" && width <= 19 && height <= 19) {
        return Ok(PASS.to_string());
    }
    let (x, y) = decode_point(point)?;
    if x >= width || y >= height {
        return Err(SgfError::Point(point.to_string()));
    }
    let column = GTP_COLUMNS
        .get(x as usize)
        .ok_or_else(|| SgfError::Point(point.to_string()))?;
    Ok(format!("{}{}", *column as char, height - y))
}

/// Expand a point or a compressed rectangle (`aa:cc`) into single points.
pub fn expand_points(value: &str) -> Result<Vec<String>, SgfError> {
    let Some((from, to)) = value.split_once(':') else {
        return Ok(vec![value.to_string()]);
    };
    let (x0, y0) = decode_point(from)?;
    let (x1, y1) = decode_point(to)?;
    let mut points = Vec::new();
    for y in y0.min(y1)..=y0.max(y1) {
        for x in x0.min(x1)..=x0.max(x1) {
            points.push(encode_point(x, y));
        }
    }
    Ok(points)
}

fn decode_point(point: &str) -> Result<(u32, u32), SgfError> {
    let bytes = point.as_bytes();
    if bytes.len() != 2 {
        return Err(SgfError::Point(point.to_string()));
    }
    let axis = |b: u8| match b {
        b'a'..=b'z' => Ok((b - b'a') as u32),
        b'A'..=b'Z' => Ok((b - b'A') as u32 + 26),
        _ => Err(SgfError::Point(point.to_string())),
    };
    Ok((axis(bytes[0])?, axis(bytes[1])?))
}

fn encode_point(x: u32, y: u32) -> String {
    let axis = |v: u32| {
        if v < 26 {
            (b'a' + v as u8) as char
        } else {
            (b'A' + (v - 26) as u8) as char
        }
    };
    format!("{}{}", axis(x), axis(y))
}
