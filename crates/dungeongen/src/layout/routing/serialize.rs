use crate::layout::geometry::Coordinate;

/// Serialize a path to its compact text form.
///
/// Format: `(1,1)-(2,1)-(2,2)`. Negative components keep their sign inside the
/// parentheses, e.g. `(-1,0)-(0,0)`.
pub fn path_to_string(points: &[Coordinate]) -> String {
    points
        .iter()
        .map(Coordinate::to_string)
        .collect::<Vec<_>>()
        .join("-")
}

/// Parse a path from its compact text form.
///
/// Returns `None` if the string is malformed or holds fewer than two points.
pub fn string_to_path(s: &str) -> Option<Vec<Coordinate>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let tokens = tokenize(s)?;
    let points = tokens
        .iter()
        .map(|t| parse_coord(t))
        .collect::<Option<Vec<_>>>()?;

    if points.len() < 2 {
        return None;
    }
    Some(points)
}

/// Split into `(...)` groups separated by single dashes.
fn tokenize(s: &str) -> Option<Vec<&str>> {
    let mut tokens = Vec::new();
    let mut rest = s;

    loop {
        if !rest.starts_with('(') {
            return None;
        }
        let close = rest.find(')')?;
        tokens.push(&rest[..=close]);
        rest = &rest[close + 1..];

        if rest.is_empty() {
            break;
        }
        rest = rest.strip_prefix('-')?;
    }

    Some(tokens)
}

/// Parse a coordinate token like `(3,-2)`.
fn parse_coord(s: &str) -> Option<Coordinate> {
    let inner = s.strip_prefix('(')?.strip_suffix(')')?;
    let (x, y) = inner.split_once(',')?;
    Some(Coordinate::new(x.trim().parse().ok()?, y.trim().parse().ok()?))
}
