//! Maximum-value scan over a short integer list.
//!
//! Input holds at most [`MAX_VALUES`] integers. The scan reports the maximum
//! and every index at which it occurs. Lists are rendered through
//! [`render_bounded_list`], which stops at a byte capacity and flags the
//! truncation so callers can warn about it.

use std::fmt::Display;

use crate::validate::Rejection;

pub const MAX_VALUES: usize = 16;
pub const RENDER_CAPACITY: usize = 256;

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse 1..=16 integers separated by commas and/or whitespace.
pub fn parse_values(text: &str) -> Result<Vec<i32>, Rejection> {
    let tokens: Vec<&str> = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.is_empty() {
        return Err(Rejection::new(
            "no elements provided: enter integers like 1,2,3",
        ));
    }
    if tokens.len() > MAX_VALUES {
        return Err(Rejection::new(format!(
            "number of elements ({}) exceeds maximum allowed size ({MAX_VALUES})",
            tokens.len()
        )));
    }

    tokens
        .iter()
        .map(|t| {
            t.parse::<i32>()
                .map_err(|_| Rejection::new(format!("'{t}' is not an integer")))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Scan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaxScan {
    pub max: i32,
    pub indices: Vec<usize>,
    /// More occurrences existed than the index capacity could hold.
    pub overflowed: bool,
}

/// Returns `None` for an empty slice.
pub fn scan(values: &[i32]) -> Option<MaxScan> {
    let max = *values.iter().max()?;
    let mut indices = Vec::new();
    let mut overflowed = false;
    for (i, v) in values.iter().enumerate() {
        if *v != max {
            continue;
        }
        if indices.len() == MAX_VALUES {
            overflowed = true;
            break;
        }
        indices.push(i);
    }
    Some(MaxScan {
        max,
        indices,
        overflowed,
    })
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    pub truncated: bool,
}

/// Render `prefix[a, b, c]` within `capacity` bytes.
///
/// Items are appended while they fit; the first item that would overflow
/// stops the rendering and sets `truncated`. One byte is always kept free for
/// the closing bracket.
pub fn render_bounded_list<T: Display>(prefix: &str, items: &[T], capacity: usize) -> Rendered {
    let mut text = String::with_capacity(capacity);
    text.push_str(prefix);
    text.push('[');

    let mut truncated = false;
    for (i, item) in items.iter().enumerate() {
        let piece = if i == 0 {
            item.to_string()
        } else {
            format!(", {item}")
        };
        if text.len() + piece.len() >= capacity {
            truncated = true;
            break;
        }
        text.push_str(&piece);
    }
    text.push(']');

    Rendered { text, truncated }
}

/// Report lines for a scan, warnings included.
pub fn report(values: &[i32]) -> Vec<String> {
    let mut lines = Vec::new();

    let received = render_bounded_list(
        &format!("Received {} element(s): ", values.len()),
        values,
        RENDER_CAPACITY,
    );
    if received.truncated {
        lines.push("Warning: input list truncated.".to_string());
    }
    lines.push(received.text);

    let Some(result) = scan(values) else {
        lines.push("No elements provided.".to_string());
        return lines;
    };
    lines.push(format!("Maximum value found: {}", result.max));

    if result.overflowed {
        lines.push(format!(
            "Warning: more occurrences of the maximum than index storage allows ({MAX_VALUES})."
        ));
    }
    let indices = render_bounded_list("Found at index/indices: ", &result.indices, RENDER_CAPACITY);
    if indices.truncated {
        lines.push("Warning: index list truncated.".to_string());
    }
    lines.push(indices.text);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_commas_and_spaces() {
        assert_eq!(parse_values("1,2,3").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_values(" -4  5,6 ").unwrap(), vec![-4, 5, 6]);
    }

    #[test]
    fn parse_rejects_empty_and_oversized() {
        assert!(parse_values("").is_err());
        assert!(parse_values(" , ").is_err());
        let seventeen = (0..17).map(|i| i.to_string()).collect::<Vec<_>>().join(",");
        let err = parse_values(&seventeen).unwrap_err();
        assert!(err.reason.contains("(17)"), "{err}");
        let sixteen = (0..16).map(|i| i.to_string()).collect::<Vec<_>>().join(",");
        assert_eq!(parse_values(&sixteen).unwrap().len(), 16);
    }

    #[test]
    fn parse_rejects_non_integers() {
        assert!(parse_values("1,two,3").is_err());
        assert!(parse_values("99999999999").is_err());
    }

    #[test]
    fn scan_finds_every_occurrence() {
        let r = scan(&[3, 7, 7, 1]).unwrap();
        assert_eq!(r.max, 7);
        assert_eq!(r.indices, vec![1, 2]);
        assert!(!r.overflowed);
    }

    #[test]
    fn scan_handles_negatives_and_empty() {
        assert_eq!(scan(&[-5, -2, -9]).unwrap().indices, vec![1]);
        assert!(scan(&[]).is_none());
    }

    #[test]
    fn render_fits_within_capacity() {
        let r = render_bounded_list("Values: ", &[1, 2, 3], 64);
        assert_eq!(r.text, "Values: [1, 2, 3]");
        assert!(!r.truncated);
    }

    #[test]
    fn render_truncates_and_flags() {
        let r = render_bounded_list("", &[100, 200, 300], 10);
        assert!(r.truncated);
        assert_eq!(r.text, "[100, 200]");
    }

    #[test]
    fn render_empty_list() {
        let r = render_bounded_list::<i32>("x", &[], 8);
        assert_eq!(r.text, "x[]");
        assert!(!r.truncated);
    }

    #[test]
    fn report_lines() {
        let lines = report(&[3, 7, 7, 1]);
        assert_eq!(
            lines,
            vec![
                "Received 4 element(s): [3, 7, 7, 1]".to_string(),
                "Maximum value found: 7".to_string(),
                "Found at index/indices: [1, 2]".to_string(),
            ]
        );
    }
}
