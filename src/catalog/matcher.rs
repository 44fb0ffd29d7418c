//! Fuzzy matching of interpolated step calls against definition patterns.
//!
//! A nested call such as `I add #{count} items` cannot be matched by running
//! the definition's regex on it. Instead the call becomes a regex of its own,
//! interpolations widened to `.*`, and is run against the pattern source.

use crate::patterns;
use regex::Regex;

/// Literal and interpolated pieces of a step text, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece<'a> {
    Literal(&'a str),
    Interpolation,
}

fn split_interpolations(text: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("#{") {
        let mut depth = 0usize;
        let mut end = None;
        for (offset, ch) in rest[start + 1..].char_indices() {
            match ch {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        end = Some(start + 1 + offset + 1);
                        break;
                    }
                }
                _ => {}
            }
        }
        let Some(end) = end else {
            break;
        };
        if start > 0 {
            pieces.push(Piece::Literal(&rest[..start]));
        }
        pieces.push(Piece::Interpolation);
        rest = &rest[end..];
    }

    if !rest.is_empty() {
        pieces.push(Piece::Literal(rest));
    }
    pieces
}

/// Builds the fuzzy regex for an interpolated step. Returns `None` for steps
/// without interpolation, which the exact pass already covers.
pub fn fuzzy_pattern(step: &str) -> Option<Regex> {
    let text = patterns::strip_step_style(step);
    let pieces = split_interpolations(text);
    if !pieces.contains(&Piece::Interpolation) {
        return None;
    }

    let body: String = pieces
        .iter()
        .map(|piece| match piece {
            Piece::Literal(literal) => regex::escape(literal),
            Piece::Interpolation => ".*".to_string(),
        })
        .collect();
    Regex::new(&format!("^{body}$")).ok()
}

/// The pattern source without its leading and trailing anchors.
pub fn strip_anchors(source: &str) -> &str {
    let source = source
        .strip_prefix("\\A")
        .or_else(|| source.strip_prefix('^'))
        .unwrap_or(source);
    source
        .strip_suffix("\\z")
        .or_else(|| source.strip_suffix("\\Z"))
        .or_else(|| source.strip_suffix('$'))
        .unwrap_or(source)
}
