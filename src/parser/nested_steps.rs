//! Nested step call resolution.
//!
//! A step definition body may invoke other steps: `step "I log in"`,
//! `steps "Given I log in"`, or a `steps %Q{ ... }` literal that can span
//! several lines. Each body line is classified into a [`LineClass`], and a
//! two-state machine turns the classes into emitted calls.
//!
//! Ruby interpolations (`#{...}`) are masked before classification so their
//! braces and quotes never confuse the literal delimiters, then restored in
//! the emitted text.

use crate::core::Location;
use crate::patterns::{
    self, INTERIOR_STEP, LITERAL_CLOSE, LITERAL_CLOSE_WITH_STEP, LITERAL_OPEN, SIMPLE_NESTED_STEP,
};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::BTreeMap;

const MASK: char = '\u{1A}';

static MASK_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new("\u{1A}(\\d+)\u{1A}").unwrap());

/// What a single body line contributes to nested step resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass {
    /// A complete call on one line.
    SingleCall(String),
    /// Opens a multi-line literal, possibly with its first step on the line.
    OpenLiteral(Option<String>),
    /// A step inside an open literal.
    InteriorCall(String),
    /// Closes a multi-line literal, possibly with its last step on the line.
    CloseLiteral(Option<String>),
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResolverState {
    Idle,
    InMultilineLiteral,
}

/// Finds the nested step calls in a body. Keys are located at
/// `declaration.line + n` for the n-th (1-based) body line.
pub fn resolve_nested_steps(declaration: &Location, body: &[String]) -> BTreeMap<Location, String> {
    let mut state = ResolverState::Idle;
    let mut nested = BTreeMap::new();

    for (index, line) in body.iter().enumerate() {
        let (next, call) = transition(state, classify_line(line));
        state = next;
        if let Some(text) = call {
            nested.insert(declaration.at_line(declaration.line + index + 1), text);
        }
    }

    nested
}

fn transition(state: ResolverState, class: LineClass) -> (ResolverState, Option<String>) {
    use LineClass::*;
    use ResolverState::*;

    match (state, class) {
        (_, Ignore) => (state, None),
        (_, SingleCall(text)) => (state, Some(text)),
        (_, OpenLiteral(first)) => (InMultilineLiteral, first),
        (Idle, InteriorCall(_) | CloseLiteral(_)) => (Idle, None),
        (InMultilineLiteral, InteriorCall(text)) => (InMultilineLiteral, Some(text)),
        (InMultilineLiteral, CloseLiteral(last)) => (Idle, last),
    }
}

/// Classifies one body line. The first matching class wins, in this order:
/// comment, single call, literal opening, literal closing, interior step.
pub fn classify_line(line: &str) -> LineClass {
    let trimmed = line.trim();
    if trimmed.is_empty() || patterns::is_comment(trimmed) {
        return LineClass::Ignore;
    }

    let masked = MaskedLine::new(trimmed);
    classify_single_call(&masked)
        .or_else(|| classify_literal_open(&masked))
        .or_else(|| classify_literal_close(&masked))
        .or_else(|| classify_interior(&masked))
        .unwrap_or(LineClass::Ignore)
}

fn classify_single_call(masked: &MaskedLine) -> Option<LineClass> {
    let captures = SIMPLE_NESTED_STEP.captures(&masked.text)?;
    let text = captures.name("dq").or_else(|| captures.name("sq"))?;
    Some(masked.finish(text.as_str()).map_or(LineClass::Ignore, LineClass::SingleCall))
}

fn classify_literal_open(masked: &MaskedLine) -> Option<LineClass> {
    let captures = LITERAL_OPEN.captures(&masked.text)?;
    let rest = captures.name("rest").map_or("", |m| m.as_str());
    if rest.is_empty() {
        return Some(LineClass::OpenLiteral(None));
    }

    if closes_literal(masked.original) {
        let inner = strip_literal_close(rest);
        let singular = captures.name("call").is_some_and(|m| m.as_str() == "step");
        let text = step_text(inner).or_else(|| (singular && !inner.is_empty()).then_some(inner));
        return Some(
            text.and_then(|t| masked.finish(t))
                .map_or(LineClass::Ignore, LineClass::SingleCall),
        );
    }

    Some(LineClass::OpenLiteral(
        step_text(rest).and_then(|t| masked.finish(t)),
    ))
}

// Brace balance inside the literal is not tracked: an interior step whose
// own text ends in `}` (`Given I see {braces}`) closes the literal, and the
// steps after it are no longer read as calls.
fn classify_literal_close(masked: &MaskedLine) -> Option<LineClass> {
    if let Some(captures) = LITERAL_CLOSE_WITH_STEP.captures(&masked.text) {
        let text = captures.name("text").map_or("", |m| m.as_str());
        return Some(LineClass::CloseLiteral(masked.finish(text)));
    }
    LITERAL_CLOSE
        .is_match(&masked.text)
        .then_some(LineClass::CloseLiteral(None))
}

fn classify_interior(masked: &MaskedLine) -> Option<LineClass> {
    let text = step_text(&masked.text)?;
    Some(masked.finish(text).map_or(LineClass::Ignore, LineClass::InteriorCall))
}

/// The text after the step keyword, if the fragment is a keyword step.
fn step_text(fragment: &str) -> Option<&str> {
    INTERIOR_STEP
        .captures(fragment)
        .and_then(|captures| captures.name("text"))
        .map(|m| m.as_str())
        .filter(|text| !text.is_empty())
}

fn strip_literal_close(rest: &str) -> &str {
    let rest = rest.trim_end();
    let rest = rest.strip_suffix(')').map_or(rest, str::trim_end);
    rest.strip_suffix('}').map_or(rest, str::trim_end)
}

/// Whether a line's trailing `}` closes a `%Q{` literal rather than an
/// interpolation.
///
/// Scans from the last `#{` marker: if its braces balance exactly at the end
/// of the line, the trailing brace is the interpolation's and the literal is
/// still open. A marker that never balances counts as closing the literal.
pub fn closes_literal(line: &str) -> bool {
    let line = line.trim_end();
    let line = line.strip_suffix(')').map_or(line, str::trim_end);
    if !line.ends_with('}') {
        return false;
    }

    let Some(marker) = line.rfind("#{") else {
        return true;
    };

    let mut depth = 0usize;
    for (offset, ch) in line[marker + 1..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return marker + 1 + offset != line.len() - 1;
                }
            }
            _ => {}
        }
    }
    true
}

/// A trimmed line with every balanced `#{...}` replaced by an indexed token.
struct MaskedLine<'a> {
    original: &'a str,
    text: String,
    segments: Vec<&'a str>,
}

impl<'a> MaskedLine<'a> {
    fn new(original: &'a str) -> Self {
        let mut text = String::with_capacity(original.len());
        let mut segments = Vec::new();
        let mut rest = original;

        while let Some(start) = rest.find("#{") {
            let Some(length) = balanced_length(&rest[start + 1..]) else {
                break;
            };
            let end = start + 1 + length;
            text.push_str(&rest[..start]);
            text.push(MASK);
            text.push_str(&segments.len().to_string());
            text.push(MASK);
            segments.push(&rest[start..end]);
            rest = &rest[end..];
        }
        text.push_str(rest);

        Self {
            original,
            text,
            segments,
        }
    }

    /// Restores interpolations and strips backslashes. Returns `None` when the
    /// call is nothing but interpolations.
    fn finish(&self, masked_text: &str) -> Option<String> {
        if MASK_TOKEN.replace_all(masked_text, "").trim().is_empty() {
            return None;
        }
        let restored = MASK_TOKEN.replace_all(masked_text, |captures: &Captures| {
            captures[1]
                .parse::<usize>()
                .ok()
                .and_then(|index| self.segments.get(index))
                .map_or_else(String::new, |segment| segment.to_string())
        });
        Some(restored.replace('\\', ""))
    }
}

/// Byte length of a `{...}` group starting at the first byte, through its
/// matching close brace.
fn balanced_length(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, ch) in text.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(offset + 1);
                }
            }
            _ => {}
        }
    }
    None
}
