//! Splits a step definition file into declaration blocks.
//!
//! Every step definition or hook declaration starts a chunk that runs up to
//! the next declaration. The chunk's terminator is the last `end` (or `}` for
//! brace blocks) found scanning backward from the chunk's end, so nested
//! `if/end` and `begin/rescue/end` constructs stay inside the body. A brace
//! block closed on its own declaration line has that inline code as its body.

use crate::patterns::{HOOK, STEP_DEFINITION};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeclarationKind {
    StepDefinition,
    Hook,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawBlock {
    pub kind: DeclarationKind,
    /// 1-based line of the declaration.
    pub line: usize,
    pub declaration: String,
    /// Trimmed lines strictly between the declaration and its terminator.
    pub body: Vec<String>,
    /// The body sits on the declaration line (`Given(/x/) { foo }`).
    pub inline: bool,
}

/// How a declaration's body is delimited.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Opening {
    Do,
    Brace,
    /// `{ ... }` closed on the declaration line itself.
    OneLine(Option<String>),
}

fn declaration(line: &str) -> Option<(DeclarationKind, Opening)> {
    let (kind, captures) = match STEP_DEFINITION.captures(line) {
        Some(captures) => (DeclarationKind::StepDefinition, captures),
        None => (DeclarationKind::Hook, HOOK.captures(line)?),
    };
    let opening = if captures.name("closed").is_some() {
        Opening::OneLine(captures.name("inline").map(|m| m.as_str().trim().to_string()))
    } else if &captures["opener"] == "{" {
        Opening::Brace
    } else {
        Opening::Do
    };
    Some((kind, opening))
}

pub(crate) fn split_blocks(text: &str) -> Vec<RawBlock> {
    let lines: Vec<&str> = text.lines().collect();
    let starts: Vec<(usize, DeclarationKind, Opening)> = lines
        .iter()
        .enumerate()
        .filter_map(|(index, line)| {
            declaration(line).map(|(kind, opening)| (index, kind, opening))
        })
        .collect();

    starts
        .iter()
        .enumerate()
        .map(|(n, (start, kind, opening))| {
            let start = *start;
            let end = starts.get(n + 1).map_or(lines.len(), |(next, _, _)| *next);
            let following = &lines[start + 1..end];
            let body = match opening {
                Opening::Do => block_body(following, "end"),
                Opening::Brace => block_body(following, "}"),
                Opening::OneLine(inline) => inline.iter().cloned().collect(),
            };
            RawBlock {
                kind: *kind,
                line: start + 1,
                declaration: lines[start].trim().to_string(),
                body,
                inline: matches!(opening, Opening::OneLine(_)),
            }
        })
        .collect()
}

fn is_terminator(line: &str, terminator: &str) -> bool {
    line == terminator || line.strip_suffix(')').map(str::trim_end) == Some(terminator)
}

fn block_body(lines: &[&str], terminator: &str) -> Vec<String> {
    let trimmed: Vec<String> = lines.iter().map(|line| line.trim().to_string()).collect();
    match trimmed.iter().rposition(|line| is_terminator(line, terminator)) {
        Some(end) => trimmed[..end].to_vec(),
        None => {
            let keep = trimmed
                .iter()
                .rposition(|line| !line.is_empty())
                .map_or(0, |last| last + 1);
            trimmed[..keep].to_vec()
        }
    }
}
