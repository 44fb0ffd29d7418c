use super::blocks::{split_blocks, DeclarationKind, RawBlock};
use super::nested_steps::resolve_nested_steps;
use crate::core::{Location, StepDefinition};
use crate::patterns::STEP_DEFINITION;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

static NEVER_MATCHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\s\S]").unwrap());

/// Parses every step definition declared in a Ruby step file.
pub fn parse_step_definitions(path: impl Into<PathBuf>, text: &str) -> Vec<StepDefinition> {
    let path = path.into();
    split_blocks(text)
        .into_iter()
        .filter(|block| block.kind == DeclarationKind::StepDefinition)
        .filter_map(|block| build_step_definition(&path, block))
        .collect()
}

fn build_step_definition(path: &Path, block: RawBlock) -> Option<StepDefinition> {
    let captures = STEP_DEFINITION.captures(&block.declaration)?;
    let location = Location::new(path, block.line);

    let (source, pattern) = match captures.name("regex") {
        Some(regex) => {
            let flags = captures.name("flags").map_or("", |m| m.as_str());
            (
                regex.as_str().to_string(),
                compile_regex(regex.as_str(), flags, &location),
            )
        }
        None => {
            let literal = captures
                .name("dq")
                .or_else(|| captures.name("sq"))
                .map_or("", |m| m.as_str())
                .replace("\\\"", "\"")
                .replace("\\'", "'");
            let pattern = compile_expression(&literal);
            (literal, pattern)
        }
    };

    let parameters = parse_parameters(captures.name("params").map_or("", |m| m.as_str()));
    // Nested calls are numbered from the line after `body_anchor`.
    let body_anchor = if block.inline {
        location.at_line(block.line - 1)
    } else {
        location.clone()
    };
    let mut definition = StepDefinition::new(location, pattern, source, parameters, block.body);
    definition.nested_steps = resolve_nested_steps(&body_anchor, &definition.body_lines);
    Some(definition)
}

/// `| a ,  b,c |` contents to `["a", "b", "c"]`.
pub fn parse_parameters(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|parameter| !parameter.is_empty())
        .map(String::from)
        .collect()
}

/// Compiles a `/regex/flags` pattern. Constructs the regex engine cannot
/// express fall back to matching the source text literally.
pub fn compile_regex(source: &str, flags: &str, location: &Location) -> Regex {
    let mut inline = String::new();
    if flags.contains('i') {
        inline.push('i');
    }
    if flags.contains('x') {
        inline.push('x');
    }
    if flags.contains('m') {
        inline.push('s');
    }
    let prefix = if inline.is_empty() {
        String::new()
    } else {
        format!("(?{inline})")
    };

    match Regex::new(&format!("{prefix}{}", translate_escapes(source))) {
        Ok(regex) => regex,
        Err(err) => {
            log::warn!(
                "{location}: step pattern /{source}/ cannot be compiled, matching it literally: {err}"
            );
            literal_regex(source)
        }
    }
}

// Ruby escapes without a direct equivalent in the regex crate.
fn translate_escapes(source: &str) -> String {
    let mut translated = String::with_capacity(source.len());
    let mut chars = source.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            translated.push(ch);
            continue;
        }
        match chars.next() {
            Some('h') => translated.push_str("[0-9a-fA-F]"),
            Some('H') => translated.push_str("[^0-9a-fA-F]"),
            Some('Z') => translated.push_str(r"\z"),
            Some('/') => translated.push('/'),
            Some(other) => {
                translated.push('\\');
                translated.push(other);
            }
            None => translated.push_str(r"\\"),
        }
    }
    translated
}

/// Compiles a quoted step pattern. `{int}`, `{float}`, `{word}`, `{string}`
/// and `{}` become capture groups; everything else matches literally.
pub fn compile_expression(expression: &str) -> Regex {
    let mut pattern = String::from("^");
    let mut rest = expression;

    while let Some(open) = rest.find('{') {
        pattern.push_str(&regex::escape(&rest[..open]));
        match rest[open..].find('}') {
            Some(close) => {
                pattern.push_str(parameter_pattern(&rest[open + 1..open + close]));
                rest = &rest[open + close + 1..];
            }
            None => {
                pattern.push_str(&regex::escape(&rest[open..]));
                rest = "";
            }
        }
    }
    pattern.push_str(&regex::escape(rest));
    pattern.push('$');

    Regex::new(&pattern).unwrap_or_else(|_| literal_regex(expression))
}

fn parameter_pattern(name: &str) -> &'static str {
    match name {
        "int" => r"(-?\d+)",
        "float" => r"(-?\d*\.?\d+)",
        "word" => r"([^\s]+)",
        "string" => r#"("[^"]*"|'[^']*')"#,
        _ => "(.*)",
    }
}

fn literal_regex(text: &str) -> Regex {
    Regex::new(&format!("^{}$", regex::escape(text))).unwrap_or_else(|_| NEVER_MATCHES.clone())
}
