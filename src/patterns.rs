//! Lexical Pattern Library
//!
//! Every line-level pattern the parsers, the nested-step resolver and the rule
//! checks rely on:
//! - Gherkin structure (titles, tags, comments, tables, doc strings, steps)
//! - Step definition and hook declarations
//! - Nested step call idioms (`step "..."`, `steps %Q{...}`)
//! - Body smells (sleeps, debugging output, pending markers, dates)
//!
//! Patterns are compiled once and shared; all of them are constant so a
//! compilation failure is a programming error.

use once_cell::sync::Lazy;
use regex::Regex;

/// Step keywords accepted at the start of a Gherkin step.
pub const STEP_STYLES: &[&str] = &["Given", "When", "Then", "And", "But", "Or", "*"];

const STEP_STYLE_ALTERNATION: &str = r"Given|When|Then|And|But|Or|\*";

// Gherkin structure
pub static FEATURE_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*Feature:\s*(?P<name>.*?)\s*$").unwrap());
pub static SCENARIO_TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?P<type>Background|Scenario Outline|Scenario Template|Scenario):\s*(?P<name>.*?)\s*$",
    )
    .unwrap()
});
pub static EXAMPLES_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:Examples|Scenarios):").unwrap());
pub static COMMENT_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*#").unwrap());
pub static TAG_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*@\S").unwrap());
pub static TAG_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"@\S+").unwrap());
pub static COMMENT_TAG_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*#.*@").unwrap());
pub static TABLE_ROW: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\|.*\|\s*$").unwrap());
pub static DOC_STRING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*(?:"""|```)"#).unwrap());
pub static STEP_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^\s*(?P<style>{STEP_STYLE_ALTERNATION})(?:\s+(?P<text>.*?))?\s*$"
    ))
    .unwrap()
});
pub static COMMENTED_STEP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^\s*#\s*(?:{STEP_STYLE_ALTERNATION})(?:\s|$)"
    ))
    .unwrap()
});
pub static OUTLINE_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"<([^<>]+)>").unwrap());
pub static DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{1,2}/\d{1,2}/(?:\d{4}|\d{2})\b").unwrap());

// Declarations in step definition files. After the opener and block
// parameters a declaration may close a one-line brace body (`{ foo }`) and
// may carry a trailing comment.
const DECLARATION_TAIL: &str = r"\s*(?:(?P<inline>[^#\s}].*?)?\s*(?P<closed>\})\s*\)?)?\s*(?:#.*)?$";

pub static STEP_DEFINITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r#"^\s*(?P<style>Given|When|Then|And|But|Or|Transform|\*)\s*\(?\s*(?:/(?P<regex>.*)/(?P<flags>[imxo]*)|"(?P<dq>(?:[^"\\]|\\.)*)"|'(?P<sq>(?:[^'\\]|\\.)*)')\s*\)?\s*(?P<opener>do|\{{)\s*(?:\|(?P<params>[^|]*)\|)?{DECLARATION_TAIL}"#
    ))
    .unwrap()
});
pub static HOOK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r#"^\s*(?P<kind>AfterConfiguration|AfterStep|Before|After|Around|at_exit)(?:\s*\((?P<tags>[^)]*)\)|\s+(?P<bare_tags>(?:'[^']*'|"[^"]*")(?:\s*,\s*(?:'[^']*'|"[^"]*"))*))?\s*(?P<opener>do|\{{)\s*(?:\|(?P<params>[^|]*)\|)?{DECLARATION_TAIL}"#
    ))
    .unwrap()
});
pub static QUOTED_STRING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"'(?P<sq>[^']*)'|"(?P<dq>[^"]*)""#).unwrap());
pub static TAG_EXPRESSION_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?P<negation>~|\bnot\s+)?(?P<tag>@[^\s,()]+)").unwrap());

// Nested step calls, matched against trimmed lines with interpolations masked
pub static SIMPLE_NESTED_STEP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r#"^steps?\s*\(?\s*(?:"(?:(?:{STEP_STYLE_ALTERNATION})\s+)?(?P<dq>(?:[^"\\]|\\.)*)"|'(?:(?:{STEP_STYLE_ALTERNATION})\s+)?(?P<sq>(?:[^'\\]|\\.)*)')\s*(?:,.*)?\)?\s*$"#
    ))
    .unwrap()
});
pub static LITERAL_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<call>steps?)\s*\(?\s*%[qQ]?\{\s*(?P<rest>.*?)\s*$").unwrap());
pub static LITERAL_CLOSE_WITH_STEP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^(?:{STEP_STYLE_ALTERNATION})\s+(?P<text>.*?)\s*\}}\s*\)?\s*$"
    ))
    .unwrap()
});
pub static LITERAL_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\}\s*\)?\s*$").unwrap());
pub static INTERIOR_STEP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^(?:{STEP_STYLE_ALTERNATION})\s+(?P<text>.*?)\s*$"
    ))
    .unwrap()
});

// Body smells
pub static SLEEP_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:Kernel\.)?sleep\s*\(?\s*(?P<seconds>\d+(?:\.\d+)?|\.\d+)").unwrap()
});
pub static LAZY_DEBUGGING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:puts|print|pp|p)(?:\s|\(|$)").unwrap());
pub static PENDING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^pending\b").unwrap());
pub static TODO_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)#\s*todo\b").unwrap());
pub static BEGIN_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^begin\b").unwrap());
pub static RESCUE_CLAUSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^rescue\b").unwrap());
pub static UNIVERSAL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\\A|\^)?\(?\.[*+]\??\)?(?:\$|\\z|\\Z)?$").unwrap());

/// Whether the line is a Gherkin or Ruby comment.
pub fn is_comment(line: &str) -> bool {
    COMMENT_LINE.is_match(line)
}

/// Whether the line carries tags: `@a @b`, or a commented-out `# @wip`.
pub fn is_tag_line(line: &str) -> bool {
    TAG_LINE.is_match(line) || is_commented_tag_line(line)
}

/// A commented-out tag line. A commented step that mentions `@` is not one.
pub fn is_commented_tag_line(line: &str) -> bool {
    COMMENT_TAG_LINE.is_match(line) && !COMMENTED_STEP.is_match(line)
}

/// Splits a step line into its keyword and the text after it.
pub fn split_step(line: &str) -> Option<(&str, &str)> {
    STEP_LINE.captures(line).map(|captures| {
        let style = captures.name("style").map_or("", |m| m.as_str());
        let text = captures.name("text").map_or("", |m| m.as_str());
        (style, text)
    })
}

/// Removes the cosmetic keyword prefix so the text can be matched against a
/// step definition pattern.
pub fn strip_step_style(line: &str) -> &str {
    match split_step(line) {
        Some((_, text)) => text,
        None => line.trim(),
    }
}

/// Whether a step line is a genuine step (keyword followed by text).
pub fn is_step(line: &str) -> bool {
    split_step(line).is_some_and(|(_, text)| !text.is_empty())
}
