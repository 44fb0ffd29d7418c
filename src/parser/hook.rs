use super::blocks::{split_blocks, DeclarationKind, RawBlock};
use super::step_definition::parse_parameters;
use crate::core::{Hook, HookKind, Location};
use crate::patterns::{HOOK, QUOTED_STRING};
use std::path::{Path, PathBuf};

/// Parses every hook (`Before`, `After`, `Around`, ...) in a Ruby support file.
pub fn parse_hooks(path: impl Into<PathBuf>, text: &str) -> Vec<Hook> {
    let path = path.into();
    split_blocks(text)
        .into_iter()
        .filter(|block| block.kind == DeclarationKind::Hook)
        .filter_map(|block| build_hook(&path, block))
        .collect()
}

fn build_hook(path: &Path, block: RawBlock) -> Option<Hook> {
    let captures = HOOK.captures(&block.declaration)?;
    let kind = HookKind::from_keyword(captures.name("kind")?.as_str())?;
    let tags = captures
        .name("tags")
        .or_else(|| captures.name("bare_tags"))
        .map_or("", |m| m.as_str());
    let parameters = parse_parameters(captures.name("params").map_or("", |m| m.as_str()));

    Some(Hook::new(
        Location::new(path, block.line),
        kind,
        parse_tag_filters(tags),
        parameters,
        block.body,
    ))
}

/// Unquotes the tag filter arguments of a hook declaration and splits each on
/// commas: `'@a, @b', "~@c"` gives `["@a", "@b", "~@c"]`.
pub fn parse_tag_filters(arguments: &str) -> Vec<String> {
    QUOTED_STRING
        .captures_iter(arguments)
        .filter_map(|captures| captures.name("sq").or_else(|| captures.name("dq")))
        .flat_map(|quoted| quoted.as_str().split(','))
        .map(str::trim)
        .filter(|filter| !filter.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_parse_hooks() {
        let text = indoc! {r#"
            Before('@database', '~@no_db') do
              DatabaseCleaner.start
            end

            Around do |scenario, block|
              block.call
            end

            After do
            end

            at_exit do
              puts "bye"
            end
        "#};
        let hooks = parse_hooks("features/support/hooks.rb", text);

        assert_eq!(hooks.len(), 4);
        assert_eq!(hooks[0].kind, HookKind::Before);
        assert_eq!(hooks[0].tag_filters, vec!["@database", "~@no_db"]);
        assert_eq!(hooks[0].body_lines, vec!["DatabaseCleaner.start"]);
        assert_eq!(hooks[1].kind, HookKind::Around);
        assert_eq!(hooks[1].parameters, vec!["scenario", "block"]);
        assert_eq!(hooks[1].card.location.line, 5);
        assert!(hooks[2].body_lines.is_empty());
        assert_eq!(hooks[3].kind, HookKind::AtExit);
    }

    #[test]
    fn test_tag_filters_split_on_commas() {
        assert_eq!(
            parse_tag_filters(r#"'@a, @b', "not @c""#),
            vec!["@a", "@b", "not @c"]
        );
        assert!(parse_tag_filters("").is_empty());
    }

    #[test]
    fn test_step_definitions_are_not_hooks() {
        assert!(parse_hooks("s.rb", "Given /^a$/ do\nend\n").is_empty());
    }
}
