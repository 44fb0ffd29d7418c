use crate::config::{Thresholds, CONFIG_FILE_NAME};
use crate::io;
use crate::rules::RuleSet;
use anyhow::Result;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

pub fn init_config(force: bool) -> Result<()> {
    init_config_at(&PathBuf::from(CONFIG_FILE_NAME), force)
}

pub fn init_config_at(config_path: &Path, force: bool) -> Result<()> {
    if io::file_exists(config_path) && !force {
        anyhow::bail!("Configuration file already exists. Use --force to overwrite.");
    }

    io::write_file(config_path, &default_config_text())?;
    println!("Created {} configuration file", config_path.display());

    Ok(())
}

/// Default thresholds, followed by every rule with its score and phrase as
/// comments.
pub fn default_config_text() -> String {
    let thresholds = Thresholds::default();
    let mut text = String::from("# bddsniff configuration\n\n[thresholds]\n");
    let _ = writeln!(text, "feature = {}", thresholds.feature);
    let _ = writeln!(text, "scenario = {}", thresholds.scenario);
    let _ = writeln!(text, "step_definition = {}", thresholds.step_definition);
    let _ = writeln!(text, "hook = {}", thresholds.hook);
    let _ = writeln!(text, "project = {}", thresholds.project);

    text.push_str("\n# Rules can be overridden by id, for example:\n");
    text.push_str("#\n# [rules.too_many_steps]\n# score = 50\n# conditions = { max = 10 }\n#\n");
    text.push_str("# Available rules (score, phrase):\n");
    for (id, rule) in RuleSet::default().iter() {
        let _ = writeln!(text, "#   {id} ({}) {}", rule.score, rule.phrase);
    }
    text
}
