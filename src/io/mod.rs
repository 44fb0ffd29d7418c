pub mod output;
pub mod walker;

pub use output::{JsonWriter, OutputWriter, TerminalWriter};
pub use walker::{read_source, FileWalker};

use anyhow::Result;
use std::fs;
use std::path::Path;

pub fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content)?;
    Ok(())
}

pub fn file_exists(path: &Path) -> bool {
    path.exists() && path.is_file()
}
