use crate::errors::{Error, Result};
use crate::suite::SourceFile;
use ignore::WalkBuilder;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

pub const FEATURE_EXTENSION: &str = "feature";
pub const STEP_EXTENSION: &str = "rb";

/// Collects files with one of a set of extensions below a root, honoring
/// `.gitignore`.
pub struct FileWalker {
    root: PathBuf,
    extensions: Vec<String>,
    ignore_patterns: Vec<glob::Pattern>,
}

impl FileWalker {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            extensions: vec![],
            ignore_patterns: vec![],
        }
    }

    pub fn features(root: PathBuf) -> Self {
        Self::new(root).with_extensions(&[FEATURE_EXTENSION])
    }

    pub fn step_definitions(root: PathBuf) -> Self {
        Self::new(root).with_extensions(&[STEP_EXTENSION])
    }

    pub fn with_extensions(mut self, extensions: &[&str]) -> Self {
        self.extensions = extensions.iter().map(|e| e.to_string()).collect();
        self
    }

    /// Glob patterns matched against each path, both as found and relative
    /// to the root. Invalid patterns are skipped with a warning.
    pub fn with_ignore_patterns(mut self, patterns: &[String]) -> Self {
        self.ignore_patterns = patterns
            .iter()
            .filter_map(|pattern| match glob::Pattern::new(pattern) {
                Ok(compiled) => Some(compiled),
                Err(e) => {
                    log::warn!("Skipping invalid ignore pattern '{}': {}", pattern, e);
                    None
                }
            })
            .collect();
        self
    }

    /// Matching paths in sorted order. A root that is itself a file is
    /// returned as-is when its extension matches.
    pub fn walk(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .git_ignore(true)
            .build();

        for entry in walker {
            let entry = entry.map_err(|e| Error::FileSystem {
                message: format!("Failed to walk directory: {e}"),
                path: Some(self.root.clone()),
                source: e.into_io_error(),
            })?;
            let path = entry.path();

            if path.is_file() && self.should_process(path) {
                files.push(path.to_path_buf());
            }
        }

        files.sort();
        log::debug!(
            "Found {} file(s) under {}",
            files.len(),
            self.root.display()
        );
        Ok(files)
    }

    fn should_process(&self, path: &Path) -> bool {
        let Some(ext) = path.extension() else {
            return false;
        };
        let ext = ext.to_string_lossy();
        if !self.extensions.iter().any(|e| *e == ext) {
            return false;
        }

        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        !self
            .ignore_patterns
            .iter()
            .any(|pattern| pattern.matches_path(path) || pattern.matches_path(relative))
    }

    /// Walks and reads every matching file.
    pub fn read_sources(&self) -> Result<Vec<SourceFile>> {
        let paths = self.walk()?;
        paths.into_par_iter().map(read_source).collect()
    }
}

pub fn read_source(path: PathBuf) -> Result<SourceFile> {
    let text = fs::read_to_string(&path)
        .map_err(|e| Error::file_system("Failed to read source file", &path, e))?;
    Ok(SourceFile { path, text })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_walk_filters_by_extension() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "features/b.feature", "Feature: B\n");
        touch(dir.path(), "features/a.feature", "Feature: A\n");
        touch(dir.path(), "features/step_definitions/steps.rb", "");
        touch(dir.path(), "features/notes.md", "");

        let files = FileWalker::features(dir.path().to_path_buf())
            .walk()
            .unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.feature", "b.feature"]);
    }

    #[test]
    fn test_ignore_globs() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "support/env.rb", "");
        touch(dir.path(), "vendor/gem.rb", "");
        touch(dir.path(), "support/vendored_steps.rb", "");

        let files = FileWalker::step_definitions(dir.path().to_path_buf())
            .with_ignore_patterns(&["vendor/**".to_string(), "[".to_string()])
            .walk()
            .unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["env.rb", "vendored_steps.rb"]);
    }

    #[test]
    fn test_read_sources() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "x.feature", "Feature: X\n");
        let sources = FileWalker::features(dir.path().to_path_buf())
            .read_sources()
            .unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].text, "Feature: X\n");
    }
}
