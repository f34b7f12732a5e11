use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::TocError;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "notetoc.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTML indentation per header level, in pixels.
    pub indent_px: u32,
    /// Plain-text indentation per header level, in spaces.
    pub text_indent: usize,
    /// Shown instead of an outline when no document is selected.
    pub empty_message: String,
    /// Shown before the first outline pass completes.
    pub loading_message: String,
    /// Quiet period before a burst of file changes triggers a recompute.
    pub debounce_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            indent_px: 15,
            text_indent: 2,
            empty_message: "Please select a note to view the table of content".to_string(),
            loading_message: "Loading...".to_string(),
            debounce_ms: 200,
        }
    }
}

impl Config {
    pub fn from_toml(path: &Path, raw: &str) -> Result<Self, TocError> {
        toml::from_str(raw).map_err(|source| TocError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, TocError> {
        let raw = fs::read_to_string(path).map_err(|e| TocError::from_io(path, e))?;
        Self::from_toml(path, &raw)
    }

    /// Explicit path must exist; the implicit `notetoc.toml` is optional.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, TocError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let implicit = PathBuf::from(DEFAULT_CONFIG_FILE);
        if implicit.is_file() {
            tracing::debug!(path = %implicit.display(), "loading config");
            return Self::load(&implicit);
        }
        Ok(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg = Config::from_toml(Path::new("t.toml"), "indent_px = 20\n").unwrap();
        assert_eq!(cfg.indent_px, 20);
        assert_eq!(cfg.loading_message, "Loading...");
        assert_eq!(cfg.debounce_ms, 200);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_toml(Path::new("t.toml"), "indent = 3\n").unwrap_err();
        assert!(matches!(err, TocError::Config { .. }));
        assert!(err.to_string().starts_with("invalid config t.toml"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::resolve(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, TocError::NotFound { .. }));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notetoc.toml");
        fs::write(&path, "empty_message = \"nothing here\"\ndebounce_ms = 50\n").unwrap();
        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.empty_message, "nothing here");
        assert_eq!(cfg.debounce_ms, 50);
    }
}
