//! TOML configuration for the arena, history, and autosave knobs
//! (`SPEC_FULL.md` §3.3). A missing or unparsable file is not an error —
//! the defaults below apply, matching the teacher's `core-config` loading
//! tolerance.

use serde::Deserialize;
use std::path::Path;

fn default_block_size() -> usize {
    1024
}

fn default_piece_table_max() -> usize {
    1000
}

fn default_document_max() -> usize {
    2000
}

fn default_autosave_dir() -> String {
    ".".to_string()
}

fn default_autosave_max_suffix() -> u32 {
    20
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    #[serde(default = "default_block_size")]
    pub block_size: usize,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self { block_size: default_block_size() }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    #[serde(default = "default_piece_table_max")]
    pub piece_table_max: usize,
    #[serde(default = "default_document_max")]
    pub document_max: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            piece_table_max: default_piece_table_max(),
            document_max: default_document_max(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AutosaveConfig {
    #[serde(default = "default_autosave_dir")]
    pub dir: String,
    #[serde(default = "default_autosave_max_suffix")]
    pub max_suffix: u32,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            dir: default_autosave_dir(),
            max_suffix: default_autosave_max_suffix(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub arena: ArenaConfig,
    pub history: HistoryConfig,
    pub autosave: AutosaveConfig,
}

impl Config {
    /// Loads configuration from `path`. A missing file, an unreadable file,
    /// or a file that fails to parse all fall back to [`Config::default`]
    /// rather than propagating an error — only genuinely malformed TOML
    /// inside an existing, readable file is logged as a warning.
    pub fn load_from(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                tracing::trace!(target: "config", path = %path.display(), error = %err, "config_not_found_using_defaults");
                return Self::default();
            }
        };
        match toml::from_str(&text) {
            Ok(cfg) => {
                tracing::debug!(target: "config", path = %path.display(), "config_loaded");
                cfg
            }
            Err(err) => {
                tracing::warn!(target: "config", path = %path.display(), error = %err, "config_parse_failed_using_defaults");
                Self::default()
            }
        }
    }

    /// Strict variant for callers (e.g. a `--config` flag) that want a
    /// hard error instead of silent fallback when the named file is
    /// missing or malformed.
    pub fn try_load_from(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let cfg = toml::from_str(&text)?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = Config::load_from(Path::new("/nonexistent/treenote.toml"));
        assert_eq!(cfg.arena.block_size, 1024);
        assert_eq!(cfg.history.document_max, 2000);
    }

    #[test]
    fn partial_file_fills_in_remaining_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("treenote.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "[history]\npiece_table_max = 50").unwrap();
        drop(f);
        let cfg = Config::load_from(&path);
        assert_eq!(cfg.history.piece_table_max, 50);
        assert_eq!(cfg.history.document_max, 2000);
        assert_eq!(cfg.autosave.max_suffix, 20);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("treenote.toml");
        std::fs::write(&path, "not = [valid toml").unwrap();
        let cfg = Config::load_from(&path);
        assert_eq!(cfg.arena.block_size, 1024);
    }
}
