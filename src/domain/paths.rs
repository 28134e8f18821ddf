//! # Paths
//!
//! Centralized definitions for where the bot keeps its files.
//! Acts as the Single Source of Truth for default locations.

use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "data/config.yaml";
pub const DATA_DIR_NAME: &str = ".vierzehn";
pub const IGNORE_FILE: &str = "ignore.yaml";
pub const LOG_FILE: &str = "vierzehn.log";

/// Returns the default data directory (`~/.vierzehn`), falling back to the working directory
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_DIR_NAME)
}

/// Returns the ignore file inside a data directory
pub fn ignore_path(data_dir: &Path) -> PathBuf {
    data_dir.join(IGNORE_FILE)
}

/// Expands `~` and a leading `~/` to the home directory
pub fn expand_home(path: &str) -> PathBuf {
    if path == "~"
        && let Some(home) = dirs::home_dir()
    {
        return home;
    }
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_home_leaves_plain_paths() {
        assert_eq!(expand_home("/tmp/x.yaml"), PathBuf::from("/tmp/x.yaml"));
        assert_eq!(expand_home("data/ignore.yaml"), PathBuf::from("data/ignore.yaml"));
    }

    #[test]
    fn test_expand_home_prefix() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/.vierzehn"), home.join(".vierzehn"));
        }
    }

    #[test]
    fn test_expand_bare_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~"), home);
        }
        assert_eq!(expand_home("~alice/x"), PathBuf::from("~alice/x"));
    }

    #[test]
    fn test_ignore_path() {
        assert_eq!(
            ignore_path(Path::new("/data")),
            PathBuf::from("/data/ignore.yaml")
        );
    }
}
