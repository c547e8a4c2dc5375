//! Data directory layout.

use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "STARCLEAN_DATA_DIR";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `STARCLEAN_DATA_DIR` environment variable
/// 2. `~/.starclean`
/// 3. `.starclean` in the current directory
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".starclean");
    }

    PathBuf::from(".starclean")
}

/// `{data_dir}/config.toml`
pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path() {
        let path = config_path(Path::new("/tmp/starclean"));
        assert_eq!(path, PathBuf::from("/tmp/starclean/config.toml"));
    }

    #[test]
    fn test_resolve_data_dir_ends_in_starclean_by_default() {
        // Only meaningful when the override is not set in the test environment.
        if std::env::var(DATA_DIR_ENV).is_err() {
            let dir = resolve_data_dir();
            assert!(dir.ends_with(".starclean"));
        }
    }
}
