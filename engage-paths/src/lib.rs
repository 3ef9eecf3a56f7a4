//! XDG Base Directory paths for engage.
//!
//! The app and the extension must agree on where the shared store lives, so
//! both resolve it through these functions rather than platform-native
//! locations.

use std::path::{Path, PathBuf};

const APP_DIR: &str = "engage";

/// File name of the shared store document
pub const STORE_FILE: &str = "store.json";

/// File name of the user config
pub const CONFIG_FILE: &str = "config.toml";

/// Get the engage config directory.
///
/// Returns `$XDG_CONFIG_HOME/engage` if set, otherwise `~/.config/engage`.
///
/// # Examples
///
/// ```
/// use engage_paths::config_dir;
///
/// let config = config_dir();
/// let file = config.join("config.toml");
/// ```
pub fn config_dir() -> PathBuf {
    resolve(
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        dirs::home_dir(),
        ".config",
    )
}

/// Get the engage data directory.
///
/// Returns `$XDG_DATA_HOME/engage` if set, otherwise `~/.local/share/engage`.
/// The shared store lives here.
pub fn data_dir() -> PathBuf {
    resolve(
        std::env::var_os("XDG_DATA_HOME").map(PathBuf::from),
        dirs::home_dir(),
        ".local/share",
    )
}

/// Get the engage cache directory.
///
/// Returns `$XDG_CACHE_HOME/engage` if set, otherwise `~/.cache/engage`.
/// Downloaded notification media is written below it.
pub fn cache_dir() -> PathBuf {
    resolve(
        std::env::var_os("XDG_CACHE_HOME").map(PathBuf::from),
        dirs::home_dir(),
        ".cache",
    )
}

/// Default location of the shared store
pub fn store_path() -> PathBuf {
    data_dir().join(STORE_FILE)
}

/// Location of the user config file
pub fn config_file() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}

/// Media directory below `cache`
pub fn media_dir(cache: &Path) -> PathBuf {
    cache.join("media")
}

fn resolve(xdg: Option<PathBuf>, home: Option<PathBuf>, fallback: &str) -> PathBuf {
    match (xdg, home) {
        (Some(base), _) if !base.as_os_str().is_empty() => base.join(APP_DIR),
        (_, Some(home)) => home.join(fallback).join(APP_DIR),
        _ => PathBuf::from(fallback).join(APP_DIR),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_end_with_engage() {
        assert!(config_dir().ends_with("engage"));
        assert!(data_dir().ends_with("engage"));
        assert!(cache_dir().ends_with("engage"));
    }

    #[test]
    fn test_xdg_base_wins() {
        let path = resolve(
            Some(PathBuf::from("/tmp/test-config")),
            Some(PathBuf::from("/home/u")),
            ".config",
        );
        assert_eq!(path, PathBuf::from("/tmp/test-config/engage"));
    }

    #[test]
    fn test_empty_xdg_falls_back_to_home() {
        let path = resolve(Some(PathBuf::new()), Some(PathBuf::from("/home/u")), ".local/share");
        assert_eq!(path, PathBuf::from("/home/u/.local/share/engage"));
    }

    #[test]
    fn test_no_home_is_relative() {
        assert_eq!(resolve(None, None, ".cache"), PathBuf::from(".cache/engage"));
    }

    #[test]
    fn test_store_and_config_files() {
        assert!(store_path().ends_with("engage/store.json"));
        assert!(config_file().ends_with("engage/config.toml"));
        assert_eq!(
            media_dir(Path::new("/c/engage")),
            PathBuf::from("/c/engage/media")
        );
    }
}
