use dirs::{data_dir, home_dir};
use std::{env, fs, io, path::Path, path::PathBuf};

const APP_DIR_NAME: &str = "quicklog";
const FALLBACK_DIR_NAME: &str = ".quicklog";
const STORE_DIR: &str = "store";
const CONFIG_DIR: &str = "config";
const CONFIG_FILE: &str = "config.json";

pub const HOME_ENV: &str = "QUICKLOG_HOME";

/// Resolves the on-disk layout used by the application.
pub struct PathResolver;

impl PathResolver {
    /// Application data directory: `$QUICKLOG_HOME`, then the platform data
    /// directory, then `~/.quicklog`.
    pub fn base_dir() -> PathBuf {
        if let Some(custom) = env::var_os(HOME_ENV) {
            return PathBuf::from(custom);
        }
        if let Some(data) = data_dir() {
            return data.join(APP_DIR_NAME);
        }
        home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(FALLBACK_DIR_NAME)
    }

    pub fn resolve_base(custom: Option<PathBuf>) -> PathBuf {
        custom.unwrap_or_else(Self::base_dir)
    }

    pub fn store_dir_in(base: &Path) -> PathBuf {
        base.join(STORE_DIR)
    }

    pub fn config_dir_in(base: &Path) -> PathBuf {
        base.join(CONFIG_DIR)
    }

    pub fn config_file_in(base: &Path) -> PathBuf {
        Self::config_dir_in(base).join(CONFIG_FILE)
    }
}

pub fn ensure_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_rooted_in_base() {
        let base = PathBuf::from("/tmp/quicklog-test");
        assert_eq!(
            PathResolver::store_dir_in(&base),
            PathBuf::from("/tmp/quicklog-test/store")
        );
        assert_eq!(
            PathResolver::config_file_in(&base),
            PathBuf::from("/tmp/quicklog-test/config/config.json")
        );
    }

    #[test]
    fn explicit_base_wins() {
        let custom = PathBuf::from("/var/tmp/elsewhere");
        assert_eq!(PathResolver::resolve_base(Some(custom.clone())), custom);
    }
}
