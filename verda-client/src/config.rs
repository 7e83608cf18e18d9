//! Client configuration
//!
//! # Environment variables
//!
//! All settings can be overridden through environment variables:
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | VERDA_WORK_DIR | /var/lib/verda | Working directory for the local store |
//! | VERDA_STORE_FILE | verda.redb | Store file name inside the work dir |
//! | VERDA_USER_ID | local | User whose documents this client owns |

use std::path::PathBuf;

/// Client configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory holding the local store file
    pub work_dir: String,
    /// Store file name
    pub store_file: String,
    /// User ID used to derive document keys
    pub user_id: String,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("VERDA_WORK_DIR").unwrap_or_else(|_| "/var/lib/verda".into()),
            store_file: std::env::var("VERDA_STORE_FILE").unwrap_or_else(|_| "verda.redb".into()),
            user_id: std::env::var("VERDA_USER_ID").unwrap_or_else(|_| "local".into()),
        }
    }

    /// Full path to the store file
    pub fn store_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join(&self.store_file)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            work_dir: "/var/lib/verda".into(),
            store_file: "verda.redb".into(),
            user_id: "local".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_path_joins_work_dir() {
        let config = Config {
            work_dir: "/tmp/verda-test".into(),
            store_file: "data.redb".into(),
            user_id: "local".into(),
        };
        assert_eq!(
            config.store_path(),
            PathBuf::from("/tmp/verda-test/data.redb")
        );
    }
}
