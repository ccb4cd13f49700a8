use std::env;
use std::path::PathBuf;

/// Environment variable names - single source of truth
pub mod env_vars {
    /// Root directory of the note vault
    pub const VAULT_DIR: &str = "RELATION_SYNC_VAULT_DIR";
    /// RON file with bidi rules and rollup specs
    pub const VIEW_CONFIG: &str = "RELATION_SYNC_VIEW_CONFIG";
}

/// Default values
pub mod defaults {
    pub const VAULT_DIR: &str = "vault";
    /// Resolved against the vault directory
    pub const VIEW_CONFIG_FILE: &str = ".relation-sync.ron";
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub vault_dir: PathBuf,
    pub view_config_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let vault_dir = lookup(env_vars::VAULT_DIR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(defaults::VAULT_DIR));
        let view_config_path = lookup(env_vars::VIEW_CONFIG)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| vault_dir.join(defaults::VIEW_CONFIG_FILE));

        Self {
            vault_dir,
            view_config_path,
        }
    }

    /// Replace the vault directory, keeping an explicitly set view config path
    pub fn with_vault_dir(mut self, vault_dir: PathBuf) -> Self {
        if self.view_config_path == self.vault_dir.join(defaults::VIEW_CONFIG_FILE) {
            self.view_config_path = vault_dir.join(defaults::VIEW_CONFIG_FILE);
        }
        self.vault_dir = vault_dir;
        self
    }
}
