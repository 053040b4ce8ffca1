use std::path::{Path, PathBuf};

use crate::config::{SETTINGS_FILE_NAME, STATE_DIR_NAME};
use crate::vault::FsVault;

/// Locations for one vault: its root and where its settings live.
#[derive(Debug, Clone)]
pub struct KindredContext {
    vault_root: PathBuf,
    settings_override: Option<PathBuf>,
}

impl KindredContext {
    pub fn new(vault_root: PathBuf) -> Self {
        Self {
            vault_root,
            settings_override: None,
        }
    }

    /// Use `path` instead of the vault-local settings file.
    #[must_use]
    pub fn with_settings_path(mut self, path: Option<PathBuf>) -> Self {
        self.settings_override = path;
        self
    }

    pub fn vault_root(&self) -> &Path {
        &self.vault_root
    }

    /// `<vault>/.kindred/settings.json` unless overridden.
    pub fn settings_path(&self) -> PathBuf {
        self.settings_override.clone().unwrap_or_else(|| {
            self.vault_root
                .join(STATE_DIR_NAME)
                .join(SETTINGS_FILE_NAME)
        })
    }

    /// A filesystem vault rooted here with `active` as the active note.
    pub fn vault(&self, active: Option<&Path>) -> FsVault {
        let vault = FsVault::new(&self.vault_root);
        match active {
            Some(path) => vault.with_active(path),
            None => vault,
        }
    }
}
