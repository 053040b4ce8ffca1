pub mod config;
pub mod find;

use anyhow::Context as _;
use kindred_lib::context::KindredContext;

use crate::cli::VaultArgs;

impl VaultArgs {
    /// Resolve the vault root (current directory when not given) and the
    /// settings location.
    pub fn context(&self) -> anyhow::Result<KindredContext> {
        let root = match &self.vault {
            Some(dir) => std::path::absolute(dir)
                .with_context(|| format!("resolve vault path: {}", dir.display()))?,
            None => std::env::current_dir().context("resolve current directory")?,
        };
        Ok(KindredContext::new(root).with_settings_path(self.config.clone()))
    }
}
