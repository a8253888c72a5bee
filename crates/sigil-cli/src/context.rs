use std::path::PathBuf;

use sigil_identity::IdentityService;
use sigil_store::open_store;

use crate::config::SigilConfig;

/// Resolved configuration shared by every subcommand.
pub struct CliContext {
    pub config: SigilConfig,
    pub config_path: PathBuf,
}

impl CliContext {
    pub fn new(config: SigilConfig, config_path: PathBuf) -> Self {
        Self {
            config,
            config_path,
        }
    }

    /// Open the configured store and wire up the identity service.
    pub fn service(&self) -> anyhow::Result<IdentityService> {
        let store = open_store(self.config.storage.backend, &self.config.storage.path)?;
        Ok(IdentityService::from_config(
            store,
            &self.config.challenge,
            &self.config.policy,
        )?)
    }
}
