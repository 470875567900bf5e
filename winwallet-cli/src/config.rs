use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use winwallet_core::ClientConfig;

/// Settings saved between runs. Every field is optional; unset fields fall
/// through to the environment and then the built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub api_url: Option<String>,
    pub socket_url: Option<String>,
    pub ethereum_address: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

/// URL overrides given on the command line.
#[derive(Debug, Clone, Default)]
pub struct UrlOverrides {
    pub api_url: Option<String>,
    pub socket_url: Option<String>,
}

impl UrlOverrides {
    fn apply(&self, config: &mut ClientConfig) {
        if let Some(url) = &self.api_url {
            config.api_url = url.clone();
        }
        if let Some(url) = &self.socket_url {
            config.socket_url = url.clone();
        }
    }
}

impl CliConfig {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("winwallet")
            .join("config.json")
    }

    /// A missing file is an empty config.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write config file {}", path.display()))
    }

    /// Flags beat the environment, which beats this file, which beats the
    /// defaults.
    pub fn client_config(&self, flags: &UrlOverrides) -> ClientConfig {
        self.layered(ClientConfig::apply_env, flags)
    }

    fn layered(
        &self,
        env: impl FnOnce(&mut ClientConfig),
        flags: &UrlOverrides,
    ) -> ClientConfig {
        let mut config = ClientConfig::default();

        UrlOverrides {
            api_url: self.api_url.clone(),
            socket_url: self.socket_url.clone(),
        }
        .apply(&mut config);
        if let Some(secs) = self.request_timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }

        env(&mut config);
        flags.apply(&mut config);
        config
    }
}
