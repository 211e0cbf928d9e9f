//! Node configuration.
//!
//! Handles loading and validation of node configuration from
//! config files and command-line arguments.

use repdao_governance::GovernanceParams;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Node configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Node name
    pub name: String,
    /// Where the governance snapshot is persisted between commands
    pub state_file: PathBuf,
    /// Number of development accounts addressable by index
    pub dev_accounts: u32,
    /// Reward model
    pub governance: GovernanceParams,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            name: "repdao-node".to_string(),
            state_file: PathBuf::from("./data/governance.json"),
            dev_accounts: 10,
            governance: GovernanceParams::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl NodeConfig {
    /// Load configuration from file.
    /// Path is validated to prevent directory traversal attacks.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        check_path(path)?;

        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        let config: NodeConfig = toml::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;
        Ok(config)
    }

    /// Save configuration to file.
    /// Path is validated to prevent directory traversal attacks.
    pub fn to_file(&self, path: &Path) -> anyhow::Result<()> {
        check_path(path)?;

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .map_err(|e| anyhow::anyhow!("Failed to write config file '{}': {}", path.display(), e))?;
        Ok(())
    }

    /// Validate configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.governance
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid governance config: {}", e))?;

        if self.dev_accounts == 0 {
            anyhow::bail!("dev_accounts must be at least 1");
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            anyhow::bail!("Unknown log format '{}' (expected pretty|json)", self.logging.format);
        }

        Ok(())
    }
}

fn check_path(path: &Path) -> anyhow::Result<()> {
    if path.to_string_lossy().contains("..") {
        anyhow::bail!("Invalid path: directory traversal detected");
    }
    Ok(())
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive
    pub level: String,
    /// Log to file
    pub log_file: Option<PathBuf>,
    /// Log format (json|pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_file: None,
            format: "pretty".to_string(),
        }
    }
}
