//! TOML configuration.
//!
//! ```toml
//! chains = ["Ethereum"]
//!
//! [server]
//! host = "127.0.0.1"
//! port = 8189
//!
//! [log]
//! level = "info"
//! format = "pretty"
//!
//! [wallet_node.eth]
//! rpc_url = "https://eth.example.org"
//! data_api_url = "https://api.etherscan.io/api"
//! data_api_key = "..."
//! timeout_secs = 15
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::ethereum;
use crate::logging::LogConfig;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8189;
const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    /// Chain names to serve. Unknown names are skipped at startup.
    pub chains: Vec<String>,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub wallet_node: WalletNodeConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WalletNodeConfig {
    pub eth: EthNodeConfig,
}

/// Endpoints of the Ethereum node and its explorer API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EthNodeConfig {
    pub rpc_url: String,
    pub data_api_url: String,
    pub data_api_key: String,
    pub timeout_secs: u64,
}

impl Default for EthNodeConfig {
    fn default() -> Self {
        Self {
            rpc_url: String::new(),
            data_api_url: String::new(),
            data_api_key: String::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl EthNodeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Reads, parses and validates the file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must be non-zero".into()));
        }
        if self.chains.is_empty() {
            return Err(ConfigError::Invalid("at least one chain must be enabled".into()));
        }

        if self.chains.iter().any(|c| c == ethereum::CHAIN_NAME) {
            let eth = &self.wallet_node.eth;
            if eth.rpc_url.trim().is_empty() {
                return Err(ConfigError::Invalid("wallet_node.eth.rpc_url is empty".into()));
            }
            if eth.data_api_url.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "wallet_node.eth.data_api_url is empty".into(),
                ));
            }
            if eth.timeout_secs == 0 {
                return Err(ConfigError::Invalid(
                    "wallet_node.eth.timeout_secs must be non-zero".into(),
                ));
            }
        }

        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
