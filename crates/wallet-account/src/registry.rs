//! Chain name to adaptor mapping.
//!
//! The registry is built once at startup and shared read-only between
//! request handlers; cloning it is cheap.

use std::collections::HashMap;
use std::sync::Arc;

use crate::adaptor::ChainAdaptor;
use crate::config::Config;
use crate::error::AccountError;
use crate::ethereum::{self, EthereumAdaptor};

/// Constructs an adaptor from the process configuration.
pub type AdaptorFactory = fn(&Config) -> Result<Arc<dyn ChainAdaptor>, AccountError>;

fn ethereum_factory(config: &Config) -> Result<Arc<dyn ChainAdaptor>, AccountError> {
    let adaptor = EthereumAdaptor::from_config(&config.wallet_node.eth)?;
    Ok(Arc::new(adaptor))
}

/// Chains this build knows how to serve.
pub fn known_factories() -> HashMap<&'static str, AdaptorFactory> {
    let mut factories: HashMap<&'static str, AdaptorFactory> = HashMap::new();
    factories.insert(ethereum::CHAIN_NAME, ethereum_factory);
    factories
}

#[derive(Clone)]
pub struct ChainRegistry {
    adaptors: Arc<HashMap<String, Arc<dyn ChainAdaptor>>>,
}

impl ChainRegistry {
    pub fn empty() -> Self {
        Self {
            adaptors: Arc::new(HashMap::new()),
        }
    }

    /// Builds the registry for the chains enabled in `config`.
    ///
    /// A configured chain without a factory is logged and skipped. A
    /// factory failure aborts startup.
    pub fn from_config(config: &Config) -> Result<Self, AccountError> {
        Self::with_factories(config, &known_factories())
    }

    pub fn with_factories(
        config: &Config,
        factories: &HashMap<&'static str, AdaptorFactory>,
    ) -> Result<Self, AccountError> {
        let mut registry = Self::empty();

        for chain in &config.chains {
            let Some(factory) = factories.get(chain.as_str()) else {
                let mut supported: Vec<&str> = factories.keys().copied().collect();
                supported.sort_unstable();
                tracing::error!(chain = %chain, supported = ?supported, "unsupported chain in config");
                continue;
            };

            let adaptor = factory(config).map_err(|e| {
                tracing::error!(chain = %chain, err = %e, "failed to set up chain");
                e
            })?;
            registry.register_arc(chain.clone(), adaptor);
        }

        Ok(registry)
    }

    /// Registers `adaptor` under its own chain name.
    pub fn register<A: ChainAdaptor + 'static>(&mut self, adaptor: A) {
        let name = adaptor.chain_name().to_string();
        self.register_arc(name, Arc::new(adaptor));
    }

    fn register_arc(&mut self, name: String, adaptor: Arc<dyn ChainAdaptor>) {
        Arc::make_mut(&mut self.adaptors).insert(name, adaptor);
    }

    pub fn get(&self, chain: &str) -> Option<&dyn ChainAdaptor> {
        self.adaptors.get(chain).map(AsRef::as_ref)
    }

    pub fn supports(&self, chain: &str) -> bool {
        self.adaptors.contains_key(chain)
    }

    pub fn supported_chains(&self) -> Vec<&str> {
        let mut chains: Vec<&str> = self.adaptors.keys().map(String::as_str).collect();
        chains.sort_unstable();
        chains
    }

    pub fn len(&self) -> usize {
        self.adaptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adaptors.is_empty()
    }
}

impl std::fmt::Debug for ChainRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainRegistry")
            .field("chains", &self.supported_chains())
            .finish()
    }
}
