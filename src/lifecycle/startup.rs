//! Startup orchestration.
//!
//! # Responsibilities
//! - Connect one RPC client per configured network
//! - Build the resolvers and the dispatcher from `[naming]`
//! - Load the signing credential and wire the transfer pipeline
//!
//! # Design Decisions
//! - Fail fast on configuration that cannot work (unknown network, bad address, bad key)
//! - An unreachable RPC endpoint is NOT fatal: requests fail until it recovers
//! - A missing credential disables transfers; resolution keeps working

use alloy::primitives::Address;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

use crate::blockchain::{
    BlockchainClient, BlockchainError, ContractReader, SignedSubmitter, Wallet,
};
use crate::config::GatewayConfig;
use crate::naming::{
    parse_address, NameClassifier, PrimaryNameResolver, RegistryTarget, ResolutionDispatcher,
    SecondaryVariantAResolver, SecondaryVariantBResolver,
};
use crate::transfer::TransferOrchestrator;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Network '{name}' could not be initialized: {source}")]
    Network {
        name: String,
        #[source]
        source: BlockchainError,
    },

    #[error("Network '{0}' is referenced but not configured")]
    UnknownNetwork(String),

    #[error("{field}: invalid address '{value}'")]
    InvalidAddress { field: String, value: String },

    #[error("Signing credential could not be loaded: {0}")]
    Wallet(#[source] BlockchainError),
}

/// Everything the HTTP layer serves from.
pub struct Services {
    pub dispatcher: ResolutionDispatcher,
    /// `None` when no signing credential is configured.
    pub transfers: Option<Arc<TransferOrchestrator>>,
    pub networks: Vec<BlockchainClient>,
}

/// Build all services in dependency order: networks, resolvers, signer.
pub async fn build_services(config: &GatewayConfig) -> Result<Services, StartupError> {
    let mut clients = BTreeMap::new();
    for (name, network) in &config.networks {
        let client = BlockchainClient::new(name, network.clone())
            .await
            .map_err(|source| StartupError::Network {
                name: name.clone(),
                source,
            })?;
        clients.insert(name.clone(), client);
    }

    let reader = |name: &str| -> Result<Arc<dyn ContractReader>, StartupError> {
        clients
            .get(name)
            .cloned()
            .map(|c| Arc::new(c) as Arc<dyn ContractReader>)
            .ok_or_else(|| StartupError::UnknownNetwork(name.to_string()))
    };

    let naming = &config.naming;
    let primary = PrimaryNameResolver::new(
        reader(&naming.primary_network)?,
        address("naming.ens_registry", &naming.ens_registry)?,
    );
    let variant_a = SecondaryVariantAResolver::new(
        reader(&naming.compound_resolver.network)?,
        address(
            "naming.compound_resolver.resolver_address",
            &naming.compound_resolver.resolver_address,
        )?,
    );
    let mut targets = Vec::with_capacity(naming.secondary_registries.len());
    for (i, registry) in naming.secondary_registries.iter().enumerate() {
        targets.push(RegistryTarget {
            reader: reader(&registry.network)?,
            contract: address(
                &format!("naming.secondary_registries[{}].contract_address", i),
                &registry.contract_address,
            )?,
        });
    }
    let variant_b = SecondaryVariantBResolver::new(targets, naming.default_suffix.clone());

    let dispatcher = ResolutionDispatcher::new(NameClassifier::from_config(naming))
        .with_primary(Arc::new(primary))
        .with_variant_a(Arc::new(variant_a))
        .with_variant_b(Arc::new(variant_b));

    let transfers = build_transfers(config, &clients, dispatcher.clone())?;

    Ok(Services {
        dispatcher,
        transfers,
        networks: clients.into_values().collect(),
    })
}

fn build_transfers(
    config: &GatewayConfig,
    clients: &BTreeMap<String, BlockchainClient>,
    dispatcher: ResolutionDispatcher,
) -> Result<Option<Arc<TransferOrchestrator>>, StartupError> {
    let client = clients
        .get(&config.transfer.network)
        .cloned()
        .ok_or_else(|| StartupError::UnknownNetwork(config.transfer.network.clone()))?;

    let wallet = match Wallet::from_env(client.config().chain_id).map_err(StartupError::Wallet)? {
        Some(wallet) => wallet,
        None => {
            tracing::warn!("No signing credential configured, transfers are disabled");
            return Ok(None);
        }
    };

    tracing::info!(
        address = %wallet.address(),
        network = %config.transfer.network,
        "Transfers enabled"
    );
    let submitter = SignedSubmitter::new(client, wallet, config.transfer.clone());
    Ok(Some(Arc::new(TransferOrchestrator::new(
        dispatcher,
        Arc::new(submitter),
        config.transfer.clone(),
    ))))
}

fn address(field: &str, value: &str) -> Result<Address, StartupError> {
    parse_address(value).ok_or_else(|| StartupError::InvalidAddress {
        field: field.to_string(),
        value: value.to_string(),
    })
}
