//! Gateway configuration types, one struct per TOML section.
//!
//! This module defines the complete configuration structure for the gateway.
//! Every section is `#[serde(default)]`, so a partial file (or none) is valid input.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the network that hosts the primary naming system (ENS).
pub const PRIMARY_NETWORK: &str = "primary";

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, body limits).
    pub listener: ListenerConfig,

    /// Inbound request budget.
    pub timeouts: TimeoutConfig,

    /// JSON-RPC networks keyed by name. `primary` is required.
    pub networks: BTreeMap<String, NetworkConfig>,

    /// Naming systems and their registries.
    pub naming: NamingConfig,

    /// Transfer submission settings.
    pub transfer: TransferConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        let mut networks = BTreeMap::new();
        networks.insert(
            PRIMARY_NETWORK.to_string(),
            NetworkConfig {
                rpc_url: "https://cloudflare-eth.com".to_string(),
                chain_id: 1,
                ..NetworkConfig::default()
            },
        );
        networks.insert(
            "base".to_string(),
            NetworkConfig {
                rpc_url: "https://mainnet.base.org".to_string(),
                chain_id: 8453,
                ..NetworkConfig::default()
            },
        );

        Self {
            listener: ListenerConfig::default(),
            timeouts: TimeoutConfig::default(),
            networks,
            naming: NamingConfig::default(),
            transfer: TransferConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Look up a network by name.
    pub fn network(&self, name: &str) -> Option<&NetworkConfig> {
        self.networks.get(name)
    }
}

/// Where the HTTP server binds and how much it reads.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            max_body_size: 64 * 1024,
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Budget for the read-only routes, in seconds. Transfers are bounded by the
    /// RPC and confirmation timeouts instead.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 60 }
    }
}

/// A JSON-RPC network.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Preferred JSON-RPC endpoint.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs, tried in order for reads.
    pub failover_urls: Vec<String>,

    /// Chain ID (e.g., 1 for Ethereum mainnet, 8453 for Base).
    pub chain_id: u64,

    /// Per-call budget across all endpoints of this network, in seconds.
    pub rpc_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 1,
            rpc_timeout_secs: 10,
        }
    }
}

/// Naming systems: suffixes used for classification and the registries behind them.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Suffix of the primary naming system.
    pub primary_suffix: String,

    /// Compound suffix: a secondary name registered under the primary system.
    pub compound_suffix: String,

    /// Bare suffix of the secondary naming system.
    pub bare_suffix: String,

    /// Suffix appended to dotless names before querying the secondary registry.
    pub default_suffix: String,

    /// Network carrying the primary ENS registry.
    pub primary_network: String,

    /// ENS registry contract address.
    pub ens_registry: String,

    /// Resolver used for compound-suffix names.
    pub compound_resolver: CompoundResolverConfig,

    /// Registries for bare secondary names, tried in order.
    pub secondary_registries: Vec<RegistryConfig>,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            primary_suffix: ".eth".to_string(),
            compound_suffix: ".base.eth".to_string(),
            bare_suffix: ".base".to_string(),
            default_suffix: ".base".to_string(),
            primary_network: PRIMARY_NETWORK.to_string(),
            ens_registry: "0x00000000000C2E074eC69A0dFb2997BA6C7d2e1e".to_string(),
            compound_resolver: CompoundResolverConfig::default(),
            secondary_registries: vec![RegistryConfig {
                network: "base".to_string(),
                contract_address: "0x03c4738ee98ae44591e1a4a4f3cab6641d95dd9a".to_string(),
            }],
        }
    }
}

/// Fixed resolver contract for compound-suffix names.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CompoundResolverConfig {
    /// Network the resolver contract lives on. The default L2 resolver is
    /// deployed on Base, so this must name a Base network for the default address.
    pub network: String,

    /// Resolver contract address.
    pub resolver_address: String,
}

impl Default for CompoundResolverConfig {
    fn default() -> Self {
        Self {
            network: "base".to_string(),
            resolver_address: "0xC6d566A56A1aFf6508b41f6c90ff131615583BCD".to_string(),
        }
    }
}

/// A name registry contract reachable through a configured network.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegistryConfig {
    /// Network name (key into `networks`).
    pub network: String,

    /// Registry contract address exposing `ownerOf(uint256)`.
    pub contract_address: String,
}

/// Transfer submission settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Network transfers are broadcast to.
    pub network: String,

    /// Fee multiplier (1.0 = as quoted, 1.2 = 20% buffer).
    pub gas_price_multiplier: f64,

    /// Transfers are refused while the network fee is above this, in gwei.
    pub max_gas_price_gwei: u64,

    /// Percentage added on top of the gas estimate.
    pub gas_limit_buffer_percent: u64,

    /// Wait for the receipt before answering.
    pub wait_for_confirmation: bool,

    /// Maximum time to wait for confirmation in seconds.
    pub confirmation_timeout_secs: u64,

    /// Number of block confirmations required.
    pub confirmation_blocks: u32,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            network: PRIMARY_NETWORK.to_string(),
            gas_price_multiplier: 1.0,
            max_gas_price_gwei: 500,
            gas_limit_buffer_percent: 20,
            wait_for_confirmation: false,
            confirmation_timeout_secs: 45,
            confirmation_blocks: 1,
        }
    }
}

/// Log and metrics output.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json_logs: bool,

    /// Serve Prometheus metrics on `metrics_address`.
    pub metrics_enabled: bool,

    /// Prometheus listener, `host:port`.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
