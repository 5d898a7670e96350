//! Per-network JSON-RPC access for registry reads and transfer submission.
//!
//! # Responsibilities
//! - Connect to a network's JSON-RPC endpoints (primary + failovers)
//! - Read chain state (block number, nonce, receipts, fee data)
//! - Execute read-only contract calls for the naming registries
//! - Classify every failure before it leaves this module

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::transports::{TransportError, TransportResult};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainId, FeeParameters};
use crate::config::NetworkConfig;
use crate::observability::metrics;

/// JSON-RPC code geth and most clients use for reverted `eth_call`s.
const EXECUTION_REVERTED_CODE: i64 = 3;

pub(crate) type DynProvider = Arc<dyn Provider + Send + Sync>;

/// Read-only contract access, the seam the registry resolvers are written against.
#[async_trait]
pub trait ContractReader: Send + Sync {
    /// Execute `eth_call` against `to` with ABI-encoded `data`.
    async fn call(&self, to: Address, data: Bytes) -> BlockchainResult<Bytes>;

    /// Name of the network this reader talks to.
    fn network(&self) -> &str;
}

/// One configured network: its endpoints, tried in order, under one per-call timeout.
#[derive(Clone)]
pub struct BlockchainClient {
    /// Network name from configuration.
    name: String,
    /// `rpc_url` first, then `failover_urls`.
    providers: Vec<DynProvider>,
    config: NetworkConfig,
    rpc_timeout: Duration,
}

impl BlockchainClient {
    /// Connect to `config`'s endpoints. An unreachable endpoint or a chain id
    /// mismatch is logged, not fatal.
    pub async fn new(name: &str, config: NetworkConfig) -> BlockchainResult<Self> {
        let rpc_timeout = Duration::from_secs(config.rpc_timeout_secs);

        let primary: url::Url = config.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        let mut providers = vec![connect(primary)];
        for failover in &config.failover_urls {
            match failover.parse() {
                Ok(url) => providers.push(connect(url)),
                Err(_) => {
                    tracing::warn!(network = %name, url = %failover, "Ignoring invalid failover RPC URL")
                }
            }
        }

        let client = Self {
            name: name.to_string(),
            providers,
            config: config.clone(),
            rpc_timeout,
        };

        match client.check_chain_id().await {
            Ok(()) => tracing::info!(
                network = %name,
                rpc_url = %config.rpc_url,
                chain_id = config.chain_id,
                endpoints = client.providers.len(),
                "Network connected"
            ),
            Err(e) => tracing::warn!(
                network = %name,
                error = %e,
                "Network configured but its chain id could not be confirmed"
            ),
        }

        Ok(client)
    }

    /// Client over in-memory providers, one per asserter, skipping the chain id check.
    #[cfg(test)]
    pub(crate) fn mocked(
        name: &str,
        config: NetworkConfig,
        nodes: &[alloy::providers::mock::Asserter],
    ) -> Self {
        let providers = nodes
            .iter()
            .map(|node| {
                Arc::new(ProviderBuilder::new().connect_mocked_client(node.clone())) as DynProvider
            })
            .collect();
        Self {
            name: name.to_string(),
            providers,
            rpc_timeout: Duration::from_secs(config.rpc_timeout_secs),
            config,
        }
    }

    /// Run `op` against each provider in order until one answers.
    ///
    /// Node error responses are final: a revert looks the same on every endpoint.
    async fn with_failover<T, F, Fut>(&self, op: &'static str, f: F) -> BlockchainResult<T>
    where
        F: Fn(DynProvider) -> Fut,
        Fut: Future<Output = TransportResult<T>>,
    {
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.rpc_timeout, f(provider.clone())).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => {
                    if let Some(reason) = revert_reason(&e) {
                        return Err(BlockchainError::Reverted(reason));
                    }
                    tracing::warn!(network = %self.name, provider_idx = i, op, error = %e, "RPC error, trying next provider");
                }
                Err(_) => {
                    tracing::warn!(network = %self.name, provider_idx = i, op, "RPC timeout, trying next provider");
                }
            }
        }
        Err(BlockchainError::Rpc(format!(
            "All providers for '{}' failed: {}",
            self.name, op
        )))
    }

    async fn check_chain_id(&self) -> BlockchainResult<()> {
        let ChainId(actual) = self.get_chain_id().await?;
        if actual == self.config.chain_id {
            Ok(())
        } else {
            Err(BlockchainError::ChainMismatch {
                expected: self.config.chain_id,
                actual,
            })
        }
    }

    pub async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        self.with_failover("eth_chainId", |p| async move { p.get_chain_id().await })
            .await
            .map(ChainId)
    }

    /// Head of the chain; also the health check.
    pub async fn get_block_number(&self) -> BlockchainResult<u64> {
        self.with_failover("eth_blockNumber", |p| async move { p.get_block_number().await })
            .await
    }

    /// Next nonce for `address`, counting its pending transactions.
    pub async fn get_transaction_count(&self, address: Address) -> BlockchainResult<u64> {
        self.with_failover("eth_getTransactionCount", move |p| async move {
            p.get_transaction_count(address).pending().await
        })
        .await
    }

    pub async fn get_transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> BlockchainResult<Option<TransactionReceipt>> {
        self.with_failover("eth_getTransactionReceipt", move |p| async move {
            p.get_transaction_receipt(tx_hash).await
        })
        .await
    }

    /// Current fee quote: EIP-1559 when the chain supports it, legacy gas price otherwise.
    pub async fn fee_parameters(&self) -> BlockchainResult<FeeParameters> {
        let eip1559 = self
            .with_failover("eth_feeHistory", |p| async move {
                p.estimate_eip1559_fees().await
            })
            .await;

        match eip1559 {
            Ok(estimate) => Ok(FeeParameters::Eip1559 {
                max_fee_per_gas: estimate.max_fee_per_gas,
                max_priority_fee_per_gas: estimate.max_priority_fee_per_gas,
            }),
            Err(e) => {
                tracing::debug!(network = %self.name, error = %e, "EIP-1559 fee estimate unavailable, using gas price");
                let gas_price = self
                    .with_failover("eth_gasPrice", |p| async move { p.get_gas_price().await })
                    .await?;
                Ok(FeeParameters::Legacy { gas_price })
            }
        }
    }

    pub async fn estimate_gas(&self, tx: &TransactionRequest) -> BlockchainResult<u64> {
        self.with_failover("eth_estimateGas", |p| {
            let tx = tx.clone();
            async move { p.estimate_gas(tx).await }
        })
        .await
    }

    /// Broadcast a signed, EIP-2718 encoded transaction.
    ///
    /// Only the primary endpoint is used; a broadcast is never repeated.
    pub async fn send_raw_transaction(&self, encoded: &[u8]) -> BlockchainResult<TxHash> {
        let provider = self.providers[0].clone();
        match timeout(self.rpc_timeout, provider.send_raw_transaction(encoded)).await {
            Ok(Ok(pending)) => Ok(*pending.tx_hash()),
            Ok(Err(e)) => match e.as_error_resp() {
                Some(payload) => Err(BlockchainError::Rejected(payload.message.to_string())),
                None => Err(BlockchainError::Rpc(e.to_string())),
            },
            Err(_) => Err(BlockchainError::Timeout(self.config.rpc_timeout_secs)),
        }
    }

    /// Reachability as reported by `/health`; also updates the `gateway_rpc_health` gauge.
    pub async fn is_healthy(&self) -> bool {
        let healthy = self.get_block_number().await.is_ok();
        metrics::record_rpc_health(&self.name, healthy);
        healthy
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl ContractReader for BlockchainClient {
    async fn call(&self, to: Address, data: Bytes) -> BlockchainResult<Bytes> {
        let tx = TransactionRequest::default().with_to(to).with_input(data);
        self.with_failover("eth_call", |p| {
            let tx = tx.clone();
            async move { p.call(tx).await }
        })
        .await
    }

    fn network(&self) -> &str {
        &self.name
    }
}

fn connect(url: url::Url) -> DynProvider {
    Arc::new(ProviderBuilder::new().connect_http(url))
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("network", &self.name)
            .field("chain_id", &self.config.chain_id)
            .field("endpoints", &self.providers.len())
            .finish()
    }
}

/// Extract the revert reason if the node reported an execution revert.
fn revert_reason(error: &TransportError) -> Option<String> {
    let payload = error.as_error_resp()?;
    let message = payload.message.to_string();
    if payload.code == EXECUTION_REVERTED_CODE || message.to_ascii_lowercase().contains("revert") {
        Some(message)
    } else {
        None
    }
}
