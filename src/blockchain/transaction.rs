//! Transaction building, signing, broadcast and confirmation monitoring.
//!
//! # Responsibilities
//! - Build native-value and ERC-20 transfer requests with fees attached
//! - Fill nonce, gas limit and chain id, sign and broadcast
//! - Monitor confirmations
//!
//! A broadcast is never retried here: once a signed transaction may have reached
//! the mempool, resending is the caller's call.

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol;
use alloy::sol_types::SolCall;
use alloy::eips::eip2718::Encodable2718;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{interval, timeout};

use crate::blockchain::client::{BlockchainClient, ContractReader};
use crate::blockchain::types::{
    BlockchainError, BlockchainResult, ConfirmationStatus, FeeParameters,
};
use crate::blockchain::wallet::Wallet;
use crate::config::TransferConfig;

sol! {
    /// Minimal ERC-20 surface used for token transfers.
    interface IERC20 {
        function transfer(address to, uint256 amount) external returns (bool);
        function decimals() external view returns (uint8);
    }
}

const WEI_PER_GWEI: u128 = 1_000_000_000;

/// `estimate` plus `percent` percent headroom.
fn buffered_gas_limit(estimate: u64, percent: u64) -> u64 {
    estimate.saturating_add(estimate.saturating_mul(percent) / 100)
}

/// Builders for the two kinds of transfer the gateway sends.
pub struct TxBuilder;

impl TxBuilder {
    /// Plain value transfer of `value` wei to `to`.
    pub fn native_transfer(to: Address, value: U256, fees: &FeeParameters) -> TransactionRequest {
        fees.apply(TransactionRequest::default().with_to(to).with_value(value))
    }

    /// `token.transfer(to, amount)` with `amount` already in the token's base units.
    pub fn token_transfer(
        token: Address,
        to: Address,
        amount: U256,
        fees: &FeeParameters,
    ) -> TransactionRequest {
        let data = IERC20::transferCall { to, amount }.abi_encode();
        fees.apply(
            TransactionRequest::default()
                .with_to(token)
                .with_value(U256::ZERO)
                .with_input(Bytes::from(data)),
        )
    }
}

/// Everything the transfer pipeline needs from the chain.
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    /// Current fee quote, after multiplier and cap.
    async fn fee_parameters(&self) -> BlockchainResult<FeeParameters>;

    /// Decimal precision declared by an ERC-20 contract.
    async fn token_decimals(&self, token: Address) -> BlockchainResult<u8>;

    /// Sign and broadcast a request built by [`TxBuilder`].
    async fn submit(&self, tx: TransactionRequest) -> BlockchainResult<TxHash>;

    /// Wait until the transaction is mined with the required depth.
    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> BlockchainResult<ConfirmationStatus>;
}

/// Submitter backed by a live network and the process signing credential.
pub struct SignedSubmitter {
    client: BlockchainClient,
    wallet: Wallet,
    config: TransferConfig,
}

impl SignedSubmitter {
    /// Create a new submitter.
    pub fn new(client: BlockchainClient, wallet: Wallet, config: TransferConfig) -> Self {
        Self {
            client,
            wallet,
            config,
        }
    }

    /// Sending account.
    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    async fn sign_and_send(&self, tx: TransactionRequest) -> BlockchainResult<TxHash> {
        let estimate = self.client.estimate_gas(&tx).await?;
        let gas_limit = buffered_gas_limit(estimate, self.config.gas_limit_buffer_percent);

        let envelope = self
            .wallet
            .sign_transaction(tx.with_gas_limit(gas_limit))
            .await?;
        let encoded = envelope.encoded_2718();

        let tx_hash = self.client.send_raw_transaction(&encoded).await?;
        tracing::debug!(tx_hash = %tx_hash, gas_limit, "Transaction broadcast");
        Ok(tx_hash)
    }
}

#[async_trait]
impl TransactionSubmitter for SignedSubmitter {
    async fn fee_parameters(&self) -> BlockchainResult<FeeParameters> {
        let fees = self.client.fee_parameters().await?;

        let price_gwei = fees.max_price_per_gas() / WEI_PER_GWEI;
        if price_gwei > self.config.max_gas_price_gwei as u128 {
            return Err(BlockchainError::GasPriceTooHigh {
                current_gwei: price_gwei as u64,
                max_gwei: self.config.max_gas_price_gwei,
            });
        }

        Ok(fees.scaled(self.config.gas_price_multiplier))
    }

    async fn token_decimals(&self, token: Address) -> BlockchainResult<u8> {
        let data = self
            .client
            .call(token, Bytes::from(IERC20::decimalsCall {}.abi_encode()))
            .await?;
        IERC20::decimalsCall::abi_decode_returns(&data)
            .map_err(|e| BlockchainError::Decode(format!("decimals() on {}: {}", token, e)))
    }

    async fn submit(&self, tx: TransactionRequest) -> BlockchainResult<TxHash> {
        let from = self.wallet.address();
        let mut next_nonce = self.wallet.lock_nonce().await;

        let nonce = match *next_nonce {
            Some(nonce) => nonce,
            None => self.client.get_transaction_count(from).await?,
        };

        let tx = tx
            .with_from(from)
            .with_nonce(nonce)
            .with_chain_id(self.wallet.chain_id());

        let result = self.sign_and_send(tx).await;

        // On failure the node's view of the account is the only safe source.
        *next_nonce = match result {
            Ok(_) => Some(nonce + 1),
            Err(_) => None,
        };
        result
    }

    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> BlockchainResult<ConfirmationStatus> {
        let required_confirmations = self.config.confirmation_blocks;
        let timeout_duration = Duration::from_secs(self.config.confirmation_timeout_secs);
        let poll_interval = Duration::from_secs(2);

        let result = timeout(timeout_duration, async {
            let mut ticker = interval(poll_interval);

            loop {
                ticker.tick().await;

                let receipt = match self.client.get_transaction_receipt(tx_hash).await? {
                    Some(r) => r,
                    None => {
                        tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                        continue;
                    }
                };

                if !receipt.status() {
                    return Ok(ConfirmationStatus::Failed(format!(
                        "Transaction {} reverted",
                        tx_hash
                    )));
                }

                let current_block = self.client.get_block_number().await?;
                let tx_block = receipt.block_number.unwrap_or(current_block);
                // The inclusion block counts as the first confirmation.
                let confirmations = current_block.saturating_sub(tx_block) as u32 + 1;

                if confirmations >= required_confirmations {
                    return Ok(ConfirmationStatus::Confirmed {
                        block_number: tx_block,
                    });
                }

                tracing::debug!(
                    tx_hash = %tx_hash,
                    confirmations = confirmations,
                    required = required_confirmations,
                    "Waiting for confirmations"
                );
            }
        })
        .await;

        match result {
            Ok(status) => status,
            Err(_) => Err(BlockchainError::ConfirmationTimeout(required_confirmations)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkConfig;
    use alloy::primitives::{address, B256, U128, U64};
    use alloy::providers::mock::Asserter;

    // Anvil account #0.
    const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const GWEI: u128 = 1_000_000_000;

    const FEES: FeeParameters = FeeParameters::Eip1559 {
        max_fee_per_gas: 30_000_000_000,
        max_priority_fee_per_gas: 1_000_000_000,
    };

    #[test]
    fn test_native_transfer_request() {
        let to = address!("000000000000000000000000000000000000dEaD");
        let tx = TxBuilder::native_transfer(to, U256::from(5u64), &FEES);

        assert_eq!(tx.to, Some(to.into()));
        assert_eq!(tx.value, Some(U256::from(5u64)));
        assert_eq!(tx.max_fee_per_gas, Some(30_000_000_000));
        assert!(tx.input.input().is_none());
        assert_eq!(tx.nonce, None);
    }

    #[test]
    fn test_token_transfer_encodes_calldata() {
        let token = address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
        let to = address!("000000000000000000000000000000000000dEaD");
        let tx = TxBuilder::token_transfer(token, to, U256::from(2_500_000u64), &FEES);

        assert_eq!(tx.to, Some(token.into()));
        assert_eq!(tx.value, Some(U256::ZERO));

        let input = tx.input.input().unwrap();
        assert_eq!(&input[..4], IERC20::transferCall::SELECTOR.as_slice());
        let decoded = IERC20::transferCall::abi_decode(input).unwrap();
        assert_eq!(decoded.to, to);
        assert_eq!(decoded.amount, U256::from(2_500_000u64));
    }

    #[test]
    fn test_transfer_selector() {
        // transfer(address,uint256)
        assert_eq!(IERC20::transferCall::SELECTOR, [0xa9, 0x05, 0x9c, 0xbb]);
    }

    fn signer_on(node: &Asserter, config: TransferConfig) -> SignedSubmitter {
        let network = NetworkConfig {
            rpc_url: "http://127.0.0.1:1".to_string(),
            failover_urls: Vec::new(),
            chain_id: 31337,
            rpc_timeout_secs: 2,
        };
        let client = BlockchainClient::mocked("primary", network, &[node.clone()]);
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY, 31337).unwrap();
        SignedSubmitter::new(client, wallet, config)
    }

    fn dead_transfer() -> TransactionRequest {
        TxBuilder::native_transfer(
            address!("000000000000000000000000000000000000dEaD"),
            U256::from(1u64),
            &FeeParameters::Legacy { gas_price: GWEI },
        )
    }

    #[test]
    fn test_gas_limit_buffer() {
        assert_eq!(buffered_gas_limit(21_000, 20), 25_200);
        assert_eq!(buffered_gas_limit(21_000, 0), 21_000);
        assert_eq!(buffered_gas_limit(u64::MAX, 20), u64::MAX);
    }

    #[tokio::test]
    async fn test_concurrent_submits_take_consecutive_nonces() {
        let node = Asserter::new();
        let submitter = signer_on(&node, TransferConfig::default());

        // One nonce lookup, then estimate + broadcast per transfer, in lock order.
        node.push_success(&U64::from(7));
        node.push_success(&U64::from(21_000));
        node.push_success(&B256::repeat_byte(0x01));
        node.push_success(&U64::from(21_000));
        node.push_success(&B256::repeat_byte(0x02));

        let (first, second) = tokio::join!(
            submitter.submit(dead_transfer()),
            submitter.submit(dead_transfer())
        );
        assert_eq!(first.unwrap(), B256::repeat_byte(0x01));
        assert_eq!(second.unwrap(), B256::repeat_byte(0x02));

        // Nonces 7 and 8 were used; the chain was asked only once.
        assert_eq!(*submitter.wallet.lock_nonce().await, Some(9));
        assert!(node.read_q().is_empty());
    }

    #[tokio::test]
    async fn test_failed_broadcast_rereads_nonce() {
        let node = Asserter::new();
        let submitter = signer_on(&node, TransferConfig::default());

        node.push_success(&U64::from(4));
        node.push_success(&U64::from(21_000));
        node.push_failure_msg("insufficient funds for gas * price + value");
        let err = submitter.submit(dead_transfer()).await.unwrap_err();
        assert!(matches!(err, BlockchainError::Rejected(_)));
        assert_eq!(*submitter.wallet.lock_nonce().await, None);

        node.push_success(&U64::from(4));
        node.push_success(&U64::from(21_000));
        node.push_success(&B256::repeat_byte(0x03));
        submitter.submit(dead_transfer()).await.unwrap();
        assert_eq!(*submitter.wallet.lock_nonce().await, Some(5));
    }

    #[tokio::test]
    async fn test_fee_cap_applies_to_quoted_price() {
        let node = Asserter::new();
        let config = TransferConfig {
            gas_price_multiplier: 1.5,
            max_gas_price_gwei: 500,
            ..TransferConfig::default()
        };
        let submitter = signer_on(&node, config);

        // No fee history on this node, so the legacy gas price is quoted.
        node.push_failure_msg("method not found");
        node.push_success(&U128::from(400 * GWEI));
        let fees = submitter.fee_parameters().await.unwrap();
        assert_eq!(fees, FeeParameters::Legacy { gas_price: 600 * GWEI });

        node.push_failure_msg("method not found");
        node.push_success(&U128::from(600 * GWEI));
        let err = submitter.fee_parameters().await.unwrap_err();
        assert!(matches!(
            err,
            BlockchainError::GasPriceTooHigh {
                current_gwei: 600,
                max_gwei: 500
            }
        ));
    }
}
