//! Signing credential and nonce sequencing.
//!
//! # Security
//! - The private key is loaded ONLY from the environment, once, at startup
//! - Keys are never logged or serialized; `Debug` shows the address only
//! - The raw key text is zeroized as soon as the signer is built

use alloy::consensus::TxEnvelope;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::Address;
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use zeroize::Zeroizing;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Where the signing key is read from at startup.
pub const PRIVATE_KEY_ENV_VAR: &str = "GATEWAY_PRIVATE_KEY";

/// The gateway's single signing account.
///
/// Clones share the nonce slot, so every transfer signed by this credential is
/// sequenced through one lock no matter which clone submits it.
#[derive(Clone)]
pub struct Wallet {
    /// secp256k1 key; never leaves this struct.
    signer: PrivateKeySigner,
    /// Network wallet used to sign transaction requests.
    wallet: EthereumWallet,
    /// Next nonce to use; `None` means "re-read from chain".
    nonce: Arc<Mutex<Option<u64>>>,
    /// EIP-155 chain id stamped on every signed request.
    chain_id: u64,
}

impl Wallet {
    /// Build the credential from 64 hex digits, `0x` prefix optional.
    pub fn from_private_key(private_key_hex: &str, chain_id: u64) -> BlockchainResult<Self> {
        let key_hex = private_key_hex.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key: {}", e)))?;

        tracing::info!(
            address = %signer.address(),
            chain_id = chain_id,
            "Signing credential loaded"
        );

        Ok(Self {
            wallet: EthereumWallet::from(signer.clone()),
            signer,
            nonce: Arc::new(Mutex::new(None)),
            chain_id,
        })
    }

    /// Reads `GATEWAY_PRIVATE_KEY`. Returns `Ok(None)` when it is not set so the
    /// gateway can still serve resolution requests.
    pub fn from_env(chain_id: u64) -> BlockchainResult<Option<Self>> {
        match std::env::var(PRIVATE_KEY_ENV_VAR) {
            Ok(key) => {
                let key = Zeroizing::new(key);
                Self::from_private_key(&key, chain_id).map(Some)
            }
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(e) => Err(BlockchainError::Wallet(format!(
                "Environment variable {} unreadable: {}",
                PRIVATE_KEY_ENV_VAR, e
            ))),
        }
    }

    /// Account that pays for and sends every transfer.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Take the nonce slot for the duration of one submission.
    ///
    /// Holding the guard across nonce lookup, signing and broadcast keeps two
    /// concurrent transfers from claiming the same nonce.
    pub async fn lock_nonce(&self) -> MutexGuard<'_, Option<u64>> {
        self.nonce.lock().await
    }

    /// Sign a fully populated transaction request.
    pub async fn sign_transaction(&self, tx: TransactionRequest) -> BlockchainResult<TxEnvelope> {
        tx.build(&self.wallet)
            .await
            .map_err(|e| BlockchainError::Wallet(format!("Could not sign transaction: {}", e)))
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address())
            .field("chain_id", &self.chain_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::U256;

    // Anvil account #0.
    const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_ADDRESS: Address = alloy::primitives::address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

    #[test]
    fn test_key_forms_derive_same_account() {
        for key in [
            TEST_PRIVATE_KEY.to_string(),
            format!("0x{}", TEST_PRIVATE_KEY),
            format!("  {}\n", TEST_PRIVATE_KEY),
        ] {
            let wallet = Wallet::from_private_key(&key, 8453).unwrap();
            assert_eq!(wallet.address(), TEST_ADDRESS);
            assert_eq!(wallet.chain_id(), 8453);
        }
    }

    #[test]
    fn test_rejects_malformed_key() {
        let err = Wallet::from_private_key("not-a-key", 1).unwrap_err();
        assert!(matches!(err, BlockchainError::Wallet(_)));
        assert!(err.to_string().contains("Invalid private key"));
    }

    #[test]
    fn test_debug_hides_key() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY, 1).unwrap();
        let rendered = format!("{:?}", wallet);
        assert!(!rendered.contains(TEST_PRIVATE_KEY));
        assert!(rendered.contains("chain_id"));
    }

    #[tokio::test]
    async fn test_clones_share_nonce_slot() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY, 1).unwrap();
        let other = wallet.clone();

        *wallet.lock_nonce().await = Some(7);
        assert_eq!(*other.lock_nonce().await, Some(7));
    }

    #[tokio::test]
    async fn test_sign_transaction() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY, 31337).unwrap();
        let tx = TransactionRequest::default()
            .with_from(wallet.address())
            .with_to(Address::ZERO)
            .with_value(U256::from(1u64))
            .with_nonce(0)
            .with_chain_id(31337)
            .with_gas_limit(21_000)
            .with_max_fee_per_gas(2_000_000_000)
            .with_max_priority_fee_per_gas(1_000_000_000);

        let envelope = wallet.sign_transaction(tx).await.unwrap();
        assert!(matches!(envelope, TxEnvelope::Eip1559(_)));
    }
}
