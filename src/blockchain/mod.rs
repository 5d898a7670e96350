//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variables (private key) + [networks.*] config
//!     → wallet.rs (key loading, signing, nonce slot)
//!     → client.rs (RPC connection with timeouts and failover, eth_call)
//!     → transaction.rs (build, sign, broadcast, confirm)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts
//! - Graceful degradation when blockchain unreachable

pub mod client;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::{BlockchainClient, ContractReader};
pub use transaction::{SignedSubmitter, TransactionSubmitter, TxBuilder};
pub use types::{BlockchainError, BlockchainResult, ChainId, ConfirmationStatus, FeeParameters};
pub use wallet::Wallet;
