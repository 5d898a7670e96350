//! Chain-facing value types and the error every chain call reports.

use alloy::network::TransactionBuilder;
use alloy::rpc::types::TransactionRequest;
use thiserror::Error;

/// EIP-155 chain identifier as reported by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Failure of a read, fee lookup, signing step or broadcast.
///
/// Callers classify these into their own error kinds; [`is_transport`](Self::is_transport)
/// separates "the node never answered" from "the node answered no".
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// Every provider URL failed at the transport or JSON-RPC layer.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// No provider answered within the per-call budget.
    #[error("RPC call exceeded {0}s")]
    Timeout(u64),

    /// The node executed the call and it reverted.
    #[error("Execution reverted: {0}")]
    Reverted(String),

    /// The node refused a transaction (insufficient funds, nonce too low, ...).
    #[error("Transaction rejected: {0}")]
    Rejected(String),

    /// Return data could not be ABI-decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("No receipt after waiting for {0} confirmations")]
    ConfirmationTimeout(u32),

    /// Bad signing key, or the signer refused to sign.
    #[error("Signer error: {0}")]
    Wallet(String),

    #[error("Network fee {current_gwei} gwei is above the {max_gwei} gwei cap")]
    GasPriceTooHigh { current_gwei: u64, max_gwei: u64 },

    /// Provider reports a different chain than the one configured.
    #[error("Provider is on chain {actual}, configured for {expected}")]
    ChainMismatch { expected: u64, actual: u64 },
}

impl BlockchainError {
    /// True when the failure happened before the node could answer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Rpc(_) | Self::Timeout(_))
    }
}

/// Shorthand used by every chain call.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Network fee quote attached to an outgoing transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeParameters {
    /// Pre-London gas price.
    Legacy { gas_price: u128 },
    /// EIP-1559 fee cap and tip.
    Eip1559 {
        max_fee_per_gas: u128,
        max_priority_fee_per_gas: u128,
    },
}

impl FeeParameters {
    /// Highest price per gas this quote can pay, in wei.
    pub fn max_price_per_gas(&self) -> u128 {
        match self {
            Self::Legacy { gas_price } => *gas_price,
            Self::Eip1559 { max_fee_per_gas, .. } => *max_fee_per_gas,
        }
    }

    /// Scale every component by `multiplier`.
    pub fn scaled(self, multiplier: f64) -> Self {
        let scale = |v: u128| (v as f64 * multiplier) as u128;
        match self {
            Self::Legacy { gas_price } => Self::Legacy {
                gas_price: scale(gas_price),
            },
            Self::Eip1559 {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            } => Self::Eip1559 {
                max_fee_per_gas: scale(max_fee_per_gas),
                max_priority_fee_per_gas: scale(max_priority_fee_per_gas),
            },
        }
    }

    /// Attach these fees to a transaction request.
    pub fn apply(&self, tx: TransactionRequest) -> TransactionRequest {
        match *self {
            Self::Legacy { gas_price } => tx.with_gas_price(gas_price),
            Self::Eip1559 {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            } => tx
                .with_max_fee_per_gas(max_fee_per_gas)
                .with_max_priority_fee_per_gas(max_priority_fee_per_gas),
        }
    }
}

/// What the receipt said once the transaction was mined deep enough.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationStatus {
    Confirmed { block_number: u64 },
    /// Transaction was mined and reverted.
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        assert_eq!(BlockchainError::Timeout(10).to_string(), "RPC call exceeded 10s");
        assert!(BlockchainError::Timeout(10).is_transport());

        let capped = BlockchainError::GasPriceTooHigh {
            current_gwei: 600,
            max_gwei: 500,
        };
        assert_eq!(
            capped.to_string(),
            "Network fee 600 gwei is above the 500 gwei cap"
        );
        assert!(!capped.is_transport());
        assert!(!BlockchainError::Reverted("ERC721: invalid token ID".into()).is_transport());
        assert!(BlockchainError::Rpc("down".into()).is_transport());
    }

    #[test]
    fn test_fee_scaling() {
        let fees = FeeParameters::Eip1559 {
            max_fee_per_gas: 100,
            max_priority_fee_per_gas: 10,
        }
        .scaled(1.5);
        assert_eq!(
            fees,
            FeeParameters::Eip1559 {
                max_fee_per_gas: 150,
                max_priority_fee_per_gas: 15,
            }
        );
        assert_eq!(fees.max_price_per_gas(), 150);
    }

    #[test]
    fn test_fee_application() {
        let tx = FeeParameters::Legacy { gas_price: 7 }.apply(TransactionRequest::default());
        assert_eq!(tx.gas_price, Some(7));
        assert_eq!(tx.max_fee_per_gas, None);

        let tx = FeeParameters::Eip1559 {
            max_fee_per_gas: 20,
            max_priority_fee_per_gas: 2,
        }
        .apply(TransactionRequest::default());
        assert_eq!(tx.max_fee_per_gas, Some(20));
        assert_eq!(tx.max_priority_fee_per_gas, Some(2));
    }
}
