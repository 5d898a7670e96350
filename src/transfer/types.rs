//! Transfer request, outcome and error types.

use alloy::primitives::{Address, TxHash};
use serde::Serialize;
use thiserror::Error;

use crate::blockchain::BlockchainError;
use crate::naming::ResolutionError;
use crate::transfer::amount::AmountError;

/// A transfer as accepted from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    /// Raw address or name.
    pub recipient: String,
    /// Decimal amount in whole units of the asset.
    pub amount: String,
    /// Native value when true, ERC-20 otherwise.
    pub is_native: bool,
    pub token_address: Option<String>,
    /// Caller-supplied token precision; read from the token when absent.
    pub token_decimals: Option<u8>,
}

impl TransferRequest {
    /// Native value transfer.
    pub fn native(recipient: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            amount: amount.into(),
            is_native: true,
            token_address: None,
            token_decimals: None,
        }
    }

    /// ERC-20 transfer.
    pub fn token(
        recipient: impl Into<String>,
        amount: impl Into<String>,
        token_address: impl Into<String>,
    ) -> Self {
        Self {
            recipient: recipient.into(),
            amount: amount.into(),
            is_native: false,
            token_address: Some(token_address.into()),
            token_decimals: None,
        }
    }

    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.token_decimals = Some(decimals);
        self
    }

    /// Label used for logs and metrics.
    pub fn asset_label(&self) -> &'static str {
        if self.is_native {
            "native"
        } else {
            "token"
        }
    }
}

/// Result of a broadcast transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferOutcome {
    pub success: bool,
    pub tx_hash: TxHash,
    /// Resolved recipient, EIP-55 checksummed on the wire.
    #[serde(serialize_with = "serialize_checksummed")]
    pub recipient: Address,
    /// Amount as the client sent it.
    pub amount: String,
    /// Inclusion block, present only when confirmation was awaited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
}

fn serialize_checksummed<S: serde::Serializer>(
    address: &Address,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&address.to_checksum(None))
}

/// Transfer pipeline failures, one variant per stage.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Missing or malformed request fields.
    #[error("{0}")]
    InvalidRequest(String),

    /// Recipient could not be resolved.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Resolution produced an address that must not receive funds.
    #[error("Invalid recipient address: {0}")]
    InvalidRecipient(String),

    /// Fee quote could not be obtained or exceeded the cap.
    #[error("Fee data unavailable: {0}")]
    FeeUnavailable(String),

    /// Token precision could not be read from the contract.
    #[error("Token metadata unavailable: {0}")]
    TokenMetadataUnavailable(String),

    /// Signing or broadcast failed; carries the provider's message.
    #[error("{0}")]
    Submission(String),

    /// The pipeline is not wired to a signing credential.
    #[error("Transfers are disabled: {0}")]
    Disabled(String),
}

impl TransferError {
    /// Short outcome label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::Resolution(e) => e.kind(),
            Self::InvalidRecipient(_) => "invalid_recipient",
            Self::FeeUnavailable(_) => "fee_unavailable",
            Self::TokenMetadataUnavailable(_) => "token_metadata_unavailable",
            Self::Submission(_) => "submission_failed",
            Self::Disabled(_) => "disabled",
        }
    }
}

impl From<AmountError> for TransferError {
    fn from(e: AmountError) -> Self {
        Self::InvalidRequest(e.to_string())
    }
}

impl TransferError {
    pub(crate) fn submission(e: BlockchainError) -> Self {
        match e {
            BlockchainError::Rejected(msg) | BlockchainError::Reverted(msg) => {
                Self::Submission(msg)
            }
            other => Self::Submission(other.to_string()),
        }
    }
}
