//! Naming types and error definitions.

use alloy::primitives::Address;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::blockchain::BlockchainError;

/// Which naming scheme governs an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NameClass {
    /// Already an account address.
    RawAddress,
    /// Name under the primary naming system (`alice.eth`).
    PrimaryName,
    /// Secondary name registered under the primary system (`alice.base.eth`).
    SecondaryVariantA,
    /// Secondary name on its own chain registry (`alice.base`, `alice`).
    SecondaryVariantB,
    /// Matches no known naming convention.
    Unclassified,
}

impl NameClass {
    /// Stable label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RawAddress => "raw_address",
            Self::PrimaryName => "primary_name",
            Self::SecondaryVariantA => "secondary_variant_a",
            Self::SecondaryVariantB => "secondary_variant_b",
            Self::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for NameClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an identifier could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// Registry reachable, name has no address.
    #[error("Name not found: {0}")]
    NotFound(String),

    /// Transport or RPC failure talking to a registry.
    #[error("Registry unavailable: {0}")]
    RegistryUnavailable(String),

    /// Identifier matches no naming convention.
    #[error("Unsupported name: {0}")]
    UnsupportedScheme(String),
}

impl ResolutionError {
    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::RegistryUnavailable(_) => "registry_unavailable",
            Self::UnsupportedScheme(_) => "unsupported_scheme",
        }
    }

    /// Classify a chain failure seen while looking up `name`.
    ///
    /// Reverts and undecodable return data mean the registry answered without a
    /// record; everything else means it could not be asked.
    pub fn from_chain(name: &str, error: BlockchainError) -> Self {
        match error {
            BlockchainError::Reverted(_) | BlockchainError::Decode(_) => {
                Self::NotFound(name.to_string())
            }
            other => Self::RegistryUnavailable(format!("{}: {}", name, other)),
        }
    }
}

/// Result of resolving one identifier.
pub type ResolutionResult = Result<Address, ResolutionError>;
