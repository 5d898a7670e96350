//! Identifier classification.
//!
//! Rules, first match wins:
//! 1. valid account address → `RawAddress`
//! 2. compound suffix (`.base.eth`) → `SecondaryVariantA`
//! 3. primary suffix (`.eth`) → `PrimaryName`
//! 4. contains the bare suffix (`.base`) or has no dot → `SecondaryVariantB`
//! 5. anything else → `Unclassified`
//!
//! The compound suffix ends with the primary one, so it has to be tested first.

use crate::config::NamingConfig;
use crate::naming::address::is_valid_address;
use crate::naming::types::NameClass;

/// Pure, table-driven classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameClassifier {
    primary_suffix: String,
    compound_suffix: String,
    bare_suffix: String,
}

impl NameClassifier {
    /// Build a classifier from explicit suffixes.
    pub fn new(
        primary_suffix: impl Into<String>,
        compound_suffix: impl Into<String>,
        bare_suffix: impl Into<String>,
    ) -> Self {
        Self {
            primary_suffix: primary_suffix.into().to_lowercase(),
            compound_suffix: compound_suffix.into().to_lowercase(),
            bare_suffix: bare_suffix.into().to_lowercase(),
        }
    }

    /// Build a classifier from the naming configuration.
    pub fn from_config(config: &NamingConfig) -> Self {
        Self::new(
            &config.primary_suffix,
            &config.compound_suffix,
            &config.bare_suffix,
        )
    }

    /// Classify an identifier. Never fails.
    pub fn classify(&self, identifier: &str) -> NameClass {
        let trimmed = identifier.trim();
        if trimmed.is_empty() {
            return NameClass::Unclassified;
        }
        if is_valid_address(trimmed) {
            return NameClass::RawAddress;
        }

        let name = normalize_name(trimmed);
        if name.ends_with(&self.compound_suffix) {
            NameClass::SecondaryVariantA
        } else if name.ends_with(&self.primary_suffix) {
            NameClass::PrimaryName
        } else if name.contains(&self.bare_suffix) || !name.contains('.') {
            NameClass::SecondaryVariantB
        } else {
            NameClass::Unclassified
        }
    }
}

impl Default for NameClassifier {
    fn default() -> Self {
        Self::from_config(&NamingConfig::default())
    }
}

/// Canonical text form used for hashing and registry lookups.
///
/// Trims and lower-cases (Unicode-aware), nothing more. ENSIP-15 mapping is not
/// applied, so a name whose registered form depends on it hashes differently
/// here and resolves as not found. Plain ASCII labels normalize exactly.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
