//! Resolution dispatcher.
//!
//! Classifies an identifier and hands it to exactly one resolver. There is no
//! fallback across naming systems: once a class is known, its resolver's answer
//! is final.

use std::sync::Arc;
use std::time::Instant;

use crate::naming::address::parse_address;
use crate::naming::classifier::NameClassifier;
use crate::naming::resolver::RegistryResolver;
use crate::naming::types::{NameClass, ResolutionError, ResolutionResult};
use crate::observability::metrics;

/// Shared resolution service used by the HTTP handlers and the transfer pipeline.
#[derive(Clone)]
pub struct ResolutionDispatcher {
    classifier: NameClassifier,
    primary: Option<Arc<dyn RegistryResolver>>,
    variant_a: Option<Arc<dyn RegistryResolver>>,
    variant_b: Option<Arc<dyn RegistryResolver>>,
}

impl ResolutionDispatcher {
    /// Dispatcher with no resolvers; only raw addresses resolve.
    pub fn new(classifier: NameClassifier) -> Self {
        Self {
            classifier,
            primary: None,
            variant_a: None,
            variant_b: None,
        }
    }

    pub fn with_primary(mut self, resolver: Arc<dyn RegistryResolver>) -> Self {
        self.primary = Some(resolver);
        self
    }

    pub fn with_variant_a(mut self, resolver: Arc<dyn RegistryResolver>) -> Self {
        self.variant_a = Some(resolver);
        self
    }

    pub fn with_variant_b(mut self, resolver: Arc<dyn RegistryResolver>) -> Self {
        self.variant_b = Some(resolver);
        self
    }

    /// The classifier in use.
    pub fn classifier(&self) -> &NameClassifier {
        &self.classifier
    }

    /// Resolve an identifier, returning the class it was routed by.
    pub async fn resolve_classified(&self, identifier: &str) -> (NameClass, ResolutionResult) {
        let start = Instant::now();
        let class = self.classifier.classify(identifier);
        let trimmed = identifier.trim();

        let result = match class {
            NameClass::RawAddress => parse_address(trimmed)
                .ok_or_else(|| ResolutionError::UnsupportedScheme(trimmed.to_string())),
            NameClass::PrimaryName => self.delegate(&self.primary, class, trimmed).await,
            NameClass::SecondaryVariantA => self.delegate(&self.variant_a, class, trimmed).await,
            NameClass::SecondaryVariantB => self.delegate(&self.variant_b, class, trimmed).await,
            NameClass::Unclassified => Err(ResolutionError::UnsupportedScheme(trimmed.to_string())),
        };

        match &result {
            Ok(address) => {
                tracing::info!(identifier = %trimmed, scheme = %class, address = %address, "Identifier resolved");
            }
            Err(e) => {
                tracing::info!(identifier = %trimmed, scheme = %class, error = %e, "Identifier not resolved");
            }
        }
        metrics::record_resolution(
            class.as_str(),
            result.as_ref().map(|_| "resolved").unwrap_or_else(|e| e.kind()),
            start,
        );

        (class, result)
    }

    /// Resolve an identifier to an address.
    pub async fn resolve_identifier(&self, identifier: &str) -> ResolutionResult {
        self.resolve_classified(identifier).await.1
    }

    async fn delegate(
        &self,
        resolver: &Option<Arc<dyn RegistryResolver>>,
        class: NameClass,
        name: &str,
    ) -> ResolutionResult {
        match resolver {
            Some(resolver) => resolver.resolve(name).await,
            None => Err(ResolutionError::UnsupportedScheme(format!(
                "{} ({} resolution is not configured)",
                name, class
            ))),
        }
    }
}
