//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (registries and transfers reference existing networks)
//! - Validate value ranges (timeouts > 0, addresses well-formed)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::{GatewayConfig, PRIMARY_NETWORK};
use crate::naming::address::is_valid_address;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if config.listener.max_body_size == 0 {
        errors.push(ValidationError::new("listener.max_body_size", "must be > 0"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be > 0"));
    }

    validate_networks(config, &mut errors);
    validate_naming(config, &mut errors);
    validate_transfer(config, &mut errors);

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "'{}' is not a socket address",
                config.observability.metrics_address
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_networks(config: &GatewayConfig, errors: &mut Vec<ValidationError>) {
    if !config.networks.contains_key(PRIMARY_NETWORK) {
        errors.push(ValidationError::new(
            "networks",
            format!("network '{}' must be configured", PRIMARY_NETWORK),
        ));
    }

    for (name, network) in &config.networks {
        let field = format!("networks.{}", name);
        if url::Url::parse(&network.rpc_url).is_err() {
            errors.push(ValidationError::new(
                format!("{}.rpc_url", field),
                format!("'{}' is not a valid URL", network.rpc_url),
            ));
        }
        for failover in &network.failover_urls {
            if url::Url::parse(failover).is_err() {
                errors.push(ValidationError::new(
                    format!("{}.failover_urls", field),
                    format!("'{}' is not a valid URL", failover),
                ));
            }
        }
        if network.chain_id == 0 {
            errors.push(ValidationError::new(format!("{}.chain_id", field), "must be > 0"));
        }
        if network.rpc_timeout_secs == 0 {
            errors.push(ValidationError::new(
                format!("{}.rpc_timeout_secs", field),
                "must be > 0",
            ));
        }
    }
}

fn validate_naming(config: &GatewayConfig, errors: &mut Vec<ValidationError>) {
    let naming = &config.naming;

    for (field, suffix) in [
        ("naming.primary_suffix", &naming.primary_suffix),
        ("naming.compound_suffix", &naming.compound_suffix),
        ("naming.bare_suffix", &naming.bare_suffix),
        ("naming.default_suffix", &naming.default_suffix),
    ] {
        if suffix.len() < 2 || !suffix.starts_with('.') {
            errors.push(ValidationError::new(
                field,
                format!("'{}' must start with '.' and name a label", suffix),
            ));
        }
    }

    require_network(config, "naming.primary_network", &naming.primary_network, errors);
    require_address("naming.ens_registry", &naming.ens_registry, errors);

    require_network(
        config,
        "naming.compound_resolver.network",
        &naming.compound_resolver.network,
        errors,
    );
    require_address(
        "naming.compound_resolver.resolver_address",
        &naming.compound_resolver.resolver_address,
        errors,
    );

    for (i, registry) in naming.secondary_registries.iter().enumerate() {
        require_network(
            config,
            &format!("naming.secondary_registries[{}].network", i),
            &registry.network,
            errors,
        );
        require_address(
            &format!("naming.secondary_registries[{}].contract_address", i),
            &registry.contract_address,
            errors,
        );
    }
}

fn validate_transfer(config: &GatewayConfig, errors: &mut Vec<ValidationError>) {
    let transfer = &config.transfer;

    require_network(config, "transfer.network", &transfer.network, errors);

    if !transfer.gas_price_multiplier.is_finite() || transfer.gas_price_multiplier <= 0.0 {
        errors.push(ValidationError::new(
            "transfer.gas_price_multiplier",
            "must be a positive number",
        ));
    }
    if transfer.max_gas_price_gwei == 0 {
        errors.push(ValidationError::new("transfer.max_gas_price_gwei", "must be > 0"));
    }
    if transfer.wait_for_confirmation && transfer.confirmation_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "transfer.confirmation_timeout_secs",
            "must be > 0 when waiting for confirmation",
        ));
    }
}

fn require_network(
    config: &GatewayConfig,
    field: &str,
    name: &str,
    errors: &mut Vec<ValidationError>,
) {
    if config.network(name).is_none() {
        errors.push(ValidationError::new(
            field,
            format!("unknown network '{}'", name),
        ));
    }
}

fn require_address(field: &str, value: &str, errors: &mut Vec<ValidationError>) {
    if !is_valid_address(value) {
        errors.push(ValidationError::new(
            field,
            format!("'{}' is not a valid address", value),
        ));
    }
}
