//! Transfer pipeline.
//!
//! # Responsibilities
//! - Validate the request before any network access
//! - Resolve the recipient through the shared dispatcher
//! - Quote fees, build, sign and broadcast
//! - Optionally wait for the inclusion block
//!
//! Each stage maps its own failure into [`TransferError`]; a failing stage stops
//! the pipeline, so a failed resolution or fee quote never reaches the signer.
//!
//! Broadcast and confirmation run on their own task. Dropping the caller's future
//! (client disconnect, server timeout) never cancels a submission that has started.

use alloy::primitives::{Address, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use std::sync::Arc;
use tracing::Instrument;

use crate::blockchain::{ConfirmationStatus, FeeParameters, TransactionSubmitter, TxBuilder};
use crate::config::TransferConfig;
use crate::naming::{is_zero_address, parse_address, ResolutionDispatcher};
use crate::observability::metrics;
use crate::transfer::amount::{self, NATIVE_DECIMALS};
use crate::transfer::types::{TransferError, TransferOutcome, TransferRequest};

/// Asset leg of a validated request.
enum Asset {
    Native,
    Token {
        contract: Address,
        decimals: Option<u8>,
    },
}

/// Drives a [`TransferRequest`] from validation to broadcast.
pub struct TransferOrchestrator {
    dispatcher: ResolutionDispatcher,
    submitter: Arc<dyn TransactionSubmitter>,
    config: TransferConfig,
}

impl TransferOrchestrator {
    /// The submitter owns the signing credential; the orchestrator never sees it.
    pub fn new(
        dispatcher: ResolutionDispatcher,
        submitter: Arc<dyn TransactionSubmitter>,
        config: TransferConfig,
    ) -> Self {
        Self {
            dispatcher,
            submitter,
            config,
        }
    }

    /// Run the whole pipeline for one request.
    pub async fn submit_transfer(
        &self,
        request: &TransferRequest,
    ) -> Result<TransferOutcome, TransferError> {
        let result = self.run(request).await;

        match &result {
            Ok(outcome) => {
                metrics::record_transfer(request.asset_label(), "submitted");
                tracing::info!(
                    recipient = %outcome.recipient,
                    amount = %outcome.amount,
                    asset = request.asset_label(),
                    tx_hash = %outcome.tx_hash,
                    "Transfer submitted"
                );
            }
            Err(e) => {
                metrics::record_transfer(request.asset_label(), e.kind());
                tracing::warn!(
                    recipient = %request.recipient,
                    amount = %request.amount,
                    asset = request.asset_label(),
                    error = %e,
                    "Transfer failed"
                );
            }
        }
        result
    }

    async fn run(&self, request: &TransferRequest) -> Result<TransferOutcome, TransferError> {
        // 1. Validate
        let asset = Self::validate(request)?;

        // 2. Resolve
        let recipient = self
            .dispatcher
            .resolve_identifier(&request.recipient)
            .await?;

        // 3. Re-validate
        if is_zero_address(&recipient) {
            return Err(TransferError::InvalidRecipient(format!(
                "{} resolved to the zero address",
                request.recipient.trim()
            )));
        }

        // 4. Fees
        let fees = self
            .submitter
            .fee_parameters()
            .await
            .map_err(|e| TransferError::FeeUnavailable(e.to_string()))?;

        // 5. Build
        let tx = match asset {
            Asset::Native => {
                let value = amount::to_base_units(&request.amount, NATIVE_DECIMALS)?;
                TxBuilder::native_transfer(recipient, value, &fees)
            }
            Asset::Token { contract, decimals } => {
                let units = self.token_units(request, contract, decimals).await?;
                TxBuilder::token_transfer(contract, recipient, units, &fees)
            }
        };
        log_fees(&fees);

        // 6-7. Sign, broadcast, confirm
        let stage = tokio::spawn(
            broadcast(
                Arc::clone(&self.submitter),
                tx,
                self.config.wait_for_confirmation,
            )
            .in_current_span(),
        );
        let (tx_hash, block_number) = stage
            .await
            .map_err(|e| TransferError::Submission(format!("Submission task failed: {}", e)))??;

        Ok(TransferOutcome {
            success: true,
            tx_hash,
            recipient,
            amount: request.amount.trim().to_string(),
            block_number,
        })
    }

    fn validate(request: &TransferRequest) -> Result<Asset, TransferError> {
        if request.recipient.trim().is_empty() || request.amount.trim().is_empty() {
            return Err(TransferError::InvalidRequest(
                "Recipient and amount are required".to_string(),
            ));
        }

        if request.is_native {
            amount::to_base_units(&request.amount, NATIVE_DECIMALS)?;
            return Ok(Asset::Native);
        }

        let contract = match request.token_address.as_deref().map(str::trim) {
            None | Some("") => {
                return Err(TransferError::InvalidRequest(
                    "Token address is required for token transfers".to_string(),
                ));
            }
            Some(raw) => parse_address(raw).ok_or_else(|| {
                TransferError::InvalidRequest(format!("Invalid token address: {}", raw))
            })?,
        };

        match request.token_decimals {
            Some(decimals) => {
                amount::to_base_units(&request.amount, decimals)?;
            }
            None => {
                amount::validate_amount(&request.amount)?;
            }
        }

        Ok(Asset::Token {
            contract,
            decimals: request.token_decimals,
        })
    }

    async fn token_units(
        &self,
        request: &TransferRequest,
        contract: Address,
        decimals: Option<u8>,
    ) -> Result<U256, TransferError> {
        let decimals = match decimals {
            Some(decimals) => decimals,
            None => self
                .submitter
                .token_decimals(contract)
                .await
                .map_err(|e| TransferError::TokenMetadataUnavailable(e.to_string()))?,
        };
        Ok(amount::to_base_units(&request.amount, decimals)?)
    }
}

async fn broadcast(
    submitter: Arc<dyn TransactionSubmitter>,
    tx: TransactionRequest,
    wait_for_confirmation: bool,
) -> Result<(TxHash, Option<u64>), TransferError> {
    let tx_hash = submitter
        .submit(tx)
        .await
        .map_err(TransferError::submission)?;
    tracing::info!(tx_hash = %tx_hash, "Transaction broadcast");

    if !wait_for_confirmation {
        return Ok((tx_hash, None));
    }

    match submitter.wait_for_confirmation(tx_hash).await {
        Ok(ConfirmationStatus::Confirmed { block_number }) => Ok((tx_hash, Some(block_number))),
        Ok(ConfirmationStatus::Failed(reason)) => Err(TransferError::Submission(reason)),
        Err(e) => {
            // Already broadcast; report the hash and let the client follow up.
            tracing::warn!(tx_hash = %tx_hash, error = %e, "Confirmation not observed");
            Ok((tx_hash, None))
        }
    }
}

fn log_fees(fees: &FeeParameters) {
    match fees {
        FeeParameters::Legacy { gas_price } => {
            tracing::debug!(gas_price = %gas_price, "Using legacy fees");
        }
        FeeParameters::Eip1559 {
            max_fee_per_gas,
            max_priority_fee_per_gas,
        } => {
            tracing::debug!(
                max_fee_per_gas = %max_fee_per_gas,
                max_priority_fee_per_gas = %max_priority_fee_per_gas,
                "Using EIP-1559 fees"
            );
        }
    }
}
