//! Request handlers.
//!
//! Bodies are camelCase JSON. Malformed JSON and missing fields are both 400.

use alloy::primitives::Address;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::naming::NameClass;
use crate::transfer::{TransferError, TransferOutcome, TransferRequest};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveEnsBody {
    pub ens_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveBaseBody {
    pub base_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResolveBody {
    pub identifier: Option<String>,
}

/// Amounts may be sent as JSON strings or numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AmountField {
    Text(String),
    Number(serde_json::Number),
}

impl AmountField {
    pub fn into_decimal_string(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(number) => number.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendAssetBody {
    pub recipient: Option<String>,
    pub amount: Option<AmountField>,
    #[serde(default = "default_is_eth")]
    pub is_eth: bool,
    pub token_address: Option<String>,
    pub decimals: Option<u8>,
}

fn default_is_eth() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct AddressResponse {
    pub address: String,
}

#[derive(Debug, Serialize)]
pub struct ClassifiedAddressResponse {
    pub address: String,
    pub scheme: NameClass,
}

/// `GET /`
pub async fn root() -> &'static str {
    "ENS asset gateway is running"
}

/// `GET /health`: per-network reachability.
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let mut networks = BTreeMap::new();
    for client in state.networks.iter() {
        networks.insert(
            client.name().to_string(),
            json!({
                "reachable": client.is_healthy().await,
                "chainId": client.config().chain_id,
            }),
        );
    }

    let all_reachable = networks
        .values()
        .all(|n| n["reachable"].as_bool().unwrap_or(false));

    Json(json!({
        "status": if all_reachable { "ok" } else { "degraded" },
        "transfersEnabled": state.transfers.is_some(),
        "networks": networks,
    }))
}

/// `POST /resolve-ens`
pub async fn resolve_ens(
    State(state): State<AppState>,
    body: Result<Json<ResolveEnsBody>, JsonRejection>,
) -> Result<Json<AddressResponse>, ApiError> {
    let Json(body) = body?;
    let name = required(body.ens_name, "ENS name is required")?;

    let address = state
        .dispatcher
        .resolve_identifier(&name)
        .await
        .map_err(|e| ApiError::from_resolution("ENS name", e))?;
    Ok(Json(AddressResponse {
        address: checksummed(address),
    }))
}

/// `POST /resolve-base`
pub async fn resolve_base(
    State(state): State<AppState>,
    body: Result<Json<ResolveBaseBody>, JsonRejection>,
) -> Result<Json<AddressResponse>, ApiError> {
    let Json(body) = body?;
    let name = required(body.base_name, "Base name is required")?;

    let address = state
        .dispatcher
        .resolve_identifier(&name)
        .await
        .map_err(|e| ApiError::from_resolution("Base name", e))?;
    Ok(Json(AddressResponse {
        address: checksummed(address),
    }))
}

/// `POST /resolve`: any identifier, reporting the scheme it was resolved by.
pub async fn resolve(
    State(state): State<AppState>,
    body: Result<Json<ResolveBody>, JsonRejection>,
) -> Result<Json<ClassifiedAddressResponse>, ApiError> {
    let Json(body) = body?;
    let identifier = required(body.identifier, "Identifier is required")?;

    let (scheme, result) = state.dispatcher.resolve_classified(&identifier).await;
    let address = result.map_err(|e| ApiError::from_resolution("Name", e))?;
    Ok(Json(ClassifiedAddressResponse {
        address: checksummed(address),
        scheme,
    }))
}

/// `POST /send-asset`
pub async fn send_asset(
    State(state): State<AppState>,
    body: Result<Json<SendAssetBody>, JsonRejection>,
) -> Result<Json<TransferOutcome>, ApiError> {
    let Json(body) = body?;

    let orchestrator = state.transfers.as_ref().ok_or_else(|| {
        ApiError::from(TransferError::Disabled(
            "no signing credential is configured".to_string(),
        ))
    })?;

    let request = TransferRequest {
        recipient: body.recipient.unwrap_or_default(),
        amount: body
            .amount
            .map(AmountField::into_decimal_string)
            .unwrap_or_default(),
        is_native: body.is_eth,
        token_address: body.token_address,
        token_decimals: body.decimals,
    };

    let outcome = orchestrator.submit_transfer(&request).await?;
    Ok(Json(outcome))
}

fn required(value: Option<String>, message: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::bad_request(message)),
    }
}

fn checksummed(address: Address) -> String {
    address.to_checksum(None)
}
