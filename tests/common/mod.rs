//! Shared utilities for integration testing.

#![allow(dead_code)]

use alloy::primitives::{Address, Bytes, TxHash, B256, U256};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use ens_asset_gateway::blockchain::{
    BlockchainError, BlockchainResult, ConfirmationStatus, ContractReader, FeeParameters,
    TransactionSubmitter,
};
use ens_asset_gateway::config::{GatewayConfig, TransferConfig};
use ens_asset_gateway::http::{AppState, HttpServer};
use ens_asset_gateway::lifecycle::Shutdown;
use ens_asset_gateway::naming::namehash::{namehash, token_id};
use ens_asset_gateway::naming::{
    NameClassifier, PrimaryNameResolver, RegistryTarget, ResolutionDispatcher,
    SecondaryVariantAResolver, SecondaryVariantBResolver,
};
use ens_asset_gateway::transfer::TransferOrchestrator;

pub const ENS_REGISTRY: Address = Address::repeat_byte(0xe1);
pub const PUBLIC_RESOLVER: Address = Address::repeat_byte(0xe2);
pub const L2_RESOLVER: Address = Address::repeat_byte(0xb1);
pub const BASE_REGISTRAR: Address = Address::repeat_byte(0xb2);

const SEL_RESOLVER: [u8; 4] = [0x01, 0x78, 0xb8, 0xbf]; // resolver(bytes32)
const SEL_ADDR: [u8; 4] = [0x3b, 0x3b, 0x57, 0xde]; // addr(bytes32)
const SEL_OWNER_OF: [u8; 4] = [0x63, 0x52, 0x21, 0x1e]; // ownerOf(uint256)

fn word(address: Address) -> Bytes {
    Bytes::copy_from_slice(address.into_word().as_slice())
}

/// In-memory registries answering `eth_call` by selector.
#[derive(Default)]
pub struct StubChain {
    /// ENS node → address record (served by `PUBLIC_RESOLVER` and `L2_RESOLVER`).
    records: HashMap<B256, Address>,
    /// Registrar token id → owner.
    owners: HashMap<U256, Address>,
    unreachable: bool,
    delay: Option<Duration>,
    pub calls: AtomicUsize,
}

impl StubChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    pub fn with_record(mut self, name: &str, address: Address) -> Self {
        self.records.insert(namehash(name), address);
        self
    }

    /// Every call stalls for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_owner(mut self, name: &str, owner: Address) -> Self {
        self.owners.insert(token_id(name), owner);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContractReader for StubChain {
    async fn call(&self, to: Address, data: Bytes) -> BlockchainResult<Bytes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.unreachable {
            return Err(BlockchainError::Rpc("connection refused".into()));
        }
        if data.len() != 36 {
            return Err(BlockchainError::Reverted("bad calldata".into()));
        }

        let selector: [u8; 4] = [data[0], data[1], data[2], data[3]];
        let arg = B256::from_slice(&data[4..36]);

        if to == ENS_REGISTRY && selector == SEL_RESOLVER {
            let resolver = if self.records.contains_key(&arg) {
                PUBLIC_RESOLVER
            } else {
                Address::ZERO
            };
            return Ok(word(resolver));
        }
        if (to == PUBLIC_RESOLVER || to == L2_RESOLVER) && selector == SEL_ADDR {
            return Ok(word(self.records.get(&arg).copied().unwrap_or(Address::ZERO)));
        }
        if to == BASE_REGISTRAR && selector == SEL_OWNER_OF {
            return match self.owners.get(&U256::from_be_bytes(arg.0)) {
                Some(owner) => Ok(word(*owner)),
                None => Err(BlockchainError::Reverted("ERC721: invalid token ID".into())),
            };
        }
        Ok(Bytes::new())
    }

    fn network(&self) -> &str {
        "stub"
    }
}

/// Real resolvers wired to a single stub chain.
pub fn dispatcher(chain: Arc<StubChain>) -> ResolutionDispatcher {
    ResolutionDispatcher::new(NameClassifier::default())
        .with_primary(Arc::new(PrimaryNameResolver::new(chain.clone(), ENS_REGISTRY)))
        .with_variant_a(Arc::new(SecondaryVariantAResolver::new(
            chain.clone(),
            L2_RESOLVER,
        )))
        .with_variant_b(Arc::new(SecondaryVariantBResolver::new(
            vec![RegistryTarget {
                reader: chain,
                contract: BASE_REGISTRAR,
            }],
            ".base",
        )))
}

/// Submitter that records requests instead of signing them.
#[derive(Default)]
pub struct StubSubmitter {
    pub token_decimals: Option<u8>,
    pub reject_with: Option<String>,
    pub confirm_delay: Option<Duration>,
    pub fee_calls: AtomicUsize,
    pub submitted: Mutex<Vec<TransactionRequest>>,
}

impl StubSubmitter {
    pub fn submissions(&self) -> Vec<TransactionRequest> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransactionSubmitter for StubSubmitter {
    async fn fee_parameters(&self) -> BlockchainResult<FeeParameters> {
        self.fee_calls.fetch_add(1, Ordering::SeqCst);
        Ok(FeeParameters::Legacy {
            gas_price: 15_000_000_000,
        })
    }

    async fn token_decimals(&self, _token: Address) -> BlockchainResult<u8> {
        self.token_decimals
            .ok_or_else(|| BlockchainError::Rpc("decimals() unavailable".into()))
    }

    async fn submit(&self, tx: TransactionRequest) -> BlockchainResult<TxHash> {
        self.submitted.lock().unwrap().push(tx);
        match &self.reject_with {
            Some(msg) => Err(BlockchainError::Rejected(msg.clone())),
            None => Ok(TxHash::repeat_byte(0x5e)),
        }
    }

    async fn wait_for_confirmation(&self, _tx_hash: TxHash) -> BlockchainResult<ConfirmationStatus> {
        if let Some(delay) = self.confirm_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(ConfirmationStatus::Confirmed { block_number: 1 })
    }
}

/// Gateway wired to stubs, with transfers enabled when a submitter is given.
pub fn state(chain: Arc<StubChain>, submitter: Option<Arc<StubSubmitter>>) -> AppState {
    state_with(chain, submitter, TransferConfig::default())
}

pub fn state_with(
    chain: Arc<StubChain>,
    submitter: Option<Arc<StubSubmitter>>,
    transfer: TransferConfig,
) -> AppState {
    let dispatcher = dispatcher(chain);
    let state = AppState::new(dispatcher.clone());
    match submitter {
        Some(submitter) => state.with_transfers(Arc::new(TransferOrchestrator::new(
            dispatcher,
            submitter,
            transfer,
        ))),
        None => state,
    }
}

/// A running gateway on an ephemeral port. Stops when dropped.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    shutdown: Shutdown,
}

impl TestGateway {
    pub async fn start(state: AppState) -> Self {
        Self::start_with(&GatewayConfig::default(), state).await
    }

    pub async fn start_with(config: &GatewayConfig, state: AppState) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let shutdown = Shutdown::new();
        let server = HttpServer::new(config, state);
        let rx = shutdown.subscribe();
        tokio::spawn(async move {
            let _ = server.run(listener, rx).await;
        });

        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        Self {
            addr,
            client,
            shutdown,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn post(&self, path: &str, body: serde_json::Value) -> (u16, serde_json::Value) {
        let res = self
            .client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .expect("gateway unreachable");
        let status = res.status().as_u16();
        (status, res.json().await.unwrap_or(serde_json::Value::Null))
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}
