//! Registry resolvers, one per naming scheme that needs a network lookup.
//!
//! Each resolver talks to the chain only through [`ContractReader`] and turns
//! every chain failure into a [`ResolutionError`] before returning.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use std::sync::Arc;

use crate::blockchain::ContractReader;
use crate::naming::address::is_zero_address;
use crate::naming::classifier::normalize_name;
use crate::naming::namehash::{namehash, token_id};
use crate::naming::types::{ResolutionError, ResolutionResult};

sol! {
    /// ENS registry: node → resolver contract.
    interface IEnsRegistry {
        function resolver(bytes32 node) external view returns (address);
    }

    /// Address record of a public resolver.
    interface IAddrResolver {
        function addr(bytes32 node) external view returns (address);
    }

    /// ERC-721 registrar keyed by label hash.
    interface INameRegistrar {
        function ownerOf(uint256 tokenId) external view returns (address);
    }
}

/// Resolves names of one naming scheme to an address.
#[async_trait]
pub trait RegistryResolver: Send + Sync {
    /// Look `name` up in the backing registry.
    async fn resolve(&self, name: &str) -> ResolutionResult;
}

/// Run a single-address view call and classify the outcome.
async fn call_for_address<C>(
    reader: &dyn ContractReader,
    contract: Address,
    call: C,
    name: &str,
) -> ResolutionResult
where
    C: SolCall<Return = Address> + Send,
{
    let data = reader
        .call(contract, Bytes::from(call.abi_encode()))
        .await
        .map_err(|e| ResolutionError::from_chain(name, e))?;

    // An empty reply comes from a contract that does not implement the call.
    let address = C::abi_decode_returns(&data)
        .map_err(|_| ResolutionError::NotFound(name.to_string()))?;

    if is_zero_address(&address) {
        return Err(ResolutionError::NotFound(name.to_string()));
    }
    Ok(address)
}

/// Standard ENS resolution: registry → resolver → `addr(node)`.
pub struct PrimaryNameResolver {
    reader: Arc<dyn ContractReader>,
    registry: Address,
}

impl PrimaryNameResolver {
    pub fn new(reader: Arc<dyn ContractReader>, registry: Address) -> Self {
        Self { reader, registry }
    }
}

#[async_trait]
impl RegistryResolver for PrimaryNameResolver {
    async fn resolve(&self, name: &str) -> ResolutionResult {
        let name = normalize_name(name);
        let node = namehash(&name);

        let resolver = call_for_address(
            self.reader.as_ref(),
            self.registry,
            IEnsRegistry::resolverCall { node },
            &name,
        )
        .await?;

        tracing::debug!(name = %name, resolver = %resolver, "ENS resolver located");

        call_for_address(
            self.reader.as_ref(),
            resolver,
            IAddrResolver::addrCall { node },
            &name,
        )
        .await
    }
}

/// Compound-suffix names: `addr(namehash(name))` on one fixed resolver contract.
pub struct SecondaryVariantAResolver {
    reader: Arc<dyn ContractReader>,
    resolver: Address,
}

impl SecondaryVariantAResolver {
    pub fn new(reader: Arc<dyn ContractReader>, resolver: Address) -> Self {
        Self { reader, resolver }
    }
}

#[async_trait]
impl RegistryResolver for SecondaryVariantAResolver {
    async fn resolve(&self, name: &str) -> ResolutionResult {
        let name = normalize_name(name);
        let node = namehash(&name);
        tracing::debug!(name = %name, node = %node, network = self.reader.network(), "Resolving compound name");

        call_for_address(
            self.reader.as_ref(),
            self.resolver,
            IAddrResolver::addrCall { node },
            &name,
        )
        .await
    }
}

/// A registrar contract on a specific network.
pub struct RegistryTarget {
    pub reader: Arc<dyn ContractReader>,
    pub contract: Address,
}

/// Bare secondary names: `ownerOf(labelhash)` on the chain's registrar.
///
/// Registries are tried in configuration order; the search only moves on when a
/// registry cannot be reached.
pub struct SecondaryVariantBResolver {
    registries: Vec<RegistryTarget>,
    default_suffix: String,
}

impl SecondaryVariantBResolver {
    pub fn new(registries: Vec<RegistryTarget>, default_suffix: impl Into<String>) -> Self {
        Self {
            registries,
            default_suffix: default_suffix.into().to_lowercase(),
        }
    }

    /// Lower-case the name and append the default suffix to dotless names.
    pub fn normalize(&self, name: &str) -> String {
        let name = normalize_name(name);
        if name.contains('.') {
            name
        } else {
            format!("{}{}", name, self.default_suffix)
        }
    }

    async fn owner_of(&self, target: &RegistryTarget, token: U256, name: &str) -> ResolutionResult {
        call_for_address(
            target.reader.as_ref(),
            target.contract,
            INameRegistrar::ownerOfCall { tokenId: token },
            name,
        )
        .await
    }
}

#[async_trait]
impl RegistryResolver for SecondaryVariantBResolver {
    async fn resolve(&self, name: &str) -> ResolutionResult {
        let name = self.normalize(name);
        let token = token_id(&name);

        let mut last_error =
            ResolutionError::RegistryUnavailable(format!("{}: no registry configured", name));

        for target in &self.registries {
            tracing::debug!(name = %name, network = target.reader.network(), registry = %target.contract, "Querying registrar");
            match self.owner_of(target, token, &name).await {
                Err(ResolutionError::RegistryUnavailable(reason)) => {
                    tracing::warn!(network = target.reader.network(), reason = %reason, "Registrar unreachable, trying next");
                    last_error = ResolutionError::RegistryUnavailable(reason);
                }
                outcome => return outcome,
            }
        }

        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::{BlockchainError, BlockchainResult};
    use alloy::primitives::{address, B256};
    use alloy::sol_types::SolValue;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const REGISTRY: Address = address!("00000000000C2E074eC69A0dFb2997BA6C7d2e1e");
    const RESOLVER: Address = address!("4976fb03C32e5B8cfe2b6cCB31c09Ba78EBaBa41");
    const ALICE: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

    #[derive(Clone)]
    enum Answer {
        Address(Address),
        Empty,
        Revert,
        Down,
    }

    /// Records every call and answers from a table keyed by (contract, calldata).
    struct StubReader {
        network: &'static str,
        answers: HashMap<(Address, Bytes), Answer>,
        fallback: Answer,
        calls: Mutex<Vec<(Address, Bytes)>>,
        count: AtomicUsize,
    }

    impl StubReader {
        fn new(network: &'static str, fallback: Answer) -> Self {
            Self {
                network,
                answers: HashMap::new(),
                fallback,
                calls: Mutex::new(Vec::new()),
                count: AtomicUsize::new(0),
            }
        }

        fn answer<C: SolCall>(mut self, contract: Address, call: C, answer: Answer) -> Self {
            self.answers
                .insert((contract, Bytes::from(call.abi_encode())), answer);
            self
        }
    }

    #[async_trait]
    impl ContractReader for StubReader {
        async fn call(&self, to: Address, data: Bytes) -> BlockchainResult<Bytes> {
            self.count.fetch_add(1, Ordering::SeqCst);
            self.calls.lock().unwrap().push((to, data.clone()));
            let answer = self
                .answers
                .get(&(to, data))
                .cloned()
                .unwrap_or_else(|| self.fallback.clone());
            match answer {
                Answer::Address(a) => Ok(Bytes::from(a.abi_encode())),
                Answer::Empty => Ok(Bytes::new()),
                Answer::Revert => Err(BlockchainError::Reverted("execution reverted".into())),
                Answer::Down => Err(BlockchainError::Rpc("connection refused".into())),
            }
        }

        fn network(&self) -> &str {
            self.network
        }
    }

    fn node(name: &str) -> B256 {
        namehash(name)
    }

    #[tokio::test]
    async fn test_primary_resolution() {
        let reader = StubReader::new("primary", Answer::Address(Address::ZERO))
            .answer(REGISTRY, IEnsRegistry::resolverCall { node: node("alice.eth") }, Answer::Address(RESOLVER))
            .answer(RESOLVER, IAddrResolver::addrCall { node: node("alice.eth") }, Answer::Address(ALICE));
        let resolver = PrimaryNameResolver::new(Arc::new(reader), REGISTRY);

        assert_eq!(resolver.resolve("Alice.eth").await, Ok(ALICE));
    }

    #[tokio::test]
    async fn test_primary_without_resolver_is_not_found() {
        let reader = Arc::new(StubReader::new("primary", Answer::Address(Address::ZERO)));
        let resolver = PrimaryNameResolver::new(reader.clone(), REGISTRY);

        let first = resolver.resolve("nosuch.eth").await;
        let second = resolver.resolve("nosuch.eth").await;
        assert_eq!(first, Err(ResolutionError::NotFound("nosuch.eth".into())));
        assert_eq!(first, second);
        // Zero resolver short-circuits: one registry call per lookup.
        assert_eq!(reader.count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_primary_transport_failure() {
        let reader = StubReader::new("primary", Answer::Down);
        let resolver = PrimaryNameResolver::new(Arc::new(reader), REGISTRY);

        let err = resolver.resolve("alice.eth").await.unwrap_err();
        assert_eq!(err.kind(), "registry_unavailable");
    }

    #[tokio::test]
    async fn test_variant_a_zero_record() {
        let reader = StubReader::new("primary", Answer::Address(Address::ZERO))
            .answer(RESOLVER, IAddrResolver::addrCall { node: node("jesse.base.eth") }, Answer::Address(ALICE));
        let resolver = SecondaryVariantAResolver::new(Arc::new(reader), RESOLVER);

        assert_eq!(resolver.resolve("jesse.base.eth").await, Ok(ALICE));
        assert_eq!(
            resolver.resolve("nobody.base.eth").await,
            Err(ResolutionError::NotFound("nobody.base.eth".into()))
        );
    }

    #[tokio::test]
    async fn test_variant_b_normalizes_dotless_names() {
        let registrar = address!("03c4738ee98ae44591e1a4a4f3cab6641d95dd9a");
        let reader = Arc::new(StubReader::new("base", Answer::Revert).answer(
            registrar,
            INameRegistrar::ownerOfCall { tokenId: token_id("bob.base") },
            Answer::Address(ALICE),
        ));
        let resolver = SecondaryVariantBResolver::new(
            vec![RegistryTarget { reader: reader.clone(), contract: registrar }],
            ".base",
        );

        assert_eq!(resolver.normalize("Bob"), "bob.base");
        assert_eq!(resolver.normalize("bob.base"), "bob.base");
        assert_eq!(resolver.resolve("bob").await, Ok(ALICE));

        // Reverted ownerOf (burnt or never minted) is a miss.
        assert_eq!(
            resolver.resolve("carol").await,
            Err(ResolutionError::NotFound("carol.base".into()))
        );
        assert_eq!(reader.calls.lock().unwrap()[0].0, registrar);
    }

    #[tokio::test]
    async fn test_variant_b_empty_reply_is_not_found() {
        let registrar = address!("03c4738ee98ae44591e1a4a4f3cab6641d95dd9a");
        let reader = Arc::new(StubReader::new("base", Answer::Empty));
        let resolver = SecondaryVariantBResolver::new(
            vec![RegistryTarget { reader, contract: registrar }],
            ".base",
        );
        assert_eq!(
            resolver.resolve("dave").await,
            Err(ResolutionError::NotFound("dave.base".into()))
        );
    }

    #[tokio::test]
    async fn test_variant_b_tries_registries_until_reachable() {
        let registrar = address!("03c4738ee98ae44591e1a4a4f3cab6641d95dd9a");
        let mainnet = Arc::new(StubReader::new("base", Answer::Down));
        let testnet = Arc::new(StubReader::new("base_sepolia", Answer::Revert));
        let third = Arc::new(StubReader::new("other", Answer::Address(ALICE)));
        let resolver = SecondaryVariantBResolver::new(
            vec![
                RegistryTarget { reader: mainnet.clone(), contract: registrar },
                RegistryTarget { reader: testnet.clone(), contract: registrar },
                RegistryTarget { reader: third.clone(), contract: registrar },
            ],
            ".base",
        );

        // NotFound from the second registry ends the search.
        assert_eq!(
            resolver.resolve("erin").await,
            Err(ResolutionError::NotFound("erin.base".into()))
        );
        assert_eq!(mainnet.count.load(Ordering::SeqCst), 1);
        assert_eq!(testnet.count.load(Ordering::SeqCst), 1);
        assert_eq!(third.count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_variant_b_all_unreachable() {
        let registrar = address!("03c4738ee98ae44591e1a4a4f3cab6641d95dd9a");
        let resolver = SecondaryVariantBResolver::new(
            vec![RegistryTarget {
                reader: Arc::new(StubReader::new("base", Answer::Down)),
                contract: registrar,
            }],
            ".base",
        );
        let err = resolver.resolve("frank").await.unwrap_err();
        assert!(matches!(err, ResolutionError::RegistryUnavailable(_)));

        let empty = SecondaryVariantBResolver::new(Vec::new(), ".base");
        assert!(matches!(
            empty.resolve("frank").await,
            Err(ResolutionError::RegistryUnavailable(_))
        ));
    }
}
