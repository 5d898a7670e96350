//! Name resolution subsystem.
//!
//! # Data Flow
//! ```text
//! identifier
//!     → classifier.rs (address? .eth? .base.eth? .base / dotless?)
//!     → dispatcher.rs (pick exactly one resolver)
//!     → resolver.rs (registry calls through blockchain::ContractReader)
//!     → Address | ResolutionError
//! ```
//!
//! # Design Decisions
//! - Classification is pure and total; only resolvers touch the network
//! - Resolvers classify chain failures themselves (NotFound vs RegistryUnavailable)
//! - Nothing is cached: every lookup reads the registry

pub mod address;
pub mod classifier;
pub mod dispatcher;
pub mod namehash;
pub mod resolver;
pub mod types;

pub use address::{is_valid_address, is_zero_address, parse_address};
pub use classifier::NameClassifier;
pub use dispatcher::ResolutionDispatcher;
pub use resolver::{
    PrimaryNameResolver, RegistryResolver, RegistryTarget, SecondaryVariantAResolver,
    SecondaryVariantBResolver,
};
pub use types::{NameClass, ResolutionError, ResolutionResult};
