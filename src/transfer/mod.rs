//! Asset transfer subsystem.
//!
//! # Data Flow
//! ```text
//! TransferRequest
//!     → orchestrator.rs (validate, resolve, re-validate)
//!     → amount.rs (decimal text → base units)
//!     → blockchain::TransactionSubmitter (fees, sign, broadcast, confirm)
//!     → TransferOutcome | TransferError
//! ```

pub mod amount;
pub mod orchestrator;
pub mod types;

pub use amount::AmountError;
pub use orchestrator::TransferOrchestrator;
pub use types::{TransferError, TransferOutcome, TransferRequest};
